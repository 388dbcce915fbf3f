use serde::Serialize;

mod rbac;

pub use rbac::{
    AccessQuery, AccessResponse, AddGroupMemberRequest, AssignRoleRequest,
    CreatePermissionRequest, CreateRoleRequest, CreateUserGroupRequest, DefaultRoleRequest,
    PermissionListingResponse, PermissionResponse, RoleListingResponse, RoleResponse,
    UpdateRoleRequest, UpdateUserGroupRequest, UserGroupResponse, UserRoleResponse,
    UserRolesResponse,
};

/// Health response payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;

use tessera_application::{
    CreatePermissionInput, CreateRoleInput, CreateUserGroupInput, UpdateRoleInput,
    UpdateUserGroupInput,
};
use tessera_core::AppResult;
use tessera_domain::{GroupId, PermissionId, RoleId, UserId};

use crate::dto::{
    AccessQuery, AccessResponse, AddGroupMemberRequest, AssignRoleRequest,
    CreatePermissionRequest, CreateRoleRequest, CreateUserGroupRequest, DefaultRoleRequest,
    PermissionListingResponse, PermissionResponse, RoleListingResponse, RoleResponse,
    UpdateRoleRequest, UpdateUserGroupRequest, UserGroupResponse, UserRoleResponse,
    UserRolesResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

mod groups;
mod permissions;
mod roles;
mod users;

pub use groups::{
    add_group_member_handler, assign_group_role_handler, create_group_handler,
    delete_group_handler, get_group_handler, list_groups_handler, remove_group_member_handler,
    remove_group_role_handler, update_group_handler,
};
pub use permissions::{
    create_permission_handler, delete_permission_handler, list_permissions_handler,
};
pub use roles::{
    create_role_handler, delete_role_handler, get_role_handler, list_roles_handler,
    update_role_handler,
};
pub use users::{
    assign_user_role_handler, check_access_handler, default_user_role_handler,
    list_user_roles_handler, remove_user_role_handler,
};

fn parse_ids<T>(values: &[String]) -> AppResult<Vec<T>>
where
    T: std::str::FromStr<Err = tessera_core::AppError>,
{
    values.iter().map(|value| value.parse::<T>()).collect()
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

mod conversions;

/// Incoming payload for custom role creation.
#[derive(Debug, Deserialize)]
pub struct CreateRoleRequest {
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub permission_ids: Vec<String>,
}

/// Incoming payload for custom role updates. Omitted fields stay unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateRoleRequest {
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub permission_ids: Option<Vec<String>>,
}

/// Incoming payload for group creation.
#[derive(Debug, Deserialize)]
pub struct CreateUserGroupRequest {
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
    pub creator_id: String,
    #[serde(default)]
    pub member_ids: Vec<String>,
    #[serde(default)]
    pub role_ids: Vec<String>,
}

/// Incoming payload for group updates. Omitted fields stay unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserGroupRequest {
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub description: Option<String>,
}

/// Incoming payload for adding a group member.
#[derive(Debug, Deserialize)]
pub struct AddGroupMemberRequest {
    pub user_id: String,
}

/// Incoming payload for attaching a role to a user or group.
#[derive(Debug, Deserialize)]
pub struct AssignRoleRequest {
    pub role_id: String,
}

/// Incoming payload for default role provisioning.
#[derive(Debug, Default, Deserialize)]
pub struct DefaultRoleRequest {
    #[serde(default)]
    pub is_admin: bool,
}

/// Incoming payload for catalog permission creation.
#[derive(Debug, Deserialize)]
pub struct CreatePermissionRequest {
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
    pub resource: String,
    pub action: String,
}

/// Query string of an access check.
#[derive(Debug, Deserialize)]
pub struct AccessQuery {
    pub resource: String,
    pub action: String,
}

/// API representation of a catalog permission.
#[derive(Debug, Serialize)]
pub struct PermissionResponse {
    pub id: String,
    pub name: String,
    pub resource: String,
    pub action: String,
    pub display_name: String,
    pub description: String,
}

/// Permission with the number of roles granting it.
#[derive(Debug, Serialize)]
pub struct PermissionListingResponse {
    #[serde(flatten)]
    pub permission: PermissionResponse,
    pub role_count: u64,
}

/// API representation of a role with its permissions.
#[derive(Debug, Serialize)]
pub struct RoleResponse {
    pub id: String,
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub is_system: bool,
    pub created_at: DateTime<Utc>,
    pub permissions: Vec<PermissionResponse>,
}

/// Role with usage counts.
#[derive(Debug, Serialize)]
pub struct RoleListingResponse {
    #[serde(flatten)]
    pub role: RoleResponse,
    pub user_count: u64,
    pub group_count: u64,
}

/// API representation of a user group.
#[derive(Debug, Serialize)]
pub struct UserGroupResponse {
    pub id: String,
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub creator_id: String,
    pub created_at: DateTime<Utc>,
    pub member_ids: Vec<String>,
    pub role_ids: Vec<String>,
}

/// API representation of a direct user-role link.
#[derive(Debug, Serialize)]
pub struct UserRoleResponse {
    pub user_id: String,
    pub role_id: String,
    pub role_name: String,
    pub role_display_name: String,
    pub is_system: bool,
    pub assigned_at: DateTime<Utc>,
}

/// Direct roles of a user with the effective permission union.
#[derive(Debug, Serialize)]
pub struct UserRolesResponse {
    pub user_id: String,
    pub roles: Vec<UserRoleResponse>,
    pub permissions: Vec<String>,
}

/// Outcome of an access check.
#[derive(Debug, Serialize)]
pub struct AccessResponse {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

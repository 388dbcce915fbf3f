use chrono::{DateTime, Utc};
use tessera_domain::{Permission, PermissionId, Role, UserId};

/// Role with its attached permissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleDefinition {
    /// Stored role.
    pub role: Role,
    /// Permissions attached to the role, ordered by resource and action.
    pub permissions: Vec<Permission>,
}

/// Role listing row for administration screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleListing {
    /// Role and its permissions.
    pub definition: RoleDefinition,
    /// Number of users holding the role directly.
    pub user_count: u64,
    /// Number of groups holding the role.
    pub group_count: u64,
}

/// A user-role link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRoleAssignment {
    /// User holding the role.
    pub user_id: UserId,
    /// Assigned role.
    pub role: Role,
    /// Assignment timestamp.
    pub assigned_at: DateTime<Utc>,
}

/// Input payload for creating custom roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRoleInput {
    /// Unique role name.
    pub name: String,
    /// Human-readable name.
    pub display_name: String,
    /// Optional description; stored as empty when omitted.
    pub description: Option<String>,
    /// Permissions to attach.
    pub permission_ids: Vec<PermissionId>,
}

/// Input payload for updating custom roles; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateRoleInput {
    /// New unique role name.
    pub name: Option<String>,
    /// New display name.
    pub display_name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// Full replacement of the permission set.
    pub permission_ids: Option<Vec<PermissionId>>,
}

use tessera_domain::{Permission, PermissionKey};

/// Permission listing row with usage count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionListing {
    /// Stored permission.
    pub permission: Permission,
    /// Number of roles granting the permission.
    pub role_count: u64,
}

/// Input payload for creating catalog permissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePermissionInput {
    /// Unique permission name, conventionally `"resource:action"`.
    pub name: String,
    /// Human-readable name.
    pub display_name: String,
    /// Optional description; stored as empty when omitted.
    pub description: Option<String>,
    /// Resource and action granted.
    pub key: PermissionKey,
}

use tessera_domain::{RoleId, UserGroup, UserId};

/// Group with its members and roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupDefinition {
    /// Stored group.
    pub group: UserGroup,
    /// Member user ids.
    pub member_ids: Vec<UserId>,
    /// Roles inherited by every member.
    pub role_ids: Vec<RoleId>,
}

/// Input payload for creating groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateUserGroupInput {
    /// Unique group name.
    pub name: String,
    /// Human-readable name.
    pub display_name: String,
    /// Optional description; stored as empty when omitted.
    pub description: Option<String>,
    /// User recorded as the creator.
    pub creator_id: UserId,
    /// Initial members.
    pub member_ids: Vec<UserId>,
    /// Initial roles.
    pub role_ids: Vec<RoleId>,
}

/// Input payload for updating groups; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateUserGroupInput {
    /// New unique group name.
    pub name: Option<String>,
    /// New display name.
    pub display_name: Option<String>,
    /// New description.
    pub description: Option<String>,
}

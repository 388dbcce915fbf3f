use tessera_application::{
    GroupDefinition, PermissionListing, RoleDefinition, RoleListing, UserRoleAssignment,
};
use tessera_domain::Permission;

use super::{
    PermissionListingResponse, PermissionResponse, RoleListingResponse, RoleResponse,
    UserGroupResponse, UserRoleResponse,
};

impl From<Permission> for PermissionResponse {
    fn from(value: Permission) -> Self {
        Self {
            id: value.id().to_string(),
            name: value.name().as_str().to_owned(),
            resource: value.resource().as_str().to_owned(),
            action: value.action().as_str().to_owned(),
            display_name: value.display_name().as_str().to_owned(),
            description: value.description().to_owned(),
        }
    }
}

impl From<PermissionListing> for PermissionListingResponse {
    fn from(value: PermissionListing) -> Self {
        Self {
            permission: PermissionResponse::from(value.permission),
            role_count: value.role_count,
        }
    }
}

impl From<RoleDefinition> for RoleResponse {
    fn from(value: RoleDefinition) -> Self {
        let role = value.role;
        Self {
            id: role.id().to_string(),
            name: role.name().as_str().to_owned(),
            display_name: role.display_name().as_str().to_owned(),
            description: role.description().to_owned(),
            is_system: role.is_system(),
            created_at: role.created_at(),
            permissions: value
                .permissions
                .into_iter()
                .map(PermissionResponse::from)
                .collect(),
        }
    }
}

impl From<RoleListing> for RoleListingResponse {
    fn from(value: RoleListing) -> Self {
        Self {
            role: RoleResponse::from(value.definition),
            user_count: value.user_count,
            group_count: value.group_count,
        }
    }
}

impl From<GroupDefinition> for UserGroupResponse {
    fn from(value: GroupDefinition) -> Self {
        let group = value.group;
        Self {
            id: group.id().to_string(),
            name: group.name().as_str().to_owned(),
            display_name: group.display_name().as_str().to_owned(),
            description: group.description().to_owned(),
            creator_id: group.creator_id().as_str().to_owned(),
            created_at: group.created_at(),
            member_ids: value
                .member_ids
                .iter()
                .map(|user_id| user_id.as_str().to_owned())
                .collect(),
            role_ids: value.role_ids.iter().map(ToString::to_string).collect(),
        }
    }
}

impl From<UserRoleAssignment> for UserRoleResponse {
    fn from(value: UserRoleAssignment) -> Self {
        Self {
            user_id: value.user_id.as_str().to_owned(),
            role_id: value.role.id().to_string(),
            role_name: value.role.name().as_str().to_owned(),
            role_display_name: value.role.display_name().as_str().to_owned(),
            is_system: value.role.is_system(),
            assigned_at: value.assigned_at,
        }
    }
}

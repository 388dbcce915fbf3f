use async_trait::async_trait;

use tessera_core::AppResult;
use tessera_domain::{GroupId, Permission, PermissionId, Role, RoleId, UserGroup, UserId};

use super::groups::GroupDefinition;
use super::permissions::PermissionListing;
use super::roles::{RoleDefinition, RoleListing, UserRoleAssignment};

/// Repository port for role, group and permission administration.
///
/// Implementations enforce the unique constraints on permission, role and
/// group names and on every join pair, and make each multi-row write
/// (create with initial links, permission replacement, cascading delete)
/// atomic.
#[async_trait]
pub trait RbacAdminRepository: Send + Sync {
    /// Lists all roles with grants and usage counts, newest first.
    async fn list_roles(&self) -> AppResult<Vec<RoleListing>>;

    /// Finds a role with its grants.
    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<RoleDefinition>>;

    /// Finds a role by unique name.
    async fn find_role_by_name(&self, name: &str) -> AppResult<Option<Role>>;

    /// Inserts a role and attaches grants.
    ///
    /// Fails with `DuplicateName` when the name is taken and `NotFound` when
    /// a permission id does not exist.
    async fn create_role(
        &self,
        role: Role,
        permission_ids: Vec<PermissionId>,
    ) -> AppResult<RoleDefinition>;

    /// Stores new scalar fields for a custom role and, when provided,
    /// replaces its grants in the same transaction.
    async fn update_role(
        &self,
        role: Role,
        permission_ids: Option<Vec<PermissionId>>,
    ) -> AppResult<RoleDefinition>;

    /// Deletes a role with its grants, user links and group links.
    async fn delete_role(&self, role_id: RoleId) -> AppResult<()>;

    /// Inserts a system role when its name is unknown and returns the stored role.
    async fn upsert_system_role(&self, role: Role) -> AppResult<Role>;

    /// Replaces a role's grants atomically without the system-role guard.
    async fn replace_role_permissions(
        &self,
        role_id: RoleId,
        permission_ids: Vec<PermissionId>,
    ) -> AppResult<()>;

    /// Links a role to a user; `DuplicateAssignment` when already linked.
    async fn assign_role_to_user(
        &self,
        user_id: &UserId,
        role_id: RoleId,
    ) -> AppResult<UserRoleAssignment>;

    /// Removes a user-role link if present.
    async fn remove_role_from_user(&self, user_id: &UserId, role_id: RoleId) -> AppResult<()>;

    /// Lists roles linked directly to a user.
    async fn list_user_roles(&self, user_id: &UserId) -> AppResult<Vec<UserRoleAssignment>>;

    /// Lists all groups with members and roles, newest first.
    async fn list_user_groups(&self) -> AppResult<Vec<GroupDefinition>>;

    /// Finds a group with members and roles.
    async fn find_user_group(&self, group_id: GroupId) -> AppResult<Option<GroupDefinition>>;

    /// Inserts a group with initial members and roles.
    async fn create_user_group(
        &self,
        group: UserGroup,
        member_ids: Vec<UserId>,
        role_ids: Vec<RoleId>,
    ) -> AppResult<GroupDefinition>;

    /// Stores new scalar fields for a group.
    async fn update_user_group(&self, group: UserGroup) -> AppResult<GroupDefinition>;

    /// Deletes a group with its member and role links.
    async fn delete_user_group(&self, group_id: GroupId) -> AppResult<()>;

    /// Adds a member; `DuplicateAssignment` when already a member.
    async fn add_user_to_group(&self, group_id: GroupId, user_id: &UserId) -> AppResult<()>;

    /// Removes a member if present.
    async fn remove_user_from_group(&self, group_id: GroupId, user_id: &UserId) -> AppResult<()>;

    /// Links a role to a group; `DuplicateAssignment` when already linked.
    async fn assign_role_to_group(&self, group_id: GroupId, role_id: RoleId) -> AppResult<()>;

    /// Removes a group-role link if present.
    async fn remove_role_from_group(&self, group_id: GroupId, role_id: RoleId) -> AppResult<()>;

    /// Lists permissions with usage counts, ordered by resource then action.
    async fn list_permissions(&self) -> AppResult<Vec<PermissionListing>>;

    /// Inserts a permission; `DuplicateName` when the name is taken.
    async fn create_permission(&self, permission: Permission) -> AppResult<Permission>;

    /// Inserts or overwrites a permission keyed by name, keeping a stored id.
    async fn upsert_permission(&self, permission: Permission) -> AppResult<Permission>;

    /// Deletes a permission and every grant referencing it.
    async fn delete_permission(&self, permission_id: PermissionId) -> AppResult<()>;
}

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tessera_application::{
    AuthorizationRepository, GroupDefinition, PermissionListing, RbacAdminRepository,
    RoleDefinition, RoleListing, UserRoleAssignment,
};
use tessera_core::{AppError, AppResult};
use tessera_domain::{
    GroupId, Permission, PermissionId, PermissionKey, Role, RoleId, UserGroup, UserId,
};
use tokio::sync::RwLock;

/// In-memory RBAC store used for development and tests.
///
/// All tables sit behind one lock so every write, including cascades, is
/// atomic with respect to readers.
#[derive(Debug, Default)]
pub struct InMemoryRbacStore {
    tables: RwLock<RbacTables>,
}

#[derive(Debug, Default)]
struct RbacTables {
    permissions: HashMap<PermissionId, Permission>,
    roles: HashMap<RoleId, Role>,
    role_permissions: BTreeSet<(RoleId, PermissionId)>,
    user_roles: HashMap<(UserId, RoleId), DateTime<Utc>>,
    groups: HashMap<GroupId, UserGroup>,
    group_members: BTreeSet<(GroupId, UserId)>,
    group_roles: BTreeSet<(GroupId, RoleId)>,
}

impl InMemoryRbacStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn catalog_order(left: &Permission, right: &Permission) -> std::cmp::Ordering {
    (left.resource().as_str(), left.action().as_str())
        .cmp(&(right.resource().as_str(), right.action().as_str()))
}

impl RbacTables {
    fn role_definition(&self, role_id: RoleId) -> Option<RoleDefinition> {
        let role = self.roles.get(&role_id)?.clone();
        let mut permissions: Vec<Permission> = self
            .role_permissions
            .iter()
            .filter(|(stored_role_id, _)| *stored_role_id == role_id)
            .filter_map(|(_, permission_id)| self.permissions.get(permission_id).cloned())
            .collect();
        permissions.sort_by(catalog_order);

        Some(RoleDefinition { role, permissions })
    }

    fn group_definition(&self, group_id: GroupId) -> Option<GroupDefinition> {
        let group = self.groups.get(&group_id)?.clone();
        let member_ids = self
            .group_members
            .iter()
            .filter(|(stored_group_id, _)| *stored_group_id == group_id)
            .map(|(_, user_id)| user_id.clone())
            .collect();
        let role_ids = self
            .group_roles
            .iter()
            .filter(|(stored_group_id, _)| *stored_group_id == group_id)
            .map(|(_, role_id)| *role_id)
            .collect();

        Some(GroupDefinition {
            group,
            member_ids,
            role_ids,
        })
    }

    fn require_role(&self, role_id: RoleId) -> AppResult<&Role> {
        self.roles
            .get(&role_id)
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' does not exist")))
    }

    fn require_group(&self, group_id: GroupId) -> AppResult<&UserGroup> {
        self.groups
            .get(&group_id)
            .ok_or_else(|| AppError::NotFound(format!("group '{group_id}' does not exist")))
    }

    fn require_permissions(&self, permission_ids: &[PermissionId]) -> AppResult<()> {
        match permission_ids
            .iter()
            .find(|permission_id| !self.permissions.contains_key(permission_id))
        {
            Some(missing) => Err(AppError::NotFound(format!(
                "permission '{missing}' does not exist"
            ))),
            None => Ok(()),
        }
    }

    fn require_roles(&self, role_ids: &[RoleId]) -> AppResult<()> {
        role_ids
            .iter()
            .try_for_each(|role_id| self.require_role(*role_id).map(|_| ()))
    }

    fn ensure_role_name_free(&self, role: &Role) -> AppResult<()> {
        if self
            .roles
            .values()
            .any(|stored| stored.id() != role.id() && stored.name() == role.name())
        {
            return Err(AppError::DuplicateName(format!(
                "role '{}' already exists",
                role.name()
            )));
        }

        Ok(())
    }

    fn ensure_group_name_free(&self, group: &UserGroup) -> AppResult<()> {
        if self
            .groups
            .values()
            .any(|stored| stored.id() != group.id() && stored.name() == group.name())
        {
            return Err(AppError::DuplicateName(format!(
                "group '{}' already exists",
                group.name()
            )));
        }

        Ok(())
    }

    fn permission_by_name(&self, name: &str) -> Option<&Permission> {
        self.permissions
            .values()
            .find(|permission| permission.name().as_str() == name)
    }

    fn set_role_permissions(&mut self, role_id: RoleId, permission_ids: Vec<PermissionId>) {
        self.role_permissions
            .retain(|(stored_role_id, _)| *stored_role_id != role_id);
        self.role_permissions.extend(
            permission_ids
                .into_iter()
                .map(|permission_id| (role_id, permission_id)),
        );
    }

    fn permission_keys_for_roles(&self, role_ids: &BTreeSet<RoleId>) -> Vec<PermissionKey> {
        self.role_permissions
            .iter()
            .filter(|(role_id, _)| role_ids.contains(role_id))
            .filter_map(|(_, permission_id)| self.permissions.get(permission_id))
            .map(Permission::key)
            .collect()
    }
}

#[async_trait]
impl AuthorizationRepository for InMemoryRbacStore {
    async fn list_direct_role_permissions(
        &self,
        user_id: &UserId,
    ) -> AppResult<Vec<PermissionKey>> {
        let tables = self.tables.read().await;
        let role_ids: BTreeSet<RoleId> = tables
            .user_roles
            .keys()
            .filter(|(stored_user_id, _)| stored_user_id == user_id)
            .map(|(_, role_id)| *role_id)
            .collect();

        Ok(tables.permission_keys_for_roles(&role_ids))
    }

    async fn list_group_role_permissions(&self, user_id: &UserId) -> AppResult<Vec<PermissionKey>> {
        let tables = self.tables.read().await;
        let group_ids: BTreeSet<GroupId> = tables
            .group_members
            .iter()
            .filter(|(_, member_id)| member_id == user_id)
            .map(|(group_id, _)| *group_id)
            .collect();
        let role_ids: BTreeSet<RoleId> = tables
            .group_roles
            .iter()
            .filter(|(group_id, _)| group_ids.contains(group_id))
            .map(|(_, role_id)| *role_id)
            .collect();

        Ok(tables.permission_keys_for_roles(&role_ids))
    }
}

#[async_trait]
impl RbacAdminRepository for InMemoryRbacStore {
    async fn list_roles(&self) -> AppResult<Vec<RoleListing>> {
        let tables = self.tables.read().await;
        let mut listings: Vec<RoleListing> = tables
            .roles
            .keys()
            .filter_map(|role_id| {
                let definition = tables.role_definition(*role_id)?;
                let user_count = tables
                    .user_roles
                    .keys()
                    .filter(|(_, stored_role_id)| stored_role_id == role_id)
                    .count();
                let group_count = tables
                    .group_roles
                    .iter()
                    .filter(|(_, stored_role_id)| stored_role_id == role_id)
                    .count();

                Some(RoleListing {
                    definition,
                    user_count: user_count as u64,
                    group_count: group_count as u64,
                })
            })
            .collect();
        listings.sort_by(|left, right| {
            right
                .definition
                .role
                .created_at()
                .cmp(&left.definition.role.created_at())
                .then_with(|| {
                    left.definition
                        .role
                        .name()
                        .cmp(right.definition.role.name())
                })
        });

        Ok(listings)
    }

    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<RoleDefinition>> {
        Ok(self.tables.read().await.role_definition(role_id))
    }

    async fn find_role_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        Ok(self
            .tables
            .read()
            .await
            .roles
            .values()
            .find(|role| role.name().as_str() == name)
            .cloned())
    }

    async fn create_role(
        &self,
        role: Role,
        permission_ids: Vec<PermissionId>,
    ) -> AppResult<RoleDefinition> {
        let mut tables = self.tables.write().await;
        tables.ensure_role_name_free(&role)?;
        tables.require_permissions(&permission_ids)?;

        let role_id = role.id();
        tables.roles.insert(role_id, role);
        tables.set_role_permissions(role_id, permission_ids);

        tables
            .role_definition(role_id)
            .ok_or_else(|| AppError::Internal(format!("role '{role_id}' vanished after insert")))
    }

    async fn update_role(
        &self,
        role: Role,
        permission_ids: Option<Vec<PermissionId>>,
    ) -> AppResult<RoleDefinition> {
        let mut tables = self.tables.write().await;
        tables.require_role(role.id())?.ensure_mutable()?;
        tables.ensure_role_name_free(&role)?;
        if let Some(permission_ids) = permission_ids.as_deref() {
            tables.require_permissions(permission_ids)?;
        }

        let role_id = role.id();
        tables.roles.insert(role_id, role);
        if let Some(permission_ids) = permission_ids {
            tables.set_role_permissions(role_id, permission_ids);
        }

        tables
            .role_definition(role_id)
            .ok_or_else(|| AppError::Internal(format!("role '{role_id}' vanished after update")))
    }

    async fn delete_role(&self, role_id: RoleId) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        tables.require_role(role_id)?.ensure_mutable()?;

        tables.roles.remove(&role_id);
        tables
            .role_permissions
            .retain(|(stored_role_id, _)| *stored_role_id != role_id);
        tables
            .user_roles
            .retain(|(_, stored_role_id), _| *stored_role_id != role_id);
        tables
            .group_roles
            .retain(|(_, stored_role_id)| *stored_role_id != role_id);

        Ok(())
    }

    async fn upsert_system_role(&self, role: Role) -> AppResult<Role> {
        let mut tables = self.tables.write().await;
        if let Some(stored) = tables
            .roles
            .values()
            .find(|stored| stored.name() == role.name())
        {
            return Ok(stored.clone());
        }

        tables.roles.insert(role.id(), role.clone());
        Ok(role)
    }

    async fn replace_role_permissions(
        &self,
        role_id: RoleId,
        permission_ids: Vec<PermissionId>,
    ) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        tables.require_role(role_id)?;
        tables.require_permissions(&permission_ids)?;
        tables.set_role_permissions(role_id, permission_ids);
        Ok(())
    }

    async fn assign_role_to_user(
        &self,
        user_id: &UserId,
        role_id: RoleId,
    ) -> AppResult<UserRoleAssignment> {
        let mut tables = self.tables.write().await;
        let role = tables.require_role(role_id)?.clone();
        let key = (user_id.clone(), role_id);
        if tables.user_roles.contains_key(&key) {
            return Err(AppError::DuplicateAssignment(format!(
                "user '{user_id}' already holds role '{}'",
                role.name()
            )));
        }

        let assigned_at = Utc::now();
        tables.user_roles.insert(key, assigned_at);

        Ok(UserRoleAssignment {
            user_id: user_id.clone(),
            role,
            assigned_at,
        })
    }

    async fn remove_role_from_user(&self, user_id: &UserId, role_id: RoleId) -> AppResult<()> {
        self.tables
            .write()
            .await
            .user_roles
            .remove(&(user_id.clone(), role_id));
        Ok(())
    }

    async fn list_user_roles(&self, user_id: &UserId) -> AppResult<Vec<UserRoleAssignment>> {
        let tables = self.tables.read().await;
        let mut assignments: Vec<UserRoleAssignment> = tables
            .user_roles
            .iter()
            .filter(|((stored_user_id, _), _)| stored_user_id == user_id)
            .filter_map(|((_, role_id), assigned_at)| {
                tables.roles.get(role_id).map(|role| UserRoleAssignment {
                    user_id: user_id.clone(),
                    role: role.clone(),
                    assigned_at: *assigned_at,
                })
            })
            .collect();
        assignments.sort_by_key(|assignment| assignment.assigned_at);

        Ok(assignments)
    }

    async fn list_user_groups(&self) -> AppResult<Vec<GroupDefinition>> {
        let tables = self.tables.read().await;
        let mut groups: Vec<GroupDefinition> = tables
            .groups
            .keys()
            .filter_map(|group_id| tables.group_definition(*group_id))
            .collect();
        groups.sort_by(|left, right| {
            right
                .group
                .created_at()
                .cmp(&left.group.created_at())
                .then_with(|| left.group.name().cmp(right.group.name()))
        });

        Ok(groups)
    }

    async fn find_user_group(&self, group_id: GroupId) -> AppResult<Option<GroupDefinition>> {
        Ok(self.tables.read().await.group_definition(group_id))
    }

    async fn create_user_group(
        &self,
        group: UserGroup,
        member_ids: Vec<UserId>,
        role_ids: Vec<RoleId>,
    ) -> AppResult<GroupDefinition> {
        let mut tables = self.tables.write().await;
        tables.ensure_group_name_free(&group)?;
        tables.require_roles(&role_ids)?;

        let group_id = group.id();
        tables.groups.insert(group_id, group);
        tables
            .group_members
            .extend(member_ids.into_iter().map(|user_id| (group_id, user_id)));
        tables
            .group_roles
            .extend(role_ids.into_iter().map(|role_id| (group_id, role_id)));

        tables
            .group_definition(group_id)
            .ok_or_else(|| AppError::Internal(format!("group '{group_id}' vanished after insert")))
    }

    async fn update_user_group(&self, group: UserGroup) -> AppResult<GroupDefinition> {
        let mut tables = self.tables.write().await;
        tables.require_group(group.id())?;
        tables.ensure_group_name_free(&group)?;

        let group_id = group.id();
        tables.groups.insert(group_id, group);

        tables
            .group_definition(group_id)
            .ok_or_else(|| AppError::Internal(format!("group '{group_id}' vanished after update")))
    }

    async fn delete_user_group(&self, group_id: GroupId) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        tables.require_group(group_id)?;

        tables.groups.remove(&group_id);
        tables
            .group_members
            .retain(|(stored_group_id, _)| *stored_group_id != group_id);
        tables
            .group_roles
            .retain(|(stored_group_id, _)| *stored_group_id != group_id);

        Ok(())
    }

    async fn add_user_to_group(&self, group_id: GroupId, user_id: &UserId) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        let group_name = tables.require_group(group_id)?.name().clone();
        if !tables.group_members.insert((group_id, user_id.clone())) {
            return Err(AppError::DuplicateAssignment(format!(
                "user '{user_id}' is already a member of group '{group_name}'"
            )));
        }

        Ok(())
    }

    async fn remove_user_from_group(&self, group_id: GroupId, user_id: &UserId) -> AppResult<()> {
        self.tables
            .write()
            .await
            .group_members
            .remove(&(group_id, user_id.clone()));
        Ok(())
    }

    async fn assign_role_to_group(&self, group_id: GroupId, role_id: RoleId) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        let group_name = tables.require_group(group_id)?.name().clone();
        let role_name = tables.require_role(role_id)?.name().clone();
        if !tables.group_roles.insert((group_id, role_id)) {
            return Err(AppError::DuplicateAssignment(format!(
                "group '{group_name}' already holds role '{role_name}'"
            )));
        }

        Ok(())
    }

    async fn remove_role_from_group(&self, group_id: GroupId, role_id: RoleId) -> AppResult<()> {
        self.tables
            .write()
            .await
            .group_roles
            .remove(&(group_id, role_id));
        Ok(())
    }

    async fn list_permissions(&self) -> AppResult<Vec<PermissionListing>> {
        let tables = self.tables.read().await;
        let mut permissions: Vec<&Permission> = tables.permissions.values().collect();
        permissions.sort_by(|left, right| catalog_order(left, right));

        Ok(permissions
            .into_iter()
            .map(|permission| PermissionListing {
                permission: permission.clone(),
                role_count: tables
                    .role_permissions
                    .iter()
                    .filter(|(_, permission_id)| *permission_id == permission.id())
                    .count() as u64,
            })
            .collect())
    }

    async fn create_permission(&self, permission: Permission) -> AppResult<Permission> {
        let mut tables = self.tables.write().await;
        if tables
            .permission_by_name(permission.name().as_str())
            .is_some()
        {
            return Err(AppError::DuplicateName(format!(
                "permission '{}' already exists",
                permission.name()
            )));
        }

        tables
            .permissions
            .insert(permission.id(), permission.clone());
        Ok(permission)
    }

    async fn upsert_permission(&self, permission: Permission) -> AppResult<Permission> {
        let mut tables = self.tables.write().await;
        let stored_id = tables
            .permission_by_name(permission.name().as_str())
            .map(Permission::id);

        let permission = match stored_id {
            Some(permission_id) => Permission::new(
                permission_id,
                permission.name().as_str(),
                permission.key(),
                permission.display_name().as_str(),
                permission.description(),
            )?,
            None => permission,
        };

        tables
            .permissions
            .insert(permission.id(), permission.clone());
        Ok(permission)
    }

    async fn delete_permission(&self, permission_id: PermissionId) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if tables.permissions.remove(&permission_id).is_none() {
            return Err(AppError::NotFound(format!(
                "permission '{permission_id}' does not exist"
            )));
        }

        tables
            .role_permissions
            .retain(|(_, stored_permission_id)| *stored_permission_id != permission_id);

        Ok(())
    }
}

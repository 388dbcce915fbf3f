use super::*;

use chrono::Utc;
use tessera_core::AppError;
use tessera_domain::{Role, RoleChanges, RoleId, UserId};
use tracing::info;

use crate::rbac_admin_ports::{
    CreateRoleInput, RoleDefinition, RoleListing, UpdateRoleInput, UserRoleAssignment,
};

impl RbacAdminService {
    /// Lists every role with its grants and usage counts, newest first.
    pub async fn list_roles(&self) -> AppResult<Vec<RoleListing>> {
        self.repository.list_roles().await
    }

    /// Returns one role with its grants.
    pub async fn get_role(&self, role_id: RoleId) -> AppResult<RoleDefinition> {
        self.repository
            .find_role(role_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' does not exist")))
    }

    /// Creates a custom role with an initial permission set.
    pub async fn create_role(&self, input: CreateRoleInput) -> AppResult<RoleDefinition> {
        let role = Role::new(
            RoleId::new(),
            input.name,
            input.display_name,
            input.description.unwrap_or_default(),
            false,
            Utc::now(),
        )?;

        let definition = self
            .repository
            .create_role(role, dedupe(input.permission_ids))
            .await?;

        info!(
            role_id = %definition.role.id(),
            role_name = %definition.role.name(),
            permissions = definition.permissions.len(),
            "role created"
        );

        Ok(definition)
    }

    /// Updates a custom role; a supplied permission list replaces the whole set.
    pub async fn update_role(
        &self,
        role_id: RoleId,
        input: UpdateRoleInput,
    ) -> AppResult<RoleDefinition> {
        let current = self.get_role(role_id).await?;
        let changes = RoleChanges {
            name: optional_field("role name", input.name)?,
            display_name: optional_field("role display name", input.display_name)?,
            description: input.description,
        };
        let updated = current.role.with_changes(&changes)?;

        let definition = self
            .repository
            .update_role(updated, input.permission_ids.map(dedupe))
            .await?;

        info!(
            role_id = %role_id,
            role_name = %definition.role.name(),
            "role updated"
        );

        Ok(definition)
    }

    /// Deletes a custom role together with every link to it.
    pub async fn delete_role(&self, role_id: RoleId) -> AppResult<()> {
        let current = self.get_role(role_id).await?;
        current.role.ensure_mutable()?;

        self.repository.delete_role(role_id).await?;

        info!(
            role_id = %role_id,
            role_name = %current.role.name(),
            "role deleted"
        );

        Ok(())
    }

    /// Assigns a role directly to a user.
    pub async fn assign_role_to_user(
        &self,
        user_id: &UserId,
        role_id: RoleId,
    ) -> AppResult<UserRoleAssignment> {
        let assignment = self.repository.assign_role_to_user(user_id, role_id).await?;

        info!(
            user_id = %user_id,
            role_name = %assignment.role.name(),
            "role assigned to user"
        );

        Ok(assignment)
    }

    /// Removes a direct role assignment. Missing links are ignored.
    pub async fn remove_role_from_user(&self, user_id: &UserId, role_id: RoleId) -> AppResult<()> {
        self.repository
            .remove_role_from_user(user_id, role_id)
            .await?;
        info!(user_id = %user_id, role_id = %role_id, "role removed from user");
        Ok(())
    }

    /// Lists roles assigned directly to a user.
    pub async fn list_user_roles(&self, user_id: &UserId) -> AppResult<Vec<UserRoleAssignment>> {
        self.repository.list_user_roles(user_id).await
    }
}

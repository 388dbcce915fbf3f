use super::*;

use chrono::Utc;
use tessera_core::AppError;
use tessera_domain::{GroupChanges, GroupId, RoleId, UserGroup, UserId};
use tracing::info;

use crate::rbac_admin_ports::{CreateUserGroupInput, GroupDefinition, UpdateUserGroupInput};

impl RbacAdminService {
    /// Lists every group with members and roles, newest first.
    pub async fn list_user_groups(&self) -> AppResult<Vec<GroupDefinition>> {
        self.repository.list_user_groups().await
    }

    /// Returns one group with members and roles.
    pub async fn get_user_group(&self, group_id: GroupId) -> AppResult<GroupDefinition> {
        self.repository
            .find_user_group(group_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("group '{group_id}' does not exist")))
    }

    /// Creates a group with initial members and roles.
    pub async fn create_user_group(
        &self,
        input: CreateUserGroupInput,
    ) -> AppResult<GroupDefinition> {
        let group = UserGroup::new(
            GroupId::new(),
            input.name,
            input.display_name,
            input.description.unwrap_or_default(),
            input.creator_id,
            Utc::now(),
        )?;

        let definition = self
            .repository
            .create_user_group(group, dedupe(input.member_ids), dedupe(input.role_ids))
            .await?;

        info!(
            group_id = %definition.group.id(),
            group_name = %definition.group.name(),
            members = definition.member_ids.len(),
            roles = definition.role_ids.len(),
            "group created"
        );

        Ok(definition)
    }

    /// Updates group scalar fields.
    pub async fn update_user_group(
        &self,
        group_id: GroupId,
        input: UpdateUserGroupInput,
    ) -> AppResult<GroupDefinition> {
        let current = self.get_user_group(group_id).await?;
        let changes = GroupChanges {
            name: optional_field("group name", input.name)?,
            display_name: optional_field("group display name", input.display_name)?,
            description: input.description,
        };

        let definition = self
            .repository
            .update_user_group(current.group.with_changes(&changes))
            .await?;

        info!(
            group_id = %group_id,
            group_name = %definition.group.name(),
            "group updated"
        );

        Ok(definition)
    }

    /// Deletes a group with its member and role links.
    pub async fn delete_user_group(&self, group_id: GroupId) -> AppResult<()> {
        self.repository.delete_user_group(group_id).await?;
        info!(group_id = %group_id, "group deleted");
        Ok(())
    }

    /// Adds a member to a group.
    pub async fn add_user_to_group(&self, group_id: GroupId, user_id: &UserId) -> AppResult<()> {
        self.repository.add_user_to_group(group_id, user_id).await?;
        info!(group_id = %group_id, user_id = %user_id, "user added to group");
        Ok(())
    }

    /// Removes a member from a group. Missing memberships are ignored.
    pub async fn remove_user_from_group(
        &self,
        group_id: GroupId,
        user_id: &UserId,
    ) -> AppResult<()> {
        self.repository
            .remove_user_from_group(group_id, user_id)
            .await?;
        info!(group_id = %group_id, user_id = %user_id, "user removed from group");
        Ok(())
    }

    /// Grants a role to every member of a group.
    pub async fn assign_role_to_group(&self, group_id: GroupId, role_id: RoleId) -> AppResult<()> {
        self.repository
            .assign_role_to_group(group_id, role_id)
            .await?;
        info!(group_id = %group_id, role_id = %role_id, "role assigned to group");
        Ok(())
    }

    /// Revokes a group role. Missing links are ignored.
    pub async fn remove_role_from_group(
        &self,
        group_id: GroupId,
        role_id: RoleId,
    ) -> AppResult<()> {
        self.repository
            .remove_role_from_group(group_id, role_id)
            .await?;
        info!(group_id = %group_id, role_id = %role_id, "role removed from group");
        Ok(())
    }
}

use super::*;

use tessera_domain::{Permission, PermissionId};
use tracing::info;

use crate::rbac_admin_ports::{CreatePermissionInput, PermissionListing};

impl RbacAdminService {
    /// Lists permissions with role counts, ordered by resource then action.
    pub async fn list_permissions(&self) -> AppResult<Vec<PermissionListing>> {
        self.repository.list_permissions().await
    }

    /// Adds a permission to the catalog.
    pub async fn create_permission(&self, input: CreatePermissionInput) -> AppResult<Permission> {
        let permission = Permission::new(
            PermissionId::new(),
            input.name,
            input.key,
            input.display_name,
            input.description.unwrap_or_default(),
        )?;

        let permission = self.repository.create_permission(permission).await?;

        info!(
            permission_id = %permission.id(),
            permission_name = %permission.name(),
            key = %permission.key(),
            "permission created"
        );

        Ok(permission)
    }

    /// Deletes a permission and removes it from every role.
    pub async fn delete_permission(&self, permission_id: PermissionId) -> AppResult<()> {
        self.repository.delete_permission(permission_id).await?;
        info!(permission_id = %permission_id, "permission deleted");
        Ok(())
    }
}

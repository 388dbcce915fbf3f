use super::*;

use chrono::Utc;
use tessera_core::AppError;
use tessera_domain::{
    PERMISSION_CATALOG, Permission, PermissionId, Role, RoleId, SystemRole, UserId,
};
use tracing::{info, warn};

use crate::rbac_admin_ports::UserRoleAssignment;

/// Summary of one bootstrap run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootstrapReport {
    /// Catalog permissions upserted.
    pub permissions: usize,
    /// System roles upserted.
    pub system_roles: usize,
    /// Role-permission grants written across all system roles.
    pub grants: usize,
}

impl RbacAdminService {
    /// Seeds the permission catalog and the five system roles.
    ///
    /// Safe to run repeatedly: permissions and roles are upserted by name and
    /// each system role's grants are replaced from the seed predicates over
    /// every stored permission.
    pub async fn bootstrap(&self) -> AppResult<BootstrapReport> {
        for seed in PERMISSION_CATALOG {
            let permission = Permission::new(
                PermissionId::new(),
                seed.name(),
                seed.key,
                seed.display_name,
                seed.description,
            )?;
            self.repository.upsert_permission(permission).await?;
        }

        let permissions = self.repository.list_permissions().await?;
        let mut grants = 0;

        for system_role in SystemRole::all() {
            let role = Role::new(
                RoleId::new(),
                system_role.name(),
                system_role.display_name(),
                system_role.description(),
                true,
                Utc::now(),
            )?;
            let stored = self.repository.upsert_system_role(role).await?;

            if !stored.is_system() {
                warn!(
                    role_name = %stored.name(),
                    "custom role shadows a system role name; grants left untouched"
                );
                continue;
            }

            let permission_ids: Vec<PermissionId> = permissions
                .iter()
                .filter(|listing| system_role.includes(listing.permission.key()))
                .map(|listing| listing.permission.id())
                .collect();
            grants += permission_ids.len();

            self.repository
                .replace_role_permissions(stored.id(), permission_ids)
                .await?;
        }

        let report = BootstrapReport {
            permissions: PERMISSION_CATALOG.len(),
            system_roles: SystemRole::all().len(),
            grants,
        };

        info!(
            permissions = report.permissions,
            system_roles = report.system_roles,
            grants = report.grants,
            "rbac bootstrap completed"
        );

        Ok(report)
    }

    /// Gives a user without direct roles a default one.
    ///
    /// Administrators receive `super_admin`, everyone else `member`. Returns
    /// `None` when the user already holds at least one direct role.
    pub async fn ensure_default_role(
        &self,
        user_id: &UserId,
        is_admin: bool,
    ) -> AppResult<Option<UserRoleAssignment>> {
        if !self.repository.list_user_roles(user_id).await?.is_empty() {
            return Ok(None);
        }

        let system_role = if is_admin {
            SystemRole::SuperAdmin
        } else {
            SystemRole::Member
        };
        let role = self
            .repository
            .find_role_by_name(system_role.name())
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "system role '{}' does not exist; run the bootstrap first",
                    system_role.name()
                ))
            })?;

        let assignment = self
            .repository
            .assign_role_to_user(user_id, role.id())
            .await?;

        info!(
            user_id = %user_id,
            role_name = %role.name(),
            "default role assigned"
        );

        Ok(Some(assignment))
    }
}

use std::sync::Arc;

use async_trait::async_trait;
use tessera_core::{AppError, AppResult};
use tessera_domain::{Action, EffectivePermissions, PermissionKey, Resource, UserId};
use tracing::warn;

/// Repository port for the two paths from a user to permissions.
#[async_trait]
pub trait AuthorizationRepository: Send + Sync {
    /// Lists permissions of roles assigned directly to the user.
    async fn list_direct_role_permissions(&self, user_id: &UserId) -> AppResult<Vec<PermissionKey>>;

    /// Lists permissions of roles held by every group the user belongs to.
    async fn list_group_role_permissions(&self, user_id: &UserId) -> AppResult<Vec<PermissionKey>>;
}

/// Resolves authorization decisions over the role assignment graph.
///
/// Read-only checks never surface storage failures: they are logged and
/// treated as a denial.
#[derive(Clone)]
pub struct AuthorizationService {
    repository: Arc<dyn AuthorizationRepository>,
}

impl AuthorizationService {
    /// Creates a new authorization service from a repository implementation.
    #[must_use]
    pub fn new(repository: Arc<dyn AuthorizationRepository>) -> Self {
        Self { repository }
    }

    /// Returns whether the user may perform `action` on `resource`.
    pub async fn has_permission(
        &self,
        user_id: &UserId,
        resource: Resource,
        action: Action,
    ) -> bool {
        match self.resolve_permission(user_id, resource, action).await {
            Ok(granted) => granted,
            Err(error) => {
                warn!(
                    user_id = %user_id,
                    %resource,
                    %action,
                    error = %error,
                    "permission check failed closed"
                );
                false
            }
        }
    }

    /// Ensures the user may perform `action` on `resource`.
    pub async fn require_permission(
        &self,
        user_id: &UserId,
        resource: Resource,
        action: Action,
    ) -> AppResult<()> {
        if self.has_permission(user_id, resource, action).await {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "missing permission {}",
            PermissionKey::new(resource, action)
        )))
    }

    /// Returns the user's effective permission set as stored.
    ///
    /// A held `manage` is listed as `manage` only. Storage failures yield an
    /// empty set.
    pub async fn user_permissions(&self, user_id: &UserId) -> EffectivePermissions {
        match self.load_effective_permissions(user_id).await {
            Ok(permissions) => permissions,
            Err(error) => {
                warn!(
                    user_id = %user_id,
                    error = %error,
                    "permission listing failed closed"
                );
                EffectivePermissions::new()
            }
        }
    }

    async fn resolve_permission(
        &self,
        user_id: &UserId,
        resource: Resource,
        action: Action,
    ) -> AppResult<bool> {
        let direct: EffectivePermissions = self
            .repository
            .list_direct_role_permissions(user_id)
            .await?
            .into_iter()
            .collect();
        if direct.allows(resource, action) {
            return Ok(true);
        }

        let inherited: EffectivePermissions = self
            .repository
            .list_group_role_permissions(user_id)
            .await?
            .into_iter()
            .collect();
        Ok(inherited.allows(resource, action))
    }

    async fn load_effective_permissions(
        &self,
        user_id: &UserId,
    ) -> AppResult<EffectivePermissions> {
        let mut permissions: EffectivePermissions = self
            .repository
            .list_direct_role_permissions(user_id)
            .await?
            .into_iter()
            .collect();
        let inherited = self
            .repository
            .list_group_role_permissions(user_id)
            .await?;
        permissions.merge(inherited);

        Ok(permissions)
    }
}

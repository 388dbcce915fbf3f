use async_trait::async_trait;

use tessera_application::AuthorizationRepository;
use tessera_core::{AppError, AppResult};
use tessera_domain::{PermissionKey, UserId};

use sqlx::{FromRow, PgPool};

/// PostgreSQL-backed repository for user permission lookups.
#[derive(Clone)]
pub struct PostgresAuthorizationRepository {
    pool: PgPool,
}

impl PostgresAuthorizationRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct PermissionKeyRow {
    resource: String,
    action: String,
}

impl PermissionKeyRow {
    fn into_key(self, user_id: &UserId) -> AppResult<PermissionKey> {
        let key = format!("{}:{}", self.resource, self.action);
        key.parse().map_err(|error| {
            AppError::Storage(format!(
                "invalid stored permission '{key}' reached by user '{user_id}': {error}"
            ))
        })
    }
}

fn decode_keys(rows: Vec<PermissionKeyRow>, user_id: &UserId) -> AppResult<Vec<PermissionKey>> {
    rows.into_iter().map(|row| row.into_key(user_id)).collect()
}

#[async_trait]
impl AuthorizationRepository for PostgresAuthorizationRepository {
    async fn list_direct_role_permissions(
        &self,
        user_id: &UserId,
    ) -> AppResult<Vec<PermissionKey>> {
        let rows = sqlx::query_as::<_, PermissionKeyRow>(
            r#"
            SELECT DISTINCT permissions.resource, permissions.action
            FROM rbac_user_roles AS user_roles
            INNER JOIN rbac_role_permissions AS role_permissions
                ON role_permissions.role_id = user_roles.role_id
            INNER JOIN rbac_permissions AS permissions
                ON permissions.id = role_permissions.permission_id
            WHERE user_roles.user_id = $1
            "#,
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Storage(format!("failed to load direct role permissions: {error}"))
        })?;

        decode_keys(rows, user_id)
    }

    async fn list_group_role_permissions(&self, user_id: &UserId) -> AppResult<Vec<PermissionKey>> {
        let rows = sqlx::query_as::<_, PermissionKeyRow>(
            r#"
            SELECT DISTINCT permissions.resource, permissions.action
            FROM rbac_user_group_members AS members
            INNER JOIN rbac_user_group_roles AS group_roles
                ON group_roles.group_id = members.group_id
            INNER JOIN rbac_role_permissions AS role_permissions
                ON role_permissions.role_id = group_roles.role_id
            INNER JOIN rbac_permissions AS permissions
                ON permissions.id = role_permissions.permission_id
            WHERE members.user_id = $1
            "#,
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Storage(format!("failed to load group role permissions: {error}"))
        })?;

        decode_keys(rows, user_id)
    }
}

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, PgPool, Postgres, Transaction};
use uuid::Uuid;

use tessera_application::{
    GroupDefinition, PermissionListing, RbacAdminRepository, RoleDefinition, RoleListing,
    UserRoleAssignment,
};
use tessera_core::{AppError, AppResult};
use tessera_domain::{
    GroupId, Permission, PermissionId, PermissionKey, Role, RoleId, UserGroup, UserId,
};

mod groups;
mod permissions;
mod roles;

/// PostgreSQL-backed repository for role, group and permission administration.
///
/// Cascades rely on `ON DELETE CASCADE` foreign keys; multi-statement writes
/// run in one transaction.
#[derive(Clone)]
pub struct PostgresRbacAdminRepository {
    pool: PgPool,
}

impl PostgresRbacAdminRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn begin(&self) -> AppResult<Transaction<'static, Postgres>> {
        self.pool
            .begin()
            .await
            .map_err(|error| AppError::Storage(format!("failed to begin transaction: {error}")))
    }
}

async fn commit(transaction: Transaction<'static, Postgres>) -> AppResult<()> {
    transaction
        .commit()
        .await
        .map_err(|error| AppError::Storage(format!("failed to commit transaction: {error}")))
}

#[derive(Debug, FromRow)]
struct RoleRow {
    id: Uuid,
    name: String,
    display_name: String,
    description: String,
    is_system: bool,
    created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct PermissionRow {
    id: Uuid,
    name: String,
    resource: String,
    action: String,
    display_name: String,
    description: String,
}

#[derive(Debug, FromRow)]
struct RolePermissionRow {
    role_id: Uuid,
    #[sqlx(flatten)]
    permission: PermissionRow,
}

#[derive(Debug, FromRow)]
struct GroupRow {
    id: Uuid,
    name: String,
    display_name: String,
    description: String,
    creator_id: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<RoleRow> for Role {
    type Error = AppError;

    fn try_from(row: RoleRow) -> Result<Self, Self::Error> {
        let role_id = row.id;
        Role::new(
            RoleId::from_uuid(row.id),
            row.name,
            row.display_name,
            row.description,
            row.is_system,
            row.created_at,
        )
        .map_err(|error| AppError::Storage(format!("invalid stored role '{role_id}': {error}")))
    }
}

impl TryFrom<PermissionRow> for Permission {
    type Error = AppError;

    fn try_from(row: PermissionRow) -> Result<Self, Self::Error> {
        let permission_id = row.id;
        let decode = || -> AppResult<Permission> {
            let key = PermissionKey::new(row.resource.parse()?, row.action.parse()?);
            Permission::new(
                PermissionId::from_uuid(row.id),
                row.name,
                key,
                row.display_name,
                row.description,
            )
        };

        decode().map_err(|error| {
            AppError::Storage(format!(
                "invalid stored permission '{permission_id}': {error}"
            ))
        })
    }
}

impl TryFrom<GroupRow> for UserGroup {
    type Error = AppError;

    fn try_from(row: GroupRow) -> Result<Self, Self::Error> {
        let group_id = row.id;
        let decode = || -> AppResult<UserGroup> {
            UserGroup::new(
                GroupId::from_uuid(row.id),
                row.name,
                row.display_name,
                row.description,
                UserId::new(row.creator_id)?,
                row.created_at,
            )
        };

        decode().map_err(|error| {
            AppError::Storage(format!("invalid stored group '{group_id}': {error}"))
        })
    }
}

/// Maps write failures onto the error taxonomy.
///
/// Unique violations (`23505`) become the caller-provided conflict, foreign
/// key violations (`23503`) become `NotFound`.
fn map_write_error(
    error: sqlx::Error,
    operation: &str,
    on_conflict: impl FnOnce() -> AppError,
) -> AppError {
    if let sqlx::Error::Database(database_error) = &error {
        match database_error.code().as_deref() {
            Some("23505") => return on_conflict(),
            Some("23503") => {
                return AppError::NotFound(format!(
                    "failed to {operation}: a referenced record does not exist"
                ));
            }
            _ => {}
        }
    }

    AppError::Storage(format!("failed to {operation}: {error}"))
}

fn storage_error(operation: &str, error: sqlx::Error) -> AppError {
    AppError::Storage(format!("failed to {operation}: {error}"))
}

fn uuids<T>(ids: &[T], as_uuid: impl Fn(&T) -> Uuid) -> Vec<Uuid> {
    ids.iter().map(as_uuid).collect()
}

/// Loads permissions of the given roles ordered by resource then action.
async fn fetch_role_permissions(
    connection: &mut PgConnection,
    role_ids: &[Uuid],
) -> AppResult<HashMap<Uuid, Vec<Permission>>> {
    let rows = sqlx::query_as::<_, RolePermissionRow>(
        r#"
        SELECT
            role_permissions.role_id,
            permissions.id,
            permissions.name,
            permissions.resource,
            permissions.action,
            permissions.display_name,
            permissions.description
        FROM rbac_role_permissions AS role_permissions
        INNER JOIN rbac_permissions AS permissions
            ON permissions.id = role_permissions.permission_id
        WHERE role_permissions.role_id = ANY($1)
        ORDER BY permissions.resource, permissions.action, permissions.name
        "#,
    )
    .bind(role_ids)
    .fetch_all(&mut *connection)
    .await
    .map_err(|error| storage_error("load role permissions", error))?;

    let mut by_role: HashMap<Uuid, Vec<Permission>> = HashMap::new();
    for row in rows {
        by_role
            .entry(row.role_id)
            .or_default()
            .push(Permission::try_from(row.permission)?);
    }

    Ok(by_role)
}

#[async_trait]
impl RbacAdminRepository for PostgresRbacAdminRepository {
    async fn list_roles(&self) -> AppResult<Vec<RoleListing>> {
        self.list_roles_impl().await
    }

    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<RoleDefinition>> {
        self.find_role_impl(role_id).await
    }

    async fn find_role_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        self.find_role_by_name_impl(name).await
    }

    async fn create_role(
        &self,
        role: Role,
        permission_ids: Vec<PermissionId>,
    ) -> AppResult<RoleDefinition> {
        self.create_role_impl(role, permission_ids).await
    }

    async fn update_role(
        &self,
        role: Role,
        permission_ids: Option<Vec<PermissionId>>,
    ) -> AppResult<RoleDefinition> {
        self.update_role_impl(role, permission_ids).await
    }

    async fn delete_role(&self, role_id: RoleId) -> AppResult<()> {
        self.delete_role_impl(role_id).await
    }

    async fn upsert_system_role(&self, role: Role) -> AppResult<Role> {
        self.upsert_system_role_impl(role).await
    }

    async fn replace_role_permissions(
        &self,
        role_id: RoleId,
        permission_ids: Vec<PermissionId>,
    ) -> AppResult<()> {
        self.replace_role_permissions_impl(role_id, permission_ids)
            .await
    }

    async fn assign_role_to_user(
        &self,
        user_id: &UserId,
        role_id: RoleId,
    ) -> AppResult<UserRoleAssignment> {
        self.assign_role_to_user_impl(user_id, role_id).await
    }

    async fn remove_role_from_user(&self, user_id: &UserId, role_id: RoleId) -> AppResult<()> {
        self.remove_role_from_user_impl(user_id, role_id).await
    }

    async fn list_user_roles(&self, user_id: &UserId) -> AppResult<Vec<UserRoleAssignment>> {
        self.list_user_roles_impl(user_id).await
    }

    async fn list_user_groups(&self) -> AppResult<Vec<GroupDefinition>> {
        self.list_user_groups_impl().await
    }

    async fn find_user_group(&self, group_id: GroupId) -> AppResult<Option<GroupDefinition>> {
        self.find_user_group_impl(group_id).await
    }

    async fn create_user_group(
        &self,
        group: UserGroup,
        member_ids: Vec<UserId>,
        role_ids: Vec<RoleId>,
    ) -> AppResult<GroupDefinition> {
        self.create_user_group_impl(group, member_ids, role_ids)
            .await
    }

    async fn update_user_group(&self, group: UserGroup) -> AppResult<GroupDefinition> {
        self.update_user_group_impl(group).await
    }

    async fn delete_user_group(&self, group_id: GroupId) -> AppResult<()> {
        self.delete_user_group_impl(group_id).await
    }

    async fn add_user_to_group(&self, group_id: GroupId, user_id: &UserId) -> AppResult<()> {
        self.add_user_to_group_impl(group_id, user_id).await
    }

    async fn remove_user_from_group(&self, group_id: GroupId, user_id: &UserId) -> AppResult<()> {
        self.remove_user_from_group_impl(group_id, user_id).await
    }

    async fn assign_role_to_group(&self, group_id: GroupId, role_id: RoleId) -> AppResult<()> {
        self.assign_role_to_group_impl(group_id, role_id).await
    }

    async fn remove_role_from_group(&self, group_id: GroupId, role_id: RoleId) -> AppResult<()> {
        self.remove_role_from_group_impl(group_id, role_id).await
    }

    async fn list_permissions(&self) -> AppResult<Vec<PermissionListing>> {
        self.list_permissions_impl().await
    }

    async fn create_permission(&self, permission: Permission) -> AppResult<Permission> {
        self.create_permission_impl(permission).await
    }

    async fn upsert_permission(&self, permission: Permission) -> AppResult<Permission> {
        self.upsert_permission_impl(permission).await
    }

    async fn delete_permission(&self, permission_id: PermissionId) -> AppResult<()> {
        self.delete_permission_impl(permission_id).await
    }
}

#[cfg(test)]
mod tests;

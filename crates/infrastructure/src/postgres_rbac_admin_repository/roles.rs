use super::*;

#[derive(Debug, FromRow)]
struct RoleListingRow {
    #[sqlx(flatten)]
    role: RoleRow,
    user_count: i64,
    group_count: i64,
}

#[derive(Debug, FromRow)]
struct UserRoleRow {
    #[sqlx(flatten)]
    role: RoleRow,
    assigned_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct RoleGuardRow {
    name: String,
    is_system: bool,
}

const ROLE_COLUMNS: &str = "roles.id, roles.name, roles.display_name, roles.description, \
                            roles.is_system, roles.created_at";

impl PostgresRbacAdminRepository {
    pub(super) async fn list_roles_impl(&self) -> AppResult<Vec<RoleListing>> {
        let mut connection = self
            .pool
            .acquire()
            .await
            .map_err(|error| storage_error("acquire connection", error))?;

        let rows = sqlx::query_as::<_, RoleListingRow>(&format!(
            r#"
            SELECT
                {ROLE_COLUMNS},
                (
                    SELECT COUNT(*)
                    FROM rbac_user_roles AS user_roles
                    WHERE user_roles.role_id = roles.id
                ) AS user_count,
                (
                    SELECT COUNT(*)
                    FROM rbac_user_group_roles AS group_roles
                    WHERE group_roles.role_id = roles.id
                ) AS group_count
            FROM rbac_roles AS roles
            ORDER BY roles.created_at DESC, roles.name
            "#
        ))
        .fetch_all(&mut *connection)
        .await
        .map_err(|error| storage_error("list roles", error))?;

        let role_ids: Vec<Uuid> = rows.iter().map(|row| row.role.id).collect();
        let mut permissions = fetch_role_permissions(&mut connection, &role_ids).await?;

        rows.into_iter()
            .map(|row| {
                let permissions = permissions.remove(&row.role.id).unwrap_or_default();
                Ok(RoleListing {
                    definition: RoleDefinition {
                        role: Role::try_from(row.role)?,
                        permissions,
                    },
                    user_count: u64::try_from(row.user_count).unwrap_or_default(),
                    group_count: u64::try_from(row.group_count).unwrap_or_default(),
                })
            })
            .collect()
    }

    pub(super) async fn find_role_impl(
        &self,
        role_id: RoleId,
    ) -> AppResult<Option<RoleDefinition>> {
        let mut connection = self
            .pool
            .acquire()
            .await
            .map_err(|error| storage_error("acquire connection", error))?;

        load_role_definition(&mut connection, role_id).await
    }

    pub(super) async fn find_role_by_name_impl(&self, name: &str) -> AppResult<Option<Role>> {
        sqlx::query_as::<_, RoleRow>(&format!(
            "SELECT {ROLE_COLUMNS} FROM rbac_roles AS roles WHERE roles.name = $1"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| storage_error("find role by name", error))?
        .map(Role::try_from)
        .transpose()
    }

    pub(super) async fn create_role_impl(
        &self,
        role: Role,
        permission_ids: Vec<PermissionId>,
    ) -> AppResult<RoleDefinition> {
        let mut transaction = self.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO rbac_roles (id, name, display_name, description, is_system, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(role.id().as_uuid())
        .bind(role.name().as_str())
        .bind(role.display_name().as_str())
        .bind(role.description())
        .bind(role.is_system())
        .bind(role.created_at())
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            map_write_error(error, "create role", || {
                AppError::DuplicateName(format!("role '{}' already exists", role.name()))
            })
        })?;

        insert_role_permissions(&mut transaction, role.id(), &permission_ids).await?;
        let permissions = fetch_role_permissions(&mut transaction, &[role.id().as_uuid()])
            .await?
            .remove(&role.id().as_uuid())
            .unwrap_or_default();

        commit(transaction).await?;

        Ok(RoleDefinition { role, permissions })
    }

    pub(super) async fn update_role_impl(
        &self,
        role: Role,
        permission_ids: Option<Vec<PermissionId>>,
    ) -> AppResult<RoleDefinition> {
        let mut transaction = self.begin().await?;
        lock_mutable_role(&mut transaction, role.id()).await?;

        sqlx::query(
            r#"
            UPDATE rbac_roles
            SET name = $2, display_name = $3, description = $4
            WHERE id = $1 AND NOT is_system
            "#,
        )
        .bind(role.id().as_uuid())
        .bind(role.name().as_str())
        .bind(role.display_name().as_str())
        .bind(role.description())
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            map_write_error(error, "update role", || {
                AppError::DuplicateName(format!("role '{}' already exists", role.name()))
            })
        })?;

        if let Some(permission_ids) = permission_ids {
            clear_role_permissions(&mut transaction, role.id()).await?;
            insert_role_permissions(&mut transaction, role.id(), &permission_ids).await?;
        }

        let definition = load_role_definition(&mut transaction, role.id())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{}' does not exist", role.id())))?;

        commit(transaction).await?;

        Ok(definition)
    }

    pub(super) async fn delete_role_impl(&self, role_id: RoleId) -> AppResult<()> {
        let mut transaction = self.begin().await?;
        lock_mutable_role(&mut transaction, role_id).await?;

        sqlx::query("DELETE FROM rbac_roles WHERE id = $1 AND NOT is_system")
            .bind(role_id.as_uuid())
            .execute(&mut *transaction)
            .await
            .map_err(|error| storage_error("delete role", error))?;

        commit(transaction).await
    }

    pub(super) async fn upsert_system_role_impl(&self, role: Role) -> AppResult<Role> {
        let mut transaction = self.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO rbac_roles (id, name, display_name, description, is_system, created_at)
            VALUES ($1, $2, $3, $4, true, $5)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(role.id().as_uuid())
        .bind(role.name().as_str())
        .bind(role.display_name().as_str())
        .bind(role.description())
        .bind(role.created_at())
        .execute(&mut *transaction)
        .await
        .map_err(|error| storage_error("upsert system role", error))?;

        let stored = sqlx::query_as::<_, RoleRow>(&format!(
            "SELECT {ROLE_COLUMNS} FROM rbac_roles AS roles WHERE roles.name = $1"
        ))
        .bind(role.name().as_str())
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| storage_error("load system role", error))?;

        commit(transaction).await?;

        Role::try_from(stored)
    }

    pub(super) async fn replace_role_permissions_impl(
        &self,
        role_id: RoleId,
        permission_ids: Vec<PermissionId>,
    ) -> AppResult<()> {
        let mut transaction = self.begin().await?;

        let exists =
            sqlx::query_scalar::<_, Uuid>("SELECT id FROM rbac_roles WHERE id = $1 FOR UPDATE")
                .bind(role_id.as_uuid())
                .fetch_optional(&mut *transaction)
                .await
                .map_err(|error| storage_error("lock role", error))?;
        if exists.is_none() {
            return Err(AppError::NotFound(format!("role '{role_id}' does not exist")));
        }

        clear_role_permissions(&mut transaction, role_id).await?;
        insert_role_permissions(&mut transaction, role_id, &permission_ids).await?;

        commit(transaction).await
    }

    pub(super) async fn assign_role_to_user_impl(
        &self,
        user_id: &UserId,
        role_id: RoleId,
    ) -> AppResult<UserRoleAssignment> {
        let mut transaction = self.begin().await?;

        let role = sqlx::query_as::<_, RoleRow>(&format!(
            "SELECT {ROLE_COLUMNS} FROM rbac_roles AS roles WHERE roles.id = $1 FOR SHARE"
        ))
        .bind(role_id.as_uuid())
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| storage_error("load role", error))?
        .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' does not exist")))
        .and_then(Role::try_from)?;

        let assigned_at = sqlx::query_scalar::<_, DateTime<Utc>>(
            r#"
            INSERT INTO rbac_user_roles (user_id, role_id)
            VALUES ($1, $2)
            RETURNING assigned_at
            "#,
        )
        .bind(user_id.as_str())
        .bind(role_id.as_uuid())
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| {
            map_write_error(error, "assign role to user", || {
                AppError::DuplicateAssignment(format!(
                    "user '{user_id}' already holds role '{}'",
                    role.name()
                ))
            })
        })?;

        commit(transaction).await?;

        Ok(UserRoleAssignment {
            user_id: user_id.clone(),
            role,
            assigned_at,
        })
    }

    pub(super) async fn remove_role_from_user_impl(
        &self,
        user_id: &UserId,
        role_id: RoleId,
    ) -> AppResult<()> {
        sqlx::query("DELETE FROM rbac_user_roles WHERE user_id = $1 AND role_id = $2")
            .bind(user_id.as_str())
            .bind(role_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|error| storage_error("remove role from user", error))?;

        Ok(())
    }

    pub(super) async fn list_user_roles_impl(
        &self,
        user_id: &UserId,
    ) -> AppResult<Vec<UserRoleAssignment>> {
        let rows = sqlx::query_as::<_, UserRoleRow>(&format!(
            r#"
            SELECT {ROLE_COLUMNS}, user_roles.assigned_at
            FROM rbac_user_roles AS user_roles
            INNER JOIN rbac_roles AS roles
                ON roles.id = user_roles.role_id
            WHERE user_roles.user_id = $1
            ORDER BY user_roles.assigned_at, roles.name
            "#
        ))
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| storage_error("list user roles", error))?;

        rows.into_iter()
            .map(|row| {
                Ok(UserRoleAssignment {
                    user_id: user_id.clone(),
                    role: Role::try_from(row.role)?,
                    assigned_at: row.assigned_at,
                })
            })
            .collect()
    }
}

async fn load_role_definition(
    connection: &mut PgConnection,
    role_id: RoleId,
) -> AppResult<Option<RoleDefinition>> {
    let Some(row) = sqlx::query_as::<_, RoleRow>(&format!(
        "SELECT {ROLE_COLUMNS} FROM rbac_roles AS roles WHERE roles.id = $1"
    ))
    .bind(role_id.as_uuid())
    .fetch_optional(&mut *connection)
    .await
    .map_err(|error| storage_error("find role", error))?
    else {
        return Ok(None);
    };

    let permissions = fetch_role_permissions(connection, &[row.id])
        .await?
        .remove(&row.id)
        .unwrap_or_default();

    Ok(Some(RoleDefinition {
        role: Role::try_from(row)?,
        permissions,
    }))
}

/// Locks the role row and rejects missing or system roles.
async fn lock_mutable_role(connection: &mut PgConnection, role_id: RoleId) -> AppResult<()> {
    let guard = sqlx::query_as::<_, RoleGuardRow>(
        "SELECT name, is_system FROM rbac_roles WHERE id = $1 FOR UPDATE",
    )
    .bind(role_id.as_uuid())
    .fetch_optional(&mut *connection)
    .await
    .map_err(|error| storage_error("lock role", error))?
    .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' does not exist")))?;

    if guard.is_system {
        return Err(AppError::Forbidden(format!(
            "system role '{}' cannot be modified or deleted",
            guard.name
        )));
    }

    Ok(())
}

async fn clear_role_permissions(connection: &mut PgConnection, role_id: RoleId) -> AppResult<()> {
    sqlx::query("DELETE FROM rbac_role_permissions WHERE role_id = $1")
        .bind(role_id.as_uuid())
        .execute(&mut *connection)
        .await
        .map_err(|error| storage_error("clear role permissions", error))?;

    Ok(())
}

async fn insert_role_permissions(
    connection: &mut PgConnection,
    role_id: RoleId,
    permission_ids: &[PermissionId],
) -> AppResult<()> {
    if permission_ids.is_empty() {
        return Ok(());
    }

    sqlx::query(
        r#"
        INSERT INTO rbac_role_permissions (role_id, permission_id)
        SELECT $1, permission_id
        FROM UNNEST($2::uuid[]) AS requested(permission_id)
        ON CONFLICT (role_id, permission_id) DO NOTHING
        "#,
    )
    .bind(role_id.as_uuid())
    .bind(uuids(permission_ids, PermissionId::as_uuid))
    .execute(&mut *connection)
    .await
    .map_err(|error| {
        map_write_error(error, "attach permissions to role", || {
            AppError::Storage(format!("conflicting grants for role '{role_id}'"))
        })
    })?;

    Ok(())
}

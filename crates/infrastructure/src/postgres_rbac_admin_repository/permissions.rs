use super::*;

#[derive(Debug, FromRow)]
struct PermissionListingRow {
    #[sqlx(flatten)]
    permission: PermissionRow,
    role_count: i64,
}

impl PostgresRbacAdminRepository {
    pub(super) async fn list_permissions_impl(&self) -> AppResult<Vec<PermissionListing>> {
        let rows = sqlx::query_as::<_, PermissionListingRow>(
            r#"
            SELECT
                permissions.id,
                permissions.name,
                permissions.resource,
                permissions.action,
                permissions.display_name,
                permissions.description,
                (
                    SELECT COUNT(*)
                    FROM rbac_role_permissions AS role_permissions
                    WHERE role_permissions.permission_id = permissions.id
                ) AS role_count
            FROM rbac_permissions AS permissions
            ORDER BY permissions.resource, permissions.action, permissions.name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| storage_error("list permissions", error))?;

        rows.into_iter()
            .map(|row| {
                Ok(PermissionListing {
                    permission: Permission::try_from(row.permission)?,
                    role_count: u64::try_from(row.role_count).unwrap_or_default(),
                })
            })
            .collect()
    }

    pub(super) async fn create_permission_impl(
        &self,
        permission: Permission,
    ) -> AppResult<Permission> {
        sqlx::query(
            r#"
            INSERT INTO rbac_permissions (id, name, resource, action, display_name, description)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(permission.id().as_uuid())
        .bind(permission.name().as_str())
        .bind(permission.resource().as_str())
        .bind(permission.action().as_str())
        .bind(permission.display_name().as_str())
        .bind(permission.description())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            map_write_error(error, "create permission", || {
                AppError::DuplicateName(format!(
                    "permission '{}' already exists",
                    permission.name()
                ))
            })
        })?;

        Ok(permission)
    }

    pub(super) async fn upsert_permission_impl(
        &self,
        permission: Permission,
    ) -> AppResult<Permission> {
        let row = sqlx::query_as::<_, PermissionRow>(
            r#"
            INSERT INTO rbac_permissions (id, name, resource, action, display_name, description)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (name) DO UPDATE
            SET resource = EXCLUDED.resource,
                action = EXCLUDED.action,
                display_name = EXCLUDED.display_name,
                description = EXCLUDED.description
            RETURNING id, name, resource, action, display_name, description
            "#,
        )
        .bind(permission.id().as_uuid())
        .bind(permission.name().as_str())
        .bind(permission.resource().as_str())
        .bind(permission.action().as_str())
        .bind(permission.display_name().as_str())
        .bind(permission.description())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| storage_error("upsert permission", error))?;

        Permission::try_from(row)
    }

    pub(super) async fn delete_permission_impl(
        &self,
        permission_id: PermissionId,
    ) -> AppResult<()> {
        let rows_affected = sqlx::query("DELETE FROM rbac_permissions WHERE id = $1")
            .bind(permission_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|error| storage_error("delete permission", error))?
            .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound(format!(
                "permission '{permission_id}' does not exist"
            )));
        }

        Ok(())
    }
}

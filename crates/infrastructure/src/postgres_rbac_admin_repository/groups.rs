use super::*;

#[derive(Debug, FromRow)]
struct GroupMemberRow {
    group_id: Uuid,
    user_id: String,
}

#[derive(Debug, FromRow)]
struct GroupRoleRow {
    group_id: Uuid,
    role_id: Uuid,
}

const GROUP_COLUMNS: &str = "user_groups.id, user_groups.name, user_groups.display_name, \
                             user_groups.description, user_groups.creator_id, \
                             user_groups.created_at";

impl PostgresRbacAdminRepository {
    pub(super) async fn list_user_groups_impl(&self) -> AppResult<Vec<GroupDefinition>> {
        let mut connection = self
            .pool
            .acquire()
            .await
            .map_err(|error| storage_error("acquire connection", error))?;

        let rows = sqlx::query_as::<_, GroupRow>(&format!(
            r#"
            SELECT {GROUP_COLUMNS}
            FROM rbac_user_groups AS user_groups
            ORDER BY user_groups.created_at DESC, user_groups.name
            "#
        ))
        .fetch_all(&mut *connection)
        .await
        .map_err(|error| storage_error("list groups", error))?;

        aggregate_groups(&mut connection, rows).await
    }

    pub(super) async fn find_user_group_impl(
        &self,
        group_id: GroupId,
    ) -> AppResult<Option<GroupDefinition>> {
        let mut connection = self
            .pool
            .acquire()
            .await
            .map_err(|error| storage_error("acquire connection", error))?;

        load_group_definition(&mut connection, group_id).await
    }

    pub(super) async fn create_user_group_impl(
        &self,
        group: UserGroup,
        member_ids: Vec<UserId>,
        role_ids: Vec<RoleId>,
    ) -> AppResult<GroupDefinition> {
        let mut transaction = self.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO rbac_user_groups
                (id, name, display_name, description, creator_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(group.id().as_uuid())
        .bind(group.name().as_str())
        .bind(group.display_name().as_str())
        .bind(group.description())
        .bind(group.creator_id().as_str())
        .bind(group.created_at())
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            map_write_error(error, "create group", || {
                AppError::DuplicateName(format!("group '{}' already exists", group.name()))
            })
        })?;

        if !member_ids.is_empty() {
            let members: Vec<String> = member_ids.iter().map(|id| id.as_str().to_owned()).collect();
            sqlx::query(
                r#"
                INSERT INTO rbac_user_group_members (group_id, user_id)
                SELECT $1, user_id
                FROM UNNEST($2::text[]) AS requested(user_id)
                ON CONFLICT (group_id, user_id) DO NOTHING
                "#,
            )
            .bind(group.id().as_uuid())
            .bind(members)
            .execute(&mut *transaction)
            .await
            .map_err(|error| storage_error("add group members", error))?;
        }

        if !role_ids.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO rbac_user_group_roles (group_id, role_id)
                SELECT $1, role_id
                FROM UNNEST($2::uuid[]) AS requested(role_id)
                ON CONFLICT (group_id, role_id) DO NOTHING
                "#,
            )
            .bind(group.id().as_uuid())
            .bind(uuids(&role_ids, RoleId::as_uuid))
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                map_write_error(error, "assign roles to group", || {
                    AppError::Storage(format!("conflicting roles for group '{}'", group.id()))
                })
            })?;
        }

        let definition = load_group_definition(&mut transaction, group.id())
            .await?
            .ok_or_else(|| {
                AppError::Storage(format!("group '{}' missing after insert", group.id()))
            })?;

        commit(transaction).await?;

        Ok(definition)
    }

    pub(super) async fn update_user_group_impl(
        &self,
        group: UserGroup,
    ) -> AppResult<GroupDefinition> {
        let mut transaction = self.begin().await?;

        let rows_affected = sqlx::query(
            r#"
            UPDATE rbac_user_groups
            SET name = $2, display_name = $3, description = $4
            WHERE id = $1
            "#,
        )
        .bind(group.id().as_uuid())
        .bind(group.name().as_str())
        .bind(group.display_name().as_str())
        .bind(group.description())
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            map_write_error(error, "update group", || {
                AppError::DuplicateName(format!("group '{}' already exists", group.name()))
            })
        })?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound(format!(
                "group '{}' does not exist",
                group.id()
            )));
        }

        let definition = load_group_definition(&mut transaction, group.id())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("group '{}' does not exist", group.id())))?;

        commit(transaction).await?;

        Ok(definition)
    }

    pub(super) async fn delete_user_group_impl(&self, group_id: GroupId) -> AppResult<()> {
        let rows_affected = sqlx::query("DELETE FROM rbac_user_groups WHERE id = $1")
            .bind(group_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|error| storage_error("delete group", error))?
            .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound(format!(
                "group '{group_id}' does not exist"
            )));
        }

        Ok(())
    }

    pub(super) async fn add_user_to_group_impl(
        &self,
        group_id: GroupId,
        user_id: &UserId,
    ) -> AppResult<()> {
        sqlx::query("INSERT INTO rbac_user_group_members (group_id, user_id) VALUES ($1, $2)")
            .bind(group_id.as_uuid())
            .bind(user_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|error| {
                map_write_error(error, "add user to group", || {
                    AppError::DuplicateAssignment(format!(
                        "user '{user_id}' is already a member of group '{group_id}'"
                    ))
                })
            })?;

        Ok(())
    }

    pub(super) async fn remove_user_from_group_impl(
        &self,
        group_id: GroupId,
        user_id: &UserId,
    ) -> AppResult<()> {
        sqlx::query("DELETE FROM rbac_user_group_members WHERE group_id = $1 AND user_id = $2")
            .bind(group_id.as_uuid())
            .bind(user_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|error| storage_error("remove user from group", error))?;

        Ok(())
    }

    pub(super) async fn assign_role_to_group_impl(
        &self,
        group_id: GroupId,
        role_id: RoleId,
    ) -> AppResult<()> {
        sqlx::query("INSERT INTO rbac_user_group_roles (group_id, role_id) VALUES ($1, $2)")
            .bind(group_id.as_uuid())
            .bind(role_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|error| {
                map_write_error(error, "assign role to group", || {
                    AppError::DuplicateAssignment(format!(
                        "group '{group_id}' already holds role '{role_id}'"
                    ))
                })
            })?;

        Ok(())
    }

    pub(super) async fn remove_role_from_group_impl(
        &self,
        group_id: GroupId,
        role_id: RoleId,
    ) -> AppResult<()> {
        sqlx::query("DELETE FROM rbac_user_group_roles WHERE group_id = $1 AND role_id = $2")
            .bind(group_id.as_uuid())
            .bind(role_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|error| storage_error("remove role from group", error))?;

        Ok(())
    }
}

async fn load_group_definition(
    connection: &mut PgConnection,
    group_id: GroupId,
) -> AppResult<Option<GroupDefinition>> {
    let rows = sqlx::query_as::<_, GroupRow>(&format!(
        "SELECT {GROUP_COLUMNS} FROM rbac_user_groups AS user_groups WHERE user_groups.id = $1"
    ))
    .bind(group_id.as_uuid())
    .fetch_all(&mut *connection)
    .await
    .map_err(|error| storage_error("find group", error))?;

    Ok(aggregate_groups(connection, rows).await?.into_iter().next())
}

async fn aggregate_groups(
    connection: &mut PgConnection,
    rows: Vec<GroupRow>,
) -> AppResult<Vec<GroupDefinition>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let group_ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();

    let member_rows = sqlx::query_as::<_, GroupMemberRow>(
        r#"
        SELECT group_id, user_id
        FROM rbac_user_group_members
        WHERE group_id = ANY($1)
        ORDER BY added_at, user_id
        "#,
    )
    .bind(group_ids.as_slice())
    .fetch_all(&mut *connection)
    .await
    .map_err(|error| storage_error("load group members", error))?;

    let role_rows = sqlx::query_as::<_, GroupRoleRow>(
        r#"
        SELECT group_roles.group_id, group_roles.role_id
        FROM rbac_user_group_roles AS group_roles
        INNER JOIN rbac_roles AS roles
            ON roles.id = group_roles.role_id
        WHERE group_roles.group_id = ANY($1)
        ORDER BY roles.name
        "#,
    )
    .bind(group_ids.as_slice())
    .fetch_all(&mut *connection)
    .await
    .map_err(|error| storage_error("load group roles", error))?;

    let mut members: HashMap<Uuid, Vec<UserId>> = HashMap::new();
    for row in member_rows {
        let user_id = UserId::new(row.user_id).map_err(|error| {
            AppError::Storage(format!(
                "invalid stored member of group '{}': {error}",
                row.group_id
            ))
        })?;
        members.entry(row.group_id).or_default().push(user_id);
    }

    let mut roles: HashMap<Uuid, Vec<RoleId>> = HashMap::new();
    for row in role_rows {
        roles
            .entry(row.group_id)
            .or_default()
            .push(RoleId::from_uuid(row.role_id));
    }

    rows.into_iter()
        .map(|row| {
            let member_ids = members.remove(&row.id).unwrap_or_default();
            let role_ids = roles.remove(&row.id).unwrap_or_default();
            Ok(GroupDefinition {
                group: UserGroup::try_from(row)?,
                member_ids,
                role_ids,
            })
        })
        .collect()
}

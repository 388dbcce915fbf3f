use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use tessera_application::RbacAdminRepository;
use tessera_core::AppError;
use tessera_domain::{
    Action, GroupId, Permission, PermissionId, PermissionKey, Resource, Role, RoleId, UserGroup,
    UserId,
};
use uuid::Uuid;

use super::PostgresRbacAdminRepository;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres rbac admin tests: {error}");
    }

    Some(pool)
}

fn unique(prefix: &str) -> String {
    format!("{prefix}_{}", Uuid::new_v4().simple())
}

fn custom_role(name: &str) -> Role {
    Role::new(RoleId::new(), name, name, "", false, chrono::Utc::now())
        .unwrap_or_else(|_| unreachable!())
}

async fn seeded_permission(
    repository: &PostgresRbacAdminRepository,
    resource: Resource,
    action: Action,
) -> Permission {
    let permission = Permission::new(
        PermissionId::new(),
        unique(&format!("{resource}:{action}")),
        PermissionKey::new(resource, action),
        "Test permission",
        "",
    )
    .unwrap_or_else(|_| unreachable!());

    let created = repository.create_permission(permission).await;
    assert!(created.is_ok());
    created.unwrap_or_else(|_| unreachable!())
}

#[tokio::test]
async fn create_role_attaches_permissions_and_rejects_duplicate_names() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresRbacAdminRepository::new(pool);
    let permission = seeded_permission(&repository, Resource::Project, Action::Read).await;
    let name = unique("reader");

    let created = repository
        .create_role(custom_role(&name), vec![permission.id()])
        .await;
    assert!(created.is_ok());
    let created = created.unwrap_or_else(|_| unreachable!());
    assert_eq!(created.permissions, vec![permission.clone()]);

    let duplicate = repository.create_role(custom_role(&name), Vec::new()).await;
    assert!(matches!(duplicate, Err(AppError::DuplicateName(_))));

    let found = repository.find_role(created.role.id()).await;
    assert_eq!(
        found
            .ok()
            .flatten()
            .map(|definition| definition.permissions.len()),
        Some(1)
    );
}

#[tokio::test]
async fn unknown_permission_rolls_back_role_creation() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresRbacAdminRepository::new(pool);
    let name = unique("ghost");

    let result = repository
        .create_role(custom_role(&name), vec![PermissionId::new()])
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert!(
        repository
            .find_role_by_name(&name)
            .await
            .unwrap_or_default()
            .is_none()
    );
}

#[tokio::test]
async fn unknown_permission_rolls_back_role_update() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresRbacAdminRepository::new(pool);
    let permission = seeded_permission(&repository, Resource::Strategy, Action::Read).await;
    let name = unique("planner");
    let created = repository
        .create_role(custom_role(&name), vec![permission.id()])
        .await
        .unwrap_or_else(|_| unreachable!());
    let role_id = created.role.id();

    let renamed = Role::new(
        role_id,
        name.as_str(),
        "Renamed",
        "changed",
        false,
        created.role.created_at(),
    )
    .unwrap_or_else(|_| unreachable!());
    let result = repository
        .update_role(renamed, Some(vec![PermissionId::new()]))
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));

    let stored = repository
        .find_role(role_id)
        .await
        .unwrap_or_default()
        .unwrap_or_else(|| unreachable!());
    assert_eq!(stored.role.display_name().as_str(), name);
    assert_eq!(stored.role.description(), "");
    assert_eq!(stored.permissions, vec![permission]);
}

#[tokio::test]
async fn system_roles_cannot_be_updated_or_deleted() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresRbacAdminRepository::new(pool);
    let name = unique("system");
    let system_role = Role::new(
        RoleId::new(),
        name.as_str(),
        "System",
        "",
        true,
        chrono::Utc::now(),
    )
    .unwrap_or_else(|_| unreachable!());

    let stored = repository.upsert_system_role(system_role.clone()).await;
    assert!(stored.is_ok());
    let stored = stored.unwrap_or_else(|_| unreachable!());
    assert_eq!(stored.id(), system_role.id());

    let again = repository
        .upsert_system_role(
            Role::new(
                RoleId::new(),
                name.as_str(),
                "Other",
                "",
                true,
                chrono::Utc::now(),
            )
            .unwrap_or_else(|_| unreachable!()),
        )
        .await;
    assert_eq!(again.ok().map(|role| role.id()), Some(system_role.id()));

    assert!(matches!(
        repository
            .update_role(stored.clone(), Some(Vec::new()))
            .await,
        Err(AppError::Forbidden(_))
    ));
    assert!(matches!(
        repository.delete_role(stored.id()).await,
        Err(AppError::Forbidden(_))
    ));
}

#[tokio::test]
async fn deleting_role_cascades_assignments() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresRbacAdminRepository::new(pool.clone());
    let permission = seeded_permission(&repository, Resource::Chat, Action::Read).await;
    let role = repository
        .create_role(custom_role(&unique("temp")), vec![permission.id()])
        .await
        .unwrap_or_else(|_| unreachable!());
    let role_id = role.role.id();
    let user_id = UserId::new(unique("user")).unwrap_or_else(|_| unreachable!());

    assert!(
        repository
            .assign_role_to_user(&user_id, role_id)
            .await
            .is_ok()
    );
    assert!(matches!(
        repository.assign_role_to_user(&user_id, role_id).await,
        Err(AppError::DuplicateAssignment(_))
    ));

    let group = UserGroup::new(
        GroupId::new(),
        unique("group"),
        "Group",
        "",
        user_id.clone(),
        chrono::Utc::now(),
    )
    .unwrap_or_else(|_| unreachable!());
    let group = repository
        .create_user_group(group, vec![user_id.clone()], vec![role_id])
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(group.role_ids, vec![role_id]);

    assert!(repository.delete_role(role_id).await.is_ok());

    let remaining = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT
            (SELECT COUNT(*) FROM rbac_role_permissions WHERE role_id = $1)
            + (SELECT COUNT(*) FROM rbac_user_roles WHERE role_id = $1)
            + (SELECT COUNT(*) FROM rbac_user_group_roles WHERE role_id = $1)
        "#,
    )
    .bind(role_id.as_uuid())
    .fetch_one(&pool)
    .await;
    assert_eq!(remaining.ok(), Some(0));
    assert!(matches!(
        repository.delete_role(role_id).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn group_links_reject_duplicates_and_remove_idempotently() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresRbacAdminRepository::new(pool);
    let creator = UserId::new(unique("creator")).unwrap_or_else(|_| unreachable!());
    let group = UserGroup::new(
        GroupId::new(),
        unique("crew"),
        "Crew",
        "",
        creator.clone(),
        chrono::Utc::now(),
    )
    .unwrap_or_else(|_| unreachable!());
    let group_id = group.id();
    assert!(
        repository
            .create_user_group(group, Vec::new(), Vec::new())
            .await
            .is_ok()
    );

    assert!(
        repository
            .add_user_to_group(group_id, &creator)
            .await
            .is_ok()
    );
    assert!(matches!(
        repository.add_user_to_group(group_id, &creator).await,
        Err(AppError::DuplicateAssignment(_))
    ));
    assert!(matches!(
        repository
            .assign_role_to_group(group_id, RoleId::new())
            .await,
        Err(AppError::NotFound(_))
    ));

    assert!(
        repository
            .remove_user_from_group(group_id, &creator)
            .await
            .is_ok()
    );
    assert!(
        repository
            .remove_user_from_group(group_id, &creator)
            .await
            .is_ok()
    );

    assert!(repository.delete_user_group(group_id).await.is_ok());
    assert!(matches!(
        repository.delete_user_group(group_id).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn upsert_permission_keeps_identity() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let repository = PostgresRbacAdminRepository::new(pool);
    let original = seeded_permission(&repository, Resource::Points, Action::Update).await;

    let replacement = Permission::new(
        PermissionId::new(),
        original.name().as_str(),
        original.key(),
        "Adjust points",
        "updated",
    )
    .unwrap_or_else(|_| unreachable!());
    let upserted = repository.upsert_permission(replacement).await;

    assert!(upserted.is_ok());
    let upserted = upserted.unwrap_or_else(|_| unreachable!());
    assert_eq!(upserted.id(), original.id());
    assert_eq!(upserted.description(), "updated");

    assert!(repository.delete_permission(original.id()).await.is_ok());
    assert!(matches!(
        repository.delete_permission(original.id()).await,
        Err(AppError::NotFound(_))
    ));
}

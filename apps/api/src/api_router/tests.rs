use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, Request, StatusCode};
use serde_json::{Value, json};
use tessera_application::{AuthorizationService, RbacAdminService};
use tessera_infrastructure::InMemoryRbacStore;
use tower::ServiceExt;

use super::build_router;
use crate::state::AppState;

async fn bootstrapped_router() -> Router {
    let store = Arc::new(InMemoryRbacStore::new());
    let state = AppState {
        rbac_admin_service: RbacAdminService::new(store.clone()),
        authorization_service: AuthorizationService::new(store),
    };
    state
        .rbac_admin_service
        .bootstrap()
        .await
        .unwrap_or_else(|_| unreachable!());

    build_router(state, "http://localhost:3000").unwrap_or_else(|_| unreachable!())
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap_or_else(|_| unreachable!());

    let response = app
        .clone()
        .oneshot(request)
        .await
        .unwrap_or_else(|_| unreachable!());
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap_or_else(|_| unreachable!());

    if bytes.is_empty() {
        return (status, Value::Null);
    }

    let value = serde_json::from_slice(&bytes).unwrap_or_else(|_| unreachable!());
    (status, value)
}

async fn role_id(app: &Router, name: &str) -> String {
    let (_, roles) = send(app, Method::GET, "/api/rbac/roles", None).await;
    roles
        .as_array()
        .and_then(|roles| roles.iter().find(|role| role["name"] == name))
        .and_then(|role| role["id"].as_str())
        .map(str::to_owned)
        .unwrap_or_else(|| unreachable!())
}

async fn permission_id(app: &Router, name: &str) -> String {
    let (_, permissions) = send(app, Method::GET, "/api/rbac/permissions", None).await;
    permissions
        .as_array()
        .and_then(|permissions| {
            permissions
                .iter()
                .find(|permission| permission["name"] == name)
        })
        .and_then(|permission| permission["id"].as_str())
        .map(str::to_owned)
        .unwrap_or_else(|| unreachable!())
}

#[tokio::test]
async fn health_reports_ok() {
    let app = bootstrapped_router().await;

    let (status, body) = send(&app, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn bootstrapped_catalog_is_listed() {
    let app = bootstrapped_router().await;

    let (status, roles) = send(&app, Method::GET, "/api/rbac/roles", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(roles.as_array().map(Vec::len), Some(5));

    let (status, permissions) = send(&app, Method::GET, "/api/rbac/permissions", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(permissions.as_array().map(Vec::len), Some(31));
    assert_eq!(permissions[0]["name"], "analytics:manage");
    assert_eq!(permissions[0]["role_count"], 2);
}

#[tokio::test]
async fn custom_role_lifecycle() {
    let app = bootstrapped_router().await;
    let finance_read = permission_id(&app, "finance:read").await;

    let (status, created) = send(
        &app,
        Method::POST,
        "/api/rbac/roles",
        Some(json!({
            "name": "auditor",
            "display_name": "Auditor",
            "permission_ids": [finance_read, finance_read],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["is_system"], false);
    assert_eq!(created["description"], "");
    assert_eq!(created["permissions"].as_array().map(Vec::len), Some(1));

    let role_uri = format!("/api/rbac/roles/{}", created["id"].as_str().unwrap_or_default());

    let (status, updated) = send(
        &app,
        Method::PUT,
        &role_uri,
        Some(json!({ "display_name": "Finance Auditor" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "auditor");
    assert_eq!(updated["display_name"], "Finance Auditor");
    assert_eq!(updated["permissions"][0]["name"], "finance:read");

    let (status, _) = send(&app, Method::DELETE, &role_uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, Method::GET, &role_uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["message"].as_str().is_some());
}

#[tokio::test]
async fn errors_map_to_status_codes() {
    let app = bootstrapped_router().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/rbac/roles",
        Some(json!({ "name": "admin", "display_name": "Shadow" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(
        body["message"]
            .as_str()
            .is_some_and(|message| message.contains("admin"))
    );

    let (status, _) = send(&app, Method::GET, "/api/rbac/roles/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/rbac/roles",
        Some(json!({ "name": "  ", "display_name": "Blank" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let admin = role_id(&app, "admin").await;
    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/rbac/roles/{admin}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/rbac/roles/{admin}"),
        Some(json!({ "display_name": "Renamed" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn access_check_reports_missing_permission() {
    let app = bootstrapped_router().await;
    let guest = role_id(&app, "guest").await;

    let (status, assignment) = send(
        &app,
        Method::POST,
        "/api/rbac/users/reader-1/roles",
        Some(json!({ "role_id": guest })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(assignment["role_name"], "guest");

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/rbac/users/reader-1/roles",
        Some(json!({ "role_id": guest })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, allowed) = send(
        &app,
        Method::GET,
        "/api/rbac/users/reader-1/access?resource=project&action=read",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(allowed, json!({ "allowed": true }));

    let (_, denied) = send(
        &app,
        Method::GET,
        "/api/rbac/users/reader-1/access?resource=project&action=update",
        None,
    )
    .await;
    assert_eq!(denied["allowed"], false);
    assert_eq!(denied["message"], "missing permission project:update");

    let (status, _) = send(
        &app,
        Method::GET,
        "/api/rbac/users/reader-1/access?resource=spaceship&action=read",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, roles) = send(&app, Method::GET, "/api/rbac/users/reader-1/roles", None).await;
    assert_eq!(roles["roles"].as_array().map(Vec::len), Some(1));
    assert_eq!(roles["permissions"].as_array().map(Vec::len), Some(9));

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/rbac/users/reader-1/roles/{guest}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, revoked) = send(
        &app,
        Method::GET,
        "/api/rbac/users/reader-1/access?resource=project&action=read",
        None,
    )
    .await;
    assert_eq!(revoked["allowed"], false);
}

#[tokio::test]
async fn group_roles_are_inherited_by_members() {
    let app = bootstrapped_router().await;
    let manager = role_id(&app, "manager").await;

    let (status, group) = send(
        &app,
        Method::POST,
        "/api/rbac/groups",
        Some(json!({
            "name": "dev_team",
            "display_name": "Dev Team",
            "creator_id": "founder",
            "member_ids": ["dev-1"],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let group_uri = format!("/api/rbac/groups/{}", group["id"].as_str().unwrap_or_default());

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("{group_uri}/roles"),
        Some(json!({ "role_id": manager })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("{group_uri}/members"),
        Some(json!({ "user_id": "dev-2" })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, fetched) = send(&app, Method::GET, &group_uri, None).await;
    assert_eq!(fetched["member_ids"], json!(["dev-1", "dev-2"]));
    assert_eq!(fetched["role_ids"], json!([manager]));

    let (_, access) = send(
        &app,
        Method::GET,
        "/api/rbac/users/dev-2/access?resource=strategy&action=delete",
        None,
    )
    .await;
    assert_eq!(access["allowed"], true);

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("{group_uri}/members/dev-2"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, access) = send(
        &app,
        Method::GET,
        "/api/rbac/users/dev-2/access?resource=strategy&action=delete",
        None,
    )
    .await;
    assert_eq!(access["allowed"], false);

    let (status, _) = send(&app, Method::DELETE, &group_uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::DELETE, &group_uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn custom_permission_can_be_granted_and_deleted() {
    let app = bootstrapped_router().await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/rbac/permissions",
        Some(json!({
            "name": "points:grant",
            "display_name": "Grant Points",
            "resource": "points",
            "action": "bogus",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/rbac/permissions",
        Some(json!({
            "name": "finance:read",
            "display_name": "Duplicate",
            "resource": "finance",
            "action": "read",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, created) = send(
        &app,
        Method::POST,
        "/api/rbac/permissions",
        Some(json!({
            "name": "points_reader",
            "display_name": "Points Reader",
            "resource": "points",
            "action": "read",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["resource"], "points");

    let permission_uri = format!(
        "/api/rbac/permissions/{}",
        created["id"].as_str().unwrap_or_default()
    );
    let (status, _) = send(&app, Method::DELETE, &permission_uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::DELETE, &permission_uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn default_role_is_assigned_once() {
    let app = bootstrapped_router().await;

    let (status, assignment) = send(
        &app,
        Method::POST,
        "/api/rbac/users/new-user/default-role",
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(assignment["role_name"], "member");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/rbac/users/new-user/default-role",
        Some(json!({ "is_admin": true })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);
}

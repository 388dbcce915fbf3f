use super::*;

use axum::response::{IntoResponse, Response};
use tessera_core::AppError;
use tessera_domain::{Action, Resource};

/// Direct roles of a user together with the effective permission union.
pub async fn list_user_roles_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<UserRolesResponse>> {
    let user_id = UserId::new(user_id)?;

    let roles = state
        .rbac_admin_service
        .list_user_roles(&user_id)
        .await?
        .into_iter()
        .map(UserRoleResponse::from)
        .collect();
    let permissions = state
        .authorization_service
        .user_permissions(&user_id)
        .await
        .to_strings()
        .into_iter()
        .collect();

    Ok(Json(UserRolesResponse {
        user_id: user_id.as_str().to_owned(),
        roles,
        permissions,
    }))
}

pub async fn assign_user_role_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(payload): Json<AssignRoleRequest>,
) -> ApiResult<(StatusCode, Json<UserRoleResponse>)> {
    let user_id = UserId::new(user_id)?;
    let role_id = payload.role_id.parse::<RoleId>()?;

    let assignment = state
        .rbac_admin_service
        .assign_role_to_user(&user_id, role_id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(UserRoleResponse::from(assignment)),
    ))
}

pub async fn remove_user_role_handler(
    State(state): State<AppState>,
    Path((user_id, role_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let user_id = UserId::new(user_id)?;
    let role_id = role_id.parse::<RoleId>()?;

    state
        .rbac_admin_service
        .remove_role_from_user(&user_id, role_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Gives a role-less user `super_admin` or `member`. Users that already hold
/// a direct role get `204 No Content`.
pub async fn default_user_role_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(payload): Json<DefaultRoleRequest>,
) -> ApiResult<Response> {
    let user_id = UserId::new(user_id)?;

    let assignment = state
        .rbac_admin_service
        .ensure_default_role(&user_id, payload.is_admin)
        .await?;

    Ok(match assignment {
        Some(assignment) => (
            StatusCode::CREATED,
            Json(UserRoleResponse::from(assignment)),
        )
            .into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}

pub async fn check_access_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<AccessQuery>,
) -> ApiResult<Json<AccessResponse>> {
    let user_id = UserId::new(user_id)?;
    let resource = query.resource.parse::<Resource>()?;
    let action = query.action.parse::<Action>()?;

    let response = match state
        .authorization_service
        .require_permission(&user_id, resource, action)
        .await
    {
        Ok(()) => AccessResponse {
            allowed: true,
            message: None,
        },
        Err(AppError::Forbidden(message)) => AccessResponse {
            allowed: false,
            message: Some(message),
        },
        Err(error) => return Err(error.into()),
    };

    Ok(Json(response))
}

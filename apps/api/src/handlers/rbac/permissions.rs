use super::*;

use tessera_domain::PermissionKey;

pub async fn list_permissions_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<PermissionListingResponse>>> {
    let permissions = state
        .rbac_admin_service
        .list_permissions()
        .await?
        .into_iter()
        .map(PermissionListingResponse::from)
        .collect();

    Ok(Json(permissions))
}

pub async fn create_permission_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreatePermissionRequest>,
) -> ApiResult<(StatusCode, Json<PermissionResponse>)> {
    let key = PermissionKey::new(payload.resource.parse()?, payload.action.parse()?);

    let permission = state
        .rbac_admin_service
        .create_permission(CreatePermissionInput {
            name: payload.name,
            display_name: payload.display_name,
            description: payload.description,
            key,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(PermissionResponse::from(permission)),
    ))
}

pub async fn delete_permission_handler(
    State(state): State<AppState>,
    Path(permission_id): Path<String>,
) -> ApiResult<StatusCode> {
    let permission_id = permission_id.parse::<PermissionId>()?;
    state
        .rbac_admin_service
        .delete_permission(permission_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

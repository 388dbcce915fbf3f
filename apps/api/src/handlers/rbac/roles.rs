use super::*;

pub async fn list_roles_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<RoleListingResponse>>> {
    let roles = state
        .rbac_admin_service
        .list_roles()
        .await?
        .into_iter()
        .map(RoleListingResponse::from)
        .collect();

    Ok(Json(roles))
}

pub async fn get_role_handler(
    State(state): State<AppState>,
    Path(role_id): Path<String>,
) -> ApiResult<Json<RoleResponse>> {
    let role_id = role_id.parse::<RoleId>()?;
    let role = state.rbac_admin_service.get_role(role_id).await?;

    Ok(Json(RoleResponse::from(role)))
}

pub async fn create_role_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateRoleRequest>,
) -> ApiResult<(StatusCode, Json<RoleResponse>)> {
    let permission_ids = parse_ids::<PermissionId>(&payload.permission_ids)?;

    let role = state
        .rbac_admin_service
        .create_role(CreateRoleInput {
            name: payload.name,
            display_name: payload.display_name,
            description: payload.description,
            permission_ids,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(RoleResponse::from(role))))
}

pub async fn update_role_handler(
    State(state): State<AppState>,
    Path(role_id): Path<String>,
    Json(payload): Json<UpdateRoleRequest>,
) -> ApiResult<Json<RoleResponse>> {
    let role_id = role_id.parse::<RoleId>()?;
    let permission_ids = payload
        .permission_ids
        .as_deref()
        .map(parse_ids::<PermissionId>)
        .transpose()?;

    let role = state
        .rbac_admin_service
        .update_role(
            role_id,
            UpdateRoleInput {
                name: payload.name,
                display_name: payload.display_name,
                description: payload.description,
                permission_ids,
            },
        )
        .await?;

    Ok(Json(RoleResponse::from(role)))
}

pub async fn delete_role_handler(
    State(state): State<AppState>,
    Path(role_id): Path<String>,
) -> ApiResult<StatusCode> {
    let role_id = role_id.parse::<RoleId>()?;
    state.rbac_admin_service.delete_role(role_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

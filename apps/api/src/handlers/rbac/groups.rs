use super::*;

pub async fn list_groups_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<UserGroupResponse>>> {
    let groups = state
        .rbac_admin_service
        .list_user_groups()
        .await?
        .into_iter()
        .map(UserGroupResponse::from)
        .collect();

    Ok(Json(groups))
}

pub async fn get_group_handler(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
) -> ApiResult<Json<UserGroupResponse>> {
    let group_id = group_id.parse::<GroupId>()?;
    let group = state.rbac_admin_service.get_user_group(group_id).await?;

    Ok(Json(UserGroupResponse::from(group)))
}

pub async fn create_group_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserGroupRequest>,
) -> ApiResult<(StatusCode, Json<UserGroupResponse>)> {
    let member_ids = payload
        .member_ids
        .into_iter()
        .map(UserId::new)
        .collect::<Result<Vec<_>, _>>()?;
    let role_ids = parse_ids::<RoleId>(&payload.role_ids)?;

    let group = state
        .rbac_admin_service
        .create_user_group(CreateUserGroupInput {
            name: payload.name,
            display_name: payload.display_name,
            description: payload.description,
            creator_id: UserId::new(payload.creator_id)?,
            member_ids,
            role_ids,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(UserGroupResponse::from(group))))
}

pub async fn update_group_handler(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
    Json(payload): Json<UpdateUserGroupRequest>,
) -> ApiResult<Json<UserGroupResponse>> {
    let group_id = group_id.parse::<GroupId>()?;

    let group = state
        .rbac_admin_service
        .update_user_group(
            group_id,
            UpdateUserGroupInput {
                name: payload.name,
                display_name: payload.display_name,
                description: payload.description,
            },
        )
        .await?;

    Ok(Json(UserGroupResponse::from(group)))
}

pub async fn delete_group_handler(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
) -> ApiResult<StatusCode> {
    let group_id = group_id.parse::<GroupId>()?;
    state.rbac_admin_service.delete_user_group(group_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_group_member_handler(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
    Json(payload): Json<AddGroupMemberRequest>,
) -> ApiResult<StatusCode> {
    let group_id = group_id.parse::<GroupId>()?;
    let user_id = UserId::new(payload.user_id)?;

    state
        .rbac_admin_service
        .add_user_to_group(group_id, &user_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove_group_member_handler(
    State(state): State<AppState>,
    Path((group_id, user_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let group_id = group_id.parse::<GroupId>()?;
    let user_id = UserId::new(user_id)?;

    state
        .rbac_admin_service
        .remove_user_from_group(group_id, &user_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn assign_group_role_handler(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
    Json(payload): Json<AssignRoleRequest>,
) -> ApiResult<StatusCode> {
    let group_id = group_id.parse::<GroupId>()?;
    let role_id = payload.role_id.parse::<RoleId>()?;

    state
        .rbac_admin_service
        .assign_role_to_group(group_id, role_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove_group_role_handler(
    State(state): State<AppState>,
    Path((group_id, role_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let group_id = group_id.parse::<GroupId>()?;
    let role_id = role_id.parse::<RoleId>()?;

    state
        .rbac_admin_service
        .remove_role_from_group(group_id, role_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

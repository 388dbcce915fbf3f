use axum::Router;
use axum::routing::{delete, get, post};
use tessera_core::AppError;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

mod cors;

use cors::build_cors_layer;

pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(rbac_routes())
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(frontend_url)?)
        .with_state(app_state))
}

fn rbac_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/rbac/roles",
            get(handlers::rbac::list_roles_handler).post(handlers::rbac::create_role_handler),
        )
        .route(
            "/api/rbac/roles/{role_id}",
            get(handlers::rbac::get_role_handler)
                .put(handlers::rbac::update_role_handler)
                .delete(handlers::rbac::delete_role_handler),
        )
        .route(
            "/api/rbac/groups",
            get(handlers::rbac::list_groups_handler).post(handlers::rbac::create_group_handler),
        )
        .route(
            "/api/rbac/groups/{group_id}",
            get(handlers::rbac::get_group_handler)
                .put(handlers::rbac::update_group_handler)
                .delete(handlers::rbac::delete_group_handler),
        )
        .route(
            "/api/rbac/groups/{group_id}/members",
            post(handlers::rbac::add_group_member_handler),
        )
        .route(
            "/api/rbac/groups/{group_id}/members/{user_id}",
            delete(handlers::rbac::remove_group_member_handler),
        )
        .route(
            "/api/rbac/groups/{group_id}/roles",
            post(handlers::rbac::assign_group_role_handler),
        )
        .route(
            "/api/rbac/groups/{group_id}/roles/{role_id}",
            delete(handlers::rbac::remove_group_role_handler),
        )
        .route(
            "/api/rbac/permissions",
            get(handlers::rbac::list_permissions_handler)
                .post(handlers::rbac::create_permission_handler),
        )
        .route(
            "/api/rbac/permissions/{permission_id}",
            delete(handlers::rbac::delete_permission_handler),
        )
        .route(
            "/api/rbac/users/{user_id}/roles",
            get(handlers::rbac::list_user_roles_handler)
                .post(handlers::rbac::assign_user_role_handler),
        )
        .route(
            "/api/rbac/users/{user_id}/roles/{role_id}",
            delete(handlers::rbac::remove_user_role_handler),
        )
        .route(
            "/api/rbac/users/{user_id}/default-role",
            post(handlers::rbac::default_user_role_handler),
        )
        .route(
            "/api/rbac/users/{user_id}/access",
            get(handlers::rbac::check_access_handler),
        )
}

#[cfg(test)]
mod tests;

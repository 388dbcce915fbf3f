use std::sync::Arc;

use sqlx::PgPool;
use tessera_application::{AuthorizationService, RbacAdminService};
use tessera_core::AppError;
use tessera_infrastructure::{
    InMemoryRbacStore, PostgresAuthorizationRepository, PostgresRbacAdminRepository,
};
use tracing::warn;

use crate::api_config::ApiConfig;
use crate::state::AppState;

use super::connect_and_migrate;

/// Builds the service graph over PostgreSQL when `DATABASE_URL` is set and
/// over a process-local store otherwise.
pub async fn build_app_state(config: &ApiConfig) -> Result<AppState, AppError> {
    match config.database_url.as_deref() {
        Some(database_url) => {
            let pool = connect_and_migrate(database_url, config.database_max_connections).await?;
            Ok(build_postgres_state(pool))
        }
        None => {
            warn!("DATABASE_URL is not set; role data lives in memory and is lost on restart");
            Ok(build_in_memory_state())
        }
    }
}

fn build_postgres_state(pool: PgPool) -> AppState {
    AppState {
        rbac_admin_service: RbacAdminService::new(Arc::new(PostgresRbacAdminRepository::new(
            pool.clone(),
        ))),
        authorization_service: AuthorizationService::new(Arc::new(
            PostgresAuthorizationRepository::new(pool),
        )),
    }
}

fn build_in_memory_state() -> AppState {
    let store = Arc::new(InMemoryRbacStore::new());
    AppState {
        rbac_admin_service: RbacAdminService::new(store.clone()),
        authorization_service: AuthorizationService::new(store),
    }
}

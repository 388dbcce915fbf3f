//! Tessera API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod api_services;
mod dto;
mod error;
mod handlers;
mod state;

use tessera_core::AppError;
use tracing::info;

use crate::api_config::{ApiCommand, ApiConfig, init_tracing};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;

    match config.command {
        ApiCommand::Migrate => {
            let database_url = config.database_url.as_deref().unwrap_or_default();
            api_services::connect_and_migrate(database_url, config.database_max_connections)
                .await?;
            info!("database migrations applied successfully");
            Ok(())
        }
        ApiCommand::Bootstrap => {
            let app_state = api_services::build_app_state(&config).await?;
            run_bootstrap(&app_state).await
        }
        ApiCommand::Serve => serve(config).await,
    }
}

async fn serve(config: ApiConfig) -> Result<(), AppError> {
    let app_state = api_services::build_app_state(&config).await?;

    if config.bootstrap_on_start {
        run_bootstrap(&app_state).await?;
    }

    let app = api_router::build_router(app_state, &config.frontend_url)?;
    let address = config.socket_address()?;

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "tessera-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}

async fn run_bootstrap(app_state: &AppState) -> Result<(), AppError> {
    let report = app_state.rbac_admin_service.bootstrap().await?;
    info!(
        permissions = report.permissions,
        system_roles = report.system_roles,
        grants = report.grants,
        "permission catalog and system roles are in place"
    );
    Ok(())
}

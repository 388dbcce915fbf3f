use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use tessera_core::AppError;
use tower_http::cors::CorsLayer;

pub(super) fn build_cors_layer(frontend_url: &str) -> Result<CorsLayer, AppError> {
    let origin = HeaderValue::from_str(frontend_url).map_err(|error| {
        AppError::Validation(format!("invalid FRONTEND_URL '{frontend_url}': {error}"))
    })?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE]))
}

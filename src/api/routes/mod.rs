//! API routes module - organizes all route handlers.
//!
//! Diagram editing is open; saved flows need a bearer token.

pub mod app_state;
pub mod auth;
pub mod auth_context;
pub mod diagram;
pub mod error;
pub mod export;
pub mod flows;
pub mod import;
pub mod openapi;

use crate::middleware::cors::{create_cors_layer, create_origin_cors_layer};
use crate::middleware::rate_limit::{create_rate_limiter_with_quota, rate_limit_middleware};
use axum::{Router, response::Json, routing::get};
use serde_json::{Value, json};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

pub use app_state::AppState;
pub use auth_context::AuthContext;
pub use error::ApiError;

/// Create the main API router combining all route modules
///
/// State is applied by the caller, see [`create_app`].
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/palette", get(diagram::get_palette))
        .nest("/diagram", diagram::diagram_router())
        .nest("/export", export::export_router())
        .nest("/import", import::import_router())
        .nest("/auth", auth::auth_router())
        .nest("/flows", flows::flows_router())
        // OpenAPI documentation endpoints
        .merge(openapi::openapi_router())
}

/// Build the complete application: health check, API under `/api/v1`,
/// state, request tracing, CORS and rate limiting.
pub fn create_app(app_state: AppState) -> Router {
    let limiter = create_rate_limiter_with_quota(app_state.config.rate_limit_per_minute);
    let cors = if app_state.config.cors_origins.is_empty() {
        create_cors_layer()
    } else {
        create_origin_cors_layer(&app_state.config.cors_origins)
    };

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", create_api_router())
        .with_state(app_state)
        .layer(axum::middleware::from_fn_with_state(
            limiter,
            rate_limit_middleware,
        ))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is up", body = Object)
    )
)]
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "process-mapper-api",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

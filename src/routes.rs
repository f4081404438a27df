use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::handlers::{self, AppState};
use crate::openapi;

/// Request bodies above this size are rejected before reaching a handler.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Builds the application router with its middleware stack.
pub fn build_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route("/create", post(handlers::create_numbers))
        .route("/delete", post(handlers::delete_numbers))
        .route("/list", get(handlers::list_numbers))
        .route("/update", post(handlers::update_number))
        .layer(ServiceBuilder::new().layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES)));

    Router::new()
        .route("/", get(handlers::start))
        .route("/health", get(handlers::health))
        .route("/docs", get(openapi::serve_swagger_ui))
        .route("/api-docs/openapi.yml", get(openapi::serve_openapi_spec))
        .merge(api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

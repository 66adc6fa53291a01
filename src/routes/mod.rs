use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    db::CatalogStore,
    middleware::request_id::{make_span_with_request_id, request_id_middleware},
    services::PosterResolver,
};

pub mod posters;
pub mod recommendations;
pub mod titles;

/// Shared, read-only state handed to every handler
pub struct AppState {
    pub catalog: Arc<CatalogStore>,
    pub resolver: Arc<PosterResolver>,
}

impl AppState {
    pub fn new(catalog: Arc<CatalogStore>, resolver: Arc<PosterResolver>) -> Self {
        Self { catalog, resolver }
    }
}

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/titles", get(titles::list))
        .route("/recommendations", post(recommendations::recommend))
        .route("/posters", get(posters::resolve))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

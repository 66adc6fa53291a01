use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::Recommendation,
    routes::AppState,
    services::recommendations,
};

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    pub title: String,
}

/// Handler for recommendations endpoint
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<RecommendationRequest>,
) -> AppResult<Json<Recommendation>> {
    tracing::info!(
        request_id = %request_id,
        title = %request.title,
        "Processing recommendation request"
    );

    let recommendation = recommendations::get_recommendations(
        state.catalog.clone(),
        state.resolver.clone(),
        &request.title,
    )
    .await?;

    tracing::info!(
        request_id = %request_id,
        results = recommendation.recommendations.len(),
        "Recommendation completed"
    );

    Ok(Json(recommendation))
}

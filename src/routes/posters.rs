use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    routes::AppState,
};

#[derive(Debug, Deserialize)]
pub struct PosterQuery {
    title: String,
}

#[derive(Debug, Serialize)]
pub struct PosterResponse {
    pub title: String,
    pub poster_url: String,
}

/// Handler for single-title poster lookup
pub async fn resolve(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PosterQuery>,
) -> AppResult<Json<PosterResponse>> {
    let title = state
        .catalog
        .get(params.title.trim())
        .ok_or_else(|| AppError::NotFound(format!("Title not in catalog: {}", params.title)))?;

    let poster_url = state.resolver.resolve(title).await;

    Ok(Json(PosterResponse {
        title: title.name.clone(),
        poster_url,
    }))
}

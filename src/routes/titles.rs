use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{models::Title, routes::AppState};

#[derive(Debug, Deserialize)]
pub struct TitleQuery {
    #[serde(default)]
    q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TitleResponse {
    pub title: String,
    pub movie_id: Option<u64>,
}

impl From<&Title> for TitleResponse {
    fn from(title: &Title) -> Self {
        Self {
            title: title.name.clone(),
            movie_id: title.movie_id,
        }
    }
}

/// Handler for the catalog listing, optionally filtered by `q`
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TitleQuery>,
) -> Json<Vec<TitleResponse>> {
    let query = params.q.unwrap_or_default();
    let titles = state
        .catalog
        .search(&query)
        .into_iter()
        .map(TitleResponse::from)
        .collect();
    Json(titles)
}

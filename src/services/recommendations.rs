use std::sync::Arc;

use chrono::Utc;

use crate::{
    db::CatalogStore,
    error::{AppError, AppResult},
    models::{Recommendation, RecommendedTitle},
    services::poster_resolver::PosterResolver,
};

/// Number of titles returned per recommendation
pub const RECOMMENDATION_COUNT: usize = 5;

/// Recommends the titles most similar to `title`, each with a poster
///
/// Rank order comes from the catalog's similarity matrix. Posters are resolved
/// concurrently and reassembled in rank order; poster problems never fail the
/// request, only an unknown title does.
pub async fn get_recommendations(
    catalog: Arc<CatalogStore>,
    resolver: Arc<PosterResolver>,
    title: &str,
) -> AppResult<Recommendation> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::InvalidInput("Title cannot be empty".to_string()));
    }

    let neighbors = catalog.neighbors(title, RECOMMENDATION_COUNT)?;

    let mut tasks = Vec::with_capacity(neighbors.len());
    for neighbor in &neighbors {
        let resolver = resolver.clone();
        let candidate = neighbor.title.clone();
        tasks.push(tokio::spawn(async move { resolver.resolve(&candidate).await }));
    }

    let mut recommendations = Vec::with_capacity(neighbors.len());
    for (neighbor, task) in neighbors.into_iter().zip(tasks) {
        let poster_url = match task.await {
            Ok(url) => url,
            Err(e) => {
                tracing::error!(error = %e, title = %neighbor.title.name, "Poster task join error");
                resolver.placeholder(&neighbor.title)
            }
        };

        recommendations.push(RecommendedTitle {
            title: neighbor.title.name,
            movie_id: neighbor.title.movie_id,
            score: neighbor.score,
            poster_url,
        });
    }

    tracing::info!(
        query = %title,
        results = recommendations.len(),
        "Recommendations generated"
    );

    Ok(Recommendation {
        query: title.to_string(),
        recommendations,
        generated_at: Utc::now(),
    })
}

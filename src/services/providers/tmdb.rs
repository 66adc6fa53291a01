/// TMDB poster providers
///
/// Two lookup shapes are supported, matching the two join keys a catalog may
/// carry:
/// 1. Search by title: GET {search_url}?query=..&api_key=..&language=en-US
/// 2. Details by movie id: GET {detail_url}/{movie_id}?language=en-US with a
///    bearer token
///
/// Both return `{poster_path}` data that is joined onto the image CDN base.
use crate::{
    error::{AppError, AppResult},
    models::{Title, TmdbMovieDetails, TmdbSearchResponse},
    services::{
        providers::{poster_url, usable_path, PosterProvider},
        transport::{ApiRequest, ApiResponse, RetryingClient},
    },
};
use reqwest::StatusCode;

const LANGUAGE: &str = "en-US";

/// Poster lookup through the TMDB title search endpoint
#[derive(Clone)]
pub struct TmdbSearchProvider {
    client: RetryingClient,
    api_key: String,
    search_url: String,
    image_base: String,
    name: &'static str,
}

impl TmdbSearchProvider {
    pub fn new(
        client: RetryingClient,
        api_key: String,
        search_url: String,
        image_base: String,
        name: &'static str,
    ) -> Self {
        Self {
            client,
            api_key,
            search_url,
            image_base,
            name,
        }
    }
}

#[async_trait::async_trait]
impl PosterProvider for TmdbSearchProvider {
    async fn find_poster(&self, title: &Title) -> AppResult<Option<String>> {
        if title.name.trim().is_empty() {
            return Ok(None);
        }

        let request = ApiRequest::get(&self.search_url)
            .query("query", &title.name)
            .query("api_key", &self.api_key)
            .query("language", LANGUAGE);

        let response = self.client.execute(&request).await?;
        let search: TmdbSearchResponse = decode(self.name, response)?;

        let poster_path = search
            .results
            .into_iter()
            .next()
            .and_then(|movie| usable_path(movie.poster_path));

        tracing::debug!(
            title = %title.name,
            provider = self.name,
            found = poster_path.is_some(),
            "Title search completed"
        );

        Ok(poster_path.map(|path| poster_url(&self.image_base, &path)))
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

/// Poster lookup through the TMDB movie details endpoint
#[derive(Clone)]
pub struct TmdbDetailProvider {
    client: RetryingClient,
    bearer_token: String,
    detail_url: String,
    image_base: String,
    name: &'static str,
}

impl TmdbDetailProvider {
    pub fn new(
        client: RetryingClient,
        bearer_token: String,
        detail_url: String,
        image_base: String,
        name: &'static str,
    ) -> Self {
        Self {
            client,
            bearer_token,
            detail_url,
            image_base,
            name,
        }
    }
}

#[async_trait::async_trait]
impl PosterProvider for TmdbDetailProvider {
    async fn find_poster(&self, title: &Title) -> AppResult<Option<String>> {
        let Some(movie_id) = title.movie_id else {
            return Ok(None);
        };

        let url = format!("{}/{}", self.detail_url.trim_end_matches('/'), movie_id);
        let request = ApiRequest::get(url)
            .query("language", LANGUAGE)
            .bearer(&self.bearer_token);

        let response = self.client.execute(&request).await?;
        let details: TmdbMovieDetails = decode(self.name, response)?;

        tracing::debug!(
            movie_id = movie_id,
            provider = self.name,
            found = details.poster_path.is_some(),
            "Movie details fetched"
        );

        Ok(usable_path(details.poster_path).map(|path| poster_url(&self.image_base, &path)))
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

fn decode<T: serde::de::DeserializeOwned>(provider: &str, response: ApiResponse) -> AppResult<T> {
    if response.status != StatusCode::OK {
        return Err(AppError::ExternalApi(format!(
            "TMDB ({}) returned status {}: {}",
            provider, response.status, response.body
        )));
    }

    serde_json::from_str(&response.body).map_err(|e| {
        AppError::ExternalApi(format!("Failed to parse TMDB response ({}): {}", provider, e))
    })
}

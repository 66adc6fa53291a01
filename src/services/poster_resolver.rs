use std::{sync::Arc, time::Duration};

use crate::{
    cached,
    config::{Config, JoinKey},
    db::{CacheKey, PosterCache},
    models::Title,
    services::{
        providers::{PlaceholderPoster, PosterProvider, TmdbDetailProvider, TmdbSearchProvider},
        transport::{HttpTransport, RetryPolicy, RetryingClient},
    },
};

/// Outcome of pre-warming the poster cache
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WarmReport {
    pub resolved: usize,
    pub placeholders: usize,
}

/// Resolves a poster URL for a title, always producing one
///
/// Order of attempts: cache, then each provider in the chain, then the
/// placeholder generator. Only real posters are cached.
pub struct PosterResolver {
    providers: Vec<Arc<dyn PosterProvider>>,
    placeholder: PlaceholderPoster,
    cache: Arc<dyn PosterCache>,
    ttl: Duration,
    join_key: JoinKey,
}

impl PosterResolver {
    pub fn new(
        providers: Vec<Arc<dyn PosterProvider>>,
        placeholder: PlaceholderPoster,
        cache: Arc<dyn PosterCache>,
        ttl: Duration,
        join_key: JoinKey,
    ) -> Self {
        Self {
            providers,
            placeholder,
            cache,
            ttl,
            join_key,
        }
    }

    /// Builds the TMDB provider chain described by the configuration
    pub fn from_config(
        config: &Config,
        transport: Arc<dyn HttpTransport>,
        cache: Arc<dyn PosterCache>,
    ) -> anyhow::Result<Self> {
        let join_key = config.join_key()?;
        let client = RetryingClient::new(
            transport,
            RetryPolicy::new(config.http_max_retries, config.http_backoff_factor),
        );

        let mut providers: Vec<Arc<dyn PosterProvider>> = Vec::new();

        if join_key == JoinKey::Id {
            let bearers = [
                (config.tmdb_default_bearer_token.as_ref(), "tmdb_detail_default"),
                (config.tmdb_bearer_token.as_ref(), "tmdb_detail_user"),
            ];
            for (token, name) in bearers {
                if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
                    providers.push(Arc::new(TmdbDetailProvider::new(
                        client.clone(),
                        token.clone(),
                        config.tmdb_detail_url.clone(),
                        config.tmdb_image_base.clone(),
                        name,
                    )));
                }
            }
        }

        let keys = [
            (Some(&config.tmdb_default_api_key), "tmdb_search_default"),
            (config.tmdb_api_key.as_ref(), "tmdb_search_user"),
        ];
        for (key, name) in keys {
            if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
                providers.push(Arc::new(TmdbSearchProvider::new(
                    client.clone(),
                    key.clone(),
                    config.tmdb_search_url.clone(),
                    config.tmdb_image_base.clone(),
                    name,
                )));
            }
        }

        tracing::info!(
            providers = ?providers.iter().map(|p| p.name()).collect::<Vec<_>>(),
            join_key = ?join_key,
            "Poster provider chain configured"
        );

        Ok(Self::new(
            providers,
            PlaceholderPoster::new(config.placeholder_base.clone()),
            cache,
            config.cache_ttl()?,
            join_key,
        ))
    }

    /// Poster URL for `title`; a placeholder when no provider has one
    pub async fn resolve(&self, title: &Title) -> String {
        let key = self.cache_key(title);

        let found = cached!(self.cache, key, self.ttl, self.lookup(title));

        match found {
            Some(url) => url,
            None => {
                tracing::info!(title = %title.name, "No poster found, using placeholder");
                self.placeholder.render(&title.name)
            }
        }
    }

    /// Resolves every title once so later requests hit the cache
    pub async fn warm(&self, titles: &[Title]) -> WarmReport {
        let total = titles.len();
        let step = (total / 10).max(1);
        let mut report = WarmReport::default();

        tracing::info!(total, "Warming poster cache");

        for (done, title) in titles.iter().enumerate() {
            let url = self.resolve(title).await;
            if url == self.placeholder.render(&title.name) {
                report.placeholders += 1;
            } else {
                report.resolved += 1;
            }

            if (done + 1) % step == 0 || done + 1 == total {
                tracing::info!(done = done + 1, total, "Poster cache warm-up progress");
            }
        }

        tracing::info!(
            resolved = report.resolved,
            placeholders = report.placeholders,
            "Poster cache warm-up complete"
        );

        report
    }

    pub fn placeholder(&self, title: &Title) -> String {
        self.placeholder.render(&title.name)
    }

    fn cache_key(&self, title: &Title) -> CacheKey {
        match (self.join_key, title.movie_id) {
            (JoinKey::Id, Some(id)) => CacheKey::PosterById(id),
            _ => CacheKey::PosterByTitle(title.name.clone()),
        }
    }

    async fn lookup(&self, title: &Title) -> Option<String> {
        for provider in &self.providers {
            match provider.find_poster(title).await {
                Ok(Some(url)) => {
                    tracing::debug!(title = %title.name, provider = provider.name(), "Poster resolved");
                    return Some(url);
                }
                Ok(None) => {
                    tracing::debug!(title = %title.name, provider = provider.name(), "No poster from provider");
                }
                Err(e) => {
                    tracing::warn!(
                        title = %title.name,
                        provider = provider.name(),
                        error = %e,
                        "Poster provider failed, falling back"
                    );
                }
            }
        }
        None
    }
}

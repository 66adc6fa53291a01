use serde::Deserialize;
use std::{str::FromStr, time::Duration};

/// Search key shipped with the service so posters resolve without any setup.
/// Replace at packaging time or override with `TMDB_DEFAULT_API_KEY`.
pub const BUNDLED_TMDB_API_KEY: &str = "marquee-bundled-tmdb-key";

const LAZY_CACHE_TTL: u64 = 3600; // 1 hour
const EAGER_CACHE_TTL: u64 = 86400; // 24 hours

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// JSON title table, one entry per matrix row
    #[serde(default = "default_titles_path")]
    pub catalog_titles_path: String,

    /// Similarity matrix chunks, concatenated row-wise in this order
    #[serde(default = "default_similarity_paths")]
    pub catalog_similarity_paths: Vec<String>,

    /// TMDB search-by-title endpoint
    #[serde(default = "default_search_url")]
    pub tmdb_search_url: String,

    /// TMDB movie detail endpoint (movie id is appended as a path segment)
    #[serde(default = "default_detail_url")]
    pub tmdb_detail_url: String,

    /// CDN prefix for poster paths
    #[serde(default = "default_image_base")]
    pub tmdb_image_base: String,

    /// Search key tried first
    #[serde(default = "default_api_key")]
    pub tmdb_default_api_key: String,

    /// Bearer token tried first for id lookups
    pub tmdb_default_bearer_token: Option<String>,

    /// User-supplied search key, tried after the default one
    pub tmdb_api_key: Option<String>,

    /// User-supplied bearer token, tried after the default one
    pub tmdb_bearer_token: Option<String>,

    /// Base URL for generated placeholder images
    #[serde(default = "default_placeholder_base")]
    pub placeholder_base: String,

    /// `id` or `title`
    #[serde(default = "default_join_key")]
    pub poster_join_key: String,

    /// `lazy` or `eager`
    #[serde(default = "default_cache_mode")]
    pub poster_cache_mode: String,

    /// Overrides the TTL implied by the cache mode
    pub poster_cache_ttl_secs: Option<u64>,

    /// Redis connection URL; the in-memory cache is used when unset
    pub redis_url: Option<String>,

    /// Per-attempt timeout for TMDB requests
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,

    /// Automatic retries for transient statuses
    #[serde(default = "default_max_retries")]
    pub http_max_retries: u32,

    /// Exponential backoff factor between retries
    #[serde(default = "default_backoff_factor")]
    pub http_backoff_factor: f64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_titles_path() -> String {
    "data/movies.json".to_string()
}

fn default_similarity_paths() -> Vec<String> {
    vec!["data/similarity.json".to_string()]
}

fn default_search_url() -> String {
    "https://api.themoviedb.org/3/search/movie".to_string()
}

fn default_detail_url() -> String {
    "https://api.themoviedb.org/3/movie".to_string()
}

fn default_image_base() -> String {
    "https://image.tmdb.org/t/p/w500".to_string()
}

fn default_api_key() -> String {
    BUNDLED_TMDB_API_KEY.to_string()
}

fn default_placeholder_base() -> String {
    "https://via.placeholder.com/500x750".to_string()
}

fn default_join_key() -> String {
    "id".to_string()
}

fn default_cache_mode() -> String {
    "lazy".to_string()
}

fn default_http_timeout() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    3
}

fn default_backoff_factor() -> f64 {
    1.0
}

/// Which catalog field joins a recommendation to its poster
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKey {
    /// TMDB movie id first, title search for entries without one
    Id,
    /// Title search only
    Title,
}

impl FromStr for JoinKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "id" => Ok(JoinKey::Id),
            "title" => Ok(JoinKey::Title),
            other => Err(anyhow::anyhow!("Unknown poster join key: {}", other)),
        }
    }
}

/// When the poster cache gets populated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PosterCacheMode {
    /// On first request per title
    Lazy,
    /// For every catalog title at startup
    Eager,
}

impl PosterCacheMode {
    pub fn default_ttl(&self) -> Duration {
        match self {
            PosterCacheMode::Lazy => Duration::from_secs(LAZY_CACHE_TTL),
            PosterCacheMode::Eager => Duration::from_secs(EAGER_CACHE_TTL),
        }
    }
}

impl FromStr for PosterCacheMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lazy" => Ok(PosterCacheMode::Lazy),
            "eager" => Ok(PosterCacheMode::Eager),
            other => Err(anyhow::anyhow!("Unknown poster cache mode: {}", other)),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        config.join_key()?;
        config.cache_mode()?;
        Ok(config)
    }

    pub fn join_key(&self) -> anyhow::Result<JoinKey> {
        self.poster_join_key.parse()
    }

    pub fn cache_mode(&self) -> anyhow::Result<PosterCacheMode> {
        self.poster_cache_mode.parse()
    }

    /// TTL for resolved posters: explicit override, else the mode's default
    pub fn cache_ttl(&self) -> anyhow::Result<Duration> {
        match self.poster_cache_ttl_secs {
            Some(secs) => Ok(Duration::from_secs(secs)),
            None => Ok(self.cache_mode()?.default_ttl()),
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            catalog_titles_path: default_titles_path(),
            catalog_similarity_paths: default_similarity_paths(),
            tmdb_search_url: default_search_url(),
            tmdb_detail_url: default_detail_url(),
            tmdb_image_base: default_image_base(),
            tmdb_default_api_key: default_api_key(),
            tmdb_default_bearer_token: None,
            tmdb_api_key: None,
            tmdb_bearer_token: None,
            placeholder_base: default_placeholder_base(),
            poster_join_key: default_join_key(),
            poster_cache_mode: default_cache_mode(),
            poster_cache_ttl_secs: None,
            redis_url: None,
            http_timeout_secs: default_http_timeout(),
            http_max_retries: default_max_retries(),
            http_backoff_factor: default_backoff_factor(),
        }
    }
}

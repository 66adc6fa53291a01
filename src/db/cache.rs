use std::{
    collections::HashMap,
    fmt::Display,
    time::{Duration, Instant},
};

use tokio::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    PosterById(u64),
    PosterByTitle(String),
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::PosterById(id) => write!(f, "poster:id:{}", id),
            CacheKey::PosterByTitle(title) => write!(f, "poster:title:{}", title),
        }
    }
}

/// Storage for resolved poster URLs
///
/// The cache is an optimization only: implementations swallow their own
/// failures and report a miss rather than erroring.
#[async_trait::async_trait]
pub trait PosterCache: Send + Sync {
    /// Returns the cached value if present and not expired
    async fn get(&self, key: &CacheKey) -> Option<String>;

    /// Stores a value that expires after `ttl`
    async fn put(&self, key: &CacheKey, value: String, ttl: Duration);
}

struct Entry {
    value: String,
    expires_at: Instant,
}

/// Process-local TTL cache
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries held, including expired ones not yet evicted
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait::async_trait]
impl PosterCache for MemoryCache {
    async fn get(&self, key: &CacheKey) -> Option<String> {
        let key = key.to_string();
        {
            let entries = self.entries.read().await;
            match entries.get(&key) {
                Some(entry) if entry.expires_at > Instant::now() => {
                    return Some(entry.value.clone())
                }
                Some(_) => {}
                None => return None,
            }
        }

        // Expired: evict so the next put starts clean
        let mut entries = self.entries.write().await;
        if entries
            .get(&key)
            .is_some_and(|entry| entry.expires_at <= Instant::now())
        {
            entries.remove(&key);
        }
        None
    }

    async fn put(&self, key: &CacheKey, value: String, ttl: Duration) {
        let entry = Entry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.entries.write().await.insert(key.to_string(), entry);
    }
}

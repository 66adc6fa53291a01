use redis::AsyncCommands;
use redis::Client;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::db::cache::{CacheKey, PosterCache};
use crate::error::AppResult;

/// Creates a Redis client for caching
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Message for asynchronous cache writes
struct CacheWriteMessage {
    key: String,
    value: String,
    ttl: u64,
}

/// Redis-backed poster cache
///
/// Reads go straight to Redis; writes are queued to a background task so a
/// slow Redis never delays a recommendation response.
#[derive(Clone)]
pub struct RedisCache {
    redis_client: Client,
    write_tx: mpsc::UnboundedSender<CacheWriteMessage>,
}

/// Handle for gracefully shutting down the cache writer
pub struct CacheWriterHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl CacheWriterHandle {
    /// Signals the writer task to flush pending writes and stop
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        tracing::info!("Cache writer shutdown signal sent");
    }
}

impl RedisCache {
    /// Creates the cache and spawns its background writer
    pub fn new(redis_client: Client) -> (Self, CacheWriterHandle) {
        let (write_tx, write_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let client = redis_client.clone();
        tokio::spawn(async move {
            Self::cache_writer_task(client, write_rx, shutdown_rx).await;
        });

        let cache = Self {
            redis_client,
            write_tx,
        };

        (cache, CacheWriterHandle { shutdown_tx })
    }

    async fn cache_writer_task(
        client: Client,
        mut write_rx: mpsc::UnboundedReceiver<CacheWriteMessage>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        tracing::info!("Cache writer task started");

        loop {
            tokio::select! {
                Some(msg) = write_rx.recv() => {
                    if let Err(e) = Self::write_to_redis(&client, msg).await {
                        tracing::error!(error = %e, "Failed to write poster to Redis");
                    }
                }
                _ = shutdown_rx.recv() => {
                    write_rx.close();
                    while let Some(msg) = write_rx.recv().await {
                        if let Err(e) = Self::write_to_redis(&client, msg).await {
                            tracing::error!(error = %e, "Failed to flush cache write during shutdown");
                        }
                    }

                    tracing::info!("Cache writer task stopped");
                    break;
                }
            }
        }
    }

    async fn write_to_redis(client: &Client, msg: CacheWriteMessage) -> AppResult<()> {
        let mut conn = client.get_multiplexed_async_connection().await?;
        let _: () = conn.set_ex(msg.key, msg.value, msg.ttl).await?;
        Ok(())
    }

    async fn read_from_redis(&self, key: &CacheKey) -> AppResult<Option<String>> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let cached: Option<String> = conn.get(key.to_string()).await?;
        Ok(cached)
    }
}

#[async_trait::async_trait]
impl PosterCache for RedisCache {
    async fn get(&self, key: &CacheKey) -> Option<String> {
        match self.read_from_redis(key).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error = %e, key = %key, "Redis read failed, treating as miss");
                None
            }
        }
    }

    async fn put(&self, key: &CacheKey, value: String, ttl: Duration) {
        // SETEX rejects a zero expiry
        let msg = CacheWriteMessage {
            key: key.to_string(),
            value,
            ttl: ttl.as_secs().max(1),
        };

        if let Err(e) = self.write_tx.send(msg) {
            tracing::error!(error = %e, "Failed to send cache write message");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn redis_url() -> String {
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string())
    }

    #[test]
    fn test_create_redis_client_rejects_bad_url() {
        assert!(create_redis_client("not a url").is_err());
    }

    #[tokio::test]
    #[ignore = "requires a running Redis instance"]
    async fn test_cache_miss() {
        let client = create_redis_client(&redis_url()).unwrap();
        let (cache, _handle) = RedisCache::new(client);

        let key = CacheKey::PosterByTitle("nonexistent_key_12345".to_string());
        assert_eq!(cache.get(&key).await, None);
    }

    #[tokio::test]
    #[ignore = "requires a running Redis instance"]
    async fn test_put_writes_in_background() {
        let client = create_redis_client(&redis_url()).unwrap();
        let (cache, _handle) = RedisCache::new(client.clone());

        let key = CacheKey::PosterById(424242);
        cache
            .put(&key, "https://image.tmdb.org/t/p/w500/x.jpg".to_string(), Duration::from_secs(60))
            .await;

        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(
            cache.get(&key).await,
            Some("https://image.tmdb.org/t/p/w500/x.jpg".to_string())
        );

        let mut conn = client.get_multiplexed_async_connection().await.unwrap();
        let _: () = conn.del(key.to_string()).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires a running Redis instance"]
    async fn test_cache_writer_graceful_shutdown() {
        let client = create_redis_client(&redis_url()).unwrap();
        let (cache, handle) = RedisCache::new(client.clone());

        let key = CacheKey::PosterByTitle("test_shutdown".to_string());
        cache
            .put(&key, "shutdown_test".to_string(), Duration::from_secs(60))
            .await;

        handle.shutdown().await;
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(cache.get(&key).await, Some("shutdown_test".to_string()));

        let mut conn = client.get_multiplexed_async_connection().await.unwrap();
        let _: () = conn.del(key.to_string()).await.unwrap();
    }
}

use std::sync::Arc;

use marquee_api::{
    config::{Config, PosterCacheMode},
    db::{create_redis_client, CacheWriterHandle, CatalogStore, MemoryCache, PosterCache, RedisCache},
    routes::{create_router, AppState},
    services::{PosterResolver, ReqwestTransport},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("marquee_api=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let catalog = Arc::new(CatalogStore::load(
        &config.catalog_titles_path,
        &config.catalog_similarity_paths,
    )?);

    let (cache, cache_writer) = build_cache(&config)?;
    let transport = Arc::new(ReqwestTransport::new(config.http_timeout())?);
    let resolver = Arc::new(PosterResolver::from_config(&config, transport, cache)?);

    if config.cache_mode()? == PosterCacheMode::Eager {
        let resolver = resolver.clone();
        let catalog = catalog.clone();
        tokio::spawn(async move {
            resolver.warm(catalog.titles()).await;
        });
    }

    let state = Arc::new(AppState::new(catalog, resolver));
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = cache_writer {
        handle.shutdown().await;
    }

    Ok(())
}

/// Redis when `REDIS_URL` is set, otherwise an in-process map
fn build_cache(
    config: &Config,
) -> anyhow::Result<(Arc<dyn PosterCache>, Option<CacheWriterHandle>)> {
    match &config.redis_url {
        Some(url) => {
            let client = create_redis_client(url)?;
            let (cache, handle) = RedisCache::new(client);
            let cache: Arc<dyn PosterCache> = Arc::new(cache);
            tracing::info!("Using Redis poster cache");
            Ok((cache, Some(handle)))
        }
        None => {
            let cache: Arc<dyn PosterCache> = Arc::new(MemoryCache::new());
            tracing::info!("Using in-memory poster cache");
            Ok((cache, None))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}

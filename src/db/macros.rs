/// Read-through caching for optional values.
///
/// Returns the cached value when present. Otherwise awaits `$block`, which
/// must produce an `Option<String>`, stores a `Some` result under `$key` for
/// `$ttl`, and returns it. `None` results are never cached.
///
/// # Arguments
/// * `$cache`: anything implementing `PosterCache`.
/// * `$key`: the `CacheKey` to read and write.
/// * `$ttl`: a `std::time::Duration`.
/// * `$block`: a future computing the value on a miss.
///
/// # Example
/// ```rust,ignore
/// let url = cached!(self.cache, key, self.ttl, async { self.lookup(title).await });
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        if let Some(hit) = $cache.get(&$key).await {
            tracing::debug!(key = %$key, "Cache hit");
            Some(hit)
        } else {
            tracing::debug!(key = %$key, "Cache miss");
            let value: Option<String> = $block.await;
            if let Some(value) = &value {
                $cache.put(&$key, value.clone(), $ttl).await;
            }
            value
        }
    }};
}

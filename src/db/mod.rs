pub mod cache;
pub mod catalog;
pub mod redis;

mod macros;

pub use self::redis::{create_redis_client, CacheWriterHandle, RedisCache};
pub use cache::{CacheKey, MemoryCache, PosterCache};
pub use catalog::CatalogStore;

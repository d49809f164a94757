use std::fmt;

use chrono::Utc;
use redis::{aio::MultiplexedConnection, AsyncCommands, FromRedisValue, ToRedisArgs};
use redis_macros::{FromRedisValue, ToRedisArgs};
use serde::{Deserialize, Serialize};

use crate::error::Error;

// Caching - keys

/// Keys for the reference-data caches. Per-user data (carts, favorites,
/// shopping lists) is never cached.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub enum CacheKey {
    IngredientCatalog,
    TagCatalog,
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::IngredientCatalog => write!(f, "ingredient-catalog"),
            CacheKey::TagCatalog => write!(f, "tag-catalog"),
        }
    }
}

// Cache - wrappers

#[derive(Serialize, Deserialize, FromRedisValue, ToRedisArgs, Clone)]
pub struct CachedRows<T: Serialize + Send + Sync + Clone> {
    pub rows: Vec<T>,
    pub cached_at: i64,
}

impl<T: Serialize + Send + Sync + Clone> CachedRows<T> {
    pub fn new(rows: Vec<T>) -> Self {
        Self {
            rows,
            cached_at: Utc::now().timestamp(),
        }
    }
}

pub async fn invalidate(key: &CacheKey, cache: &mut MultiplexedConnection) -> Result<(), Error> {
    let key = key.to_string();
    log::trace!("> Invalidated {key}");
    delete_cache_value(key.as_str(), cache).await
}

// Cache - raw handlers

pub async fn set_cache_value<K: ToRedisArgs + Send + Sync, V: ToRedisArgs + Send + Sync>(
    key: K,
    value: V,
    cache: &mut MultiplexedConnection,
) -> Result<(), Error> {
    let _: () = cache.set(key, value).await?;

    Ok(())
}

pub async fn delete_cache_value<K: ToRedisArgs + Send + Sync>(
    key: K,
    cache: &mut MultiplexedConnection,
) -> Result<(), Error> {
    let _: () = cache.del(key).await?;

    Ok(())
}

pub async fn get_cache_value<K: ToRedisArgs + Send + Sync, V: FromRedisValue>(
    key: K,
    cache: &mut MultiplexedConnection,
) -> Result<Option<V>, Error> {
    let value: Option<V> = cache.get(key).await?;

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_render_to_stable_strings() {
        assert_eq!(CacheKey::IngredientCatalog.to_string(), "ingredient-catalog");
        assert_eq!(CacheKey::TagCatalog.to_string(), "tag-catalog");
    }
}

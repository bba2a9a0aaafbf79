//! Persistent response cache for backend data.
//!
//! Historical weather queries are immutable once the day has passed, so the
//! dashboard caches the raw record lists on disk and only refetches after the
//! configured TTL. Entries are postcard-encoded with their expiry timestamp.

use anyhow::{Result, anyhow};
use fjall::Keyspace;
use serde::Deserialize;
use serde::{Serialize, de::DeserializeOwned};
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::OnceCell;
use tokio::task;

use crate::config::CacheConfig;

static GLOBAL_CACHE: OnceCell<ResponseCache> = OnceCell::const_new();

#[derive(Serialize, Deserialize)]
struct StoredEntry<T> {
    value: T,
    expires_at: u64, // Unix timestamp (seconds)
}

pub struct ResponseCache {
    store: Keyspace,
    default_ttl: Duration,
}

/// Cache key for a historical-weather query. One key per
/// (location, date range) so overlapping ranges never collide.
#[must_use]
pub fn history_key(location_id: &str, start_date: &str, end_date: &str) -> String {
    format!("history:{location_id}:{start_date}:{end_date}")
}

/// Expand a leading `~` to the user's home directory.
#[must_use]
pub fn expand_home(location: &str) -> PathBuf {
    if let Some(rest) = location.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(location)
}

fn get_from_store(store: Keyspace, key: Vec<u8>) -> anyhow::Result<Option<Vec<u8>>> {
    Ok(store.get(key)?.map(|v| v.to_vec()))
}

impl ResponseCache {
    fn new(path: impl AsRef<Path>, default_ttl: Duration) -> Result<Self> {
        let db = fjall::Database::builder(&path).open()?;
        let items = db.keyspace("responses", fjall::KeyspaceCreateOptions::default)?;
        Ok(ResponseCache {
            store: items,
            default_ttl,
        })
    }

    /// Stores a serializable value with the configured default TTL.
    pub async fn put_default<T: Serialize + Send + Debug + 'static>(
        &self,
        key: &str,
        value: T,
    ) -> Result<()> {
        self.put(key, value, self.default_ttl).await
    }

    /// Stores a serializable value with an explicit time-to-live.
    #[tracing::instrument(name = "put_cache", level = "debug", skip(self, value))]
    pub async fn put<T: Serialize + Send + Debug + 'static>(
        &self,
        key: &str,
        value: T,
        ttl: Duration,
    ) -> Result<()> {
        let store = self.store.clone();
        let key = key.as_bytes().to_vec();
        let expires_at = SystemTime::now()
            .checked_add(ttl)
            .ok_or(anyhow!("TTL overflow"))?
            .duration_since(UNIX_EPOCH)?
            .as_secs();
        let entry = StoredEntry { value, expires_at };
        let bytes = postcard::to_stdvec(&entry)?;

        let _ = task::spawn_blocking(move || store.insert(key, bytes)).await?;
        Ok(())
    }

    /// Retrieves a value if it exists and has not expired.
    /// Returns `None` for cache misses or expired entries.
    #[tracing::instrument(name = "query_cache", level = "debug", skip(self))]
    pub async fn get<T: DeserializeOwned + Send + 'static>(&self, key: &str) -> Result<Option<T>> {
        let store = self.store.clone();
        let key_bytes = key.as_bytes().to_vec();

        let maybe_bytes: Option<Vec<u8>> =
            task::spawn_blocking(move || get_from_store(store, key_bytes)).await??;

        if let Some(bytes) = maybe_bytes {
            let entry: StoredEntry<T> = postcard::from_bytes(&bytes)?;
            let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();

            if now < entry.expires_at {
                tracing::debug!("Key found and still fresh");
                Ok(Some(entry.value))
            } else {
                tracing::debug!("Key found but expired");
                self.remove(key).await?;
                Ok(None)
            }
        } else {
            tracing::debug!("Key not found");
            Ok(None)
        }
    }

    /// Manually removes a key from the cache.
    pub async fn remove(&self, key: &str) -> Result<()> {
        let key = key.as_bytes().to_vec();
        let store = self.store.clone();
        let _ = task::spawn_blocking(move || store.remove(key)).await?;
        Ok(())
    }
}

/// Initializes the global response cache from the cache section of the
/// application config. **Must be called once before use.**
pub fn init(config: &CacheConfig) -> Result<()> {
    let path = expand_home(&config.location);
    let ttl = Duration::from_secs(u64::from(config.ttl_hours) * 3600);
    let cache = ResponseCache::new(path, ttl)?;
    GLOBAL_CACHE
        .set(cache)
        .map_err(|_| anyhow!("Cache already initialized"))?;
    Ok(())
}

/// Whether the global cache has been initialized. Commands that continue
/// after a failed `init` check this instead of panicking.
#[must_use]
pub fn is_initialized() -> bool {
    GLOBAL_CACHE.get().is_some()
}

/// Returns a reference to the globally initialized cache.
/// # Panics
/// Panics if the cache has not been initialized by calling `cache::init` first.
fn get_cache() -> &'static ResponseCache {
    GLOBAL_CACHE
        .get()
        .expect("Cache not initialized. Call cache::init first.")
}

// Public, ergonomic API endpoints that use the global cache.
pub async fn put<T: Serialize + Send + Debug + 'static>(key: &str, value: T) -> Result<()> {
    get_cache().put_default(key, value).await
}

pub async fn get<T: DeserializeOwned + Send + 'static>(key: &str) -> Result<Option<T>> {
    get_cache().get(key).await
}

pub async fn remove(key: &str) -> Result<()> {
    get_cache().remove(key).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_key_shape() {
        let key = history_key("loc-7", "2024-01-01", "2024-12-31");
        assert_eq!(key, "history:loc-7:2024-01-01:2024-12-31");
    }

    #[test]
    fn test_expand_home_passthrough() {
        let path = expand_home("/var/cache/agroclim");
        assert_eq!(path, PathBuf::from("/var/cache/agroclim"));
    }

    #[test]
    fn test_expand_home_tilde() {
        let path = expand_home("~/.cache/agroclim");
        assert!(!path.to_string_lossy().starts_with('~'));
        assert!(path.to_string_lossy().ends_with(".cache/agroclim"));
    }
}

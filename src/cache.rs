//! On-disk TTL cache backed by fjall, values encoded with postcard

use fjall::Keyspace;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::fmt::Debug;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::task;

use crate::TripError;

#[derive(Serialize, Deserialize)]
struct StoredEntry<T> {
    value: T,
    expires_at: u64, // Unix timestamp (seconds)
}

/// Cheap to clone; clones share the same keyspace
#[derive(Clone)]
pub struct PersistentCache {
    store: Keyspace,
}

fn now_secs() -> crate::Result<u64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|e| TripError::cache(e.to_string()))
}

fn join_error(err: task::JoinError) -> TripError {
    TripError::cache(format!("cache task failed: {err}"))
}

impl PersistentCache {
    /// Open (or create) the cache database in `path`
    pub fn open(path: impl AsRef<Path>) -> crate::Result<Self> {
        let db = fjall::Database::builder(path.as_ref()).open()?;
        let store = db.keyspace("cache", fjall::KeyspaceCreateOptions::default)?;
        Ok(Self { store })
    }

    /// Stores a serializable value with a time-to-live (TTL).
    #[tracing::instrument(name = "put_cache", level = "debug", skip(self, value))]
    pub async fn put<T: Serialize + Send + Debug + 'static>(
        &self,
        key: &str,
        value: T,
        ttl: Duration,
    ) -> crate::Result<()> {
        let store = self.store.clone();
        let key = key.as_bytes().to_vec();
        let expires_at = now_secs()?.saturating_add(ttl.as_secs());
        let bytes = postcard::to_stdvec(&StoredEntry { value, expires_at })?;

        task::spawn_blocking(move || store.insert(key, bytes))
            .await
            .map_err(join_error)??;
        Ok(())
    }

    /// Retrieves a value if it exists and has not expired.
    /// Returns `None` for cache misses or expired entries.
    #[tracing::instrument(name = "query_cache", level = "debug", skip(self))]
    pub async fn get<T: DeserializeOwned + Send + 'static>(&self, key: &str) -> crate::Result<Option<T>> {
        let store = self.store.clone();
        let key_bytes = key.as_bytes().to_vec();

        let maybe_bytes = task::spawn_blocking(move || {
            store.get(key_bytes).map(|v| v.map(|bytes| bytes.to_vec()))
        })
        .await
        .map_err(join_error)??;

        let Some(bytes) = maybe_bytes else {
            tracing::debug!("Key not found");
            return Ok(None);
        };

        let entry: StoredEntry<T> = postcard::from_bytes(&bytes)?;
        if now_secs()? < entry.expires_at {
            tracing::debug!("Key found and still fresh");
            Ok(Some(entry.value))
        } else {
            tracing::debug!("Key found but expired");
            self.remove(key).await?;
            Ok(None)
        }
    }

    /// Manually removes a key from the cache.
    pub async fn remove(&self, key: &str) -> crate::Result<()> {
        let key = key.as_bytes().to_vec();
        let store = self.store.clone();
        task::spawn_blocking(move || store.remove(key))
            .await
            .map_err(join_error)??;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Location;

    #[tokio::test]
    async fn test_put_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PersistentCache::open(dir.path()).unwrap();
        let paris = Location::with_country(48.8566, 2.3522, "Paris".into(), "fr".into());

        cache
            .put("geocode:paris", paris.clone(), Duration::from_secs(3600))
            .await
            .unwrap();
        let cached: Option<Location> = cache.get("geocode:paris").await.unwrap();
        assert_eq!(cached, Some(paris));
    }

    #[tokio::test]
    async fn test_missing_key() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PersistentCache::open(dir.path()).unwrap();
        let cached: Option<Location> = cache.get("geocode:atlantis").await.unwrap();
        assert!(cached.is_none());
    }

    #[tokio::test]
    async fn test_expired_entry_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PersistentCache::open(dir.path()).unwrap();

        cache
            .put("geocode:rome", "Rome".to_string(), Duration::ZERO)
            .await
            .unwrap();
        let cached: Option<String> = cache.get("geocode:rome").await.unwrap();
        assert!(cached.is_none());
    }
}

//! Cache-aside layer for single-entity reads and writes.
//!
//! Reads consult the cache first and populate it on a store hit. Writes
//! update the cache from the value the store returned. Deletes evict every
//! key of the removed entity. A failed store call never touches the cache.

use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;

use cards_types::{Card, ExternalId, Holder, RepoError};

/// Key an entity can be cached under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Surrogate id assigned by the store.
    Id(i64),
    /// Stable external id.
    External(ExternalId),
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::Id(id) => write!(f, "id:{}", id),
            CacheKey::External(id) => write!(f, "external:{}", id),
        }
    }
}

/// An entity that knows the keys it is reachable under.
pub trait Cached: Clone + Send + Sync + 'static {
    fn cache_keys(&self) -> Vec<CacheKey>;
}

impl Cached for Card {
    fn cache_keys(&self) -> Vec<CacheKey> {
        vec![CacheKey::Id(self.id.get()), CacheKey::External(self.external_id)]
    }
}

impl Cached for Holder {
    fn cache_keys(&self) -> Vec<CacheKey> {
        vec![CacheKey::Id(self.id.get())]
    }
}

/// Storage behind the cache-aside layer.
pub trait EntityCache<V>: Send + Sync {
    fn get(&self, key: &CacheKey) -> Option<V>;
    fn put(&self, key: CacheKey, value: V);
    fn evict(&self, key: &CacheKey);
}

/// Process-local cache backed by a concurrent map.
pub struct InMemoryCache<V> {
    entries: DashMap<CacheKey, V>,
}

impl<V> InMemoryCache<V> {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Default for InMemoryCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone + Send + Sync> EntityCache<V> for InMemoryCache<V> {
    fn get(&self, key: &CacheKey) -> Option<V> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    fn put(&self, key: CacheKey, value: V) {
        self.entries.insert(key, value);
    }

    fn evict(&self, key: &CacheKey) {
        self.entries.remove(key);
    }
}

/// Wraps store calls for one entity type with cache-aside semantics.
pub struct CacheAside<V> {
    cache: Arc<dyn EntityCache<V>>,
}

impl<V> Clone for CacheAside<V> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
        }
    }
}

impl<V: Cached> CacheAside<V> {
    pub fn new(cache: Arc<dyn EntityCache<V>>) -> Self {
        Self { cache }
    }

    /// Returns the cached value for `key`, or loads it and caches it under
    /// all of its keys.
    pub async fn read<F, Fut>(&self, key: CacheKey, load: F) -> Result<Option<V>, RepoError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<V>, RepoError>>,
    {
        if let Some(hit) = self.cache.get(&key) {
            tracing::debug!(%key, "cache hit");
            return Ok(Some(hit));
        }

        tracing::debug!(%key, "cache miss");
        let loaded = load().await?;
        if let Some(value) = &loaded {
            self.store(value);
        }
        Ok(loaded)
    }

    /// Runs a create or update and caches the value the store returned.
    pub async fn write<F, Fut>(&self, persist: F) -> Result<V, RepoError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, RepoError>>,
    {
        let written = persist().await?;
        self.store(&written);
        Ok(written)
    }

    /// Runs a delete of `value` and evicts all of its keys once the store
    /// has answered.
    pub async fn remove<F, Fut>(&self, value: &V, delete: F) -> Result<bool, RepoError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<bool, RepoError>>,
    {
        let deleted = delete().await?;
        for key in value.cache_keys() {
            self.cache.evict(&key);
        }
        Ok(deleted)
    }

    fn store(&self, value: &V) {
        for key in value.cache_keys() {
            self.cache.put(key, value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cards_types::{HolderId, NewHolder};
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn holder(id: i64, name: &str) -> Holder {
        let now = Utc::now();
        NewHolder {
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        }
        .with_id(HolderId::new(id))
    }

    fn layer() -> (Arc<InMemoryCache<Holder>>, CacheAside<Holder>) {
        let cache = Arc::new(InMemoryCache::new());
        let aside = CacheAside::new(cache.clone() as Arc<dyn EntityCache<Holder>>);
        (cache, aside)
    }

    #[tokio::test]
    async fn test_read_populates_then_hits() {
        let (cache, aside) = layer();
        let loads = AtomicUsize::new(0);
        let counter = &loads;

        let first = aside
            .read(CacheKey::Id(1), move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, RepoError>(Some(holder(1, "Ana")))
            })
            .await
            .unwrap();
        let second = aside
            .read(CacheKey::Id(1), move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, RepoError>(None)
            })
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_value_is_not_cached() {
        let (cache, aside) = layer();

        let found = aside
            .read(CacheKey::Id(9), || async { Ok::<_, RepoError>(None) })
            .await
            .unwrap();

        assert!(found.is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_failed_write_leaves_cache_untouched() {
        let (cache, aside) = layer();
        cache.put(CacheKey::Id(1), holder(1, "Ana"));

        let result = aside
            .write(|| async { Err::<Holder, _>(RepoError::Database("down".into())) })
            .await;

        assert!(result.is_err());
        assert_eq!(cache.get(&CacheKey::Id(1)).unwrap().name, "Ana");
    }

    #[tokio::test]
    async fn test_write_replaces_cached_value() {
        let (cache, aside) = layer();
        cache.put(CacheKey::Id(1), holder(1, "Ana"));

        aside
            .write(|| async { Ok::<_, RepoError>(holder(1, "Anabel")) })
            .await
            .unwrap();

        assert_eq!(cache.get(&CacheKey::Id(1)).unwrap().name, "Anabel");
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_entry() {
        let (cache, aside) = layer();
        let ana = holder(1, "Ana");
        cache.put(CacheKey::Id(1), ana.clone());

        let result = aside
            .remove(&ana, || async { Err::<bool, _>(RepoError::Database("down".into())) })
            .await;

        assert!(result.is_err());
        assert!(cache.get(&CacheKey::Id(1)).is_some());

        aside
            .remove(&ana, || async { Ok::<_, RepoError>(true) })
            .await
            .unwrap();
        assert!(cache.get(&CacheKey::Id(1)).is_none());
    }

    #[test]
    fn test_card_is_cached_under_both_keys() {
        let now = Utc::now();
        let card = cards_types::NewCard {
            external_id: ExternalId::new(),
            number: "1111222233334444".to_string(),
            cvc: "123".to_string(),
            expiry: chrono::NaiveDate::from_ymd_opt(2099, 1, 1).unwrap(),
            holder_name: "Ana".to_string(),
            balance: 0.0,
            created_at: now,
            updated_at: now,
        }
        .with_id(cards_types::CardId::new(4));

        assert_eq!(
            card.cache_keys(),
            vec![CacheKey::Id(4), CacheKey::External(card.external_id)]
        );
    }
}

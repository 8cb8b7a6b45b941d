use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::debug;

use crate::error::VerifyResult;
use crate::jwks::{KeySet, KeySetSource};

#[derive(Clone)]
struct CachedKeySet {
    keys: KeySet,
    fetched_at: Instant,
}

/// Time-bounded, per-tenant cache in front of another key-set source.
///
/// Entries older than the TTL are never served, so keys removed by the
/// provider stop verifying at most one TTL after rotation.
#[derive(Clone)]
pub struct CachingKeySetSource<S> {
    inner: S,
    ttl: Duration,
    entries: Arc<RwLock<HashMap<String, CachedKeySet>>>,
}

impl<S: KeySetSource> CachingKeySetSource<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn invalidate(&self, tenant_id: &str) {
        let mut guard = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        guard.remove(tenant_id);
    }

    pub fn clear(&self) {
        let mut guard = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        guard.clear();
    }

    pub fn contains(&self, tenant_id: &str) -> bool {
        self.fresh(tenant_id).is_some()
    }

    fn fresh(&self, tenant_id: &str) -> Option<KeySet> {
        let guard = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        guard
            .get(tenant_id)
            .filter(|entry| entry.fetched_at.elapsed() < self.ttl)
            .map(|entry| entry.keys.clone())
    }

    async fn load(&self, tenant_id: &str) -> VerifyResult<KeySet> {
        let keys = self.inner.key_set(tenant_id).await?;
        let mut guard = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        guard.insert(
            tenant_id.to_string(),
            CachedKeySet {
                keys: keys.clone(),
                fetched_at: Instant::now(),
            },
        );
        debug!(tenant_id, keys = keys.len(), "cached signing key set");
        Ok(keys)
    }
}

#[async_trait]
impl<S: KeySetSource> KeySetSource for CachingKeySetSource<S> {
    async fn key_set(&self, tenant_id: &str) -> VerifyResult<KeySet> {
        match self.fresh(tenant_id) {
            Some(keys) => Ok(keys),
            None => self.load(tenant_id).await,
        }
    }

    /// Refetch regardless of age. A failed refetch leaves the current entry in place.
    async fn refreshed_key_set(&self, tenant_id: &str) -> VerifyResult<Option<KeySet>> {
        self.load(tenant_id).await.map(Some)
    }
}

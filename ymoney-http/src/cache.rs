//! Memoized instance ids for [`ExternalPayment`](crate::external::ExternalPayment).
//!
//! Resolving an instance id costs a network call, so results are shared
//! between client instances through an [`InstanceIdCache`]. Entries are keyed
//! by client id, never expire, and are dropped only by [`InstanceIdCache::clear`].
//! A failed resolution is remembered as [`CachedInstanceId::Unavailable`].

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use tokio::sync::RwLock;

static GLOBAL: LazyLock<Arc<InstanceIdCache>> = LazyLock::new(|| Arc::new(InstanceIdCache::new()));

/// Outcome of a previous instance id resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CachedInstanceId {
    /// The provider issued this instance id.
    Resolved(String),
    /// The provider answered with a non-success status.
    Unavailable,
}

/// Client id → instance id cache shared across client instances.
#[derive(Debug, Default)]
pub struct InstanceIdCache {
    /// Entries keyed by client id (`RwLock` for read-heavy workload)
    entries: RwLock<HashMap<String, CachedInstanceId>>,
}

impl InstanceIdCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the process-wide cache used by clients that were not given one.
    #[must_use]
    pub fn global() -> Arc<Self> {
        Arc::clone(&GLOBAL)
    }

    /// Returns the cached entry for a client id.
    pub async fn get(&self, client_id: &str) -> Option<CachedInstanceId> {
        self.entries.read().await.get(client_id).cloned()
    }

    /// Stores the resolution outcome for a client id.
    ///
    /// A concurrent resolution for the same client id simply overwrites the
    /// entry; both writers saw the same provider answer.
    pub async fn insert(&self, client_id: impl Into<String>, entry: CachedInstanceId) {
        self.entries.write().await.insert(client_id.into(), entry);
    }

    /// Forgets a single client id.
    pub async fn remove(&self, client_id: &str) -> Option<CachedInstanceId> {
        self.entries.write().await.remove(client_id)
    }

    /// Drops every entry.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Returns the number of cached client ids.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns `true` if nothing is cached.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

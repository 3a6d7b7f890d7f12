//! Sharded map of epoch-second buckets

use dashmap::DashMap;
use rustc_hash::FxBuildHasher;
use std::sync::Arc;

use crate::bucket::TimeBucket;

/// Concurrent mapping from epoch second to its bucket
///
/// Insert-if-absent happens under the owning shard's write lock, so two
/// writers racing on the same second always end up sharing one bucket.
/// Buckets are handed out as `Arc`s; the shard lock is never held while a
/// bucket is being updated.
#[derive(Debug, Default)]
pub struct BucketStore {
    buckets: DashMap<i64, Arc<TimeBucket>, FxBuildHasher>,
}

impl BucketStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bucket for `key`, created empty if absent
    pub fn get_or_create(&self, key: i64) -> Arc<TimeBucket> {
        Arc::clone(self.buckets.entry(key).or_default().value())
    }

    /// Bucket for `key` if one exists
    pub fn lookup(&self, key: i64) -> Option<Arc<TimeBucket>> {
        self.buckets.get(&key).map(|entry| Arc::clone(entry.value()))
    }

    /// Discard every bucket
    pub fn clear(&self) {
        self.buckets.clear();
    }

    /// Drop buckets keyed before `min_key`, returning how many were removed
    pub fn retain_from(&self, min_key: i64) -> usize {
        let before = self.buckets.len();
        self.buckets.retain(|key, _| *key >= min_key);
        before.saturating_sub(self.buckets.len())
    }

    /// Number of live buckets
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Whether the store holds no buckets
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

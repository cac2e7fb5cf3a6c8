use crate::id::VertexId;

use std::num::NonZeroUsize;

use lru::LruCache;

/// A bounded cache of vertices which have already been traversed.
///
/// Only vertices on a "stripe" (`height % stripe_distance < stripe_width`) are admitted, which
/// is enough to cut repeated descents through the DAG short while keeping the cache small. A
/// miss only ever causes a redundant traversal.
pub struct ProcessedCache {
    cache: LruCache<VertexId, ()>,
    stripe_distance: u64,
    stripe_width: u64,
}

impl ProcessedCache {
    pub fn new(cache_size: NonZeroUsize, stripe_distance: u64, stripe_width: u64) -> Self {
        ProcessedCache { cache: LruCache::new(cache_size), stripe_distance, stripe_width }
    }

    /// Whether the vertex has been traversed, refreshing its recency.
    pub fn contains(&mut self, vtx_id: &VertexId) -> bool {
        self.cache.get(vtx_id).is_some()
    }

    pub fn on_stripe(&self, height: u64) -> bool {
        height % self.stripe_distance < self.stripe_width
    }

    /// Caches a traversed vertex if its height lies on a stripe.
    pub fn admit(&mut self, vtx_id: VertexId, height: u64) -> bool {
        if !self.on_stripe(height) {
            return false;
        }
        let _ = self.cache.put(vtx_id, ());
        true
    }

    pub fn flush(&mut self) {
        self.cache.clear();
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

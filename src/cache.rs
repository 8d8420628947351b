// src/cache.rs
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::types::Snapshot;

/// Single-slot store for the published snapshot.
///
/// Publishing swaps the pointer; readers get an owned `Arc` and keep a
/// consistent view even if a newer snapshot lands while they serialize.
#[derive(Debug)]
pub struct NewsCache {
    inner: ArcSwap<Snapshot>,
}

impl NewsCache {
    /// Starts out holding the empty snapshot.
    pub fn new() -> Self {
        Self {
            inner: ArcSwap::from_pointee(Snapshot::empty()),
        }
    }

    pub fn current(&self) -> Arc<Snapshot> {
        self.inner.load_full()
    }

    pub fn publish(&self, snapshot: Snapshot) {
        self.inner.store(Arc::new(snapshot));
    }
}

impl Default for NewsCache {
    fn default() -> Self {
        Self::new()
    }
}

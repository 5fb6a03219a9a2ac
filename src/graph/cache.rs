//! Dirty-flag cache around the connection index
//!
//! Owned by the host and injected into the stores; every write path calls
//! [`IndexCache::invalidate`], and the next [`IndexCache::get`] pays one
//! full rebuild. The rebuilt index is published by `Arc` swap, so a reader
//! in a multi-threaded embedding either sees the old complete index or the
//! new complete one, never a partially populated structure.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::store::{FileStore, Result};

use super::index::ConnectionIndex;

pub struct IndexCache {
    store: Arc<dyn FileStore>,
    slot: RwLock<Option<Arc<ConnectionIndex>>>,
}

impl IndexCache {
    pub fn new(store: Arc<dyn FileStore>) -> Self {
        Self {
            store,
            slot: RwLock::new(None),
        }
    }

    /// Drop the cached index. Safe to call redundantly; two invalidations
    /// before the next query cost exactly one rebuild.
    pub async fn invalidate(&self) {
        *self.slot.write().await = None;
    }

    /// Current index, rebuilding first if a write invalidated it.
    pub async fn get(&self) -> Result<Arc<ConnectionIndex>> {
        if let Some(index) = self.slot.read().await.as_ref() {
            return Ok(Arc::clone(index));
        }

        // Build outside the write lock; if two tasks race, both builds see
        // the post-invalidation vault and either result is fresh.
        let built = Arc::new(ConnectionIndex::build(self.store.as_ref()).await?);
        let mut slot = self.slot.write().await;
        *slot = Some(Arc::clone(&built));
        Ok(built)
    }
}

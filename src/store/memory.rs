//! In-memory file store for tests and ephemeral embedding.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{FileStore, Result, StoreError};

/// Map-backed store. `list` order is the path sort order, which keeps
/// index-build order (and therefore related-note tie order) deterministic
/// in tests.
#[derive(Default)]
pub struct MemoryStore {
    files: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FileStore for MemoryStore {
    async fn list(&self) -> Result<Vec<String>> {
        Ok(self.files.read().await.keys().cloned().collect())
    }

    async fn read(&self, path: &str) -> Result<String> {
        self.files
            .read()
            .await
            .get(path)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(path.to_string()))
    }

    async fn write(&self, path: &str, content: &str) -> Result<()> {
        self.files
            .write()
            .await
            .insert(path.to_string(), content.to_string());
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.files
            .write()
            .await
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(path.to_string()))
    }
}

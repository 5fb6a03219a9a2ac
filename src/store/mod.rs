//! Vault file store
//!
//! The retention engine never touches the filesystem directly; everything
//! goes through the [`FileStore`] trait so hosts can supply their own backing
//! (Tauri fs plugin, sync layer, in-memory fixture). Two implementations ship
//! with the crate:
//! - [`DiskStore`] — a directory of UTF-8 markdown files with atomic writes
//! - [`MemoryStore`] — a map-backed store for tests

mod disk;
mod memory;

pub use disk::DiskStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Abstract store of text files keyed by vault-relative path.
///
/// Paths use `/` separators regardless of platform. `write` must be atomic
/// and durable on return: a concurrent `read` sees either the previous or
/// the new content, never a torn file. Writers to the *same* path must be
/// serialized by the implementation; writers to different paths may overlap.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// All text file paths currently in the vault.
    async fn list(&self) -> Result<Vec<String>>;

    /// Read a file. Fails with [`StoreError::NotFound`] if absent.
    async fn read(&self, path: &str) -> Result<String>;

    /// Atomically replace (or create) a file.
    async fn write(&self, path: &str, content: &str) -> Result<()>;

    /// Remove a file. Fails with [`StoreError::NotFound`] if absent.
    async fn delete(&self, path: &str) -> Result<()>;
}

//! Disk-backed file store
//!
//! Stores the vault as a directory tree of `.md` files. Writes go through a
//! sibling temp file and a rename, so a reader never observes a half-written
//! file. A per-path async mutex serializes concurrent writers to the same
//! path; a rating write and a manual-edit write racing on one card would
//! otherwise corrupt its frontmatter.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::Mutex;

use super::{FileStore, Result, StoreError};

pub struct DiskStore {
    root: PathBuf,
    write_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl DiskStore {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            write_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Create the root directory if needed.
    pub async fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    fn full_path(&self, path: &str) -> PathBuf {
        // Vault paths always use '/', independent of platform
        let mut full = self.root.clone();
        for part in path.split('/') {
            full.push(part);
        }
        full
    }

    async fn lock_for(&self, path: &str) -> Arc<Mutex<()>> {
        let mut locks = self.write_locks.lock().await;
        locks
            .entry(path.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn relative_key(&self, path: &Path) -> Option<String> {
        let rel = path.strip_prefix(&self.root).ok()?;
        let mut parts = Vec::new();
        for comp in rel.components() {
            parts.push(comp.as_os_str().to_str()?.to_string());
        }
        Some(parts.join("/"))
    }
}

#[async_trait]
impl FileStore for DiskStore {
    async fn list(&self) -> Result<Vec<String>> {
        let mut paths = Vec::new();
        if !self.root.exists() {
            return Ok(paths);
        }

        // Iterative walk; async fns cannot recurse without boxing
        let mut pending = vec![self.root.clone()];
        while let Some(dir) = pending.pop() {
            let mut entries = fs::read_dir(&dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                let name = entry.file_name();
                if name.to_string_lossy().starts_with('.') {
                    continue;
                }
                if entry.file_type().await?.is_dir() {
                    pending.push(path);
                } else if path.extension().map_or(false, |e| e == "md") {
                    if let Some(key) = self.relative_key(&path) {
                        paths.push(key);
                    }
                }
            }
        }

        paths.sort();
        Ok(paths)
    }

    async fn read(&self, path: &str) -> Result<String> {
        match fs::read_to_string(self.full_path(path)).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StoreError::NotFound(path.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, path: &str, content: &str) -> Result<()> {
        let lock = self.lock_for(path).await;
        let _guard = lock.lock().await;

        let full = self.full_path(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).await?;
        }

        // Temp file lives next to the target so the rename stays on one
        // filesystem and is atomic.
        let mut tmp = full.clone();
        tmp.set_extension("md.tmp");
        fs::write(&tmp, content).await?;
        fs::rename(&tmp, &full).await?;
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let lock = self.lock_for(path).await;
        let _guard = lock.lock().await;

        match fs::remove_file(self.full_path(path)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StoreError::NotFound(path.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, DiskStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskStore::new(dir.path().to_path_buf());
        (dir, store)
    }

    #[tokio::test]
    async fn write_then_read_round_trips() {
        let (_dir, store) = temp_store();
        store.write("Cards/Alpha.md", "hello").await.unwrap();
        assert_eq!(store.read("Cards/Alpha.md").await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn read_missing_is_not_found() {
        let (_dir, store) = temp_store();
        match store.read("nope.md").await {
            Err(StoreError::NotFound(p)) => assert_eq!(p, "nope.md"),
            other => panic!("expected NotFound, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let (_dir, store) = temp_store();
        assert!(matches!(
            store.delete("nope.md").await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn list_returns_nested_md_files_only() {
        let (_dir, store) = temp_store();
        store.write("Cards/A.md", "a").await.unwrap();
        store.write("Sources/Deep/B.md", "b").await.unwrap();
        store.write("notes.md", "n").await.unwrap();

        let mut listed = store.list().await.unwrap();
        listed.sort();
        assert_eq!(listed, vec!["Cards/A.md", "Sources/Deep/B.md", "notes.md"]);
    }

    #[tokio::test]
    async fn overwrite_replaces_content() {
        let (_dir, store) = temp_store();
        store.write("a.md", "one").await.unwrap();
        store.write("a.md", "two").await.unwrap();
        assert_eq!(store.read("a.md").await.unwrap(), "two");
        assert_eq!(store.list().await.unwrap().len(), 1);
    }
}

//! Source persistence over the vault file store
//!
//! Mirrors the card layout: one markdown file per source under `Sources/`,
//! record fields in frontmatter, free notes in the body.

use std::sync::Arc;

use chrono::NaiveDate;
use thiserror::Error;

use crate::cards::store::{filename_stem, slugify, LoadDiagnostic};
use crate::frontmatter::{self, Metadata, Value};
use crate::graph::IndexCache;
use crate::store::{FileStore, StoreError};

use super::models::{Source, SourceStatus, SourceType};

/// Namespace prefix for source files.
pub const SOURCES_DIR: &str = "Sources";

#[derive(Error, Debug)]
pub enum SourceError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Not a source: {0}")]
    NotASource(String),

    #[error("Malformed source {path}: {reason}")]
    Malformed { path: String, reason: String },

    #[error("Source has no title")]
    MissingTitle,
}

pub type Result<T> = std::result::Result<T, SourceError>;

#[derive(Clone)]
pub struct SourceStore {
    store: Arc<dyn FileStore>,
    cache: Option<Arc<IndexCache>>,
}

impl SourceStore {
    pub fn new(store: Arc<dyn FileStore>) -> Self {
        Self { store, cache: None }
    }

    pub fn with_cache(mut self, cache: Arc<IndexCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    async fn mark_dirty(&self) {
        if let Some(cache) = &self.cache {
            cache.invalidate().await;
        }
    }

    /// Load every source; same skip-and-report policy as the card store.
    pub async fn load_all(&self) -> Result<(Vec<Source>, Vec<LoadDiagnostic>)> {
        let mut sources = Vec::new();
        let mut diagnostics = Vec::new();

        for path in self.store.list().await? {
            if !in_namespace(&path) {
                continue;
            }
            let text = match self.store.read(&path).await {
                Ok(text) => text,
                Err(e) => {
                    log::warn!("Skipping unreadable source file {}: {}", path, e);
                    diagnostics.push(LoadDiagnostic {
                        path,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };
            match parse_source(&path, &text) {
                Ok(Some(source)) => sources.push(source),
                Ok(None) => {}
                Err(reason) => {
                    log::warn!("Skipping malformed source file {}: {}", path, reason);
                    diagnostics.push(LoadDiagnostic { path, reason });
                }
            }
        }

        Ok((sources, diagnostics))
    }

    pub async fn load(&self, path: &str) -> Result<Source> {
        let text = self.store.read(path).await?;
        match parse_source(path, &text) {
            Ok(Some(source)) => Ok(source),
            Ok(None) => Err(SourceError::NotASource(path.to_string())),
            Err(reason) => Err(SourceError::Malformed {
                path: path.to_string(),
                reason,
            }),
        }
    }

    /// Normalize the status/date invariants against `today`, then persist.
    /// Returns the path written; title edits rename write-then-delete like
    /// card saves.
    pub async fn save(
        &self,
        source: &mut Source,
        existing_path: Option<&str>,
        today: NaiveDate,
    ) -> Result<String> {
        if source.title.trim().is_empty() {
            return Err(SourceError::MissingTitle);
        }
        source.normalize(today);

        let target = self.available_path(&source.title, existing_path).await?;
        let text = frontmatter::serialize(&source_metadata(source), &source.body);
        self.store.write(&target, &text).await?;

        if let Some(old) = existing_path {
            if old != target {
                self.store.delete(old).await?;
            }
        }

        self.mark_dirty().await;
        source.path = target.clone();
        Ok(target)
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        self.store.delete(path).await?;
        self.mark_dirty().await;
        Ok(())
    }

    async fn available_path(&self, title: &str, existing_path: Option<&str>) -> Result<String> {
        let base = slugify(title);
        for attempt in 0..100 {
            let candidate = if attempt == 0 {
                format!("{}/{}.md", SOURCES_DIR, base)
            } else {
                format!("{}/{} {}.md", SOURCES_DIR, base, attempt)
            };
            if Some(candidate.as_str()) == existing_path {
                return Ok(candidate);
            }
            match self.store.read(&candidate).await {
                Err(StoreError::NotFound(_)) => return Ok(candidate),
                Err(e) => return Err(e.into()),
                Ok(_) => continue,
            }
        }
        Ok(format!("{}/{} {}.md", SOURCES_DIR, base, 100))
    }
}

fn in_namespace(path: &str) -> bool {
    path.starts_with(&format!("{}/", SOURCES_DIR)) && path.ends_with(".md")
}

fn parse_source(path: &str, text: &str) -> std::result::Result<Option<Source>, String> {
    let (meta, body) = frontmatter::parse(text);
    if meta.get("type").and_then(|v| v.as_str()) != Some("source") {
        return Ok(None);
    }

    let title = meta
        .get("title")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| filename_stem(path).to_string());

    let source_type = match meta.get("sourceType").and_then(|v| v.as_str()) {
        None => SourceType::default(),
        Some(raw) => {
            SourceType::parse(raw).ok_or_else(|| format!("unknown sourceType: {}", raw))?
        }
    };
    let status = match meta.get("status").and_then(|v| v.as_str()) {
        None => SourceStatus::default(),
        Some(raw) => {
            SourceStatus::parse(raw).ok_or_else(|| format!("unknown status: {}", raw))?
        }
    };

    let parse_date = |key: &str| -> std::result::Result<Option<NaiveDate>, String> {
        match meta.get(key).and_then(|v| v.as_str()) {
            None => Ok(None),
            Some(raw) => raw
                .parse::<NaiveDate>()
                .map(Some)
                .map_err(|_| format!("invalid date in '{}': {}", key, raw)),
        }
    };

    Ok(Some(Source {
        path: path.to_string(),
        title,
        author: meta.get("author").and_then(|v| v.as_str()).map(String::from),
        source_type,
        status,
        rating: meta
            .get("rating")
            .and_then(|v| v.as_i64())
            .unwrap_or(0)
            .clamp(0, 5) as u8,
        started: parse_date("started")?,
        finished: parse_date("finished")?,
        body,
    }))
}

fn source_metadata(source: &Source) -> Metadata {
    let mut meta = Metadata::new();
    meta.insert("type".into(), Value::Str("source".into()));
    meta.insert("title".into(), Value::Str(source.title.clone()));
    if let Some(author) = &source.author {
        meta.insert("author".into(), Value::Str(author.clone()));
    }
    meta.insert(
        "sourceType".into(),
        Value::Str(source.source_type.as_str().into()),
    );
    meta.insert("status".into(), Value::Str(source.status.as_str().into()));
    meta.insert("rating".into(), Value::Number(source.rating as i64));
    if let Some(started) = source.started {
        meta.insert(
            "started".into(),
            Value::Str(started.format("%Y-%m-%d").to_string()),
        );
    }
    if let Some(finished) = source.finished {
        meta.insert(
            "finished".into(),
            Value::Str(finished.format("%Y-%m-%d").to_string()),
        );
    }
    meta
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn source_store() -> SourceStore {
        SourceStore::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let store = source_store();
        let mut source = Source::new("Designing Data-Intensive Applications".into(), SourceType::Book);
        source.author = Some("Martin Kleppmann".into());
        source.status = SourceStatus::Reading;
        source.rating = 5;
        source.body = "Chapter notes go here.".into();

        let path = store.save(&mut source, None, day("2026-08-29")).await.unwrap();
        assert_eq!(path, "Sources/Designing Data-Intensive Applications.md");

        let loaded = store.load(&path).await.unwrap();
        assert_eq!(loaded.title, "Designing Data-Intensive Applications");
        assert_eq!(loaded.author.as_deref(), Some("Martin Kleppmann"));
        assert_eq!(loaded.source_type, SourceType::Book);
        assert_eq!(loaded.status, SourceStatus::Reading);
        assert_eq!(loaded.rating, 5);
        assert_eq!(loaded.started, Some(day("2026-08-29")));
        assert_eq!(loaded.finished, None);
        assert_eq!(loaded.body, "Chapter notes go here.");
    }

    #[tokio::test]
    async fn finishing_without_a_date_fills_today() {
        let store = source_store();
        let mut source = Source::new("Some Article".into(), SourceType::Article);
        source.status = SourceStatus::Reading;
        let path = store.save(&mut source, None, day("2026-08-01")).await.unwrap();

        let mut reloaded = store.load(&path).await.unwrap();
        reloaded.status = SourceStatus::Finished;
        store
            .save(&mut reloaded, Some(&path), day("2026-08-29"))
            .await
            .unwrap();

        let finished = store.load(&path).await.unwrap();
        assert_eq!(finished.started, Some(day("2026-08-01")));
        assert_eq!(finished.finished, Some(day("2026-08-29")));
    }

    #[tokio::test]
    async fn load_all_filters_to_source_records() {
        let backing = Arc::new(MemoryStore::new());
        backing
            .write(
                "Sources/A.md",
                "---\ntype: source\ntitle: A\nsourceType: video\nstatus: finished\nstarted: 2026-08-01\nfinished: 2026-08-02\n---\n",
            )
            .await
            .unwrap();
        backing.write("Sources/Note.md", "# not a source").await.unwrap();
        backing
            .write("Sources/Broken.md", "---\ntype: source\nstatus: paused\n---\n")
            .await
            .unwrap();

        let store = SourceStore::new(backing);
        let (sources, diagnostics) = store.load_all().await.unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].source_type, SourceType::Video);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].path, "Sources/Broken.md");
    }
}

//! Card persistence over the vault file store
//!
//! File layout, one card per file:
//! ```text
//! Cards/What is ownership.md
//! ---
//! type: card
//! tags: [rust, memory]
//! source: "[[The Rust Book]]"
//! interval: 6
//! ease: 2.5
//! nextReview: 2026-09-04
//! lastReview: 2026-08-29
//! reviewCount: 3
//! created: 2026-08-01
//! ---
//!
//! # What is ownership
//!
//! Each value has a single owner...
//! ```

use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::frontmatter::{self, Metadata, Value};
use crate::graph::IndexCache;
use crate::store::{FileStore, StoreError};

use super::models::{Card, DEFAULT_EASE};
use crate::review::algorithm::MIN_EASE;

/// Namespace prefix for card files.
pub const CARDS_DIR: &str = "Cards";

#[derive(Error, Debug)]
pub enum CardError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Not a card: {0}")]
    NotACard(String),

    #[error("Malformed card {path}: {reason}")]
    Malformed { path: String, reason: String },

    #[error("Card has no front text")]
    MissingFront,
}

pub type Result<T> = std::result::Result<T, CardError>;

/// A file skipped during a bulk load, reported so the host can surface it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadDiagnostic {
    pub path: String,
    pub reason: String,
}

/// Card CRUD over an abstract file store.
///
/// Cheap to clone; clones share the underlying store and, when configured,
/// the connection-index cache that every successful write invalidates.
#[derive(Clone)]
pub struct CardStore {
    store: Arc<dyn FileStore>,
    cache: Option<Arc<IndexCache>>,
}

impl CardStore {
    pub fn new(store: Arc<dyn FileStore>) -> Self {
        Self { store, cache: None }
    }

    /// Route write-invalidation to a shared connection-index cache.
    pub fn with_cache(mut self, cache: Arc<IndexCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    async fn mark_dirty(&self) {
        if let Some(cache) = &self.cache {
            cache.invalidate().await;
        }
    }

    /// Load every card in the vault. Unreadable or malformed files are
    /// skipped with a warning and reported as diagnostics; one bad file
    /// never fails the whole load.
    pub async fn load_all(&self) -> Result<(Vec<Card>, Vec<LoadDiagnostic>)> {
        let mut cards = Vec::new();
        let mut diagnostics = Vec::new();

        for path in self.store.list().await? {
            if !in_namespace(&path) {
                continue;
            }
            let text = match self.store.read(&path).await {
                Ok(text) => text,
                Err(e) => {
                    log::warn!("Skipping unreadable card file {}: {}", path, e);
                    diagnostics.push(LoadDiagnostic {
                        path,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };
            match parse_card(&path, &text) {
                Ok(Some(card)) => cards.push(card),
                Ok(None) => {} // not a card record, fine
                Err(reason) => {
                    log::warn!("Skipping malformed card file {}: {}", path, reason);
                    diagnostics.push(LoadDiagnostic { path, reason });
                }
            }
        }

        Ok((cards, diagnostics))
    }

    /// Load one card by path.
    pub async fn load(&self, path: &str) -> Result<Card> {
        let text = self.store.read(path).await?;
        match parse_card(path, &text) {
            Ok(Some(card)) => Ok(card),
            Ok(None) => Err(CardError::NotACard(path.to_string())),
            Err(reason) => Err(CardError::Malformed {
                path: path.to_string(),
                reason,
            }),
        }
    }

    /// Persist a card, returning the path it now lives at.
    ///
    /// The target filename is a slug of the front. When `existing_path` is
    /// given and the slug moved (front was edited), the new file is written
    /// before the old one is deleted, so a failure mid-way can duplicate a
    /// card but never lose one.
    pub async fn save(&self, card: &Card, existing_path: Option<&str>) -> Result<String> {
        let front = card.front.trim();
        if front.is_empty() {
            return Err(CardError::MissingFront);
        }

        let target = self.available_path(front, existing_path).await?;
        let text = frontmatter::serialize(&card_metadata(card), &card_body(card));
        self.store.write(&target, &text).await?;

        if let Some(old) = existing_path {
            if old != target {
                self.store.delete(old).await?;
            }
        }

        self.mark_dirty().await;
        Ok(target)
    }

    /// Delete a card file. The caller is expected to drop any held copy;
    /// the index cache is invalidated here.
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.store.delete(path).await?;
        self.mark_dirty().await;
        Ok(())
    }

    /// Slug path for the front, probing ` 1`, ` 2`, ... suffixes when a
    /// different file already sits at the natural slot.
    async fn available_path(&self, front: &str, existing_path: Option<&str>) -> Result<String> {
        let base = slugify(front);
        for attempt in 0..100 {
            let candidate = if attempt == 0 {
                format!("{}/{}.md", CARDS_DIR, base)
            } else {
                format!("{}/{} {}.md", CARDS_DIR, base, attempt)
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
        // 100 identical fronts; last probe wins rather than spinning forever
        Ok(format!("{}/{} {}.md", CARDS_DIR, base, 100))
    }
}

fn in_namespace(path: &str) -> bool {
    path.starts_with(&format!("{}/", CARDS_DIR)) && path.ends_with(".md")
}

/// Filename-safe slug: printable title text with path and wiki-link
/// characters removed.
pub(crate) fn slugify(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .filter(|c| !matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '[' | ']' | '#'))
        .collect();
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    let truncated: String = collapsed.chars().take(80).collect();
    let trimmed = truncated.trim().trim_end_matches('.').to_string();
    if trimmed.is_empty() {
        "Untitled".to_string()
    } else {
        trimmed
    }
}

/// First `#`-heading becomes the front, remainder the back. Falls back to
/// the first non-empty line, then to the filename stem.
pub(crate) fn split_front_back(body: &str, filename_stem: &str) -> (String, String) {
    let lines: Vec<&str> = body.lines().collect();

    // Heading means hashes followed by a space; a bare `#tag` token is body
    // text, not a front
    let is_heading = |l: &&str| {
        let trimmed = l.trim_start();
        let rest = trimmed.trim_start_matches('#');
        rest.len() < trimmed.len() && rest.starts_with(' ')
    };

    if let Some(idx) = lines.iter().position(is_heading) {
        let front = lines[idx].trim_start().trim_start_matches('#').trim();
        let back = lines[idx + 1..].join("\n").trim().to_string();
        if !front.is_empty() {
            return (front.to_string(), back);
        }
    }

    if let Some(idx) = lines.iter().position(|l| !l.trim().is_empty()) {
        let front = lines[idx].trim().to_string();
        let back = lines[idx + 1..].join("\n").trim().to_string();
        return (front, back);
    }

    (filename_stem.to_string(), String::new())
}

pub(crate) fn filename_stem(path: &str) -> &str {
    let name = path.rsplit('/').next().unwrap_or(path);
    name.strip_suffix(".md").unwrap_or(name)
}

fn parse_date(meta: &Metadata, key: &str) -> std::result::Result<Option<NaiveDate>, String> {
    match meta.get(key).and_then(|v| v.as_str()) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<NaiveDate>()
            .map(Some)
            .map_err(|_| format!("invalid date in '{}': {}", key, raw)),
    }
}

/// `Ok(None)` when the file is simply not a card record.
fn parse_card(path: &str, text: &str) -> std::result::Result<Option<Card>, String> {
    let (meta, body) = frontmatter::parse(text);
    if meta.get("type").and_then(|v| v.as_str()) != Some("card") {
        return Ok(None);
    }

    let (front, back) = split_front_back(&body, filename_stem(path));

    let next_review = parse_date(&meta, "nextReview")?;
    let last_review = parse_date(&meta, "lastReview")?;
    let created = parse_date(&meta, "created")?;

    // Lenient defaults for hand-created files: a card missing its dates
    // becomes due tomorrow relative to a synthesized creation day.
    let next_review = match (next_review, created) {
        (Some(d), _) => d,
        (None, Some(c)) => c + Duration::days(1),
        (None, None) => return Err("missing both 'nextReview' and 'created'".to_string()),
    };
    let created = created.unwrap_or(next_review - Duration::days(1));

    let interval = meta
        .get("interval")
        .and_then(|v| v.as_i64())
        .unwrap_or(0)
        .max(0) as i32;
    let ease = meta
        .get("ease")
        .and_then(|v| v.as_f32())
        .unwrap_or(DEFAULT_EASE)
        .max(MIN_EASE);
    let review_count = meta
        .get("reviewCount")
        .and_then(|v| v.as_i64())
        .unwrap_or(0)
        .max(0) as i32;

    Ok(Some(Card {
        path: path.to_string(),
        front,
        back,
        source: meta.get("source").and_then(|v| v.as_str()).map(String::from),
        tags: meta.get("tags").map(|v| v.to_string_list()).unwrap_or_default(),
        interval,
        ease,
        next_review,
        last_review,
        review_count,
        created,
    }))
}

fn card_metadata(card: &Card) -> Metadata {
    let mut meta = Metadata::new();
    meta.insert("type".into(), Value::Str("card".into()));
    if !card.tags.is_empty() {
        meta.insert("tags".into(), Value::List(card.tags.clone()));
    }
    if let Some(source) = &card.source {
        meta.insert("source".into(), Value::Str(source.clone()));
    }
    meta.insert("interval".into(), Value::Number(card.interval as i64));
    meta.insert("ease".into(), Value::Str(format!("{}", card.ease)));
    meta.insert(
        "nextReview".into(),
        Value::Str(card.next_review.format("%Y-%m-%d").to_string()),
    );
    if let Some(last) = card.last_review {
        meta.insert(
            "lastReview".into(),
            Value::Str(last.format("%Y-%m-%d").to_string()),
        );
    }
    meta.insert("reviewCount".into(), Value::Number(card.review_count as i64));
    meta.insert(
        "created".into(),
        Value::Str(card.created.format("%Y-%m-%d").to_string()),
    );
    meta
}

fn card_body(card: &Card) -> String {
    if card.back.trim().is_empty() {
        format!("# {}\n", card.front.trim())
    } else {
        format!("# {}\n\n{}\n", card.front.trim(), card.back.trim_end())
    }
}

//! Connection index: build + relationship queries
//!
//! One [`IndexedNote`] per vault file, in store listing order. Queries are
//! read-only over the built structure; ties between equally scored results
//! keep that scan order (stable sort), which is the documented, acceptable
//! nondeterminism for equal scores.

use std::collections::{HashMap, HashSet};

use pulldown_cmark::{Event, Parser};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::frontmatter;
use crate::store::{FileStore, Result};

use super::stopwords::STOP_WORDS;

/// Everything the graph knows about one note.
#[derive(Debug, Clone)]
pub struct IndexedNote {
    pub path: String,
    /// Filename sans extension.
    pub title: String,
    pub tags: Vec<String>,
    /// Source title, unwrapped from its `[[...]]` token.
    pub source: Option<String>,
    /// Lower-cased alphanumeric tokens (≥ 3 chars) minus stop words.
    pub keywords: HashSet<String>,
    /// Outgoing wiki-link targets, aliases discarded, first-seen order.
    pub out_links: Vec<String>,
    /// Body sans frontmatter; kept for auto-link offset scanning.
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedNote {
    pub path: String,
    pub title: String,
    pub score: i32,
}

/// A place where `[[title]]` could be inserted non-destructively.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkSuggestion {
    /// The note the suggestion links to.
    pub path: String,
    pub title: String,
    /// Character offset of the match in the target note's body
    /// (frontmatter excluded).
    pub offset: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossSourceConnection {
    pub card_a: String,
    pub card_b: String,
    pub source_a: String,
    pub source_b: String,
    pub shared_tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteConnections {
    pub path: String,
    pub title: String,
    pub connections: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStats {
    /// Every indexed note, most connected first.
    pub notes: Vec<NoteConnections>,
    /// Paths with zero connections.
    pub orphans: Vec<String>,
    pub note_count: usize,
    /// Distinct connection edges: link-resolved pairs plus tag-sharing
    /// pairs, each pair counted once per kind.
    pub connection_count: usize,
}

struct Patterns {
    wiki_link: Regex,
    token: Regex,
}

impl Patterns {
    fn new() -> Self {
        Self {
            wiki_link: Regex::new(r"\[\[([^\]\|]+)(?:\|([^\]]+))?\]\]").unwrap(),
            token: Regex::new(r"[a-z0-9]+").unwrap(),
        }
    }
}

pub struct ConnectionIndex {
    notes: Vec<IndexedNote>,
    by_path: HashMap<String, usize>,
    patterns: Patterns,
}

impl ConnectionIndex {
    /// Full scan of every file in the store. Unreadable files are skipped
    /// with a warning; the index stays a best-effort view of the vault.
    pub async fn build(store: &dyn FileStore) -> Result<Self> {
        let patterns = Patterns::new();
        let stop_words: HashSet<&str> = STOP_WORDS.iter().copied().collect();

        let mut notes = Vec::new();
        let mut by_path = HashMap::new();

        for path in store.list().await? {
            let text = match store.read(&path).await {
                Ok(text) => text,
                Err(e) => {
                    log::warn!("Skipping unreadable file during index build {}: {}", path, e);
                    continue;
                }
            };

            let note = index_note(&path, &text, &patterns, &stop_words);
            by_path.insert(note.path.clone(), notes.len());
            notes.push(note);
        }

        log::debug!("Connection index built over {} notes", notes.len());
        Ok(Self {
            notes,
            by_path,
            patterns,
        })
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn note(&self, path: &str) -> Option<&IndexedNote> {
        self.by_path.get(path).map(|&i| &self.notes[i])
    }

    /// Notes related to `path`, best first, at most `limit`.
    ///
    /// Score per candidate: +3 per shared tag, +shared keywords capped at
    /// 5, +2 for a direct link in either direction, +2 for a shared
    /// source. Zero-scored notes are excluded; the queried note never
    /// appears in its own results.
    pub fn find_related(&self, path: &str, limit: usize) -> Vec<RelatedNote> {
        let Some(&target_idx) = self.by_path.get(path) else {
            return Vec::new();
        };
        let target = &self.notes[target_idx];
        let target_tags = lower_set(&target.tags);

        let mut scored: Vec<RelatedNote> = Vec::new();
        for (idx, note) in self.notes.iter().enumerate() {
            if idx == target_idx {
                continue;
            }

            let mut score = 0i32;

            // Sets on both sides; a duplicated tag still counts once
            let shared_tags = lower_set(&note.tags)
                .intersection(&target_tags)
                .count();
            score += 3 * shared_tags as i32;

            let shared_keywords = note.keywords.intersection(&target.keywords).count();
            score += shared_keywords.min(5) as i32;

            if self.links_between(target, note) {
                score += 2;
            }

            if let (Some(a), Some(b)) = (&target.source, &note.source) {
                if a.eq_ignore_ascii_case(b) {
                    score += 2;
                }
            }

            if score > 0 {
                scored.push(RelatedNote {
                    path: note.path.clone(),
                    title: note.title.clone(),
                    score,
                });
            }
        }

        // Stable sort keeps scan order among equal scores
        scored.sort_by(|a, b| b.score.cmp(&a.score));
        scored.truncate(limit);
        scored
    }

    /// Titles of other notes that appear, unlinked, in this note's body.
    ///
    /// One suggestion per matching note at its first whole-word,
    /// case-insensitive occurrence; occurrences already inside a `[[...]]`
    /// span never match. Titles shorter than three characters are skipped
    /// (they match everything).
    pub fn auto_link_suggestions(&self, path: &str) -> Vec<LinkSuggestion> {
        let Some(&target_idx) = self.by_path.get(path) else {
            return Vec::new();
        };
        let target = &self.notes[target_idx];
        let link_spans: Vec<(usize, usize)> = self
            .patterns
            .wiki_link
            .find_iter(&target.body)
            .map(|m| (m.start(), m.end()))
            .collect();

        let mut suggestions = Vec::new();
        for (idx, note) in self.notes.iter().enumerate() {
            if idx == target_idx || note.title.chars().count() < 3 {
                continue;
            }

            let pattern = format!(r"(?i)\b{}\b", regex::escape(&note.title));
            let Ok(re) = Regex::new(&pattern) else {
                continue;
            };
            let hit = re.find_iter(&target.body).find(|m| {
                !link_spans
                    .iter()
                    .any(|&(start, end)| m.start() < end && m.end() > start)
            });
            if let Some(m) = hit {
                suggestions.push(LinkSuggestion {
                    path: note.path.clone(),
                    title: note.title.clone(),
                    offset: target.body[..m.start()].chars().count(),
                });
            }
        }
        suggestions
    }

    /// Pairs of notes from *different* sources that share at least one
    /// tag. Quadratic across sources and their cards; fine at vault scale.
    pub fn cross_source_connections(&self) -> Vec<CrossSourceConnection> {
        // Group by source, preserving first-seen order
        let mut order: Vec<String> = Vec::new();
        let mut groups: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, note) in self.notes.iter().enumerate() {
            if let Some(source) = &note.source {
                let key = source.to_lowercase();
                groups.entry(key.clone()).or_insert_with(|| {
                    order.push(key.clone());
                    Vec::new()
                });
                groups.get_mut(&key).unwrap().push(idx);
            }
        }

        let mut connections = Vec::new();
        for (a_pos, a_key) in order.iter().enumerate() {
            for b_key in order.iter().skip(a_pos + 1) {
                for &a_idx in &groups[a_key] {
                    for &b_idx in &groups[b_key] {
                        let a = &self.notes[a_idx];
                        let b = &self.notes[b_idx];
                        let b_tags = lower_set(&b.tags);
                        let shared: Vec<String> = a
                            .tags
                            .iter()
                            .filter(|t| b_tags.contains(&t.to_lowercase()))
                            .cloned()
                            .collect();
                        if !shared.is_empty() {
                            connections.push(CrossSourceConnection {
                                card_a: a.path.clone(),
                                card_b: b.path.clone(),
                                source_a: a.source.clone().unwrap_or_default(),
                                source_b: b.source.clone().unwrap_or_default(),
                                shared_tags: shared,
                            });
                        }
                    }
                }
            }
        }
        connections
    }

    /// Connectivity over the whole vault: per-note connection counts
    /// (resolved link edges in either direction plus tag-sharing pairs,
    /// once per pair), most connected first, orphans called out.
    pub fn connection_stats(&self) -> ConnectionStats {
        // Titles are not unique across folders; a link resolves to every
        // note carrying the title
        let mut by_title: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, note) in self.notes.iter().enumerate() {
            by_title.entry(note.title.to_lowercase()).or_default().push(idx);
        }

        let mut link_pairs: HashSet<(usize, usize)> = HashSet::new();
        for (idx, note) in self.notes.iter().enumerate() {
            for link in &note.out_links {
                let Some(targets) = by_title.get(&link.to_lowercase()) else {
                    continue;
                };
                for &other in targets {
                    if other != idx {
                        link_pairs.insert((idx.min(other), idx.max(other)));
                    }
                }
            }
        }

        let tag_sets: Vec<HashSet<String>> =
            self.notes.iter().map(|n| lower_set(&n.tags)).collect();
        let mut tag_pairs: HashSet<(usize, usize)> = HashSet::new();
        for a in 0..self.notes.len() {
            if tag_sets[a].is_empty() {
                continue;
            }
            for b in (a + 1)..self.notes.len() {
                if !tag_sets[a].is_disjoint(&tag_sets[b]) {
                    tag_pairs.insert((a, b));
                }
            }
        }

        let mut counts = vec![0usize; self.notes.len()];
        for &(a, b) in link_pairs.iter().chain(tag_pairs.iter()) {
            counts[a] += 1;
            counts[b] += 1;
        }

        let mut notes: Vec<NoteConnections> = self
            .notes
            .iter()
            .zip(&counts)
            .map(|(note, &connections)| NoteConnections {
                path: note.path.clone(),
                title: note.title.clone(),
                connections,
            })
            .collect();
        notes.sort_by(|a, b| b.connections.cmp(&a.connections));

        let orphans: Vec<String> = notes
            .iter()
            .filter(|n| n.connections == 0)
            .map(|n| n.path.clone())
            .collect();

        ConnectionStats {
            note_count: self.notes.len(),
            connection_count: link_pairs.len() + tag_pairs.len(),
            notes,
            orphans,
        }
    }

    fn links_between(&self, a: &IndexedNote, b: &IndexedNote) -> bool {
        a.out_links.iter().any(|l| l.eq_ignore_ascii_case(&b.title))
            || b.out_links.iter().any(|l| l.eq_ignore_ascii_case(&a.title))
    }
}

fn lower_set(tags: &[String]) -> HashSet<String> {
    tags.iter().map(|t| t.to_lowercase()).collect()
}

fn index_note(
    path: &str,
    text: &str,
    patterns: &Patterns,
    stop_words: &HashSet<&str>,
) -> IndexedNote {
    let (meta, body) = frontmatter::parse(text);

    let title = crate::cards::store::filename_stem(path).to_string();
    let tags = meta
        .get("tags")
        .map(|v| v.to_string_list())
        .unwrap_or_default();
    let source = meta
        .get("source")
        .and_then(|v| v.as_str())
        .map(unwrap_link_token);

    let mut out_links = Vec::new();
    let mut seen = HashSet::new();
    for cap in patterns.wiki_link.captures_iter(&body) {
        let target = cap[1].trim().to_string();
        if seen.insert(target.to_lowercase()) {
            out_links.push(target);
        }
    }

    let keywords = extract_keywords(&title, &body, patterns, stop_words);

    IndexedNote {
        path: path.to_string(),
        title,
        tags,
        source,
        keywords,
        out_links,
        body,
    }
}

fn unwrap_link_token(raw: &str) -> String {
    let inner = raw
        .trim()
        .strip_prefix("[[")
        .and_then(|r| r.strip_suffix("]]"))
        .unwrap_or(raw.trim());
    inner.split('|').next().unwrap_or(inner).trim().to_string()
}

/// Keyword set of a note: wiki-link syntax reduced to its display text,
/// Markdown stripped through the parser's text events, then lower-cased
/// alphanumeric tokens of length ≥ 3 minus stop words.
fn extract_keywords(
    title: &str,
    body: &str,
    patterns: &Patterns,
    stop_words: &HashSet<&str>,
) -> HashSet<String> {
    let delinked = patterns.wiki_link.replace_all(body, |cap: &regex::Captures| {
        cap.get(2)
            .or_else(|| cap.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default()
    });

    let mut text = String::with_capacity(delinked.len() + title.len() + 1);
    text.push_str(title);
    text.push('\n');
    for event in Parser::new(&delinked) {
        match event {
            Event::Text(t) | Event::Code(t) => {
                text.push_str(&t);
                text.push(' ');
            }
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            _ => {}
        }
    }

    let lowered = text.to_lowercase();
    patterns
        .token
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|t| t.len() >= 3 && !stop_words.contains(t))
        .map(str::to_string)
        .collect()
}

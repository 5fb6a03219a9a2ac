//! Card data model

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Starting ease factor for a new card.
pub const DEFAULT_EASE: f32 = 2.5;

/// A flashcard backed by a file in the `Cards/` namespace.
///
/// Identity is the `path`; renames are write-new-then-delete-old, fields
/// carried verbatim. `next_review` is always `last_review + interval` days,
/// or `created + 1` day before the first review.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub path: String,
    /// Prompt, derived from the body's first heading (filename fallback).
    pub front: String,
    /// Answer: everything after the first heading.
    pub back: String,
    /// Reference to a source, stored as a wiki-link token (`[[Title]]`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Days until next review, as scheduled at the last review.
    #[serde(default)]
    pub interval: i32,
    /// SM-2 ease factor, never below 1.3.
    #[serde(default = "default_ease")]
    pub ease: f32,
    pub next_review: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_review: Option<NaiveDate>,
    #[serde(default)]
    pub review_count: i32,
    pub created: NaiveDate,
}

fn default_ease() -> f32 {
    DEFAULT_EASE
}

impl Card {
    /// A fresh, never-reviewed card. First review falls due tomorrow.
    pub fn new(front: String, back: String, today: NaiveDate) -> Self {
        Self {
            path: String::new(),
            front,
            back,
            source: None,
            tags: Vec::new(),
            interval: 0,
            ease: DEFAULT_EASE,
            next_review: today + Duration::days(1),
            last_review: None,
            review_count: 0,
            created: today,
        }
    }

    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.next_review <= today
    }

    /// Days past due; negative when the card is scheduled in the future.
    pub fn overdue_days(&self, today: NaiveDate) -> i64 {
        (today - self.next_review).num_days()
    }

    /// Source title with the `[[...]]` wrapper removed.
    pub fn source_title(&self) -> Option<&str> {
        let raw = self.source.as_deref()?;
        let inner = raw
            .strip_prefix("[[")
            .and_then(|r| r.strip_suffix("]]"))
            .unwrap_or(raw);
        // [[Title|Alias]] references the title half
        Some(inner.split('|').next().unwrap_or(inner).trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn new_card_is_due_tomorrow() {
        let card = Card::new("Q".into(), "A".into(), day("2026-08-29"));
        assert_eq!(card.next_review, day("2026-08-30"));
        assert_eq!(card.interval, 0);
        assert_eq!(card.ease, DEFAULT_EASE);
        assert!(!card.is_due(day("2026-08-29")));
        assert!(card.is_due(day("2026-08-30")));
    }

    #[test]
    fn source_title_unwraps_link_token() {
        let mut card = Card::new("Q".into(), "A".into(), day("2026-08-29"));
        card.source = Some("[[The Rust Book]]".into());
        assert_eq!(card.source_title(), Some("The Rust Book"));

        card.source = Some("[[The Rust Book|trpl]]".into());
        assert_eq!(card.source_title(), Some("The Rust Book"));

        card.source = Some("Plain Title".into());
        assert_eq!(card.source_title(), Some("Plain Title"));
    }

    #[test]
    fn overdue_days_sign() {
        let mut card = Card::new("Q".into(), "A".into(), day("2026-08-01"));
        card.next_review = day("2026-08-25");
        assert_eq!(card.overdue_days(day("2026-08-29")), 4);
        assert_eq!(card.overdue_days(day("2026-08-20")), -5);
    }
}

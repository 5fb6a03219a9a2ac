//! Source data model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Kind of material a source is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceType {
    Book,
    Article,
    Video,
    Podcast,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Book => "book",
            SourceType::Article => "article",
            SourceType::Video => "video",
            SourceType::Podcast => "podcast",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "book" => Some(SourceType::Book),
            "article" => Some(SourceType::Article),
            "video" => Some(SourceType::Video),
            "podcast" => Some(SourceType::Podcast),
            _ => None,
        }
    }
}

impl Default for SourceType {
    fn default() -> Self {
        Self::Book
    }
}

/// Where the source sits in the reading lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceStatus {
    WantToRead,
    Reading,
    Finished,
}

impl SourceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceStatus::WantToRead => "want_to_read",
            SourceStatus::Reading => "reading",
            SourceStatus::Finished => "finished",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "want_to_read" => Some(SourceStatus::WantToRead),
            "reading" => Some(SourceStatus::Reading),
            "finished" => Some(SourceStatus::Finished),
            _ => None,
        }
    }
}

impl Default for SourceStatus {
    fn default() -> Self {
        Self::WantToRead
    }
}

/// A studied source backed by a file in the `Sources/` namespace.
///
/// Invariants, restored by [`Source::normalize`] before every save:
/// `started` is only set once the source left `want_to_read`; `finished`
/// is only set while `status == finished`; `rating` stays within 0–5.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    pub path: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default)]
    pub source_type: SourceType,
    #[serde(default)]
    pub status: SourceStatus,
    #[serde(default)]
    pub rating: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished: Option<NaiveDate>,
    #[serde(default)]
    pub body: String,
}

impl Source {
    pub fn new(title: String, source_type: SourceType) -> Self {
        Self {
            path: String::new(),
            title,
            author: None,
            source_type,
            status: SourceStatus::WantToRead,
            rating: 0,
            started: None,
            finished: None,
            body: String::new(),
        }
    }

    /// Re-establish the status/date invariants, filling missing dates with
    /// `today` where a transition implies them.
    pub fn normalize(&mut self, today: NaiveDate) {
        self.rating = self.rating.min(5);
        match self.status {
            SourceStatus::WantToRead => {
                self.started = None;
                self.finished = None;
            }
            SourceStatus::Reading => {
                if self.started.is_none() {
                    self.started = Some(today);
                }
                self.finished = None;
            }
            SourceStatus::Finished => {
                if self.started.is_none() {
                    self.started = Some(today);
                }
                if self.finished.is_none() {
                    self.finished = Some(today);
                }
            }
        }
    }

    /// The `[[Title]]` token cards use to reference this source.
    pub fn link_token(&self) -> String {
        format!("[[{}]]", self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn finishing_auto_populates_finished_date() {
        let mut source = Source::new("Deep Work".into(), SourceType::Book);
        source.status = SourceStatus::Reading;
        source.normalize(day("2026-08-01"));
        assert_eq!(source.started, Some(day("2026-08-01")));
        assert_eq!(source.finished, None);

        source.status = SourceStatus::Finished;
        source.normalize(day("2026-08-29"));
        assert_eq!(source.started, Some(day("2026-08-01")));
        assert_eq!(source.finished, Some(day("2026-08-29")));
    }

    #[test]
    fn moving_back_to_want_to_read_clears_dates() {
        let mut source = Source::new("Deep Work".into(), SourceType::Book);
        source.status = SourceStatus::Finished;
        source.normalize(day("2026-08-29"));

        source.status = SourceStatus::WantToRead;
        source.normalize(day("2026-08-30"));
        assert_eq!(source.started, None);
        assert_eq!(source.finished, None);
    }

    #[test]
    fn rating_clamps_to_five() {
        let mut source = Source::new("x".into(), SourceType::Article);
        source.rating = 9;
        source.normalize(day("2026-08-29"));
        assert_eq!(source.rating, 5);
    }
}

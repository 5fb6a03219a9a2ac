//! Review session state machine
//!
//! ```text
//! AwaitingRating --reveal()--> AnswerShown --rate(q)--> AwaitingRating | Complete
//! ```
//!
//! A session walks a pre-filtered queue of due cards, most overdue first
//! (ties go to the lower ease, the harder card). Each `rate` persists its
//! card through the [`CardStore`] before the session advances; abandoning a
//! session never un-records a rating that already hit disk. A failed persist
//! leaves both the in-memory card and the session state untouched, so the
//! host can retry or surface the error without the card silently looking
//! reviewed.

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cards::{Card, CardError, CardStore};

use super::algorithm::{schedule, Quality};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Invalid session operation '{operation}' in state {state:?}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },

    #[error(transparent)]
    Card(#[from] CardError),
}

pub type Result<T> = std::result::Result<T, SessionError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionState {
    /// A card front is shown, the answer is hidden.
    AwaitingRating,
    /// The answer is visible, rating buttons are live.
    AnswerShown,
    /// Terminal; also reached by [`ReviewSession::cancel`].
    Complete,
}

/// Per-quality counts recorded over the session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingTally {
    pub again: usize,
    pub hard: usize,
    pub good: usize,
    pub easy: usize,
}

impl RatingTally {
    fn record(&mut self, quality: Quality) {
        match quality {
            Quality::Again => self.again += 1,
            Quality::Hard => self.hard += 1,
            Quality::Good => self.good += 1,
            Quality::Easy => self.easy += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.again + self.hard + self.good + self.easy
    }
}

pub struct ReviewSession {
    cards: CardStore,
    queue: Vec<Card>,
    position: usize,
    state: SessionState,
    tally: RatingTally,
    today: NaiveDate,
    cancelled: bool,
}

impl ReviewSession {
    /// Start a session over the given cards (the caller filters to due
    /// ones). An empty queue is a valid, immediately complete session.
    pub fn start(cards: CardStore, mut queue: Vec<Card>, today: NaiveDate) -> Self {
        queue.sort_by(|a, b| {
            b.overdue_days(today)
                .cmp(&a.overdue_days(today))
                .then(a.ease.partial_cmp(&b.ease).unwrap_or(Ordering::Equal))
        });

        let state = if queue.is_empty() {
            SessionState::Complete
        } else {
            SessionState::AwaitingRating
        };

        Self {
            cards,
            queue,
            position: 0,
            state,
            tally: RatingTally::default(),
            today,
            cancelled: false,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn tally(&self) -> RatingTally {
        self.tally
    }

    /// Cards left in the queue, the current one included.
    pub fn remaining(&self) -> usize {
        self.queue.len() - self.position
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// The card currently shown, if the session is still running.
    pub fn current_card(&self) -> Option<&Card> {
        match self.state {
            SessionState::Complete => None,
            _ => self.queue.get(self.position),
        }
    }

    /// Show the answer for the current card. No data changes.
    pub fn reveal(&mut self) -> Result<&Card> {
        if self.state != SessionState::AwaitingRating {
            return Err(SessionError::InvalidState {
                operation: "reveal",
                state: self.state,
            });
        }
        self.state = SessionState::AnswerShown;
        Ok(&self.queue[self.position])
    }

    /// Record a rating for the current card: reschedule, persist, advance.
    ///
    /// Only valid in `AnswerShown`. The write completes before the session
    /// advances; `&mut self` keeps a second transition from starting while
    /// one is in flight.
    pub async fn rate(&mut self, quality: Quality) -> Result<&Card> {
        if self.state != SessionState::AnswerShown {
            return Err(SessionError::InvalidState {
                operation: "rate",
                state: self.state,
            });
        }

        // Work on a copy; the queue entry only changes once the save lands.
        let mut card = self.queue[self.position].clone();
        let scheduled = schedule(quality, card.interval, card.ease, self.today);
        card.interval = scheduled.interval;
        card.ease = scheduled.ease;
        card.next_review = scheduled.next_review;
        card.last_review = Some(scheduled.last_review);
        card.review_count += 1;

        let existing = self.queue[self.position].path.clone();
        let path = self.cards.save(&card, Some(&existing)).await?;
        card.path = path;

        self.queue[self.position] = card;
        self.tally.record(quality);
        self.position += 1;
        self.state = if self.position < self.queue.len() {
            SessionState::AwaitingRating
        } else {
            SessionState::Complete
        };

        Ok(&self.queue[self.position - 1])
    }

    /// Abandon the session. Ratings already persisted stay persisted; the
    /// remaining queue is simply dropped.
    pub fn cancel(&mut self) {
        if self.state != SessionState::Complete {
            self.cancelled = true;
            self.state = SessionState::Complete;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::store::MemoryStore;

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    const TODAY: &str = "2026-08-29";

    async fn seeded_store(fronts_and_due: &[(&str, &str, f32)]) -> (CardStore, Vec<Card>) {
        let store = CardStore::new(Arc::new(MemoryStore::new()));
        let mut cards = Vec::new();
        for (front, due, ease) in fronts_and_due {
            let mut card = Card::new(front.to_string(), "answer".into(), day("2026-08-01"));
            card.next_review = day(due);
            card.ease = *ease;
            card.interval = 1;
            let path = store.save(&card, None).await.unwrap();
            card.path = path;
            cards.push(card);
        }
        (store, cards)
    }

    #[tokio::test]
    async fn empty_queue_is_immediately_complete() {
        let (store, _) = seeded_store(&[]).await;
        let session = ReviewSession::start(store, Vec::new(), day(TODAY));
        assert_eq!(session.state(), SessionState::Complete);
        assert_eq!(session.tally().total(), 0);
        assert!(session.current_card().is_none());
    }

    #[tokio::test]
    async fn queue_orders_most_overdue_first_then_lower_ease() {
        let (store, cards) = seeded_store(&[
            ("fresh", "2026-08-29", 2.5),
            ("older easy", "2026-08-20", 2.8),
            ("older hard", "2026-08-20", 1.6),
            ("oldest", "2026-08-10", 2.5),
        ])
        .await;

        let session = ReviewSession::start(store, cards, day(TODAY));
        let order: Vec<&str> = session.queue.iter().map(|c| c.front.as_str()).collect();
        assert_eq!(order, vec!["oldest", "older hard", "older easy", "fresh"]);
    }

    #[tokio::test]
    async fn full_walk_updates_tally_and_persists() {
        let (store, cards) = seeded_store(&[
            ("a", "2026-08-28", 2.5),
            ("b", "2026-08-29", 2.5),
        ])
        .await;

        let mut session = ReviewSession::start(store.clone(), cards, day(TODAY));

        session.reveal().unwrap();
        session.rate(Quality::Good).await.unwrap();
        assert_eq!(session.state(), SessionState::AwaitingRating);

        session.reveal().unwrap();
        session.rate(Quality::Again).await.unwrap();
        assert_eq!(session.state(), SessionState::Complete);

        let tally = session.tally();
        assert_eq!(tally.good, 1);
        assert_eq!(tally.again, 1);
        assert_eq!(tally.total(), 2);

        // interval 1 + Good -> 6 days out
        let (persisted, _) = store.load_all().await.unwrap();
        let a = persisted.iter().find(|c| c.front == "a").unwrap();
        assert_eq!(a.interval, 6);
        assert_eq!(a.next_review, day("2026-09-04"));
        assert_eq!(a.last_review, Some(day(TODAY)));
        assert_eq!(a.review_count, 1);

        let b = persisted.iter().find(|c| c.front == "b").unwrap();
        assert_eq!(b.interval, 1);
        assert_eq!(b.next_review, day("2026-08-30"));
    }

    #[tokio::test]
    async fn rate_outside_answer_shown_fails_fast() {
        let (store, cards) = seeded_store(&[("a", "2026-08-29", 2.5)]).await;
        let mut session = ReviewSession::start(store, cards, day(TODAY));

        assert!(matches!(
            session.rate(Quality::Good).await,
            Err(SessionError::InvalidState { operation: "rate", .. })
        ));
        session.reveal().unwrap();
        assert!(matches!(
            session.reveal(),
            Err(SessionError::InvalidState { operation: "reveal", .. })
        ));
    }

    #[tokio::test]
    async fn cancel_keeps_already_persisted_ratings() {
        let (store, cards) = seeded_store(&[
            ("a", "2026-08-28", 2.5),
            ("b", "2026-08-29", 2.5),
        ])
        .await;
        let mut session = ReviewSession::start(store.clone(), cards, day(TODAY));

        session.reveal().unwrap();
        session.rate(Quality::Easy).await.unwrap();
        session.cancel();

        assert!(session.is_cancelled());
        assert_eq!(session.state(), SessionState::Complete);
        assert!(matches!(
            session.reveal(),
            Err(SessionError::InvalidState { .. })
        ));

        let (persisted, _) = store.load_all().await.unwrap();
        let a = persisted.iter().find(|c| c.front == "a").unwrap();
        assert_eq!(a.review_count, 1);
        let b = persisted.iter().find(|c| c.front == "b").unwrap();
        assert_eq!(b.review_count, 0);
    }

    #[tokio::test]
    async fn repeated_again_keeps_interval_one_and_ease_non_increasing() {
        let (store, cards) = seeded_store(&[("a", "2026-08-28", 2.5)]).await;

        let mut session = ReviewSession::start(store.clone(), cards, day(TODAY));
        session.reveal().unwrap();
        session.rate(Quality::Again).await.unwrap();

        let (persisted, _) = store.load_all().await.unwrap();
        let first_ease = persisted[0].ease;
        assert_eq!(persisted[0].interval, 1);
        assert!(first_ease < 2.5);

        let mut second =
            ReviewSession::start(store.clone(), persisted, day("2026-08-30"));
        second.reveal().unwrap();
        second.rate(Quality::Again).await.unwrap();

        let (persisted, _) = store.load_all().await.unwrap();
        assert_eq!(persisted[0].interval, 1);
        assert!(persisted[0].ease <= first_ease);
    }
}

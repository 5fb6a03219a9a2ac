//! Review statistics
//!
//! Pure derivations over the full card list: due and reviewed-today
//! counts, the current review streak, and a trailing-window histogram for
//! the activity chart. Cheap enough to recompute on every request.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::cards::Card;

/// Default trailing window for the review histogram.
pub const DEFAULT_HISTOGRAM_DAYS: usize = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayCount {
    pub date: NaiveDate,
    pub reviews: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultStats {
    pub total_cards: usize,
    /// Cards with `next_review <= today`.
    pub due_today: usize,
    /// Cards whose last review happened today.
    pub reviewed_today: usize,
    /// Consecutive days, walking backward from today, with at least one
    /// review. A review-free today reports zero.
    pub current_streak: u32,
    /// One entry per day over the trailing window, oldest first, zero
    /// days included.
    pub histogram: Vec<DayCount>,
}

pub fn compute(cards: &[Card], today: NaiveDate) -> VaultStats {
    compute_window(cards, today, DEFAULT_HISTOGRAM_DAYS)
}

pub fn compute_window(cards: &[Card], today: NaiveDate, window_days: usize) -> VaultStats {
    let due_today = cards.iter().filter(|c| c.is_due(today)).count();
    let reviewed_today = cards
        .iter()
        .filter(|c| c.last_review == Some(today))
        .count();

    let reviewed_on = |day: NaiveDate| cards.iter().any(|c| c.last_review == Some(day));

    let mut current_streak = 0u32;
    let mut day = today;
    while reviewed_on(day) {
        current_streak += 1;
        day -= Duration::days(1);
    }

    let mut histogram = Vec::with_capacity(window_days);
    for offset in (0..window_days as i64).rev() {
        let date = today - Duration::days(offset);
        histogram.push(DayCount {
            date,
            reviews: cards.iter().filter(|c| c.last_review == Some(date)).count(),
        });
    }

    VaultStats {
        total_cards: cards.len(),
        due_today,
        reviewed_today,
        current_streak,
        histogram,
    }
}

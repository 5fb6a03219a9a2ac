//! SM-2 variant scheduler
//!
//! Four-button rating scale instead of SuperMemo's six:
//! - 0 Again — failed, full interval reset
//! - 1 Hard  — failed, reset, smaller ease penalty
//! - 2 Good  — recalled
//! - 3 Easy  — recalled effortlessly
//!
//! Interval progression for passing ratings is the classic 1 → 6 →
//! `round(interval * ease)`; any failing rating resets to 1 day. The ease
//! drift `0.1 - (3 - q) * (0.08 + (3 - q) * 0.02)` applies on every rating
//! and is floored at 1.3, so Good leaves ease untouched, Easy adds 0.1,
//! Hard subtracts 0.14 and Again subtracts 0.32.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Minimum ease factor allowed.
pub const MIN_EASE: f32 = 1.3;

/// Rating a reviewer gives after seeing the answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Quality {
    Again,
    Hard,
    Good,
    Easy,
}

impl Quality {
    pub fn value(self) -> i32 {
        match self {
            Quality::Again => 0,
            Quality::Hard => 1,
            Quality::Good => 2,
            Quality::Easy => 3,
        }
    }

    pub fn from_value(value: i32) -> Option<Self> {
        match value {
            0 => Some(Quality::Again),
            1 => Some(Quality::Hard),
            2 => Some(Quality::Good),
            3 => Some(Quality::Easy),
            _ => None,
        }
    }

    /// Ratings below Good count as failed recall.
    pub fn is_pass(self) -> bool {
        self.value() >= 2
    }
}

/// Output of one scheduling step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scheduled {
    pub interval: i32,
    pub ease: f32,
    pub next_review: NaiveDate,
    pub last_review: NaiveDate,
}

/// Compute the next review from a rating. Pure and deterministic; rounding
/// of `interval * ease` is `f32::round` (half away from zero).
pub fn schedule(quality: Quality, interval: i32, ease: f32, today: NaiveDate) -> Scheduled {
    let interval = interval.max(0);

    let new_interval = if !quality.is_pass() {
        1
    } else {
        match interval {
            0 => 1,
            1 => 6,
            _ => (interval as f32 * ease).round() as i32,
        }
    };

    let miss = (3 - quality.value()) as f32;
    let new_ease = (ease + (0.1 - miss * (0.08 + miss * 0.02))).max(MIN_EASE);

    Scheduled {
        interval: new_interval,
        ease: new_ease,
        next_review: today + Duration::days(new_interval as i64),
        last_review: today,
    }
}

/// Interval each rating would produce, in rating order (Again, Hard, Good,
/// Easy). Shown on the rating buttons so the reviewer knows the stakes.
pub fn preview_intervals(interval: i32, ease: f32, today: NaiveDate) -> [i32; 4] {
    [
        schedule(Quality::Again, interval, ease, today).interval,
        schedule(Quality::Hard, interval, ease, today).interval,
        schedule(Quality::Good, interval, ease, today).interval,
        schedule(Quality::Easy, interval, ease, today).interval,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    const TODAY: &str = "2026-08-29";

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn failing_ratings_always_reset_to_one_day() {
        for quality in [Quality::Again, Quality::Hard] {
            for interval in [0, 1, 6, 40, 365] {
                let result = schedule(quality, interval, 2.5, day(TODAY));
                assert_eq!(result.interval, 1, "{:?} at interval {}", quality, interval);
            }
        }
    }

    #[test]
    fn passing_interval_ladder() {
        assert_eq!(schedule(Quality::Good, 0, 2.5, day(TODAY)).interval, 1);
        assert_eq!(schedule(Quality::Good, 1, 2.5, day(TODAY)).interval, 6);
        assert_eq!(schedule(Quality::Good, 6, 2.5, day(TODAY)).interval, 15);
        assert_eq!(schedule(Quality::Easy, 6, 2.5, day(TODAY)).interval, 15);
        assert_eq!(schedule(Quality::Good, 15, 2.5, day(TODAY)).interval, 38);
        assert_eq!(schedule(Quality::Good, 10, 1.3, day(TODAY)).interval, 13);
    }

    #[test]
    fn ease_drift_per_quality() {
        assert!(approx(schedule(Quality::Easy, 6, 2.5, day(TODAY)).ease, 2.6));
        assert!(approx(schedule(Quality::Good, 6, 2.5, day(TODAY)).ease, 2.5));
        assert!(approx(schedule(Quality::Hard, 6, 2.5, day(TODAY)).ease, 2.36));
        assert!(approx(schedule(Quality::Again, 6, 2.5, day(TODAY)).ease, 2.18));
    }

    #[test]
    fn ease_never_drops_below_floor() {
        let mut ease = 1.5;
        for _ in 0..10 {
            ease = schedule(Quality::Again, 6, ease, day(TODAY)).ease;
            assert!(ease >= MIN_EASE);
        }
        assert_eq!(ease, MIN_EASE);
    }

    #[test]
    fn dates_follow_the_interval() {
        let result = schedule(Quality::Good, 1, 2.5, day(TODAY));
        assert_eq!(result.last_review, day(TODAY));
        assert_eq!(result.next_review, day("2026-09-04"));
    }

    #[test]
    fn preview_matches_individual_calls() {
        let preview = preview_intervals(6, 2.5, day(TODAY));
        assert_eq!(preview, [1, 1, 15, 15]);
    }

    #[test]
    fn quality_round_trips_through_values() {
        for value in 0..4 {
            assert_eq!(Quality::from_value(value).unwrap().value(), value);
        }
        assert_eq!(Quality::from_value(4), None);
        assert_eq!(Quality::from_value(-1), None);
    }
}

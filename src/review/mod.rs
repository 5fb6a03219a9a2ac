//! Spaced repetition
//!
//! - [`algorithm`] — the pure SM-2 variant behind every rating
//! - [`session`] — the state machine walking a queue of due cards

pub mod algorithm;
pub mod session;

pub use algorithm::{preview_intervals, schedule, Quality, Scheduled, MIN_EASE};
pub use session::{RatingTally, ReviewSession, SessionError, SessionState};

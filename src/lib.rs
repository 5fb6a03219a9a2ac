//! Knowledge retention engine
//!
//! Spaced-repetition flashcards and a connection graph over a plain-text
//! vault of markdown notes. The crate is UI-free: it consumes an abstract
//! [`store::FileStore`] and hands back data structures and persisted file
//! writes, nothing else.
//!
//! - [`frontmatter`] — the `---` metadata codec under every record
//! - [`cards`] / [`sources`] — record stores over `Cards/` and `Sources/`
//! - [`review`] — the SM-2 variant scheduler and the session state machine
//! - [`graph`] — relationship queries over a rebuildable full-vault index
//! - [`stats`] — streaks, due counts, review histograms
//! - [`Vault`] — the composition root a host embeds

pub mod cards;
pub mod frontmatter;
pub mod graph;
pub mod review;
pub mod sources;
pub mod stats;
pub mod store;
mod vault;

pub use vault::Vault;

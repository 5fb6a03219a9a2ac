//! Flashcards over the vault
//!
//! A card is a markdown file in the `Cards/` namespace: scheduling fields in
//! frontmatter, the prompt as the first heading, the answer as the rest of
//! the body.

pub mod models;
pub mod store;

pub use models::{Card, DEFAULT_EASE};
pub use store::{CardError, CardStore, LoadDiagnostic};

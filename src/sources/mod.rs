//! Reading sources
//!
//! A source is the book, article, video or podcast a batch of cards was
//! extracted from, stored as a markdown file in the `Sources/` namespace
//! with its reading status in frontmatter.

pub mod models;
pub mod store;

pub use models::{Source, SourceStatus, SourceType};
pub use store::{SourceError, SourceStore};

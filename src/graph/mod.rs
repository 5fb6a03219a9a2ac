//! Connection graph
//!
//! A derived, rebuildable index over every note in the vault — not just
//! cards — answering relationship queries: related cards, auto-link
//! suggestions, cross-source connections and connectivity statistics.
//!
//! The index is never patched in place. Any write through the card or
//! source stores marks the [`IndexCache`] dirty and the next query pays one
//! full rescan. That trades recompute cost for simplicity, which is the
//! right trade at the hundreds-to-low-thousands of notes this targets; a
//! vault beyond that wants incremental inverted maps instead.

mod cache;
mod index;
mod stopwords;

pub use cache::IndexCache;
pub use index::{
    ConnectionIndex, ConnectionStats, CrossSourceConnection, IndexedNote, LinkSuggestion,
    NoteConnections, RelatedNote,
};

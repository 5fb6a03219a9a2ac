//! Vault composition root
//!
//! Wires the stores and the shared connection-index cache over one file
//! store, so every write path invalidates the index without the host
//! having to remember to. A host (Tauri command layer, CLI, tests) embeds
//! exactly one of these per vault.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::cards::{self, Card, CardStore, LoadDiagnostic};
use crate::graph::{ConnectionIndex, IndexCache};
use crate::review::ReviewSession;
use crate::sources::SourceStore;
use crate::stats::{self, VaultStats};
use crate::store::{self, FileStore};

pub struct Vault {
    cards: CardStore,
    sources: SourceStore,
    graph: Arc<IndexCache>,
}

impl Vault {
    pub fn open(store: Arc<dyn FileStore>) -> Self {
        let graph = Arc::new(IndexCache::new(Arc::clone(&store)));
        let cards = CardStore::new(Arc::clone(&store)).with_cache(Arc::clone(&graph));
        let sources = SourceStore::new(store).with_cache(Arc::clone(&graph));
        Self {
            cards,
            sources,
            graph,
        }
    }

    /// Card CRUD. Writes through this store invalidate the graph cache.
    pub fn cards(&self) -> &CardStore {
        &self.cards
    }

    /// Source CRUD, same invalidation wiring.
    pub fn sources(&self) -> &SourceStore {
        &self.sources
    }

    /// Current connection index, rebuilt first if any write dirtied it.
    pub async fn graph(&self) -> store::Result<Arc<ConnectionIndex>> {
        self.graph.get().await
    }

    /// All cards due on or before `today`, plus load diagnostics for any
    /// skipped files.
    pub async fn due_cards(
        &self,
        today: NaiveDate,
    ) -> cards::store::Result<(Vec<Card>, Vec<LoadDiagnostic>)> {
        let (cards, diagnostics) = self.cards.load_all().await?;
        let due = cards.into_iter().filter(|c| c.is_due(today)).collect();
        Ok((due, diagnostics))
    }

    /// Start a review session over today's due cards.
    pub async fn start_review(&self, today: NaiveDate) -> cards::store::Result<ReviewSession> {
        let (due, _) = self.due_cards(today).await?;
        Ok(ReviewSession::start(self.cards.clone(), due, today))
    }

    /// Review statistics over the whole card collection.
    pub async fn stats(&self, today: NaiveDate) -> cards::store::Result<VaultStats> {
        let (cards, _) = self.cards.load_all().await?;
        Ok(stats::compute(&cards, today))
    }
}

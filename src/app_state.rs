//! Implements a struct that holds the state of the JSON API server.

use std::sync::Arc;

use crate::{
    cache::MonthCache, intake::IntakeStore, store::DocumentStore, transaction::TransactionStore,
};

/// The state of the JSON API server.
#[derive(Clone)]
pub struct AppState {
    /// Partition-aware transaction storage.
    pub transactions: TransactionStore,

    /// Partition-aware food-intake storage.
    pub intake: IntakeStore,

    /// Read-through cache of fetched transaction months.
    pub cache: MonthCache,
}

impl AppState {
    /// Create a new [AppState] with every adapter backed by `store`.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            transactions: TransactionStore::new(store.clone()),
            intake: IntakeStore::new(store),
            cache: MonthCache::new(),
        }
    }
}

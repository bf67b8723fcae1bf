//! # Stocktake State
//!
//! Session-only discrepancy log. Never persisted; a restart starts empty.

use std::sync::{Arc, Mutex, MutexGuard};

use namaa_core::{Discrepancy, StocktakeLog};

#[derive(Debug, Clone, Default)]
pub struct StocktakeState {
    log: Arc<Mutex<StocktakeLog>>,
}

impl StocktakeState {
    pub fn new() -> Self {
        Self::default()
    }

    // Mutations are single Vec operations, so a poisoned log is still whole.
    fn lock(&self) -> MutexGuard<'_, StocktakeLog> {
        self.log.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn record(&self, entry: Discrepancy) {
        self.lock().record(entry);
    }

    /// Entries newest first.
    pub fn entries(&self) -> Vec<Discrepancy> {
        self.lock().entries().to_vec()
    }

    pub fn net_diff(&self) -> i64 {
        self.lock().net_diff()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

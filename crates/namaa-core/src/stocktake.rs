//! # Stocktake Log
//!
//! Session-only record of the counts entered during a stocktake.
//! Nothing here is persisted; the product's new stock is the durable result.
//!
//! ```text
//! scan SKU ──► enter counted stock ──► product.stock = counted (absolute)
//!                                          │
//!                                          └──► log.record(old, new) (newest first)
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::{to_millis, Product};

/// Difference between the expected and counted stock of one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Discrepancy {
    pub product_id: String,
    pub name: String,
    pub sku: String,
    pub old_stock: i64,
    pub new_stock: i64,

    /// `new_stock - old_stock`; negative means shrinkage.
    pub diff: i64,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    #[ts(type = "number")]
    pub recorded_at: DateTime<Utc>,
}

impl Discrepancy {
    pub fn new(product: &Product, new_stock: i64, recorded_at: DateTime<Utc>) -> Self {
        Discrepancy {
            product_id: product.id.clone(),
            name: product.name.clone(),
            sku: product.sku.clone(),
            old_stock: product.stock,
            new_stock,
            diff: new_stock - product.stock,
            recorded_at: to_millis(recorded_at),
        }
    }
}

/// Discrepancies for the current session, newest first.
#[derive(Debug, Clone, Default)]
pub struct StocktakeLog {
    entries: Vec<Discrepancy>,
}

impl StocktakeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, entry: Discrepancy) {
        self.entries.insert(0, entry);
    }

    pub fn entries(&self) -> &[Discrepancy] {
        &self.entries
    }

    /// Net change in units across every recorded count.
    pub fn net_diff(&self) -> i64 {
        self.entries.iter().map(|d| d.diff).sum()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

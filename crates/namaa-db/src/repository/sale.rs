//! # Sale Repository
//!
//! Sales are write-once: there is no update or delete.
//!
//! ## Invoice Counter
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │    UPDATE counters SET value = value + 1 WHERE name = 'invoice'         │
//! │    INSERT sale "000N" (only if absent, else bump again)                 │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! The counter and the sale commit together, so a number is never handed
//! out twice and a rolled-back insert does not burn one.

use sqlx::{Sqlite, SqliteConnection, Transaction};
use tracing::{debug, info, warn};

use namaa_core::invoice::format_invoice_id;
use namaa_core::{Collection, Sale};

use crate::error::{DbError, DbResult};
use crate::store::{put_if_version_with, RecordStore};

pub(crate) const INVOICE_COUNTER: &str = "invoice";

/// Attempts to find a free invoice number when ids collide with imported
/// sales that bypassed the counter.
const MAX_INVOICE_SKIPS: usize = 100;

#[derive(Debug, Clone)]
pub struct SaleRepository {
    store: RecordStore,
}

impl SaleRepository {
    pub fn new(store: RecordStore) -> Self {
        SaleRepository { store }
    }

    pub async fn get_all(&self) -> DbResult<Vec<Sale>> {
        self.store.get_all().await
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        self.store.get(id).await
    }

    pub async fn count(&self) -> DbResult<i64> {
        self.store.count(Collection::Sales).await
    }

    /// Invoice number the next sale will receive.
    pub async fn next_invoice_id(&self) -> DbResult<String> {
        let mut conn = self
            .store
            .pool()
            .acquire()
            .await
            .map_err(|e| DbError::read(Collection::Sales, e))?;
        let current = read_counter(&mut conn).await?;
        Ok(format_invoice_id(current + 1))
    }

    /// Records the sale under the next invoice number.
    ///
    /// Whatever id `sale` carries is replaced. Returns the stored sale.
    pub async fn insert_with_next_invoice(&self, mut sale: Sale) -> DbResult<Sale> {
        let mut tx = self
            .store
            .pool()
            .begin()
            .await
            .map_err(|e| DbError::write(Collection::Sales, e))?;

        let mut inserted = false;
        for _ in 0..MAX_INVOICE_SKIPS {
            let number = bump_counter(&mut tx).await?;
            sale.id = format_invoice_id(number);

            match put_if_version_with(&mut *tx, &sale, 0).await {
                Ok(_) => {
                    inserted = true;
                    break;
                }
                Err(e) if e.is_conflict() => {
                    warn!(invoice = %sale.id, "Invoice number already taken, skipping");
                }
                Err(e) => return Err(e),
            }
        }

        if !inserted {
            return Err(DbError::write(
                Collection::Sales,
                "no free invoice number near the counter",
            ));
        }

        commit(tx).await?;
        info!(invoice = %sale.id, total = %sale.total, items = sale.items.len(), "Sale recorded");
        Ok(sale)
    }
}

// =============================================================================
// Counter Helpers
// =============================================================================

async fn read_counter(conn: &mut SqliteConnection) -> DbResult<i64> {
    let value: Option<i64> = sqlx::query_scalar("SELECT value FROM counters WHERE name = ?")
        .bind(INVOICE_COUNTER)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| DbError::read("counters", e))?;
    Ok(value.unwrap_or(0))
}

async fn bump_counter(conn: &mut SqliteConnection) -> DbResult<i64> {
    let value: i64 = sqlx::query_scalar(
        "INSERT INTO counters (name, value) VALUES (?, 1) \
         ON CONFLICT(name) DO UPDATE SET value = value + 1 \
         RETURNING value",
    )
    .bind(INVOICE_COUNTER)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| DbError::write("counters", e))?;
    debug!(value, "Invoice counter bumped");
    Ok(value)
}

/// Raises the invoice counter to at least `floor`. Never lowers it.
pub(crate) async fn raise_counter_with(conn: &mut SqliteConnection, floor: i64) -> DbResult<()> {
    sqlx::query(
        "INSERT INTO counters (name, value) VALUES (?, ?) \
         ON CONFLICT(name) DO UPDATE SET value = MAX(value, excluded.value)",
    )
    .bind(INVOICE_COUNTER)
    .bind(floor)
    .execute(&mut *conn)
    .await
    .map_err(|e| DbError::write("counters", e))?;
    Ok(())
}

async fn commit(tx: Transaction<'_, Sqlite>) -> DbResult<()> {
    tx.commit()
        .await
        .map_err(|e| DbError::write(Collection::Sales, e))
}

// =============================================================================
// Unit Tests
// =============================================================================

//! # Product Repository
//!
//! Product records plus the versioned read-modify-write used for stock.
//!
//! ## Stock Update Loop
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  modify(id, attempts, f)                                                │
//! │                                                                         │
//! │   ┌──► get_versioned(id) ── None ──► Ok(None)                           │
//! │   │        │                                                            │
//! │   │        ▼                                                            │
//! │   │    f(&mut product)                                                  │
//! │   │        │                                                            │
//! │   │        ▼                                                            │
//! │   │    put_if_version(product, v) ── Ok ──► Ok(Some(product))           │
//! │   │        │                                                            │
//! │   └─ VersionConflict (attempts left)                                    │
//! │            │                                                            │
//! │            └── attempts exhausted ──► Err(VersionConflict)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::{debug, warn};

use namaa_core::{Collection, Product};

use crate::error::{DbError, DbResult};
use crate::store::RecordStore;

#[derive(Debug, Clone)]
pub struct ProductRepository {
    store: RecordStore,
}

impl ProductRepository {
    pub fn new(store: RecordStore) -> Self {
        ProductRepository { store }
    }

    pub async fn get_all(&self) -> DbResult<Vec<Product>> {
        self.store.get_all().await
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        self.store.get(id).await
    }

    /// First product carrying this barcode. SKUs are not unique, so a
    /// duplicate resolves to the earliest inserted product.
    pub async fn find_by_sku(&self, sku: &str) -> DbResult<Option<Product>> {
        let body: Option<String> = sqlx::query_scalar(
            "SELECT body FROM products WHERE json_extract(body, '$.sku') = ? ORDER BY rowid LIMIT 1",
        )
        .bind(sku)
        .fetch_optional(self.store.pool())
        .await
        .map_err(|e| DbError::read(Collection::Products, e))?;

        body.map(|b| serde_json::from_str(&b))
            .transpose()
            .map_err(|e| DbError::read(Collection::Products, e))
    }

    /// Inserts or replaces the whole product.
    pub async fn put(&self, product: &Product) -> DbResult<()> {
        self.store.put(product).await?;
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        self.store.delete(Collection::Products, id).await
    }

    /// Applies `f` to the stored product and writes it back only if nobody
    /// wrote it in between, re-reading on conflict.
    ///
    /// Returns `Ok(None)` when the product does not exist.
    pub async fn modify<F>(&self, id: &str, max_attempts: u32, mut f: F) -> DbResult<Option<Product>>
    where
        F: FnMut(&mut Product),
    {
        let attempts = max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;

            let Some(current) = self.store.get_versioned::<Product>(id).await? else {
                return Ok(None);
            };

            let mut product = current.record;
            f(&mut product);

            match self.store.put_if_version(&product, current.version).await {
                Ok(version) => {
                    debug!(id, version, stock = product.stock, "Product updated");
                    return Ok(Some(product));
                }
                Err(e) if e.is_conflict() && attempt < attempts => {
                    warn!(id, attempt, "Product changed concurrently, retrying");
                }
                Err(e) => return Err(e),
            }
        }
    }
}

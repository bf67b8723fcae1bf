//! # Inventory Commands
//!
//! Product CRUD, barcode lookup and stocktaking.
//!
//! ## Stocktake
//! ```text
//! counted 12, system says 15
//!      │
//!      ▼
//! modify(product, stock = 12)       absolute count, not a delta
//!      │
//!      ▼
//! Discrepancy { old: 15, new: 12, diff: -3 } ──► session log (newest first)
//! ```

use tracing::{debug, info};
use uuid::Uuid;

use namaa_core::sku::generate_unique_sku;
use namaa_core::validation::{validate_product, validate_stock};
use namaa_core::{now_millis, Discrepancy, Product};

use crate::error::ApiError;
use crate::state::{AppConfig, DbState, StocktakeState};

pub async fn get_products(db: &DbState) -> Result<Vec<Product>, ApiError> {
    Ok(db.open().await?.products().get_all().await?)
}

pub async fn get_product(db: &DbState, id: &str) -> Result<Product, ApiError> {
    db.open()
        .await?
        .products()
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", id))
}

/// Barcode scan. Duplicate SKUs resolve to the earliest product.
pub async fn find_by_sku(db: &DbState, sku: &str) -> Result<Option<Product>, ApiError> {
    debug!(sku, "find_by_sku command");
    Ok(db.open().await?.products().find_by_sku(sku.trim()).await?)
}

/// A random 4-digit SKU not used by any current product.
pub async fn generate_sku(db: &DbState) -> Result<String, ApiError> {
    let existing = db.open().await?.products().get_all().await?;
    Ok(generate_unique_sku(&existing)?)
}

/// Saves a new product.
///
/// A blank id gets a fresh UUID; a blank SKU gets a generated one. A
/// manually entered SKU is taken as is, even if another product has it.
pub async fn add_product(db: &DbState, mut product: Product) -> Result<Product, ApiError> {
    let database = db.open().await?;

    if product.id.trim().is_empty() {
        product.id = Uuid::new_v4().to_string();
    }
    if product.sku.trim().is_empty() {
        let existing = database.products().get_all().await?;
        product.sku = generate_unique_sku(&existing)?;
    }
    validate_product(&product)?;

    database.products().put(&product).await?;
    info!(id = %product.id, sku = %product.sku, stock = product.stock, "Product added");
    Ok(product)
}

/// Replaces an existing product with the edited version.
pub async fn update_product(db: &DbState, product: Product) -> Result<Product, ApiError> {
    validate_product(&product)?;
    let database = db.open().await?;

    if database.products().get_by_id(&product.id).await?.is_none() {
        return Err(ApiError::not_found("Product", &product.id));
    }

    database.products().put(&product).await?;
    info!(id = %product.id, "Product updated");
    Ok(product)
}

/// Removes a product. Deleting an unknown id is not an error.
pub async fn delete_product(db: &DbState, id: &str) -> Result<(), ApiError> {
    db.open().await?.products().delete(id).await?;
    info!(id, "Product deleted");
    Ok(())
}

/// Sets a product's stock to the counted figure and logs the difference.
pub async fn stocktake(
    db: &DbState,
    config: &AppConfig,
    log: &StocktakeState,
    product_id: &str,
    actual_count: i64,
) -> Result<Discrepancy, ApiError> {
    validate_stock(actual_count)?;
    let database = db.open().await?;

    // The stock seen by the write that landed, not by a retried attempt.
    let mut before: Option<Product> = None;
    database
        .products()
        .modify(product_id, config.stock_write_retries, |p| {
            before = Some(p.clone());
            p.stock = actual_count;
        })
        .await?
        .ok_or_else(|| ApiError::not_found("Product", product_id))?;

    let before = before.ok_or_else(|| ApiError::internal("Stocktake did not read the product"))?;
    let entry = Discrepancy::new(&before, actual_count, now_millis());

    info!(
        product_id,
        old_stock = entry.old_stock,
        new_stock = entry.new_stock,
        diff = entry.diff,
        "Stock counted"
    );

    log.record(entry.clone());
    Ok(entry)
}

/// This session's stocktake discrepancies, newest first.
pub fn stocktake_log(log: &StocktakeState) -> Vec<Discrepancy> {
    log.entries()
}

pub fn clear_stocktake_log(log: &StocktakeState) {
    log.clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{product, seed_products};
    use crate::error::ErrorCode;

    #[tokio::test]
    async fn test_add_product_fills_id_and_sku() {
        let db = DbState::in_memory();
        let mut p = product("", 3, 10);
        p.sku = String::new();

        let saved = add_product(&db, p).await.unwrap();
        assert!(!saved.id.is_empty());
        assert_eq!(saved.sku.len(), 4);
        assert!(saved.sku.chars().all(|c| c.is_ascii_digit()));

        assert_eq!(get_products(&db).await.unwrap(), vec![saved]);
    }

    #[tokio::test]
    async fn test_manual_duplicate_sku_is_accepted() {
        let db = DbState::in_memory();
        let mut a = product("a", 1, 10);
        a.sku = "4821".into();
        let mut b = product("b", 1, 10);
        b.sku = "4821".into();

        add_product(&db, a).await.unwrap();
        add_product(&db, b).await.unwrap();

        let found = find_by_sku(&db, "4821").await.unwrap().unwrap();
        assert_eq!(found.id, "a");
    }

    #[tokio::test]
    async fn test_add_product_validation() {
        let db = DbState::in_memory();
        let err = add_product(&db, product("p1", -1, 10)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(get_products(&db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_generated_sku_avoids_existing() {
        let db = DbState::in_memory();
        let mut p1 = product("p1", 1, 10);
        p1.sku = "4821".into();
        seed_products(&db, vec![p1]).await;

        let sku = generate_sku(&db).await.unwrap();
        assert_ne!(sku, "4821");
        assert_eq!(sku.len(), 4);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let db = DbState::in_memory();
        seed_products(&db, vec![product("p1", 1, 10)]).await;

        let mut p1 = get_product(&db, "p1").await.unwrap();
        p1.name = "Olive oil 1L".into();
        update_product(&db, p1).await.unwrap();
        assert_eq!(get_product(&db, "p1").await.unwrap().name, "Olive oil 1L");

        let err = update_product(&db, product("ghost", 1, 10)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        delete_product(&db, "p1").await.unwrap();
        delete_product(&db, "p1").await.unwrap();
        assert!(get_products(&db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stocktake_sets_absolute_count() {
        let db = DbState::in_memory();
        let log = StocktakeState::new();
        seed_products(&db, vec![product("p1", 15, 10), product("p2", 2, 10)]).await;

        let entry = stocktake(&db, &AppConfig::default(), &log, "p1", 12)
            .await
            .unwrap();
        assert_eq!((entry.old_stock, entry.new_stock, entry.diff), (15, 12, -3));
        assert_eq!(get_product(&db, "p1").await.unwrap().stock, 12);

        stocktake(&db, &AppConfig::default(), &log, "p2", 6)
            .await
            .unwrap();

        let entries = stocktake_log(&log);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].product_id, "p2");
        assert_eq!(log.net_diff(), 1);

        clear_stocktake_log(&log);
        assert!(stocktake_log(&log).is_empty());
    }

    #[tokio::test]
    async fn test_stocktake_errors() {
        let db = DbState::in_memory();
        let log = StocktakeState::new();
        seed_products(&db, vec![product("p1", 1, 10)]).await;

        let err = stocktake(&db, &AppConfig::default(), &log, "ghost", 3)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let err = stocktake(&db, &AppConfig::default(), &log, "p1", -1)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        assert!(stocktake_log(&log).is_empty());
    }
}

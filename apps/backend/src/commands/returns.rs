//! # Return Commands
//!
//! Goods coming back over the counter. A return is not tied to any sale:
//! any product and quantity is accepted.
//!
//! ```text
//! modify(product, stock += qty) ──► append ReturnRecord
//!                                    amount = qty × price now
//! ```

use tracing::{debug, error, info};
use uuid::Uuid;

use namaa_core::validation::validate_quantity;
use namaa_core::{now_millis, ReturnRecord};

use crate::error::ApiError;
use crate::state::{AppConfig, DbState};

/// Puts `quantity` units back on the shelf and records the refund.
pub async fn process_return(
    db: &DbState,
    config: &AppConfig,
    product_id: &str,
    quantity: i64,
    reason: Option<String>,
) -> Result<ReturnRecord, ApiError> {
    debug!(product_id, quantity, "process_return command");
    validate_quantity(quantity)?;

    let database = db.open().await?;

    let product = database
        .products()
        .modify(product_id, config.stock_write_retries, |p| p.stock += quantity)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", product_id))?;

    let record = ReturnRecord {
        id: Uuid::new_v4().to_string(),
        product_id: product.id.clone(),
        product_name: product.name.clone(),
        quantity,
        amount: product.price.multiply_quantity(quantity),
        date: now_millis(),
        reason: reason.filter(|r| !r.trim().is_empty()),
    };

    if let Err(e) = database.returns().append(&record).await {
        error!(
            product_id,
            quantity,
            error = %e,
            "Stock restored but return record was not saved"
        );
        return Err(e.into());
    }

    info!(
        product_id,
        quantity,
        amount = %record.amount,
        stock = product.stock,
        "Return processed"
    );
    Ok(record)
}

pub async fn get_returns(db: &DbState) -> Result<Vec<ReturnRecord>, ApiError> {
    Ok(db.open().await?.returns().get_all().await?)
}

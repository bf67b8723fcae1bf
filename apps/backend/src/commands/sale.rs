//! # Sale Commands
//!
//! ## CompleteSale Saga
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. validate cart, check stock, settle payment      (nothing written)   │
//! │                          │                                              │
//! │                          ▼                                              │
//! │  2. insert sale under next invoice number           (one transaction)   │
//! │        fails ──► error, no stock touched                                │
//! │                          │                                              │
//! │                          ▼                                              │
//! │  3. for each line, in cart order:                                       │
//! │        modify(product, stock -= qty)                (versioned write)   │
//! │        product gone   ──► skipped, warn, continue                       │
//! │        write failed   ──► stop, PARTIAL_SALE report                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Step 3 is not rolled back when it stops: the sale is already recorded.
//! The report names the products whose stock was changed so the operator
//! can reconcile the rest by stocktake.

use serde::Serialize;
use tracing::{debug, error, info, warn};
use ts_rs::TS;

use namaa_core::checkout::{build_sale, check_stock, validate_items};
use namaa_core::{now_millis, Sale, SaleDraft};

use crate::error::{ApiError, PartialSale};
use crate::state::{AppConfig, DbState, Session};

/// Result of a completed sale.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleOutcome {
    pub sale: Sale,

    /// Line items whose product was deleted after the stock check; recorded
    /// on the sale but no stock was taken.
    pub skipped: Vec<String>,
}

/// Records a sale and takes its items out of stock.
///
/// The cashier's name on the sale comes from `session`.
pub async fn complete_sale(
    db: &DbState,
    config: &AppConfig,
    session: &Session,
    mut draft: SaleDraft,
) -> Result<SaleOutcome, ApiError> {
    debug!(items = draft.items.len(), method = ?draft.payment_method, "complete_sale command");

    validate_items(&draft.items)?;
    draft.user_name = Some(session.user_name.clone());

    let database = db.open().await?;
    let products = database.products();

    let current = products.get_all().await?;
    check_stock(&draft.items, &current)?;

    let sale = build_sale(String::new(), &draft, now_millis())?;
    let sale = database.sales().insert_with_next_invoice(sale).await?;

    let mut applied = Vec::new();
    let mut skipped = Vec::new();

    for (index, item) in sale.items.iter().enumerate() {
        let quantity = item.quantity;
        let result = products
            .modify(&item.product_id, config.stock_write_retries, |p| {
                p.stock -= quantity
            })
            .await;

        match result {
            Ok(Some(product)) => {
                debug!(product_id = %product.id, stock = product.stock, "Stock decremented");
                applied.push(item.product_id.clone());
            }
            Ok(None) => {
                warn!(
                    invoice = %sale.id,
                    product_id = %item.product_id,
                    "Sold product no longer exists, stock not updated"
                );
                skipped.push(item.product_id.clone());
            }
            Err(e) => {
                let pending: Vec<String> = sale.items[index + 1..]
                    .iter()
                    .map(|i| i.product_id.clone())
                    .collect();

                error!(
                    invoice = %sale.id,
                    failed = %item.product_id,
                    applied = ?applied,
                    pending = ?pending,
                    error = %e,
                    "Sale recorded but stock update stopped"
                );

                return Err(ApiError::partial_sale(PartialSale {
                    sale_id: sale.id.clone(),
                    applied,
                    failed_product_id: item.product_id.clone(),
                    reason: e.to_string(),
                    pending,
                }));
            }
        }
    }

    info!(
        invoice = %sale.id,
        total = %config.format_currency(sale.total.minor()),
        lines = sale.items.len(),
        units = sale.total_quantity(),
        skipped = skipped.len(),
        "Sale completed"
    );

    Ok(SaleOutcome { sale, skipped })
}

/// Invoice number the next sale will receive, for the POS header.
pub async fn next_invoice_id(db: &DbState) -> Result<String, ApiError> {
    Ok(db.open().await?.sales().next_invoice_id().await?)
}

pub async fn get_sales(db: &DbState) -> Result<Vec<Sale>, ApiError> {
    Ok(db.open().await?.sales().get_all().await?)
}

pub async fn get_sale(db: &DbState, invoice_id: &str) -> Result<Sale, ApiError> {
    db.open()
        .await?
        .sales()
        .get_by_id(invoice_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Sale", invoice_id))
}

// =============================================================================
// Unit Tests
// =============================================================================

//! # Checkout
//!
//! Pure checks and assembly for turning a cart into a [`Sale`].
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SaleDraft (cart + payment)                                             │
//! │       │                                                                 │
//! │       ├── validate_items()   empty cart? quantity <= 0?                 │
//! │       ├── check_stock()      enough on the shelf right now?             │
//! │       ├── settle_payment()   cash: paid >= total, change = paid - total │
//! │       ▼                                                                 │
//! │  build_sale(invoice_id) ──► Sale (immutable from here on)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The stock check is advisory: it runs against a read that may be stale by
//! the time stock is written. The authoritative guard is the versioned stock
//! write in the backend.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{to_millis, CartItem, PaymentMethod, Product, Sale};
use crate::validation::validate_quantity;

/// What the POS screen hands over when the cashier presses "pay".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleDraft {
    /// Line items in the order they were added to the cart.
    pub items: Vec<CartItem>,

    pub payment_method: PaymentMethod,

    /// Cash tendered. Ignored for non-cash methods; defaults to the exact
    /// total when omitted for cash.
    #[serde(default)]
    pub amount_paid: Option<Money>,

    /// Name of the cashier completing the sale.
    #[serde(default)]
    pub user_name: Option<String>,
}

impl SaleDraft {
    /// Sum of line totals.
    pub fn total(&self) -> Money {
        self.items.iter().map(CartItem::line_total).sum()
    }
}

/// Rejects empty carts and non-positive quantities.
pub fn validate_items(items: &[CartItem]) -> CoreResult<()> {
    if items.is_empty() {
        return Err(CoreError::EmptyCart);
    }
    for item in items {
        validate_quantity(item.quantity)?;
    }
    Ok(())
}

/// Checks requested quantities against current stock.
///
/// Quantities for the same product across several lines are added up. A
/// line whose product is not in `products` has nothing on the shelf and
/// fails with `available: 0`.
pub fn check_stock(items: &[CartItem], products: &[Product]) -> CoreResult<()> {
    let by_id: HashMap<&str, &Product> = products.iter().map(|p| (p.id.as_str(), p)).collect();

    let mut requested: Vec<(&CartItem, i64)> = Vec::new();
    for item in items {
        match requested
            .iter_mut()
            .find(|(first, _)| first.product_id == item.product_id)
        {
            Some((_, qty)) => *qty += item.quantity,
            None => requested.push((item, item.quantity)),
        }
    }

    for (item, qty) in requested {
        match by_id.get(item.product_id.as_str()) {
            Some(product) if product.can_sell(qty) => {}
            Some(product) => {
                return Err(CoreError::InsufficientStock {
                    product_id: product.id.clone(),
                    name: product.name.clone(),
                    available: product.stock,
                    requested: qty,
                });
            }
            None => {
                return Err(CoreError::InsufficientStock {
                    product_id: item.product_id.clone(),
                    name: item.product_name.clone(),
                    available: 0,
                    requested: qty,
                });
            }
        }
    }

    Ok(())
}

/// Works out `(amount_paid, change)` for the sale record.
///
/// Only cash carries tendered/change amounts.
pub fn settle_payment(
    method: PaymentMethod,
    total: Money,
    amount_paid: Option<Money>,
) -> CoreResult<(Option<Money>, Option<Money>)> {
    if !method.is_cash() {
        return Ok((None, None));
    }

    let paid = amount_paid.unwrap_or(total);
    if paid < total {
        return Err(CoreError::InsufficientPayment {
            paid: paid.to_string(),
            total: total.to_string(),
        });
    }

    Ok((Some(paid), Some(paid - total)))
}

/// Assembles the immutable sale record under the given invoice id.
///
/// `date` is kept to the millisecond, as stored.
pub fn build_sale(invoice_id: String, draft: &SaleDraft, date: DateTime<Utc>) -> CoreResult<Sale> {
    validate_items(&draft.items)?;

    let total = draft.total();
    let (amount_paid, change) = settle_payment(draft.payment_method, total, draft.amount_paid)?;

    Ok(Sale {
        id: invoice_id,
        items: draft.items.clone(),
        total,
        date: to_millis(date),
        payment_method: draft.payment_method,
        user_name: draft.user_name.clone(),
        amount_paid,
        change,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, stock: i64, price: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            sku: "1000".to_string(),
            price: Money::from_minor(price),
            cost: Money::zero(),
            stock,
            category: String::new(),
            expiry_date: None,
        }
    }

    fn item(id: &str, qty: i64, price: i64) -> CartItem {
        CartItem {
            product_id: id.to_string(),
            product_name: format!("Product {}", id),
            price: Money::from_minor(price),
            quantity: qty,
        }
    }

    fn draft(items: Vec<CartItem>, method: PaymentMethod, paid: Option<i64>) -> SaleDraft {
        SaleDraft {
            items,
            payment_method: method,
            amount_paid: paid.map(Money::from_minor),
            user_name: Some("Salma".to_string()),
        }
    }

    #[test]
    fn test_empty_cart_rejected() {
        assert!(matches!(validate_items(&[]), Err(CoreError::EmptyCart)));
        assert!(validate_items(&[item("p1", 0, 10)]).is_err());
    }

    #[test]
    fn test_stock_check_sums_duplicate_lines() {
        let products = vec![product("p1", 5, 10)];
        assert!(check_stock(&[item("p1", 3, 10)], &products).is_ok());

        let err = check_stock(&[item("p1", 3, 10), item("p1", 3, 10)], &products).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientStock {
                available: 5,
                requested: 6,
                ..
            }
        ));
    }

    #[test]
    fn test_stock_check_rejects_unknown_products() {
        let products = vec![product("p1", 5, 10)];
        let err = check_stock(&[item("p1", 1, 10), item("ghost", 3, 10)], &products).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientStock {
                ref product_id,
                available: 0,
                requested: 3,
                ..
            } if product_id == "ghost"
        ));
    }

    #[test]
    fn test_cash_change() {
        let (paid, change) =
            settle_payment(PaymentMethod::Cash, Money::from_minor(20), Some(Money::from_minor(50)))
                .unwrap();
        assert_eq!(paid, Some(Money::from_minor(50)));
        assert_eq!(change, Some(Money::from_minor(30)));

        assert!(settle_payment(
            PaymentMethod::Cash,
            Money::from_minor(20),
            Some(Money::from_minor(19))
        )
        .is_err());
    }

    #[test]
    fn test_card_has_no_change() {
        let (paid, change) =
            settle_payment(PaymentMethod::BankCard, Money::from_minor(20), Some(Money::from_minor(5)))
                .unwrap();
        assert_eq!((paid, change), (None, None));
    }

    #[test]
    fn test_build_sale() {
        let d = draft(vec![item("p1", 2, 10)], PaymentMethod::Cash, Some(20));
        let sale = build_sale("0001".to_string(), &d, Utc::now()).unwrap();

        assert_eq!(sale.id, "0001");
        assert_eq!(sale.total, Money::from_minor(20));
        assert_eq!(sale.change, Some(Money::zero()));
        assert_eq!(sale.items.len(), 1);
        assert_eq!(sale.user_name.as_deref(), Some("Salma"));
    }
}

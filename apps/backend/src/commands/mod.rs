//! # Commands Module
//!
//! Every operation the UI can invoke.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs        ◄─── You are here (exports)
//! ├── sale.rs       ◄─── CompleteSale saga, invoice numbers
//! ├── returns.rs    ◄─── ProcessReturn
//! ├── inventory.rs  ◄─── Product CRUD, SKU lookup/generation, stocktake
//! ├── users.rs      ◄─── Login, add/delete operators
//! ├── settings.rs   ◄─── First-run setup, UpsertSettings
//! ├── backup.rs     ◄─── Export, prepare/apply restore
//! └── reports.rs    ◄─── Sales summary, alerts, storage usage
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  UI                                                                     │
//! │  ──                                                                     │
//! │  completeSale({ items, paymentMethod, amountPaid })                     │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Rust Backend                                                           │
//! │  ────────────                                                           │
//! │  async fn complete_sale(                                                │
//! │      db: &DbState,          ◄── store handle                           │
//! │      config: &AppConfig,    ◄── retries, thresholds                    │
//! │      session: &Session,     ◄── who is at the till                     │
//! │      draft: SaleDraft,      ◄── from the UI (JSON)                     │
//! │  ) -> Result<SaleOutcome, ApiError>                                     │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  UI receives: SaleOutcome or { code, message }                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every mutation goes to the store before the UI updates its own copy, so
//! the store stays the source of truth.

pub mod backup;
pub mod inventory;
pub mod reports;
pub mod returns;
pub mod sale;
pub mod settings;
pub mod users;

#[cfg(test)]
pub(crate) mod test_support {
    use namaa_core::{CartItem, Money, PaymentMethod, Product, SaleDraft, UserRole};

    use crate::state::{DbState, Session};

    pub fn product(id: &str, stock: i64, price: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            sku: format!("SKU-{}", id),
            price: Money::from_minor(price),
            cost: Money::zero(),
            stock,
            category: String::new(),
            expiry_date: None,
        }
    }

    pub async fn seed_products(db: &DbState, products: Vec<Product>) {
        let repo = db.open().await.unwrap().products();
        for p in &products {
            repo.put(p).await.unwrap();
        }
    }

    /// Cash sale paying the exact total. Lines are `(product_id, qty, price)`.
    pub fn draft(lines: &[(&str, i64, i64)]) -> SaleDraft {
        SaleDraft {
            items: lines
                .iter()
                .map(|(id, qty, price)| CartItem {
                    product_id: id.to_string(),
                    product_name: format!("Product {}", id),
                    price: Money::from_minor(*price),
                    quantity: *qty,
                })
                .collect(),
            payment_method: PaymentMethod::Cash,
            amount_paid: None,
            user_name: None,
        }
    }

    pub fn admin() -> Session {
        Session {
            user_id: "admin".to_string(),
            user_name: "Admin".to_string(),
            role: UserRole::Admin,
        }
    }

    pub fn cashier() -> Session {
        Session {
            user_id: "u-salma".to_string(),
            user_name: "Salma".to_string(),
            role: UserRole::Cashier,
        }
    }
}

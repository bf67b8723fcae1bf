//! # Domain Types
//!
//! Entity records persisted by the store and exchanged with the UI.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │  ReturnRecord   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id ("0001")    │   │  id             │       │
//! │  │  sku (barcode)  │   │  items[]        │   │  productId      │       │
//! │  │  price / cost   │   │  total          │   │  quantity       │       │
//! │  │  stock          │   │  paymentMethod  │   │  amount         │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                              │
//! │  │     User        │   │  StoreSettings  │  (singleton, id "settings") │
//! │  └─────────────────┘   └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Format
//! Field names are camelCase and timestamps are epoch milliseconds, so a
//! record reads the same in the store, in a backup file, and in the UI.

use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

/// Fixed identifier of the store settings singleton.
pub const SETTINGS_ID: &str = "settings";

/// Identifier given to the administrator created during first-run setup.
pub const SETUP_ADMIN_ID: &str = "admin";

// =============================================================================
// Timestamps
// =============================================================================

/// Cuts `at` to whole milliseconds, the precision timestamps are stored at.
#[inline]
pub fn to_millis(at: DateTime<Utc>) -> DateTime<Utc> {
    at.trunc_subsecs(3)
}

/// The current time at stored precision.
///
/// Every record timestamp comes from here, so a freshly built record equals
/// the one read back from the store.
pub fn now_millis() -> DateTime<Utc> {
    to_millis(Utc::now())
}

// =============================================================================
// Product
// =============================================================================

/// A product on the shelf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    /// Unique identifier.
    pub id: String,

    /// Display name shown to cashier and on receipt.
    pub name: String,

    /// Barcode. Intended to be unique, never enforced.
    pub sku: String,

    /// Sale price.
    pub price: Money,

    /// Purchase price (for profit reports).
    #[serde(default)]
    pub cost: Money,

    /// Units on hand. Non-negative by convention only.
    pub stock: i64,

    #[serde(default)]
    pub category: String,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_milliseconds_option"
    )]
    #[ts(type = "number | null")]
    pub expiry_date: Option<DateTime<Utc>>,
}

impl Product {
    /// Checks whether `quantity` units can be taken from the current stock.
    #[inline]
    pub fn can_sell(&self, quantity: i64) -> bool {
        self.stock >= quantity
    }

    /// Classifies the product's expiry date relative to `now`.
    ///
    /// Products without an expiry date are always [`ExpiryStatus::Fresh`].
    pub fn expiry_status(&self, now: DateTime<Utc>, warning_window: Duration) -> ExpiryStatus {
        match self.expiry_date {
            Some(expiry) if expiry < now => ExpiryStatus::Expired,
            Some(expiry) if expiry < now + warning_window => ExpiryStatus::ExpiringSoon,
            _ => ExpiryStatus::Fresh,
        }
    }
}

/// Where a product stands relative to its expiry date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ExpiryStatus {
    Fresh,
    ExpiringSoon,
    Expired,
}

// =============================================================================
// Cart Item
// =============================================================================

/// A line item of a sale.
///
/// Name and price are snapshots taken when the product went into the cart;
/// later product edits never reach back into recorded sales.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartItem {
    pub product_id: String,

    /// Product name at time of sale (frozen).
    pub product_name: String,

    /// Unit price at time of sale (frozen).
    pub price: Money,

    pub quantity: i64,
}

impl CartItem {
    /// Freezes a product's name and price into a line item.
    pub fn from_product(product: &Product, quantity: i64) -> Self {
        CartItem {
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            price: product.price,
            quantity,
        }
    }

    /// Unit price × quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.price.multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// How the customer paid.
///
/// Serialized names are the shop's display labels ("Bank Card").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum PaymentMethod {
    Cash,
    #[serde(rename = "Bank Card")]
    BankCard,
    #[serde(rename = "Yusur Pay")]
    YusurPay,
    MobiCash,
    #[serde(rename = "Masrafy Pay")]
    MasrafyPay,
    #[serde(rename = "Sahary Pay")]
    SaharyPay,
    #[serde(rename = "One Pay")]
    OnePay,
    Transfer,
}

impl PaymentMethod {
    /// Returns true for physical cash (the only method with tendered/change).
    #[inline]
    pub const fn is_cash(&self) -> bool {
        matches!(self, PaymentMethod::Cash)
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A recorded sale. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Sale {
    /// Invoice number, zero-padded ("0001").
    pub id: String,

    /// Line items in cart order.
    pub items: Vec<CartItem>,

    pub total: Money,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    #[ts(type = "number")]
    pub date: DateTime<Utc>,

    pub payment_method: PaymentMethod,

    /// Cashier name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,

    /// Cash handed over by the customer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_paid: Option<Money>,

    /// Cash handed back.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change: Option<Money>,
}

impl Sale {
    /// Total units across all line items, for the receipt footer and logs.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

// =============================================================================
// Return Record
// =============================================================================

/// Goods brought back by a customer. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ReturnRecord {
    pub id: String,
    pub product_id: String,

    /// Product name at time of return (frozen).
    pub product_name: String,

    pub quantity: i64,

    /// Refunded value: quantity × product price at time of return.
    pub amount: Money,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    #[ts(type = "number")]
    pub date: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

// =============================================================================
// User
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum UserRole {
    Admin,
    Cashier,
}

/// An operator account.
///
/// The password is a 4-digit PIN kept in clear text, exactly as the shop's
/// existing data stores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct User {
    pub id: String,
    pub name: String,

    #[serde(default)]
    pub password: String,

    pub role: UserRole,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    #[ts(type = "number")]
    pub created_at: DateTime<Utc>,
}

impl User {
    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

// =============================================================================
// Store Settings
// =============================================================================

/// Shop identity printed on receipts. Singleton keyed by [`SETTINGS_ID`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StoreSettings {
    #[serde(default = "settings_id")]
    pub id: String,

    pub store_name: String,

    #[serde(default)]
    pub address: String,

    #[serde(default)]
    pub phone: String,

    /// Slogan or short description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub is_setup_complete: bool,
}

fn settings_id() -> String {
    SETTINGS_ID.to_string()
}

impl StoreSettings {
    /// Creates settings under the fixed singleton identifier.
    pub fn new(
        store_name: impl Into<String>,
        address: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        StoreSettings {
            id: settings_id(),
            store_name: store_name.into(),
            address: address.into(),
            phone: phone.into(),
            description: None,
            is_setup_complete: false,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

//! # namaa-core: Pure Business Logic for Namaa POS
//!
//! Entity types and business rules with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Namaa POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    UI (out of this workspace)                   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    namaa-backend (operations)                   │   │
//! │  │    complete_sale, process_return, stocktake, restore, ...       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ namaa-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │ checkout  │  │ validation│  │   │
//! │  │   │  record   │  │  invoice  │  │  reports  │  │ stocktake │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • PURE FUNCTIONS                         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    namaa-db (Record Store)                      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entities (Product, Sale, ReturnRecord, User, StoreSettings)
//! - [`record`] - Collections and the `Record` trait the store is generic over
//! - [`money`] - Integer money in dirhams
//! - [`checkout`] - Cart checks and sale assembly
//! - [`invoice`] - Invoice number formatting
//! - [`reports`] - Revenue, profit and inventory alerts
//! - [`stocktake`] - Session discrepancy log
//! - [`sku`] - Random 4-digit SKU generation
//! - [`validation`] - Input rules
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use namaa_core::invoice::format_invoice_id;
//! use namaa_core::Money;
//!
//! let price = Money::from_minor(2500);
//! assert_eq!((price * 2).to_string(), "5.000");
//! assert_eq!(format_invoice_id(7), "0007");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod error;
pub mod invoice;
pub mod money;
pub mod record;
pub mod reports;
pub mod sku;
pub mod stocktake;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use checkout::SaleDraft;
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use record::{Collection, Record};
pub use stocktake::{Discrepancy, StocktakeLog};
pub use types::*;

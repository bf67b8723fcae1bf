//! # Repository Module
//!
//! Typed views over the record store, one per collection.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Backend command                                                        │
//! │       │  db.products().modify("p1", 5, |p| p.stock -= 2)               │
//! │       ▼                                                                 │
//! │  ProductRepository ──► RecordStore ──► SQLite `products` table          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - [`ProductRepository`] - products, SKU lookup, versioned stock updates
//! - [`SaleRepository`] - write-once sales, invoice counter
//! - [`UserRepository`] - operator accounts
//! - [`SettingsRepository`] - the settings singleton, first-run setup
//! - [`ReturnRepository`] - append-only returns

pub mod product;
pub mod returns;
pub mod sale;
pub mod settings;
pub mod user;

pub use product::ProductRepository;
pub use returns::ReturnRepository;
pub use sale::SaleRepository;
pub use settings::SettingsRepository;
pub use user::UserRepository;

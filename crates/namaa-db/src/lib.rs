//! # namaa-db: Record Store for Namaa POS
//!
//! Local persistence on SQLite via sqlx: one table per collection, JSON
//! record bodies, versioned rows.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Namaa POS Data Flow                              │
//! │                                                                         │
//! │  Backend command (complete_sale)                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     namaa-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │  RecordStore  │    │  (embedded)  │  │   │
//! │  │   │               │◄───│  (store.rs)   │    │  001..004    │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                        ┌───────────────┐                      │   │
//! │  │                        │ BackupEngine  │                      │   │
//! │  │                        │  (backup.rs)  │                      │   │
//! │  │                        └───────────────┘                      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (WAL)                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Opening the store, open-once handle, diagnostics
//! - [`migrations`] - Embedded schema migrations
//! - [`store`] - Generic get-all / put / delete and versioned writes
//! - [`repository`] - Typed per-collection access
//! - [`backup`] - Snapshot export and merge restore
//! - [`error`] - Store error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use namaa_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("namaa.db")).await?;
//! let products = db.products().get_all().await?;
//! let next = db.sales().next_invoice_id().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod backup;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use backup::{BackupEngine, RestorePreview, RestoreReport, Snapshot, SnapshotData};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig, SharedDatabase, StorageUsage};
pub use store::{RecordStore, Versioned};

pub use repository::{
    ProductRepository, ReturnRepository, SaleRepository, SettingsRepository, UserRepository,
};

//! # Namaa Backend Library
//!
//! The layer the POS screens call into: configuration, logging, the boot
//! sequence and every domain operation.
//!
//! ## Module Organization
//! ```text
//! namaa_backend/
//! ├── lib.rs          ◄─── You are here (boot & logging)
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── db.rs       ◄─── Open-once store handle
//! │   ├── config.rs   ◄─── AppConfig (defaults → TOML → NAMAA_* env)
//! │   ├── session.rs  ◄─── Logged-in operator
//! │   └── stocktake.rs◄─── Session-only discrepancy log
//! ├── commands/       ◄─── Domain operations
//! └── error.rs        ◄─── API error type for commands
//! ```
//!
//! ## Boot Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Application Startup                               │
//! │                                                                         │
//! │  1. Initialize Logging ───────────────────────────────────────────────► │
//! │     • tracing-subscriber with env filter (default INFO, RUST_LOG)       │
//! │                                                                         │
//! │  2. Request Persistence ──────────────────────────────────────────────► │
//! │     • make sure the data directory exists; failure is only logged      │
//! │                                                                         │
//! │  3. Open Store ───────────────────────────────────────────────────────► │
//! │     • SQLite with WAL mode, pending migrations applied                  │
//! │     • failure ──► STORAGE_UNAVAILABLE ("cannot load data")              │
//! │                                                                         │
//! │  4. Load Collections ─────────────────────────────────────────────────► │
//! │     • settings, users, products, sales, returns                         │
//! │                                                                         │
//! │  5. Branch ───────────────────────────────────────────────────────────► │
//! │     • no settings ──► NeedsSetup                                        │
//! │     • settings    ──► Ready (login screen)                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod error;
pub mod state;

use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use ts_rs::TS;

use namaa_core::{Product, ReturnRecord, Sale, StoreSettings, User};
use namaa_db::DbConfig;

use error::{ApiError, ErrorCode};
use state::{AppConfig, DbState, StocktakeState};

/// Everything commands need, built once at boot.
#[derive(Debug)]
pub struct Backend {
    pub db: DbState,
    pub config: AppConfig,
    pub stocktake: StocktakeState,
}

/// Collections loaded at startup for the UI's working copy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LoadedData {
    pub settings: Option<StoreSettings>,
    pub users: Vec<User>,
    pub products: Vec<Product>,
    pub sales: Vec<Sale>,
    pub returns: Vec<ReturnRecord>,
}

/// Which screen the UI opens on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum BootState {
    /// No settings record: first-run setup.
    NeedsSetup,
    /// Set up: login.
    Ready,
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=namaa=trace` - Show trace for namaa crates only
/// - Default: INFO level
///
/// Safe to call more than once; later calls do nothing.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Best-effort request that the store's location be kept.
///
/// Creates the directory holding the store file. Returns whether it is
/// available; a failure is logged and boot carries on.
pub fn request_persistence(database_path: &Path) -> bool {
    let Some(dir) = database_path.parent().filter(|d| !d.as_os_str().is_empty()) else {
        return true;
    };

    match std::fs::create_dir_all(dir) {
        Ok(()) => true,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "Could not prepare data directory");
            false
        }
    }
}

/// Runs the boot sequence against the configured store.
pub async fn boot(config: AppConfig) -> Result<(Backend, LoadedData, BootState), ApiError> {
    info!("Starting Namaa POS backend");

    let path = config
        .resolve_database_path()
        .map_err(|e| ApiError::new(ErrorCode::StorageUnavailable, e.to_string()))?;
    info!(path = %path.display(), "Database path determined");

    if config.request_persistence {
        request_persistence(&path);
    }

    boot_with(DbConfig::new(path), config).await
}

/// Boot against an explicit store configuration.
pub async fn boot_with(
    db_config: DbConfig,
    config: AppConfig,
) -> Result<(Backend, LoadedData, BootState), ApiError> {
    let db = DbState::new(db_config);
    let data = load_all(&db).await?;

    let state = if data.settings.is_some() {
        BootState::Ready
    } else {
        BootState::NeedsSetup
    };

    info!(
        ?state,
        users = data.users.len(),
        products = data.products.len(),
        sales = data.sales.len(),
        "Store loaded"
    );

    let backend = Backend {
        db,
        config,
        stocktake: StocktakeState::new(),
    };
    Ok((backend, data, state))
}

/// Reads every collection. Fails as a whole if any read fails.
pub async fn load_all(db: &DbState) -> Result<LoadedData, ApiError> {
    let database = db.open().await?;
    Ok(LoadedData {
        settings: database.settings().get().await?,
        users: database.users().get_all().await?,
        products: database.products().get_all().await?,
        sales: database.sales().get_all().await?,
        returns: database.returns().get_all().await?,
    })
}

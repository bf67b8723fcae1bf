//! # Store Handle
//!
//! Opening the SQLite file, pool configuration, and the open-once handle.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Store Lifecycle                                    │
//! │                                                                         │
//! │  Boot                                                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SharedDatabase::open() ──► first caller runs Database::new(config)    │
//! │       │                     concurrent callers await the same future   │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────┐                           │
//! │  │            SqlitePool (WAL)              │                           │
//! │  └─────────────────────────────────────────┘                           │
//! │       │                                                                 │
//! │       ├── store()     generic record access                            │
//! │       ├── products() / sales() / users() / settings() / returns()      │
//! │       ├── backup()    snapshot export / restore                        │
//! │       └── storage_usage(), health_check()                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::backup::BackupEngine;
use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::{
    ProductRepository, ReturnRepository, SaleRepository, SettingsRepository, UserRepository,
};
use crate::store::RecordStore;

const MEMORY_PATH: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// Store configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("/path/to/namaa.db")
///     .max_connections(5)
///     .min_connections(1);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite file. Created if absent.
    pub database_path: PathBuf,

    /// Default: 5
    pub max_connections: u32,

    /// Default: 1
    pub min_connections: u32,

    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Default: 10 minutes
    pub idle_timeout: Duration,

    /// Whether to migrate on open. Default: true
    pub run_migrations: bool,
}

impl DbConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Private in-memory store (for testing).
    ///
    /// Each call yields an isolated database. A single connection is kept so
    /// the data lives as long as the pool.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(MEMORY_PATH),
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            run_migrations: true,
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == MEMORY_PATH
    }

    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        let options = if self.is_in_memory() {
            SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
        } else {
            SqliteConnectOptions::new()
                .filename(&self.database_path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
        };

        Ok(options
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true))
    }
}

// =============================================================================
// Database
// =============================================================================

/// Open store handle. Cheap to clone; clones share the pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

/// Space taken by the store file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageUsage {
    pub page_count: i64,
    pub page_size: i64,
}

impl StorageUsage {
    pub fn bytes(&self) -> i64 {
        self.page_count * self.page_size
    }
}

impl Database {
    /// Opens (creating if absent) the store and brings the schema current.
    ///
    /// Any failure here is a `ConnectionFailed` or `MigrationFailed`; the
    /// session cannot continue without a store.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Opening record store"
        );

        let connect_options = config.connect_options()?;
        debug!("Connection options configured");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(max_connections = config.max_connections, "Store pool created");

        let db = Database { pool };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Applies pending migrations. Safe to call repeatedly.
    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// Current schema version.
    pub async fn schema_version(&self) -> DbResult<i64> {
        migrations::schema_version(&self.pool).await
    }

    /// Raw pool access for statements the repositories do not cover.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Generic collection access.
    pub fn store(&self) -> RecordStore {
        RecordStore::new(self.pool.clone())
    }

    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.store())
    }

    pub fn sales(&self) -> SaleRepository {
        SaleRepository::new(self.store())
    }

    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.store())
    }

    pub fn settings(&self) -> SettingsRepository {
        SettingsRepository::new(self.store())
    }

    pub fn returns(&self) -> ReturnRepository {
        ReturnRepository::new(self.store())
    }

    /// Snapshot export and restore.
    pub fn backup(&self) -> BackupEngine {
        BackupEngine::new(self.pool.clone())
    }

    /// Bytes used by the store file (page_count × page_size).
    pub async fn storage_usage(&self) -> DbResult<StorageUsage> {
        let page_count: i64 = sqlx::query_scalar("PRAGMA page_count")
            .fetch_one(&self.pool)
            .await?;
        let page_size: i64 = sqlx::query_scalar("PRAGMA page_size")
            .fetch_one(&self.pool)
            .await?;
        Ok(StorageUsage {
            page_count,
            page_size,
        })
    }

    /// Closes the pool. Later calls fail with `ConnectionFailed`.
    pub async fn close(&self) {
        info!("Closing record store");
        self.pool.close().await;
    }

    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Open-once Handle
// =============================================================================

/// Lazily opened store shared by every caller.
///
/// The first `open()` opens and migrates; callers arriving while that is in
/// flight wait for it and receive the same handle. A failed open leaves the
/// cell empty so the next call tries again.
#[derive(Debug)]
pub struct SharedDatabase {
    config: DbConfig,
    cell: OnceCell<Database>,
}

impl SharedDatabase {
    pub fn new(config: DbConfig) -> Self {
        SharedDatabase {
            config,
            cell: OnceCell::new(),
        }
    }

    pub async fn open(&self) -> DbResult<&Database> {
        self.cell
            .get_or_try_init(|| Database::new(self.config.clone()))
            .await
    }

    /// The handle if it has been opened.
    pub fn get(&self) -> Option<&Database> {
        self.cell.get()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.health_check().await);
    }

    #[tokio::test]
    async fn test_in_memory_stores_are_isolated() {
        let a = Database::new(DbConfig::in_memory()).await.unwrap();
        let b = Database::new(DbConfig::in_memory()).await.unwrap();

        sqlx::query("INSERT INTO users (id, body, version) VALUES ('u1', '{}', 1)")
            .execute(a.pool())
            .await
            .unwrap();

        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(b.pool())
            .await
            .unwrap();
        assert_eq!(n, 0);
    }

    #[tokio::test]
    async fn test_config_builder() {
        let config = DbConfig::new("/tmp/test.db")
            .max_connections(10)
            .min_connections(2)
            .run_migrations(false);

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
        assert!(!config.run_migrations);
        assert!(!config.is_in_memory());
        assert!(DbConfig::in_memory().is_in_memory());
    }

    #[tokio::test]
    async fn test_concurrent_open_shares_one_handle() {
        let dir = tempfile::tempdir().unwrap();
        let shared = SharedDatabase::new(DbConfig::new(dir.path().join("namaa.db")));

        let (a, b, c) = tokio::join!(shared.open(), shared.open(), shared.open());
        let (a, b, c) = (a.unwrap(), b.unwrap(), c.unwrap());

        assert!(std::ptr::eq(a, b));
        assert!(std::ptr::eq(b, c));
        assert!(a.health_check().await);
    }

    #[tokio::test]
    async fn test_reopen_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("namaa.db");

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        sqlx::query("INSERT INTO products (id, body, version) VALUES ('p1', '{}', 1)")
            .execute(db.pool())
            .await
            .unwrap();
        db.close().await;

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(n, 1);

        let usage = db.storage_usage().await.unwrap();
        assert!(usage.bytes() > 0);
    }

    #[tokio::test]
    async fn test_unopenable_path_fails_to_connect() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("namaa.db");

        let err = Database::new(DbConfig::new(path).connect_timeout(Duration::from_secs(2)))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ConnectionFailed(_)));
    }
}

//! # Schema Migrations
//!
//! Embedded SQL migrations that evolve the set of collections.
//!
//! ## Schema History
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Version │ File                        │ Change                         │
//! │  ─────── │ ─────────────────────────── │ ────────────────────────────── │
//! │  1       │ 001_initial_collections.sql │ + products, sales, customers   │
//! │  2       │ 002_users_settings.sql      │ + users, settings − customers  │
//! │  3       │ 003_returns.sql             │ + returns                      │
//! │  4       │ 004_counters.sql            │ + counters (invoice seeded)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rules
//! - New collections are created without touching existing ones
//!   (`CREATE TABLE IF NOT EXISTS`), so stores laid out before migrations
//!   were tracked upgrade in place.
//! - Deprecated collections are dropped together with their data.
//! - Applied versions are recorded in `_sqlx_migrations`; running again at
//!   the current version is a no-op.
//!
//! ## Adding New Migrations
//! 1. Create `migrations/sqlite/NNN_description.sql` with the next number
//! 2. Bump [`SCHEMA_VERSION`]
//! 3. **NEVER** modify an existing migration

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbResult;

/// Embedded migrations from the workspace `migrations/sqlite` directory.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Schema version this build expects after migrating.
pub const SCHEMA_VERSION: i64 = 4;

/// Runs all pending migrations in order.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    let before = schema_version(pool).await?;
    debug!(current = before, target = SCHEMA_VERSION, "Checking for pending migrations");

    MIGRATOR.run(pool).await?;

    let after = schema_version(pool).await?;
    if after != before {
        info!(from = before, to = after, "Schema upgraded");
    }
    Ok(())
}

/// Highest successfully applied migration, or 0 for an untracked store.
pub async fn schema_version(pool: &SqlitePool) -> DbResult<i64> {
    let tracked: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = '_sqlx_migrations'",
    )
    .fetch_one(pool)
    .await?;

    if tracked == 0 {
        return Ok(0);
    }

    let version: Option<i64> =
        sqlx::query_scalar("SELECT MAX(version) FROM _sqlx_migrations WHERE success = 1")
            .fetch_one(pool)
            .await?;

    Ok(version.unwrap_or(0))
}

/// Returns `(total_migrations, applied_migrations)` for diagnostics.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let total = MIGRATOR.migrations.len();
    let applied = if schema_version(pool).await? == 0 {
        0
    } else {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
            .fetch_one(pool)
            .await?;
        n as usize
    };
    Ok((total, applied))
}

/// Checks whether a table exists.
pub async fn table_exists(pool: &SqlitePool, name: &str) -> DbResult<bool> {
    let n: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?")
            .bind(name)
            .fetch_one(pool)
            .await?;
    Ok(n > 0)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use namaa_core::Collection;

    #[tokio::test]
    async fn test_fresh_store_has_all_collections() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        for c in Collection::ALL {
            assert!(table_exists(db.pool(), c.name()).await.unwrap(), "{}", c);
        }
        assert!(table_exists(db.pool(), "counters").await.unwrap());
        assert!(!table_exists(db.pool(), "customers").await.unwrap());
        assert_eq!(schema_version(db.pool()).await.unwrap(), SCHEMA_VERSION);
    }

    #[tokio::test]
    async fn test_rerun_is_noop() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        sqlx::query("INSERT INTO products (id, body, version) VALUES ('p1', '{}', 1)")
            .execute(db.pool())
            .await
            .unwrap();

        run_migrations(db.pool()).await.unwrap();
        run_migrations(db.pool()).await.unwrap();

        let (total, applied) = migration_status(db.pool()).await.unwrap();
        assert_eq!(total, applied);
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(n, 1);
    }

    #[tokio::test]
    async fn test_untracked_legacy_store_upgrades_in_place() {
        let db = Database::new(DbConfig::in_memory().run_migrations(false))
            .await
            .unwrap();
        assert_eq!(schema_version(db.pool()).await.unwrap(), 0);

        for ddl in [
            "CREATE TABLE products (id TEXT PRIMARY KEY NOT NULL, body TEXT NOT NULL, version INTEGER NOT NULL DEFAULT 0)",
            "CREATE TABLE sales (id TEXT PRIMARY KEY NOT NULL, body TEXT NOT NULL, version INTEGER NOT NULL DEFAULT 0)",
            "CREATE TABLE customers (id TEXT PRIMARY KEY NOT NULL, body TEXT NOT NULL, version INTEGER NOT NULL DEFAULT 0)",
            "INSERT INTO products VALUES ('p1', '{\"id\":\"p1\"}', 1)",
            "INSERT INTO sales VALUES ('0001', '{}', 1), ('0007', '{}', 1)",
            "INSERT INTO customers VALUES ('c1', '{}', 1)",
        ] {
            sqlx::query(ddl).execute(db.pool()).await.unwrap();
        }

        run_migrations(db.pool()).await.unwrap();

        let body: String = sqlx::query_scalar("SELECT body FROM products WHERE id = 'p1'")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(body, "{\"id\":\"p1\"}");
        assert!(!table_exists(db.pool(), "customers").await.unwrap());
        assert!(table_exists(db.pool(), "returns").await.unwrap());

        // Seeded from the highest invoice number, not the row count.
        let counter: i64 = sqlx::query_scalar("SELECT value FROM counters WHERE name = 'invoice'")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(counter, 7);
    }
}

//! # Record Store
//!
//! Generic key-value persistence: one table per [`Collection`], one JSON body
//! per record, keyed by the record's `id`.
//!
//! ## Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  get_all::<T>()             every record, insertion order               │
//! │  get::<T>(id)               one record or None                          │
//! │  put(&record)               insert-or-replace, bumps version            │
//! │  delete(collection, id)     no-op when absent                           │
//! │                                                                         │
//! │  get_versioned::<T>(id)     record + version                            │
//! │  put_if_version(&r, v)      write only if still at version v            │
//! │                             (v = 0: only if absent)                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Versions
//! Every row carries a `version` starting at 1 and bumped by every write.
//! `put` ignores it (last writer wins). `put_if_version` is the
//! compare-and-swap used for read-modify-write of stock.
//!
//! Each call is one SQLite statement and so atomic on its own. Multi-record
//! atomicity needs a transaction; the `*_with` functions accept any executor,
//! including `&mut *tx`.

use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::debug;

use namaa_core::{Collection, Record};

use crate::error::{DbError, DbResult};

/// A record together with the version it was read at.
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    pub record: T,
    pub version: i64,
}

/// Pool-backed access to every collection.
#[derive(Debug, Clone)]
pub struct RecordStore {
    pool: SqlitePool,
}

impl RecordStore {
    pub fn new(pool: SqlitePool) -> Self {
        RecordStore { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Every record of `T`'s collection. Empty when the collection is empty.
    pub async fn get_all<T: Record>(&self) -> DbResult<Vec<T>> {
        get_all_with(&self.pool).await
    }

    pub async fn get<T: Record>(&self, id: &str) -> DbResult<Option<T>> {
        Ok(self.get_versioned(id).await?.map(|v| v.record))
    }

    pub async fn get_versioned<T: Record>(&self, id: &str) -> DbResult<Option<Versioned<T>>> {
        get_versioned_with(&self.pool, id).await
    }

    /// Inserts or replaces the record. Returns the new version.
    pub async fn put<T: Record>(&self, record: &T) -> DbResult<i64> {
        put_with(&self.pool, record).await
    }

    /// Writes the record only if it is still at `expected` version.
    ///
    /// `expected == 0` means the record must not exist yet.
    pub async fn put_if_version<T: Record>(&self, record: &T, expected: i64) -> DbResult<i64> {
        put_if_version_with(&self.pool, record, expected).await
    }

    /// Removes a record. Absent ids are not an error.
    pub async fn delete(&self, collection: Collection, id: &str) -> DbResult<()> {
        delete_with(&self.pool, collection, id).await
    }

    pub async fn count(&self, collection: Collection) -> DbResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", collection.name());
        sqlx::query_scalar::<_, i64>(&sql)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DbError::read(collection, e))
    }

    /// Identifiers present in a collection.
    pub async fn ids(&self, collection: Collection) -> DbResult<Vec<String>> {
        let sql = format!("SELECT id FROM {} ORDER BY rowid", collection.name());
        sqlx::query_scalar::<_, String>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DbError::read(collection, e))
    }
}

// =============================================================================
// Executor-generic Operations
// =============================================================================

fn decode<T: Record>(id: &str, body: &str) -> DbResult<T> {
    serde_json::from_str(body).map_err(|e| DbError::ReadFailed {
        collection: T::COLLECTION.to_string(),
        reason: format!("record {} is unreadable: {}", id, e),
    })
}

fn encode<T: Record>(record: &T) -> DbResult<String> {
    if record.id().is_empty() {
        return Err(DbError::write(T::COLLECTION, "record has no id"));
    }
    Ok(serde_json::to_string(record)?)
}

/// Reads every record of `T`. Fails as a whole if any body is unreadable.
pub async fn get_all_with<'c, T, E>(executor: E) -> DbResult<Vec<T>>
where
    T: Record,
    E: Executor<'c, Database = Sqlite>,
{
    let collection = T::COLLECTION;
    let sql = format!("SELECT id, body FROM {} ORDER BY rowid", collection.name());
    let rows = sqlx::query_as::<_, (String, String)>(&sql)
        .fetch_all(executor)
        .await
        .map_err(|e| DbError::read(collection, e))?;

    debug!(collection = %collection, count = rows.len(), "get_all");

    rows.iter().map(|(id, body)| decode(id, body)).collect()
}

pub async fn get_versioned_with<'c, T, E>(executor: E, id: &str) -> DbResult<Option<Versioned<T>>>
where
    T: Record,
    E: Executor<'c, Database = Sqlite>,
{
    let collection = T::COLLECTION;
    let sql = format!("SELECT body, version FROM {} WHERE id = ?", collection.name());
    let row = sqlx::query_as::<_, (String, i64)>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await
        .map_err(|e| DbError::read(collection, e))?;

    match row {
        Some((body, version)) => Ok(Some(Versioned {
            record: decode(id, &body)?,
            version,
        })),
        None => Ok(None),
    }
}

pub async fn put_with<'c, T, E>(executor: E, record: &T) -> DbResult<i64>
where
    T: Record,
    E: Executor<'c, Database = Sqlite>,
{
    let collection = T::COLLECTION;
    let body = encode(record)?;
    let sql = format!(
        "INSERT INTO {t} (id, body, version) VALUES (?, ?, 1) \
         ON CONFLICT(id) DO UPDATE SET body = excluded.body, version = {t}.version + 1 \
         RETURNING version",
        t = collection.name()
    );

    let version = sqlx::query_scalar::<_, i64>(&sql)
        .bind(record.id())
        .bind(body)
        .fetch_one(executor)
        .await
        .map_err(|e| DbError::write(collection, e))?;

    debug!(collection = %collection, id = record.id(), version, "put");
    Ok(version)
}

pub async fn put_if_version_with<'c, T, E>(executor: E, record: &T, expected: i64) -> DbResult<i64>
where
    T: Record,
    E: Executor<'c, Database = Sqlite>,
{
    let collection = T::COLLECTION;
    let body = encode(record)?;

    let written = if expected == 0 {
        let sql = format!(
            "INSERT INTO {} (id, body, version) VALUES (?, ?, 1) \
             ON CONFLICT(id) DO NOTHING RETURNING version",
            collection.name()
        );
        sqlx::query_scalar::<_, i64>(&sql)
            .bind(record.id())
            .bind(body)
            .fetch_optional(executor)
            .await
    } else {
        let sql = format!(
            "UPDATE {} SET body = ?, version = version + 1 \
             WHERE id = ? AND version = ? RETURNING version",
            collection.name()
        );
        sqlx::query_scalar::<_, i64>(&sql)
            .bind(body)
            .bind(record.id())
            .bind(expected)
            .fetch_optional(executor)
            .await
    }
    .map_err(|e| DbError::write(collection, e))?;

    match written {
        Some(version) => {
            debug!(collection = %collection, id = record.id(), version, "put_if_version");
            Ok(version)
        }
        None => Err(DbError::VersionConflict {
            collection: collection.to_string(),
            id: record.id().to_string(),
            expected,
        }),
    }
}

pub async fn delete_with<'c, E>(executor: E, collection: Collection, id: &str) -> DbResult<()>
where
    E: Executor<'c, Database = Sqlite>,
{
    let sql = format!("DELETE FROM {} WHERE id = ?", collection.name());
    let result = sqlx::query(&sql)
        .bind(id)
        .execute(executor)
        .await
        .map_err(|e| DbError::write(collection, e))?;

    debug!(collection = %collection, id, removed = result.rows_affected(), "delete");
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

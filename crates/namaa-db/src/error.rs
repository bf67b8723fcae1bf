//! # Database Error Types
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite error (sqlx::Error)    serde_json error                        │
//! │       │                             │                                   │
//! │       ▼                             ▼                                   │
//! │  DbError (this module) ← tags the collection and the kind of access    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ApiError (backend) ← serialized for the UI                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The store never retries on its own; callers decide.

use thiserror::Error;

/// Record store errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// The store could not be opened or created.
    ///
    /// Fatal for the session: corrupt file, permission denied, disk full.
    #[error("Cannot open store: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Read from {collection} failed: {reason}")]
    ReadFailed { collection: String, reason: String },

    #[error("Write to {collection} failed: {reason}")]
    WriteFailed { collection: String, reason: String },

    /// A conditional write found the record at a different version.
    ///
    /// ```text
    /// A reads p1 (v3)      B reads p1 (v3)
    /// A writes p1 if v3 ✓  (p1 is now v4)
    ///                      B writes p1 if v3 ✗ → VersionConflict
    /// ```
    #[error("{collection}/{id} changed since it was read (expected version {expected})")]
    VersionConflict {
        collection: String,
        id: String,
        expected: i64,
    },

    /// A stored body could not be encoded or decoded.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// A backup document is not in the expected shape.
    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn read(collection: impl ToString, err: impl ToString) -> Self {
        DbError::ReadFailed {
            collection: collection.to_string(),
            reason: err.to_string(),
        }
    }

    pub fn write(collection: impl ToString, err: impl ToString) -> Self {
        DbError::WriteFailed {
            collection: collection.to_string(),
            reason: err.to_string(),
        }
    }

    /// True for errors a caller can resolve by re-reading and trying again.
    pub fn is_conflict(&self) -> bool {
        matches!(self, DbError::VersionConflict { .. })
    }
}

/// Fallback conversion for statements not tied to one collection.
///
/// ```text
/// sqlx::Error::PoolTimedOut / PoolClosed  → DbError::ConnectionFailed
/// Other                                   → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => {
                DbError::ConnectionFailed("Timed out waiting for a connection".to_string())
            }
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),
            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        DbError::Serialization(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

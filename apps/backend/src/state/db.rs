//! # Database State
//!
//! Holds the open-once store handle for commands.
//!
//! ## Thread Safety
//! `SharedDatabase` opens the store on first use; concurrent first callers
//! wait on the same open and get the same `Database`. The pool inside is
//! thread-safe, so commands run queries without further locking.
//!
//! ## Usage in Commands
//! ```rust,ignore
//! pub async fn get_products(db: &DbState) -> Result<Vec<Product>, ApiError> {
//!     Ok(db.open().await?.products().get_all().await?)
//! }
//! ```

use namaa_db::{Database, DbConfig, SharedDatabase};

use crate::error::ApiError;

#[derive(Debug)]
pub struct DbState {
    shared: SharedDatabase,
}

impl DbState {
    pub fn new(config: DbConfig) -> Self {
        DbState {
            shared: SharedDatabase::new(config),
        }
    }

    /// Private in-memory store (for testing).
    pub fn in_memory() -> Self {
        DbState::new(DbConfig::in_memory())
    }

    /// Returns the store, opening and migrating it on first call.
    ///
    /// A failed open surfaces as `STORAGE_UNAVAILABLE`; the next call tries
    /// again.
    pub async fn open(&self) -> Result<&Database, ApiError> {
        Ok(self.shared.open().await?)
    }

    pub fn is_open(&self) -> bool {
        self.shared.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[tokio::test]
    async fn test_open_is_lazy_and_shared() {
        let state = DbState::in_memory();
        assert!(!state.is_open());

        let (a, b) = tokio::join!(state.open(), state.open());
        assert!(std::ptr::eq(a.unwrap(), b.unwrap()));
        assert!(state.is_open());
    }

    #[tokio::test]
    async fn test_unopenable_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join("namaa.db");
        let state = DbState::new(
            DbConfig::new(path).connect_timeout(std::time::Duration::from_secs(2)),
        );

        let err = state.open().await.unwrap_err();
        assert_eq!(err.code, ErrorCode::StorageUnavailable);
        assert!(!state.is_open());
    }
}

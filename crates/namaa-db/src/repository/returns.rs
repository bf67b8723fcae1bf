//! # Return Repository
//!
//! Returns are append-only.

use namaa_core::ReturnRecord;

use crate::error::DbResult;
use crate::store::RecordStore;

#[derive(Debug, Clone)]
pub struct ReturnRepository {
    store: RecordStore,
}

impl ReturnRepository {
    pub fn new(store: RecordStore) -> Self {
        ReturnRepository { store }
    }

    pub async fn get_all(&self) -> DbResult<Vec<ReturnRecord>> {
        self.store.get_all().await
    }

    /// Appends a return. An id that already exists is a `VersionConflict`.
    pub async fn append(&self, record: &ReturnRecord) -> DbResult<()> {
        self.store.put_if_version(record, 0).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Utc;
    use namaa_core::Money;

    #[tokio::test]
    async fn test_append_only() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let record = ReturnRecord {
            id: "r1".to_string(),
            product_id: "p1".to_string(),
            product_name: "Milk".to_string(),
            quantity: 2,
            amount: Money::from_minor(20),
            date: Utc::now(),
            reason: Some("damaged".to_string()),
        };

        db.returns().append(&record).await.unwrap();
        assert!(db.returns().append(&record).await.unwrap_err().is_conflict());
        assert_eq!(db.returns().get_all().await.unwrap(), vec![record]);
    }
}

//! # Backup and Restore
//!
//! Serializes every collection into one portable JSON document and merges
//! such a document back in.
//!
//! ## Document Format
//! ```text
//! {
//!   "timestamp": 1767225600000,          epoch millis of the export
//!   "version":   "1.0",                  format tag
//!   "data": {                            required envelope
//!     "settings": [...], "users": [...], "products": [...],
//!     "sales":    [...], "returns": [...]
//!   }
//! }
//! ```
//!
//! Money fields (`price`, `cost`, `total`, `amount`, `amountPaid`, `change`)
//! are integers in dirhams, 1000 per dinar: `"price": 2750` is 2.750 LYD. A
//! fractional number such as `2.75` does not parse and the document is
//! rejected as `InvalidSnapshot`.
//!
//! ## Restore Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  parse ──► no "data" object? ──► InvalidSnapshot (nothing written)      │
//! │    │                                                                    │
//! │    ▼                                                                    │
//! │  preview: per collection, incoming count + local ids to be replaced     │
//! │    │                                                                    │
//! │    ▼                                                                    │
//! │  restore (one transaction):                                             │
//! │    for each collection present: put every record (overwrite by id)      │
//! │    local records not in the document stay as they are                   │
//! │    invoice counter raised to the highest imported invoice number        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{info, warn};
use ts_rs::TS;

use namaa_core::invoice::parse_invoice_number;
use namaa_core::{
    now_millis, Collection, Product, Record, ReturnRecord, Sale, StoreSettings, User, SETTINGS_ID,
};

use crate::error::{DbError, DbResult};
use crate::repository::sale::raise_counter_with;
use crate::store::{get_all_with, put_with};

/// Format tag written into every export.
pub const SNAPSHOT_VERSION: &str = "1.0";

// =============================================================================
// Document
// =============================================================================

/// A full backup document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Snapshot {
    #[serde(default, with = "chrono::serde::ts_milliseconds")]
    #[ts(type = "number")]
    pub timestamp: DateTime<Utc>,

    #[serde(default)]
    pub version: String,

    pub data: SnapshotData,
}

/// Collections carried by a snapshot. A missing key means "leave that
/// collection alone" on restore.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SnapshotData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Vec<StoreSettings>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<User>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub products: Option<Vec<Product>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sales: Option<Vec<Sale>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<Vec<ReturnRecord>>,
}

impl Snapshot {
    /// Parses a backup document.
    ///
    /// The top-level `data` object is mandatory; anything else that does not
    /// fit the record shapes is rejected as a whole.
    pub fn parse(text: &str) -> DbResult<Snapshot> {
        let value: serde_json::Value = serde_json::from_str(text)
            .map_err(|e| DbError::InvalidSnapshot(format!("not a JSON document: {}", e)))?;

        if !value.get("data").is_some_and(|d| d.is_object()) {
            return Err(DbError::InvalidSnapshot(
                "missing top-level \"data\" object".to_string(),
            ));
        }

        serde_json::from_value(value).map_err(|e| DbError::InvalidSnapshot(e.to_string()))
    }

    pub fn to_json(&self) -> DbResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Number of records in one collection, `None` when absent.
    pub fn count(&self, collection: Collection) -> Option<usize> {
        let d = &self.data;
        match collection {
            Collection::Settings => d.settings.as_ref().map(Vec::len),
            Collection::Users => d.users.as_ref().map(Vec::len),
            Collection::Products => d.products.as_ref().map(Vec::len),
            Collection::Sales => d.sales.as_ref().map(Vec::len),
            Collection::Returns => d.returns.as_ref().map(Vec::len),
        }
    }

    fn ids(&self, collection: Collection) -> Vec<String> {
        fn ids_of<T: Record>(records: &Option<Vec<T>>) -> Vec<String> {
            records
                .iter()
                .flatten()
                .map(|r| r.id().to_string())
                .collect()
        }
        let d = &self.data;
        match collection {
            // Settings always land on the singleton id.
            Collection::Settings => d
                .settings
                .iter()
                .flatten()
                .map(|_| SETTINGS_ID.to_string())
                .collect(),
            Collection::Users => ids_of(&d.users),
            Collection::Products => ids_of(&d.products),
            Collection::Sales => ids_of(&d.sales),
            Collection::Returns => ids_of(&d.returns),
        }
    }
}

// =============================================================================
// Preview / Report
// =============================================================================

/// What a restore would do to one collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CollectionPreview {
    #[ts(type = "string")]
    pub collection: Collection,
    pub incoming: usize,

    /// Local ids whose records will be replaced.
    pub overwrites: Vec<String>,
}

/// Shown to the operator before they confirm a restore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RestorePreview {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    #[ts(type = "number")]
    pub exported_at: DateTime<Utc>,
    pub version: String,
    pub collections: Vec<CollectionPreview>,
}

/// Records written per collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RestoreReport {
    pub settings: usize,
    pub users: usize,
    pub products: usize,
    pub sales: usize,
    pub returns: usize,
}

impl RestoreReport {
    pub fn total(&self) -> usize {
        self.settings + self.users + self.products + self.sales + self.returns
    }
}

// =============================================================================
// Engine
// =============================================================================

#[derive(Debug, Clone)]
pub struct BackupEngine {
    pool: SqlitePool,
}

impl BackupEngine {
    pub fn new(pool: SqlitePool) -> Self {
        BackupEngine { pool }
    }

    /// Reads all five collections from one consistent read.
    pub async fn export(&self) -> DbResult<Snapshot> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::read("snapshot", e))?;

        let data = SnapshotData {
            settings: Some(get_all_with(&mut *tx).await?),
            users: Some(get_all_with(&mut *tx).await?),
            products: Some(get_all_with(&mut *tx).await?),
            sales: Some(get_all_with(&mut *tx).await?),
            returns: Some(get_all_with(&mut *tx).await?),
        };

        tx.rollback()
            .await
            .map_err(|e| DbError::read("snapshot", e))?;

        let snapshot = Snapshot {
            timestamp: now_millis(),
            version: SNAPSHOT_VERSION.to_string(),
            data,
        };

        info!(
            products = snapshot.count(Collection::Products).unwrap_or(0),
            sales = snapshot.count(Collection::Sales).unwrap_or(0),
            "Snapshot exported"
        );
        Ok(snapshot)
    }

    /// Describes what restoring `snapshot` would change. Writes nothing.
    pub async fn preview(&self, snapshot: &Snapshot) -> DbResult<RestorePreview> {
        let mut collections = Vec::new();

        for collection in Collection::ALL {
            let Some(incoming) = snapshot.count(collection) else {
                continue;
            };

            let sql = format!("SELECT id FROM {}", collection.name());
            let local: HashSet<String> = sqlx::query_scalar::<_, String>(&sql)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| DbError::read(collection, e))?
                .into_iter()
                .collect();

            let mut overwrites: Vec<String> = snapshot
                .ids(collection)
                .into_iter()
                .filter(|id| local.contains(id))
                .collect();
            overwrites.sort();
            overwrites.dedup();

            collections.push(CollectionPreview {
                collection,
                incoming,
                overwrites,
            });
        }

        Ok(RestorePreview {
            exported_at: snapshot.timestamp,
            version: snapshot.version.clone(),
            collections,
        })
    }

    /// Merges the snapshot into the store in one transaction.
    ///
    /// Either every record is written or none is.
    pub async fn restore(&self, snapshot: &Snapshot) -> DbResult<RestoreReport> {
        if !snapshot.version.is_empty() && snapshot.version != SNAPSHOT_VERSION {
            warn!(version = %snapshot.version, "Restoring snapshot with unknown format version");
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::write("snapshot", e))?;

        let d = &snapshot.data;
        let mut report = RestoreReport::default();

        if let Some(settings) = &d.settings {
            for s in settings {
                let mut s = s.clone();
                s.id = SETTINGS_ID.to_string();
                put_with(&mut *tx, &s).await?;
            }
            report.settings = settings.len();
        }
        report.users = put_each(&mut tx, &d.users).await?;
        report.products = put_each(&mut tx, &d.products).await?;
        report.sales = put_each(&mut tx, &d.sales).await?;
        report.returns = put_each(&mut tx, &d.returns).await?;

        let highest_invoice = d
            .sales
            .iter()
            .flatten()
            .filter_map(|s| parse_invoice_number(&s.id))
            .max();
        if let Some(n) = highest_invoice {
            raise_counter_with(&mut tx, n).await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::write("snapshot", e))?;

        info!(records = report.total(), "Snapshot restored");
        Ok(report)
    }
}

async fn put_each<T: Record>(conn: &mut SqliteConnection, records: &Option<Vec<T>>) -> DbResult<usize> {
    let Some(records) = records else {
        return Ok(0);
    };
    for r in records {
        put_with(&mut *conn, r).await?;
    }
    Ok(records.len())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use namaa_core::{CartItem, Money, PaymentMethod};

    fn product(id: &str, name: &str, stock: i64) -> Product {
        Product {
            id: id.to_string(),
            name: name.to_string(),
            sku: "1000".to_string(),
            price: Money::from_minor(10),
            cost: Money::from_minor(5),
            stock,
            category: String::new(),
            expiry_date: None,
        }
    }

    fn sale(id: &str) -> Sale {
        Sale {
            id: id.to_string(),
            items: vec![CartItem {
                product_id: "p1".to_string(),
                product_name: "Milk".to_string(),
                price: Money::from_minor(10),
                quantity: 1,
            }],
            total: Money::from_minor(10),
            date: Utc::now(),
            payment_method: PaymentMethod::OnePay,
            user_name: None,
            amount_paid: None,
            change: None,
        }
    }

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[test]
    fn test_fractional_money_is_rejected() {
        let doc = r#"{"timestamp": 1, "version": "1.0", "data": {"products": [
            {"id": "p1", "name": "Milk", "sku": "1234", "price": 1.75,
             "cost": 1, "stock": 1, "category": ""}
        ]}}"#;
        assert!(matches!(Snapshot::parse(doc), Err(DbError::InvalidSnapshot(_))));

        let whole = doc.replace("1.75", "1750");
        let snap = Snapshot::parse(&whole).unwrap();
        let products = snap.data.products.unwrap();
        assert_eq!(products[0].price, Money::from_minor(1750));
    }

    #[tokio::test]
    async fn test_export_carries_every_collection() {
        let db = db().await;
        db.settings()
            .upsert(&StoreSettings::new("Namaa", "Tripoli", "091"))
            .await
            .unwrap();
        db.products().put(&product("p1", "Milk", 5)).await.unwrap();

        let snap = db.backup().export().await.unwrap();
        assert_eq!(snap.version, SNAPSHOT_VERSION);
        for c in Collection::ALL {
            assert!(snap.count(c).is_some(), "{}", c);
        }

        let json: serde_json::Value = serde_json::from_str(&snap.to_json().unwrap()).unwrap();
        assert!(json["timestamp"].is_i64());
        assert_eq!(json["data"]["products"][0]["id"], "p1");
        assert_eq!(json["data"]["settings"][0]["storeName"], "Namaa");
    }

    #[tokio::test]
    async fn test_restore_merges_by_id() {
        let db = db().await;
        db.products().put(&product("p1", "Old name", 5)).await.unwrap();
        db.products().put(&product("p2", "Local only", 7)).await.unwrap();

        let doc = r#"{
            "timestamp": 1767225600000,
            "version": "1.0",
            "data": { "products": [
                { "id": "p1", "name": "New name", "sku": "1000", "price": 12,
                  "cost": 5, "stock": 40, "category": "" }
            ] }
        }"#;
        let snap = Snapshot::parse(doc).unwrap();

        let preview = db.backup().preview(&snap).await.unwrap();
        assert_eq!(preview.collections.len(), 1);
        assert_eq!(preview.collections[0].overwrites, vec!["p1".to_string()]);

        let report = db.backup().restore(&snap).await.unwrap();
        assert_eq!(report.products, 1);

        let p1 = db.products().get_by_id("p1").await.unwrap().unwrap();
        assert_eq!(p1.name, "New name");
        assert_eq!(p1.stock, 40);
        let p2 = db.products().get_by_id("p2").await.unwrap().unwrap();
        assert_eq!(p2, product("p2", "Local only", 7));
    }

    #[tokio::test]
    async fn test_missing_envelope_is_rejected() {
        let err = Snapshot::parse(r#"{"timestamp": 1, "version": "1.0"}"#).unwrap_err();
        assert!(matches!(err, DbError::InvalidSnapshot(_)));

        let err = Snapshot::parse(r#"{"data": []}"#).unwrap_err();
        assert!(matches!(err, DbError::InvalidSnapshot(_)));

        let err = Snapshot::parse("not json").unwrap_err();
        assert!(matches!(err, DbError::InvalidSnapshot(_)));
    }

    #[tokio::test]
    async fn test_malformed_record_rejects_whole_document() {
        let doc = r#"{ "data": { "products": [ { "id": "p9" } ] } }"#;
        assert!(matches!(
            Snapshot::parse(doc),
            Err(DbError::InvalidSnapshot(_))
        ));
    }

    #[tokio::test]
    async fn test_restore_round_trip_into_fresh_store() {
        let source = db().await;
        source.products().put(&product("p1", "Milk", 3)).await.unwrap();
        source.sales().insert_with_next_invoice(sale("")).await.unwrap();
        let text = source.backup().export().await.unwrap().to_json().unwrap();

        let target = db().await;
        target
            .backup()
            .restore(&Snapshot::parse(&text).unwrap())
            .await
            .unwrap();

        assert_eq!(
            target.products().get_all().await.unwrap(),
            source.products().get_all().await.unwrap()
        );
        assert_eq!(target.sales().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_restore_raises_invoice_counter() {
        let db = db().await;
        let snap = Snapshot {
            timestamp: Utc::now(),
            version: SNAPSHOT_VERSION.to_string(),
            data: SnapshotData {
                sales: Some(vec![sale("0009"), sale("legacy-a")]),
                ..Default::default()
            },
        };

        db.backup().restore(&snap).await.unwrap();
        assert_eq!(db.sales().next_invoice_id().await.unwrap(), "0010");
    }

    #[tokio::test]
    async fn test_settings_restore_onto_singleton() {
        let db = db().await;
        db.settings()
            .upsert(&StoreSettings::new("Local", "", ""))
            .await
            .unwrap();

        let mut imported = StoreSettings::new("Imported", "", "");
        imported.id = "old-id".to_string();
        let snap = Snapshot {
            timestamp: Utc::now(),
            version: SNAPSHOT_VERSION.to_string(),
            data: SnapshotData {
                settings: Some(vec![imported]),
                ..Default::default()
            },
        };

        db.backup().restore(&snap).await.unwrap();
        let all: Vec<StoreSettings> = db.store().get_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].store_name, "Imported");
    }
}

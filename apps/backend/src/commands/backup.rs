//! # Backup Commands
//!
//! ## Restore Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  prepare_restore(doc)                                                   │
//! │     parse ──► FORMAT_ERROR if the data envelope is missing              │
//! │     preview: incoming counts, local ids that will be overwritten        │
//! │          │                                                              │
//! │          ▼   operator reads the preview                                 │
//! │  apply_restore(session, prepared, confirmed)                            │
//! │     not ADMIN      ──► FORBIDDEN                                        │
//! │     not confirmed  ──► CONFIRMATION_REQUIRED                            │
//! │     merge by id in one transaction                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::{debug, info};

use namaa_db::{RestorePreview, RestoreReport, Snapshot};

use crate::error::{ApiError, ErrorCode};
use crate::state::{DbState, Session};

/// A parsed backup waiting for the operator's go-ahead.
#[derive(Debug, Clone)]
pub struct PreparedRestore {
    preview: RestorePreview,
    snapshot: Snapshot,
}

impl PreparedRestore {
    pub fn preview(&self) -> &RestorePreview {
        &self.preview
    }
}

/// Serializes every collection into one JSON document.
pub async fn export_snapshot(db: &DbState) -> Result<String, ApiError> {
    let snapshot = db.open().await?.backup().export().await?;
    Ok(snapshot.to_json()?)
}

/// Parses a backup document and describes what restoring it would change.
/// Writes nothing.
pub async fn prepare_restore(db: &DbState, document: &str) -> Result<PreparedRestore, ApiError> {
    debug!(bytes = document.len(), "prepare_restore command");
    let snapshot = Snapshot::parse(document)?;
    let preview = db.open().await?.backup().preview(&snapshot).await?;
    Ok(PreparedRestore { preview, snapshot })
}

/// Merges a prepared backup into the store.
///
/// Records are overwritten by id; local records absent from the backup
/// stay.
pub async fn apply_restore(
    db: &DbState,
    session: &Session,
    prepared: PreparedRestore,
    confirmed: bool,
) -> Result<RestoreReport, ApiError> {
    session.require_admin()?;
    if !confirmed {
        return Err(ApiError::new(
            ErrorCode::ConfirmationRequired,
            "Restoring merges the backup into current data and must be confirmed",
        ));
    }

    let report = db.open().await?.backup().restore(&prepared.snapshot).await?;
    info!(
        records = report.total(),
        exported_at = %prepared.preview.exported_at,
        by = %session.user_id,
        "Backup restored"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::sale::{complete_sale, next_invoice_id};
    use crate::commands::test_support::{admin, cashier, draft, product, seed_products};
    use crate::state::AppConfig;
    use namaa_core::Collection;

    #[tokio::test]
    async fn test_restore_merges_by_id() {
        let source = DbState::in_memory();
        let mut p1 = product("p1", 50, 10);
        p1.name = "Imported name".into();
        seed_products(&source, vec![p1]).await;
        let doc = export_snapshot(&source).await.unwrap();

        let target = DbState::in_memory();
        seed_products(&target, vec![product("p1", 5, 10), product("p2", 8, 10)]).await;

        let prepared = prepare_restore(&target, &doc).await.unwrap();
        let products = prepared
            .preview()
            .collections
            .iter()
            .find(|c| c.collection == Collection::Products)
            .unwrap();
        assert_eq!(products.incoming, 1);
        assert_eq!(products.overwrites, vec!["p1".to_string()]);

        let report = apply_restore(&target, &admin(), prepared, true).await.unwrap();
        assert_eq!(report.products, 1);

        let database = target.open().await.unwrap();
        let p1 = database.products().get_by_id("p1").await.unwrap().unwrap();
        assert_eq!((p1.stock, p1.name.as_str()), (50, "Imported name"));
        let p2 = database.products().get_by_id("p2").await.unwrap().unwrap();
        assert_eq!(p2.stock, 8);
    }

    #[tokio::test]
    async fn test_restore_requires_confirmation_and_admin() {
        let source = DbState::in_memory();
        seed_products(&source, vec![product("p1", 50, 10)]).await;
        let doc = export_snapshot(&source).await.unwrap();

        let target = DbState::in_memory();
        let prepared = prepare_restore(&target, &doc).await.unwrap();

        let err = apply_restore(&target, &admin(), prepared.clone(), false)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfirmationRequired);

        let err = apply_restore(&target, &cashier(), prepared, true)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);

        let database = target.open().await.unwrap();
        assert!(database.products().get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_envelope_is_format_error() {
        let db = DbState::in_memory();
        seed_products(&db, vec![product("p1", 5, 10)]).await;

        let err = prepare_restore(&db, r#"{"timestamp": 1, "version": "1.0"}"#)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::FormatError);

        let err = prepare_restore(&db, "not json").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::FormatError);
    }

    #[tokio::test]
    async fn test_restored_sales_advance_invoice_numbers() {
        let source = DbState::in_memory();
        seed_products(&source, vec![product("p1", 10, 10)]).await;
        for _ in 0..3 {
            complete_sale(&source, &AppConfig::default(), &cashier(), draft(&[("p1", 1, 10)]))
                .await
                .unwrap();
        }
        let doc = export_snapshot(&source).await.unwrap();

        let target = DbState::in_memory();
        let prepared = prepare_restore(&target, &doc).await.unwrap();
        apply_restore(&target, &admin(), prepared, true).await.unwrap();

        assert_eq!(next_invoice_id(&target).await.unwrap(), "0004");
    }
}

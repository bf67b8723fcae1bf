//! # Report Commands
//!
//! Loads the collections and hands them to the pure report functions in
//! `namaa_core::reports`. Thresholds come from `AppConfig`.

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use ts_rs::TS;

use namaa_core::reports::{self, InventoryAlerts, SalesSummary};
use namaa_core::Money;

use crate::error::ApiError;
use crate::state::{AppConfig, DbState};

/// Revenue for one calendar day (UTC).
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DailyRevenue {
    #[ts(type = "string")]
    pub date: NaiveDate,
    pub total: Money,
}

/// Space used by the store.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StorageInfo {
    pub bytes: i64,
    pub page_count: i64,
    pub page_size: i64,
}

pub async fn sales_summary(db: &DbState) -> Result<SalesSummary, ApiError> {
    let database = db.open().await?;
    let sales = database.sales().get_all().await?;
    let returns = database.returns().get_all().await?;
    let products = database.products().get_all().await?;
    Ok(reports::sales_summary(&sales, &returns, &products))
}

/// Oldest day first.
pub async fn revenue_by_day(db: &DbState) -> Result<Vec<DailyRevenue>, ApiError> {
    let sales = db.open().await?.sales().get_all().await?;
    Ok(reports::revenue_by_day(&sales)
        .into_iter()
        .map(|(date, total)| DailyRevenue { date, total })
        .collect())
}

/// Low-stock, expired and expiring-soon products.
pub async fn inventory_alerts(db: &DbState, config: &AppConfig) -> Result<InventoryAlerts, ApiError> {
    let products = db.open().await?.products().get_all().await?;
    Ok(reports::inventory_alerts(
        &products,
        Utc::now(),
        config.report_options(),
    ))
}

pub async fn storage_usage(db: &DbState) -> Result<StorageInfo, ApiError> {
    let usage = db.open().await?.storage_usage().await?;
    Ok(StorageInfo {
        bytes: usage.bytes(),
        page_count: usage.page_count,
        page_size: usage.page_size,
    })
}

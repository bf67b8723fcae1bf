//! # Reports
//!
//! Figures for the reports screen, computed from loaded collections.
//!
//! ## Profit Model
//! ```text
//! gross profit        = Σ sales  Σ lines (line price − current cost) × qty
//! return profit loss  = Σ returns (refund amount − current cost × qty)
//! net profit          = gross profit − return profit loss
//!
//! net revenue         = Σ sale totals − Σ refund amounts
//! ```
//!
//! Costs come from the product as it is now; a product that has since been
//! deleted counts with zero cost.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{ExpiryStatus, Product, ReturnRecord, Sale};

/// Products below this stock level are flagged.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 5;

/// Products expiring within this many days are flagged.
pub const DEFAULT_EXPIRY_WARNING_DAYS: i64 = 30;

/// Report thresholds.
#[derive(Debug, Clone, Copy)]
pub struct ReportOptions {
    pub low_stock_threshold: i64,
    pub expiry_warning: Duration,
}

impl Default for ReportOptions {
    fn default() -> Self {
        ReportOptions {
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            expiry_warning: Duration::days(DEFAULT_EXPIRY_WARNING_DAYS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SalesSummary {
    pub gross_revenue: Money,
    pub returns_total: Money,
    pub net_revenue: Money,
    pub gross_profit: Money,
    pub return_profit_loss: Money,
    pub net_profit: Money,
    pub sale_count: usize,
    pub return_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct InventoryAlerts {
    pub low_stock: Vec<Product>,
    pub expired: Vec<Product>,
    pub expiring_soon: Vec<Product>,
}

/// Revenue and profit totals.
pub fn sales_summary(sales: &[Sale], returns: &[ReturnRecord], products: &[Product]) -> SalesSummary {
    let cost_of: HashMap<&str, Money> = products.iter().map(|p| (p.id.as_str(), p.cost)).collect();
    let cost = |id: &str| cost_of.get(id).copied().unwrap_or_default();

    let gross_revenue: Money = sales.iter().map(|s| s.total).sum();
    let returns_total: Money = returns.iter().map(|r| r.amount).sum();

    let gross_profit: Money = sales
        .iter()
        .flat_map(|s| s.items.iter())
        .map(|item| (item.price - cost(&item.product_id)) * item.quantity)
        .sum();

    let return_profit_loss: Money = returns
        .iter()
        .map(|r| r.amount - cost(&r.product_id) * r.quantity)
        .sum();

    SalesSummary {
        gross_revenue,
        returns_total,
        net_revenue: gross_revenue - returns_total,
        gross_profit,
        return_profit_loss,
        net_profit: gross_profit - return_profit_loss,
        sale_count: sales.len(),
        return_count: returns.len(),
    }
}

/// Sale totals grouped by UTC calendar day, oldest first.
pub fn revenue_by_day(sales: &[Sale]) -> BTreeMap<NaiveDate, Money> {
    let mut days = BTreeMap::new();
    for sale in sales {
        *days.entry(sale.date.date_naive()).or_insert_with(Money::zero) += sale.total;
    }
    days
}

/// Low-stock, expired and soon-to-expire products.
pub fn inventory_alerts(products: &[Product], now: DateTime<Utc>, opts: ReportOptions) -> InventoryAlerts {
    let mut alerts = InventoryAlerts {
        low_stock: Vec::new(),
        expired: Vec::new(),
        expiring_soon: Vec::new(),
    };

    for p in products {
        if p.stock < opts.low_stock_threshold {
            alerts.low_stock.push(p.clone());
        }
        match p.expiry_status(now, opts.expiry_warning) {
            ExpiryStatus::Expired => alerts.expired.push(p.clone()),
            ExpiryStatus::ExpiringSoon => alerts.expiring_soon.push(p.clone()),
            ExpiryStatus::Fresh => {}
        }
    }

    alerts
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CartItem, PaymentMethod};
    use chrono::TimeZone;

    fn product(id: &str, price: i64, cost: i64, stock: i64) -> Product {
        Product {
            id: id.to_string(),
            name: id.to_string(),
            sku: "1000".to_string(),
            price: Money::from_minor(price),
            cost: Money::from_minor(cost),
            stock,
            category: String::new(),
            expiry_date: None,
        }
    }

    fn sale(id: &str, date: DateTime<Utc>, lines: &[(&str, i64, i64)]) -> Sale {
        let items: Vec<CartItem> = lines
            .iter()
            .map(|(pid, price, qty)| CartItem {
                product_id: pid.to_string(),
                product_name: pid.to_string(),
                price: Money::from_minor(*price),
                quantity: *qty,
            })
            .collect();
        Sale {
            id: id.to_string(),
            total: items.iter().map(CartItem::line_total).sum(),
            items,
            date,
            payment_method: PaymentMethod::Cash,
            user_name: None,
            amount_paid: None,
            change: None,
        }
    }

    #[test]
    fn test_sales_summary() {
        let now = Utc::now();
        let products = vec![product("p1", 10, 6, 5)];
        let sales = vec![sale("0001", now, &[("p1", 10, 3)])];
        let returns = vec![ReturnRecord {
            id: "r1".to_string(),
            product_id: "p1".to_string(),
            product_name: "p1".to_string(),
            quantity: 1,
            amount: Money::from_minor(10),
            date: now,
            reason: None,
        }];

        let s = sales_summary(&sales, &returns, &products);
        assert_eq!(s.gross_revenue, Money::from_minor(30));
        assert_eq!(s.net_revenue, Money::from_minor(20));
        assert_eq!(s.gross_profit, Money::from_minor(12));
        assert_eq!(s.return_profit_loss, Money::from_minor(4));
        assert_eq!(s.net_profit, Money::from_minor(8));
    }

    #[test]
    fn test_deleted_product_counts_zero_cost() {
        let sales = vec![sale("0001", Utc::now(), &[("gone", 10, 2)])];
        let s = sales_summary(&sales, &[], &[]);
        assert_eq!(s.gross_profit, Money::from_minor(20));
    }

    #[test]
    fn test_revenue_by_day() {
        let d1 = Utc.with_ymd_and_hms(2026, 5, 1, 9, 0, 0).unwrap();
        let d2 = Utc.with_ymd_and_hms(2026, 5, 2, 9, 0, 0).unwrap();
        let sales = vec![
            sale("0001", d1, &[("p1", 10, 1)]),
            sale("0002", d1, &[("p1", 10, 2)]),
            sale("0003", d2, &[("p1", 10, 1)]),
        ];

        let days = revenue_by_day(&sales);
        assert_eq!(days.len(), 2);
        assert_eq!(days[&d1.date_naive()], Money::from_minor(30));
    }

    #[test]
    fn test_inventory_alerts() {
        let now = Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap();
        let mut expired = product("old", 10, 5, 20);
        expired.expiry_date = Some(now - Duration::days(2));
        let mut soon = product("soon", 10, 5, 20);
        soon.expiry_date = Some(now + Duration::days(5));
        let low = product("low", 10, 5, 4);
        let edge = product("edge", 10, 5, 5);

        let alerts = inventory_alerts(&[expired, soon, low, edge], now, ReportOptions::default());
        assert_eq!(alerts.low_stock.len(), 1);
        assert_eq!(alerts.low_stock[0].id, "low");
        assert_eq!(alerts.expired[0].id, "old");
        assert_eq!(alerts.expiring_soon[0].id, "soon");
    }
}

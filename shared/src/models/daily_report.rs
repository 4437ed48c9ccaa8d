//! Daily Report Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::tax::RateSummary;

/// Per-product aggregate inside a daily report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailySalesItem {
    pub product_id: String,
    pub product_name: String,
    pub quantity: u64,
    pub total: Decimal,
    pub tax_rate: Decimal,
}

/// Daily sales report over completed orders
///
/// Monetary fields are rounded to 2dp once, at the end of aggregation.
/// A day with no completed orders yields a zero-valued report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailySalesReport {
    /// `YYYY-MM-DD` in the business timezone
    pub date: String,
    pub total: Decimal,
    pub order_count: u64,
    pub items: Vec<DailySalesItem>,
    pub tax_by_rate: Vec<RateSummary>,
}

impl DailySalesReport {
    /// Zero-valued report for a day with no completed orders
    pub fn empty(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            total: Decimal::ZERO,
            order_count: 0,
            items: Vec::new(),
            tax_by_rate: Vec::new(),
        }
    }
}

//! Daily sales aggregation (read-only)
//!
//! Scans completed orders whose timestamp falls inside the business-day
//! window of the requested date and folds their items into per-product
//! totals plus a by-rate tax summary. Decimal sums are accumulated raw and
//! every reported figure is rounded once at the end. A day with no
//! completed orders yields a zero-valued report, not an error.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use shared::models::{DailySalesItem, DailySalesReport, OrderItem, OrderStatus};
use std::collections::BTreeMap;

use crate::orders::{OrderError, OrderResult};
use crate::store::PosStore;
use crate::tax;

#[derive(Clone)]
pub struct SalesReporter {
    store: PosStore,
    tz: Tz,
}

impl SalesReporter {
    pub fn new(store: PosStore, tz: Tz) -> Self {
        Self { store, tz }
    }

    /// Aggregate completed orders of one business day (`YYYY-MM-DD`)
    pub fn daily_sales(&self, date: &str) -> OrderResult<DailySalesReport> {
        let day = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|_| OrderError::Validation(format!("date is not YYYY-MM-DD: {date}")))?;
        let next_day = day
            .succ_opt()
            .ok_or_else(|| OrderError::Validation(format!("date out of range: {date}")))?;
        let start = self.day_start(day, date)?;
        let end = self.day_start(next_day, date)?;

        let mut total = Decimal::ZERO;
        let mut order_count = 0u64;
        // keyed by (product, rate): the same product can sell at different
        // effective rates across indoor and takeaway orders
        let mut by_product: BTreeMap<(String, Decimal), DailySalesItem> = BTreeMap::new();
        let mut all_items: Vec<OrderItem> = Vec::new();

        for order in self.store.list_orders()? {
            if order.status != OrderStatus::Completed {
                continue;
            }
            let Ok(ts) = DateTime::parse_from_rfc3339(&order.timestamp) else {
                tracing::warn!(order_id = order.id, "unparseable order timestamp, skipped");
                continue;
            };
            let ts = ts.with_timezone(&self.tz);
            if ts < start || ts >= end {
                continue;
            }

            order_count += 1;
            total += order.total;

            for item in self.store.items_for_order(order.id)? {
                let entry = by_product
                    .entry((item.product_id.clone(), item.tax_rate))
                    .or_insert_with(|| DailySalesItem {
                        product_id: item.product_id.clone(),
                        product_name: item.product_name.clone(),
                        quantity: 0,
                        total: Decimal::ZERO,
                        tax_rate: item.tax_rate,
                    });
                entry.quantity += u64::from(item.quantity);
                entry.total += item.gross();
                all_items.push(item);
            }
        }

        let items = by_product
            .into_values()
            .map(|mut item| {
                item.total = tax::round_money(item.total);
                item
            })
            .collect();
        let tax_by_rate = tax::rate_rows(&tax::summarize_by_rate(&all_items));

        Ok(DailySalesReport {
            date: date.to_string(),
            total: tax::round_money(total),
            order_count,
            items,
            tax_by_rate,
        })
    }

    fn day_start(&self, day: NaiveDate, date: &str) -> OrderResult<DateTime<Tz>> {
        self.tz
            .from_local_datetime(&day.and_time(NaiveTime::MIN))
            .earliest()
            .ok_or_else(|| OrderError::Validation(format!("no local midnight for {date}")))
    }
}

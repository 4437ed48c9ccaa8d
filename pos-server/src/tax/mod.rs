//! Tax decomposition with rust_decimal precision
//!
//! Prices are tax-inclusive: a line's gross amount already contains the
//! tax portion, and the engine splits it out (`tax = gross * r / (100 + r)`
//! equivalently `net = gross / (1 + r/100)`). All arithmetic runs on
//! `Decimal`; sums are accumulated unrounded and each reported figure is
//! rounded exactly once, to 2 decimal places, half-up.
//!
//! Which rate applies to a line is a policy question: the standard rate
//! always applies to `Standard`-class products (drinks), while
//! `Reduced`-class products get the standard rate for on-premises
//! consumption and the reduced rate for takeaway/outdoor. The concrete
//! percentages come from configuration, never from call sites.

use rust_decimal::prelude::*;
use shared::models::{OrderItem, RateSummary, TaxBreakdown, TaxClass};
use std::collections::BTreeMap;

/// Rounding for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Round a monetary value to 2 decimal places, half-up
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Split a tax-inclusive gross amount into net and tax at the given
/// percent rate
///
/// `net` is rounded once at output; `tax` is the exact remainder so that
/// `net + tax == gross` always holds at 2dp. Callers validate `rate >= 0`
/// beforehand; this is pure arithmetic.
pub fn decompose(gross: Decimal, rate: Decimal) -> TaxBreakdown {
    let gross = round_money(gross);
    let divisor = Decimal::ONE + rate / Decimal::ONE_HUNDRED;
    let net = round_money(gross / divisor);
    TaxBreakdown {
        net,
        tax: gross - net,
        gross,
    }
}

/// Group line items by their frozen tax rate and decompose each group once
///
/// Gross amounts are summed raw per rate; the decomposition runs on the
/// bucket sum, not per row, so rounding error does not compound across
/// many small lines. Used by checkout receipts and the daily report.
pub fn summarize_by_rate<'a, I>(items: I) -> BTreeMap<Decimal, TaxBreakdown>
where
    I: IntoIterator<Item = &'a OrderItem>,
{
    let mut gross_by_rate: BTreeMap<Decimal, Decimal> = BTreeMap::new();
    for item in items {
        *gross_by_rate.entry(item.tax_rate).or_insert(Decimal::ZERO) += item.gross();
    }
    gross_by_rate
        .into_iter()
        .map(|(rate, gross)| (rate, decompose(gross, rate)))
        .collect()
}

/// Flatten a by-rate summary into serializable rows
pub fn rate_rows(summary: &BTreeMap<Decimal, TaxBreakdown>) -> Vec<RateSummary> {
    summary
        .iter()
        .map(|(rate, b)| RateSummary {
            rate: *rate,
            net: b.net,
            tax: b.tax,
            gross: b.gross,
        })
        .collect()
}

/// Jurisdiction tax policy, built from configuration
#[derive(Debug, Clone)]
pub struct TaxPolicy {
    /// Percent, e.g. 19.00
    pub standard_rate: Decimal,
    /// Percent, e.g. 7.00
    pub reduced_rate: Decimal,
}

impl TaxPolicy {
    /// Effective rate for a product class and consumption location
    pub fn effective_rate(&self, class: TaxClass, is_indoor: bool) -> Decimal {
        match class {
            TaxClass::Standard => self.standard_rate,
            TaxClass::Reduced => {
                if is_indoor {
                    self.standard_rate
                } else {
                    self.reduced_rate
                }
            }
        }
    }
}

impl Default for TaxPolicy {
    fn default() -> Self {
        Self {
            standard_rate: Decimal::new(1900, 2),
            reduced_rate: Decimal::new(700, 2),
        }
    }
}

//! Tax types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Tax class of a catalog product
///
/// Which concrete rate applies is decided by the tax policy together with
/// the indoor/outdoor consumption flag; the class only says whether a
/// product is ever eligible for the reduced rate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaxClass {
    /// Always the standard rate (drinks)
    Standard,
    /// Standard rate on premises, reduced rate for takeaway/outdoor
    Reduced,
}

/// Net/tax split of a tax-inclusive gross amount
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaxBreakdown {
    pub net: Decimal,
    pub tax: Decimal,
    pub gross: Decimal,
}

/// One per-rate bucket of a receipt or report summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateSummary {
    /// Percent, e.g. 19.00
    pub rate: Decimal,
    pub net: Decimal,
    pub tax: Decimal,
    pub gross: Decimal,
}

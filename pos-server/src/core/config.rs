//! Server configuration
//!
//! # Environment variables
//!
//! Every setting can be overridden through the environment:
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | WORK_DIR | /var/lib/pos | working directory (database, logs) |
//! | HTTP_PORT | 3000 | HTTP API port |
//! | TIMEZONE | Europe/Berlin | business timezone for report windows |
//! | TABLE_COUNT | 12 | seeded table pool size (plus pickup) |
//! | STANDARD_TAX_RATE | 19.00 | standard VAT percent |
//! | REDUCED_TAX_RATE | 7.00 | reduced VAT percent (takeaway food) |
//! | REQUEST_TIMEOUT_MS | 30000 | per-request timeout (ms) |
//! | JWT_SECRET | dev-secret | HS256 token secret |
//! | ENVIRONMENT | development | development \| staging \| production |
//!
//! # Example
//!
//! ```ignore
//! WORK_DIR=/data/pos HTTP_PORT=8080 cargo run
//! ```

use chrono_tz::Tz;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::tax::TaxPolicy;

#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory holding the database and log files
    pub work_dir: String,
    /// HTTP API port
    pub http_port: u16,
    /// Business timezone; daily report windows are computed in it
    pub timezone: Tz,
    /// Seeded table pool size (a virtual pickup entry is added on top)
    pub table_count: u32,
    /// Standard VAT percent (drinks, on-premises food)
    pub standard_tax_rate: Decimal,
    /// Reduced VAT percent (takeaway/outdoor food)
    pub reduced_tax_rate: Decimal,
    /// Per-request timeout in milliseconds
    pub request_timeout_ms: u64,
    /// HS256 secret for validating staff tokens
    pub jwt_secret: String,
    /// development | staging | production
    pub environment: String,
}

impl Config {
    /// Load configuration from the environment, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/pos".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            timezone: std::env::var("TIMEZONE")
                .ok()
                .and_then(|tz| tz.parse().ok())
                .unwrap_or(chrono_tz::Europe::Berlin),
            table_count: std::env::var("TABLE_COUNT")
                .ok()
                .and_then(|n| n.parse().ok())
                .unwrap_or(12),
            standard_tax_rate: std::env::var("STANDARD_TAX_RATE")
                .ok()
                .and_then(|r| Decimal::from_str(&r).ok())
                .unwrap_or(Decimal::new(1900, 2)),
            reduced_tax_rate: std::env::var("REDUCED_TAX_RATE")
                .ok()
                .and_then(|r| Decimal::from_str(&r).ok())
                .unwrap_or(Decimal::new(700, 2)),
            request_timeout_ms: std::env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(30000),
            jwt_secret: std::env::var("JWT_SECRET").unwrap_or_else(|_| "dev-secret".into()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
        }
    }

    /// The jurisdiction tax policy this deployment runs under
    pub fn tax_policy(&self) -> TaxPolicy {
        TaxPolicy {
            standard_rate: self.standard_tax_rate,
            reduced_rate: self.reduced_tax_rate,
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

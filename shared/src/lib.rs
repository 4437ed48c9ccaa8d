//! Shared types for the POS order core
//!
//! Data models and small utilities used by the server and its tests:
//! orders and line items, dining tables, external (public-menu) orders,
//! the product catalog, tax summaries, and daily report shapes.

pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

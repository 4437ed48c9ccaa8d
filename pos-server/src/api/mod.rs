//! API routes
//!
//! # Structure
//!
//! - [`health`] - liveness check
//! - [`orders`] - order create/update/status
//! - [`tables`] - table pool and explicit clear
//! - [`products`] - catalog list/upsert
//! - [`external_orders`] - public submission, staff surface, SSE stream
//! - [`reports`] - daily sales

pub mod external_orders;
pub mod health;
pub mod orders;
pub mod products;
pub mod reports;
pub mod tables;

// Re-export common types for handlers
pub use crate::utils::{AppError, AppResult};

//! Order Transaction Core
//!
//! - **manager**: multi-row order writes inside single store transactions
//! - **validate**: payload shape checks, run before a transaction opens
//! - **error**: the `Unauthorized` / `NotFound` / `Validation` /
//!   `TransactionFailed` taxonomy every operation surfaces

mod error;
pub mod manager;
pub mod validate;

pub use error::{OrderError, OrderResult};
pub use manager::OrderManager;

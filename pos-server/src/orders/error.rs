//! Order operation error taxonomy

use thiserror::Error;

use crate::store::StoreError;

/// Errors surfaced by order, table and external-order operations
///
/// Business failures detected before any write abort before a transaction
/// is opened; failures inside a transaction roll back and collapse into
/// the generic `TransactionFailed` — the cause is logged server-side and
/// never echoed to the caller.
#[derive(Debug, Error)]
pub enum OrderError {
    /// No acting user, or the acting user cannot see the resource
    #[error("Authentication required")]
    Unauthorized,

    /// Referenced order/table/product/external order absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed or missing required input
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Store-level fault during a write; the transaction was rolled back
    #[error("Transaction failed")]
    TransactionFailed,
}

pub type OrderResult<T> = Result<T, OrderError>;

impl From<StoreError> for OrderError {
    fn from(e: StoreError) -> Self {
        tracing::error!(error = %e, "store fault, surfacing as generic transaction failure");
        OrderError::TransactionFailed
    }
}

//! Unified API error handling
//!
//! # Error code scheme
//!
//! | Prefix | Category | Example |
//! |--------|----------|---------|
//! | E0xxx | business errors | E0003 not found |
//! | E2xxx | permission errors | E2001 forbidden |
//! | E3xxx | authentication errors | E3001 not logged in |
//! | E9xxx | system errors | E9002 transaction failed |

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

use crate::orders::OrderError;
use crate::store::StoreError;

/// Uniform API response envelope
///
/// ```json
/// {
///   "code": "E0000",
///   "message": "Success",
///   "data": { ... }
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct AppResponse<T> {
    /// Error code (E0000 = success)
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// Application error enum
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== Authentication (401) ==========
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid token")]
    InvalidToken,

    // ========== Authorization (403) ==========
    #[error("Permission denied: {0}")]
    Forbidden(String),

    // ========== Business (4xx) ==========
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    // ========== System (5xx) ==========
    /// Multi-row write failed and was rolled back; detail stays in the log
    #[error("Transaction failed")]
    Transaction,

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "E3001", "Please login first"),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "E3002", "Invalid token"),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "E2001", msg.as_str()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "E0003", msg.as_str()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "E0002", msg.as_str()),
            AppError::Transaction => {
                (StatusCode::INTERNAL_SERVER_ERROR, "E9002", "Transaction failed")
            }
            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Internal error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "E9001",
                    "Internal server error",
                )
            }
        };

        let body = Json(AppResponse::<()> {
            code: code.to_string(),
            message: message.to_string(),
            data: None,
        });
        (status, body).into_response()
    }
}

impl From<OrderError> for AppError {
    fn from(e: OrderError) -> Self {
        match e {
            OrderError::Unauthorized => AppError::Unauthorized,
            OrderError::NotFound(msg) => AppError::NotFound(msg),
            OrderError::Validation(msg) => AppError::Validation(msg),
            OrderError::TransactionFailed => AppError::Transaction,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        error!(error = %e, "store fault");
        AppError::Transaction
    }
}

pub type AppResult<T> = Result<T, AppError>;

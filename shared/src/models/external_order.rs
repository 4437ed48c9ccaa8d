//! External Order Model
//!
//! The public-submission shadow record paired 1:1 with an [`Order`],
//! carrying customer contact details. It owns its own copy of the item
//! rows, written in the same transaction as the paired order.
//!
//! [`Order`]: super::order::Order

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::order::OrderItem;

/// External order status; transitions are staff-driven
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExternalOrderStatus {
    #[default]
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

/// External order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalOrder {
    /// UUID
    pub id: String,
    /// The paired order this record shadows
    pub order_id: u64,
    /// Server-computed from catalog prices; the public client is untrusted
    pub total: Decimal,
    pub status: ExternalOrderStatus,
    /// Staff account/tenant whose public menu received the submission
    pub admin_user_id: String,
    pub source: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_note: Option<String>,
    /// RFC 3339
    pub created_at: String,
}

/// External order with its own item rows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalOrderDetail {
    #[serde(flatten)]
    pub external: ExternalOrder,
    pub items: Vec<OrderItem>,
}

/// Line item of a public submission. Price and name are resolved from the
/// target tenant's catalog, never taken from the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalItemInput {
    pub product_id: String,
    pub quantity: u32,
}

/// Public submission payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalOrderSubmit {
    pub admin_user_id: String,
    pub source: Option<String>,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_note: Option<String>,
    pub items: Vec<ExternalItemInput>,
}

/// Status update payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalOrderStatusUpdate {
    pub status: ExternalOrderStatus,
}

//! Order Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::dining_table::DiningTable;

/// Order lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Open order being built or awaiting checkout
    #[default]
    Pending,
    /// Checked out (cash/card) or confirmed external pickup
    Completed,
    /// Voided by staff action
    Cancelled,
    /// Saved-for-later cart held against a table
    Parked,
}

impl OrderStatus {
    /// Terminal orders no longer hold a table and are historical.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }
}

/// Payment method recorded on the order header
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Card,
    /// Submitted through a public menu link, settled out of band
    External,
}

/// Order entity (header row; items are stored as separate rows)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: u64,
    /// Caller-supplied total, fixed-point 2dp. Not re-derived from items;
    /// keeping it consistent with the item rows is the caller's contract.
    pub total: Decimal,
    pub status: OrderStatus,
    /// RFC 3339
    pub timestamp: String,
    pub payment_method: PaymentMethod,
    /// Only meaningful for cash payments
    pub cash_received: Option<Decimal>,
    /// None = takeaway/pickup
    pub table_id: Option<u64>,
    /// Staff account the order belongs to
    pub user_id: String,
}

/// Order line item
///
/// Belongs to exactly one of {order, external order}; exactly one of the
/// two parent references is populated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: u64,
    pub order_id: Option<u64>,
    pub external_order_id: Option<String>,
    pub product_id: String,
    /// Denormalized at write time; immune to later catalog renames
    pub product_name: String,
    pub quantity: u32,
    /// Frozen at write time
    pub price: Decimal,
    /// Percent, e.g. 19.00 or 7.00
    pub tax_rate: Decimal,
}

impl OrderItem {
    /// Gross line amount (price × quantity), unrounded
    pub fn gross(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Order with relations hydrated (the read-after-write shape returned by
/// every mutation)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub table: Option<DiningTable>,
}

/// Line item payload for create/update
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemInput {
    pub product_id: String,
    pub quantity: u32,
    pub price: Decimal,
    pub tax_rate: Decimal,
}

/// Create order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    pub total: Decimal,
    #[serde(default)]
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub cash_received: Option<Decimal>,
    pub table_id: Option<u64>,
    /// Client-set timestamp; server time when absent
    pub timestamp: Option<String>,
    pub items: Vec<OrderItemInput>,
}

/// Update order payload
///
/// Only supplied fields change. `items: None` keeps the current item rows;
/// `items: Some(list)` deletes all existing rows for the order and inserts
/// the full new list (replace, not patch).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OrderUpdate {
    pub total: Option<Decimal>,
    pub status: Option<OrderStatus>,
    pub payment_method: Option<PaymentMethod>,
    pub cash_received: Option<Decimal>,
    pub table_id: Option<u64>,
    pub timestamp: Option<String>,
    pub items: Option<Vec<OrderItemInput>>,
}

/// Update status payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
}

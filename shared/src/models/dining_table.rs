//! Dining Table Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Dining table entity
///
/// Tables are seeded once as a fixed pool (plus a virtual pickup entry)
/// and never deleted in normal operation. The occupancy fields are written
/// exclusively by the table synchronizer; `occupied` holds if and only if
/// a non-terminal order references this table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiningTable {
    pub id: u64,
    pub name: String,
    pub occupied: bool,
    /// Owning order, for display on the floor plan
    pub order_id: Option<u64>,
    pub order_total: Option<Decimal>,
    pub order_item_count: Option<u32>,
}

impl DiningTable {
    /// A free table with no order snapshot
    pub fn free(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            occupied: false,
            order_id: None,
            order_total: None,
            order_item_count: None,
        }
    }
}

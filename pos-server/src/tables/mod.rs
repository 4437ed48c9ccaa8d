//! Table occupancy synchronization
//!
//! Single writer of the `occupied`/order-snapshot fields on
//! [`DiningTable`]: every order write path routes through
//! [`sync_for_order`] inside its own write transaction, so the invariant
//!
//! > `occupied == exists(non-terminal order with table_id == table.id)`
//!
//! cannot be broken by a caller forgetting a flip. Because redb serializes
//! write transactions, check-and-occupy is atomic — a create racing a
//! status change that frees the same table sees either the table still
//! held or already free, never a stale mixture.

use redb::WriteTransaction;
use shared::models::{DiningTable, Order, OrderStatus};

use crate::orders::{OrderError, OrderResult};
use crate::store::{PosStore, StoreResult};

/// Free → Occupied: record the owning order and its display snapshot
/// (current total, item count) on the table row.
pub fn occupy(
    store: &PosStore,
    txn: &WriteTransaction,
    table_id: u64,
    order: &Order,
    item_count: u32,
) -> StoreResult<()> {
    let Some(mut table) = store.get_table_txn(txn, table_id)? else {
        tracing::warn!(table_id, "occupy on unknown table, skipped");
        return Ok(());
    };
    table.occupied = true;
    table.order_id = Some(order.id);
    table.order_total = Some(order.total);
    table.order_item_count = Some(item_count);
    store.put_table(txn, &table)?;
    tracing::debug!(table_id, order_id = order.id, "table occupied");
    Ok(())
}

/// Occupied → Free: drop the order reference
pub fn release(store: &PosStore, txn: &WriteTransaction, table_id: u64) -> StoreResult<()> {
    let Some(mut table) = store.get_table_txn(txn, table_id)? else {
        tracing::warn!(table_id, "release on unknown table, skipped");
        return Ok(());
    };
    table.occupied = false;
    table.order_id = None;
    table.order_total = None;
    table.order_item_count = None;
    store.put_table(txn, &table)?;
    tracing::debug!(table_id, "table released");
    Ok(())
}

/// Derive the table state from an order's current status
///
/// Non-terminal order on a table → occupied; terminal → free. Orders
/// without a table (takeaway/pickup) are a no-op.
pub fn sync_for_order(
    store: &PosStore,
    txn: &WriteTransaction,
    order: &Order,
    item_count: u32,
) -> StoreResult<()> {
    let Some(table_id) = order.table_id else {
        return Ok(());
    };
    if order.status.is_terminal() {
        release(store, txn, table_id)
    } else {
        occupy(store, txn, table_id, order, item_count)
    }
}

/// Staff-explicit clear: cancels the live order holding the table (if any)
/// and frees it, in one transaction, so the invariant holds afterwards.
pub fn clear_table(store: &PosStore, table_id: u64) -> OrderResult<DiningTable> {
    let txn = store.begin_write()?;
    store
        .get_table_txn(&txn, table_id)?
        .ok_or_else(|| OrderError::NotFound(format!("table {table_id}")))?;

    if let Some(mut order) = store.find_live_order_for_table_txn(&txn, table_id)? {
        order.status = OrderStatus::Cancelled;
        store.put_order(&txn, &order)?;
        tracing::info!(table_id, order_id = order.id, "live order cancelled by table clear");
    }
    release(store, &txn, table_id)?;
    txn.commit().map_err(crate::store::StoreError::from)?;

    store
        .get_table(table_id)?
        .ok_or_else(|| OrderError::NotFound(format!("table {table_id}")))
}

/// Check the occupancy invariant over the whole pool (test support)
pub fn occupancy_consistent(store: &PosStore) -> StoreResult<bool> {
    for table in store.list_tables()? {
        let live = store.find_live_order_for_table(table.id)?;
        if table.occupied != live.is_some() {
            return Ok(false);
        }
    }
    Ok(true)
}

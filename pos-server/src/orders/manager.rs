//! Order Transaction Manager
//!
//! Orchestrates every multi-row order write inside one store transaction:
//! header, line items and the table link change together or not at all.
//!
//! # Write Flow
//!
//! ```text
//! create/update(input, acting_user)
//!     ├─ 1. Acting-user check (Unauthorized before any work)
//!     ├─ 2. Shape validation (Validation before the transaction opens)
//!     ├─ 3. Begin write transaction
//!     ├─ 4. Resolve table row, reject if held by another live order
//!     ├─ 5. Write header (children reference its allocated id)
//!     ├─ 6. Resolve product names per item, freeze them on the rows
//!     ├─ 7. Synchronize table occupancy from the final status
//!     ├─ 8. Commit (drop on any earlier error = rollback)
//!     └─ 9. Fresh read-after-write, relations hydrated
//! ```
//!
//! Business errors raised between 3 and 8 return early; the transaction
//! drops uncommitted and the store is untouched. Store faults collapse to
//! the generic `TransactionFailed` with the cause logged server-side.

use shared::models::{
    Order, OrderCreate, OrderDetail, OrderItem, OrderItemInput, OrderStatusUpdate, OrderUpdate,
};

use super::{OrderError, OrderResult, validate};
use crate::auth::CurrentUser;
use crate::store::{PosStore, StoreError};
use crate::tables;

#[derive(Clone)]
pub struct OrderManager {
    store: PosStore,
}

impl OrderManager {
    pub fn new(store: PosStore) -> Self {
        Self { store }
    }

    /// Create an order with its line items, optionally occupying a table
    pub fn create_order(
        &self,
        input: OrderCreate,
        acting: Option<&CurrentUser>,
    ) -> OrderResult<OrderDetail> {
        let user = acting.ok_or(OrderError::Unauthorized)?;
        validate::validate_create(&input)?;

        let txn = self.store.begin_write()?;
        let order_id = self.store.next_order_id(&txn)?;

        let order = Order {
            id: order_id,
            total: input.total,
            status: input.status,
            timestamp: input.timestamp.unwrap_or_else(shared::util::now_rfc3339),
            payment_method: input.payment_method,
            cash_received: input.cash_received,
            table_id: input.table_id,
            user_id: user.id.clone(),
        };

        if let Some(table_id) = order.table_id {
            self.resolve_free_table(&txn, table_id, order_id)?;
        }

        // Header first so the item rows reference a persisted id
        self.store.put_order(&txn, &order)?;
        let item_count = self.write_items(&txn, order_id, &input.items, user)?;

        tables::sync_for_order(&self.store, &txn, &order, item_count)?;
        txn.commit().map_err(StoreError::from)?;

        tracing::info!(
            order_id,
            items = input.items.len(),
            table_id = ?order.table_id,
            user_id = %user.id,
            "order created"
        );
        self.hydrate(order_id)
    }

    /// Update an order: supplied scalar fields change, and a supplied item
    /// list replaces the existing rows wholesale (`None` keeps them)
    pub fn update_order(
        &self,
        id: u64,
        input: OrderUpdate,
        acting: Option<&CurrentUser>,
    ) -> OrderResult<OrderDetail> {
        let user = acting.ok_or(OrderError::Unauthorized)?;
        validate::validate_update(&input)?;

        let txn = self.store.begin_write()?;
        let mut order = self.load_scoped_txn(&txn, id, user)?;
        let prev_table = order.table_id;

        if let Some(total) = input.total {
            order.total = total;
        }
        if let Some(status) = input.status {
            order.status = status;
        }
        if let Some(method) = input.payment_method {
            order.payment_method = method;
        }
        if let Some(cash) = input.cash_received {
            order.cash_received = Some(cash);
        }
        if let Some(ts) = input.timestamp {
            order.timestamp = ts;
        }
        if let Some(table_id) = input.table_id
            && order.table_id != Some(table_id)
        {
            self.resolve_free_table(&txn, table_id, id)?;
            order.table_id = Some(table_id);
        }

        let replaced = input.items.is_some();
        let item_count = if let Some(items) = &input.items {
            // Replace, not patch: the old rows go away entirely
            let removed = self.store.delete_items_for_order(&txn, id)?;
            tracing::debug!(order_id = id, removed, "replacing item rows");
            self.write_items(&txn, id, items, user)?
        } else {
            self.store
                .items_for_order_txn(&txn, id)?
                .iter()
                .map(|i| i.quantity)
                .sum()
        };

        self.store.put_order(&txn, &order)?;

        // A moved order frees the table it previously held
        if let Some(prev) = prev_table
            && order.table_id != Some(prev)
        {
            tables::release(&self.store, &txn, prev)?;
        }
        tables::sync_for_order(&self.store, &txn, &order, item_count)?;
        txn.commit().map_err(StoreError::from)?;

        tracing::info!(order_id = id, replaced_items = replaced, "order updated");
        self.hydrate(id)
    }

    /// Single-field status transition
    ///
    /// The table synchronizer runs inside the same transaction: a
    /// completed or cancelled order releases its table atomically, so no
    /// caller can forget the flip.
    pub fn update_order_status(
        &self,
        id: u64,
        input: OrderStatusUpdate,
        acting: Option<&CurrentUser>,
    ) -> OrderResult<OrderDetail> {
        let user = acting.ok_or(OrderError::Unauthorized)?;

        let txn = self.store.begin_write()?;
        let mut order = self.load_scoped_txn(&txn, id, user)?;
        let previous = order.status;
        order.status = input.status;
        self.store.put_order(&txn, &order)?;

        let item_count = self
            .store
            .items_for_order_txn(&txn, id)?
            .iter()
            .map(|i| i.quantity)
            .sum();
        tables::sync_for_order(&self.store, &txn, &order, item_count)?;
        txn.commit().map_err(StoreError::from)?;

        tracing::info!(order_id = id, from = ?previous, to = ?input.status, "order status changed");
        self.hydrate(id)
    }

    /// Fetch an order with relations, scoped to the acting user
    pub fn get_order(&self, id: u64, acting: Option<&CurrentUser>) -> OrderResult<OrderDetail> {
        let user = acting.ok_or(OrderError::Unauthorized)?;
        let order = self
            .store
            .get_order(id)?
            .ok_or_else(|| OrderError::NotFound(format!("order {id}")))?;
        if !user.is_admin() && order.user_id != user.id {
            return Err(OrderError::Unauthorized);
        }
        self.hydrate(id)
    }

    /// Resolve a table row and reject when another live order holds it.
    /// Runs inside the serialized write transaction, closing the
    /// check-then-occupy race.
    fn resolve_free_table(
        &self,
        txn: &redb::WriteTransaction,
        table_id: u64,
        order_id: u64,
    ) -> OrderResult<()> {
        let table = self
            .store
            .get_table_txn(txn, table_id)?
            .ok_or_else(|| OrderError::NotFound(format!("table {table_id}")))?;
        if let Some(existing) = self.store.find_live_order_for_table_txn(txn, table_id)?
            && existing.id != order_id
        {
            return Err(OrderError::Validation(format!(
                "table {} is already occupied by order {}",
                table.name, existing.id
            )));
        }
        Ok(())
    }

    /// Resolve product names from the acting tenant's catalog and insert
    /// the item rows. Any unresolvable product aborts the caller's
    /// transaction — no partial order is left behind.
    fn write_items(
        &self,
        txn: &redb::WriteTransaction,
        order_id: u64,
        items: &[OrderItemInput],
        user: &CurrentUser,
    ) -> OrderResult<u32> {
        let mut item_count = 0u32;
        for item in items {
            let product = self
                .store
                .get_product_txn(txn, &item.product_id)?
                .filter(|p| p.admin_user_id == user.tenant_id())
                .ok_or_else(|| OrderError::NotFound(format!("product {}", item.product_id)))?;
            let row = OrderItem {
                id: self.store.next_item_id(txn)?,
                order_id: Some(order_id),
                external_order_id: None,
                product_id: item.product_id.clone(),
                product_name: product.name,
                quantity: item.quantity,
                price: item.price,
                tax_rate: item.tax_rate,
            };
            self.store.put_item(txn, &row)?;
            item_count += item.quantity;
        }
        Ok(item_count)
    }

    fn load_scoped_txn(
        &self,
        txn: &redb::WriteTransaction,
        id: u64,
        user: &CurrentUser,
    ) -> OrderResult<Order> {
        let order = self
            .store
            .get_order_txn(txn, id)?
            .ok_or_else(|| OrderError::NotFound(format!("order {id}")))?;
        if !user.is_admin() && order.user_id != user.id {
            return Err(OrderError::Unauthorized);
        }
        Ok(order)
    }

    /// Fresh read-after-write so callers always observe server-computed
    /// values, never the in-memory write payload
    fn hydrate(&self, order_id: u64) -> OrderResult<OrderDetail> {
        let order = self
            .store
            .get_order(order_id)?
            .ok_or_else(|| OrderError::NotFound(format!("order {order_id}")))?;
        let items = self.store.items_for_order(order_id)?;
        let table = match order.table_id {
            Some(id) => self.store.get_table(id)?,
            None => None,
        };
        Ok(OrderDetail {
            order,
            items,
            table,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shared::models::{OrderStatus, PaymentMethod, Product, TaxClass};

    use crate::auth::Role;

    fn admin() -> CurrentUser {
        CurrentUser {
            id: "admin-1".to_string(),
            username: "boss".to_string(),
            role: Role::Admin,
            parent_user: None,
        }
    }

    fn employee() -> CurrentUser {
        CurrentUser {
            id: "emp-1".to_string(),
            username: "mario".to_string(),
            role: Role::Employee,
            parent_user: Some("admin-1".to_string()),
        }
    }

    fn setup() -> (PosStore, OrderManager) {
        let store = PosStore::open_in_memory().unwrap();
        store.seed_tables(3).unwrap();
        for (id, name, price_cents, class) in [
            ("espresso", "Espresso", 250, TaxClass::Standard),
            ("pizza", "Pizza Margherita", 850, TaxClass::Reduced),
        ] {
            store
                .upsert_product(&Product {
                    id: id.to_string(),
                    admin_user_id: "admin-1".to_string(),
                    name: name.to_string(),
                    price: Decimal::new(price_cents, 2),
                    tax_class: class,
                })
                .unwrap();
        }
        let manager = OrderManager::new(store.clone());
        (store, manager)
    }

    fn item(product_id: &str, quantity: u32, price_cents: i64) -> OrderItemInput {
        OrderItemInput {
            product_id: product_id.to_string(),
            quantity,
            price: Decimal::new(price_cents, 2),
            tax_rate: Decimal::new(1900, 2),
        }
    }

    fn create_input(table_id: Option<u64>, items: Vec<OrderItemInput>) -> OrderCreate {
        let total = items.iter().map(|i| i.price * Decimal::from(i.quantity)).sum();
        OrderCreate {
            total,
            status: OrderStatus::Pending,
            payment_method: PaymentMethod::Cash,
            cash_received: None,
            table_id,
            timestamp: None,
            items,
        }
    }

    #[test]
    fn test_create_order_round_trip() {
        let (store, manager) = setup();
        let input = create_input(None, vec![item("espresso", 3, 250)]);

        let detail = manager.create_order(input, Some(&admin())).unwrap();

        assert_eq!(detail.order.total, Decimal::new(750, 2));
        assert_eq!(detail.items.len(), 1);
        assert_eq!(detail.items[0].quantity, 3);
        assert_eq!(detail.items[0].price, Decimal::new(250, 2));
        // server-populated even though the request never supplied it
        assert_eq!(detail.items[0].product_name, "Espresso");

        // read-after-write matches the store, not the payload
        let stored = store.get_order(detail.order.id).unwrap().unwrap();
        assert_eq!(stored.user_id, "admin-1");
    }

    #[test]
    fn test_create_without_acting_user_writes_nothing() {
        let (store, manager) = setup();
        let input = create_input(None, vec![item("espresso", 1, 250)]);

        let err = manager.create_order(input, None).unwrap_err();
        assert!(matches!(err, OrderError::Unauthorized));
        assert!(store.list_orders().unwrap().is_empty());
    }

    #[test]
    fn test_unresolvable_product_rolls_back_everything() {
        let (store, manager) = setup();
        let input = create_input(
            Some(1),
            vec![item("espresso", 1, 250), item("ghost", 1, 100)],
        );

        let err = manager.create_order(input, Some(&admin())).unwrap_err();
        assert!(matches!(err, OrderError::NotFound(_)));

        // zero rows after the failed call, and the table stayed free
        assert!(store.list_orders().unwrap().is_empty());
        assert!(store.items_for_order(1).unwrap().is_empty());
        assert!(!store.get_table(1).unwrap().unwrap().occupied);
    }

    #[test]
    fn test_create_occupies_table() {
        let (store, manager) = setup();
        let input = create_input(Some(2), vec![item("pizza", 2, 850)]);

        let detail = manager.create_order(input, Some(&admin())).unwrap();

        let table = store.get_table(2).unwrap().unwrap();
        assert!(table.occupied);
        assert_eq!(table.order_id, Some(detail.order.id));
        assert_eq!(table.order_item_count, Some(2));
        assert!(crate::tables::occupancy_consistent(&store).unwrap());
    }

    #[test]
    fn test_create_on_occupied_table_rejected() {
        let (store, manager) = setup();
        manager
            .create_order(create_input(Some(1), vec![item("pizza", 1, 850)]), Some(&admin()))
            .unwrap();

        let err = manager
            .create_order(create_input(Some(1), vec![item("espresso", 1, 250)]), Some(&admin()))
            .unwrap_err();
        assert!(matches!(err, OrderError::Validation(_)));
        assert_eq!(store.list_orders().unwrap().len(), 1);
    }

    #[test]
    fn test_unknown_table_not_found() {
        let (_store, manager) = setup();
        let err = manager
            .create_order(create_input(Some(42), vec![item("espresso", 1, 250)]), Some(&admin()))
            .unwrap_err();
        assert!(matches!(err, OrderError::NotFound(_)));
    }

    #[test]
    fn test_update_replaces_items_wholesale() {
        let (store, manager) = setup();
        let detail = manager
            .create_order(
                create_input(None, vec![item("espresso", 2, 250), item("pizza", 1, 850)]),
                Some(&admin()),
            )
            .unwrap();
        let old_ids: Vec<u64> = detail.items.iter().map(|i| i.id).collect();

        let updated = manager
            .update_order(
                detail.order.id,
                OrderUpdate {
                    total: Some(Decimal::new(850, 2)),
                    items: Some(vec![item("pizza", 1, 850)]),
                    ..Default::default()
                },
                Some(&admin()),
            )
            .unwrap();

        // old row ids are all gone, only the new set exists
        assert_eq!(updated.items.len(), 1);
        assert!(updated.items.iter().all(|i| !old_ids.contains(&i.id)));
        assert_eq!(updated.items[0].product_name, "Pizza Margherita");
        assert_eq!(
            store.items_for_order(detail.order.id).unwrap().len(),
            1
        );
    }

    #[test]
    fn test_update_without_items_keeps_rows() {
        let (store, manager) = setup();
        let detail = manager
            .create_order(create_input(None, vec![item("espresso", 2, 250)]), Some(&admin()))
            .unwrap();

        let updated = manager
            .update_order(
                detail.order.id,
                OrderUpdate {
                    total: Some(Decimal::new(500, 2)),
                    ..Default::default()
                },
                Some(&admin()),
            )
            .unwrap();

        assert_eq!(updated.items.len(), 1);
        assert_eq!(updated.items[0].id, detail.items[0].id);
        assert_eq!(store.items_for_order(detail.order.id).unwrap().len(), 1);
    }

    #[test]
    fn test_update_failed_replace_rolls_back() {
        let (store, manager) = setup();
        let detail = manager
            .create_order(create_input(None, vec![item("espresso", 2, 250)]), Some(&admin()))
            .unwrap();

        let err = manager
            .update_order(
                detail.order.id,
                OrderUpdate {
                    items: Some(vec![item("ghost", 1, 100)]),
                    ..Default::default()
                },
                Some(&admin()),
            )
            .unwrap_err();
        assert!(matches!(err, OrderError::NotFound(_)));

        // the old rows survived the failed replace
        let items = store.items_for_order(detail.order.id).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product_id, "espresso");
    }

    #[test]
    fn test_completion_releases_table() {
        let (store, manager) = setup();
        let detail = manager
            .create_order(create_input(Some(3), vec![item("pizza", 1, 850)]), Some(&admin()))
            .unwrap();
        assert!(store.get_table(3).unwrap().unwrap().occupied);

        manager
            .update_order_status(
                detail.order.id,
                OrderStatusUpdate {
                    status: OrderStatus::Completed,
                },
                Some(&admin()),
            )
            .unwrap();

        assert!(!store.get_table(3).unwrap().unwrap().occupied);
        assert!(crate::tables::occupancy_consistent(&store).unwrap());

        // the freed table can be taken again
        manager
            .create_order(create_input(Some(3), vec![item("espresso", 1, 250)]), Some(&admin()))
            .unwrap();
        assert!(store.get_table(3).unwrap().unwrap().occupied);
    }

    #[test]
    fn test_move_order_to_another_table() {
        let (store, manager) = setup();
        let detail = manager
            .create_order(create_input(Some(1), vec![item("pizza", 1, 850)]), Some(&admin()))
            .unwrap();

        manager
            .update_order(
                detail.order.id,
                OrderUpdate {
                    table_id: Some(2),
                    ..Default::default()
                },
                Some(&admin()),
            )
            .unwrap();

        assert!(!store.get_table(1).unwrap().unwrap().occupied);
        assert!(store.get_table(2).unwrap().unwrap().occupied);
        assert!(crate::tables::occupancy_consistent(&store).unwrap());
    }

    #[test]
    fn test_employee_cannot_touch_foreign_order() {
        let (_store, manager) = setup();
        let detail = manager
            .create_order(create_input(None, vec![item("espresso", 1, 250)]), Some(&admin()))
            .unwrap();

        let err = manager
            .update_order(
                detail.order.id,
                OrderUpdate {
                    total: Some(Decimal::ZERO),
                    ..Default::default()
                },
                Some(&employee()),
            )
            .unwrap_err();
        assert!(matches!(err, OrderError::Unauthorized));

        // employees resolve products through their parent's catalog
        let own = manager
            .create_order(create_input(None, vec![item("espresso", 1, 250)]), Some(&employee()))
            .unwrap();
        assert_eq!(own.order.user_id, "emp-1");
        assert_eq!(own.items[0].product_name, "Espresso");
    }

    #[test]
    fn test_unknown_order_not_found() {
        let (_store, manager) = setup();
        let err = manager
            .update_order_status(
                999,
                OrderStatusUpdate {
                    status: OrderStatus::Completed,
                },
                Some(&admin()),
            )
            .unwrap_err();
        assert!(matches!(err, OrderError::NotFound(_)));
    }
}

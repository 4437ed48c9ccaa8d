//! External order ingestion
//!
//! The public-menu trust boundary: submissions arrive unauthenticated, so
//! the only client-controlled facts that survive are product ids,
//! quantities and contact details. Names and prices come from the target
//! tenant's catalog, the total is computed server-side, and any
//! unresolvable product aborts the whole submission (matching the
//! authenticated path) — a submission never half-lands.
//!
//! One transaction writes four things: the paired order header, its item
//! rows, the external order record, and the external record's own copy of
//! the item rows. After commit the full external order is published to the
//! broadcast topic; staff clients that miss the push find the order via
//! the pending-list query.

use rust_decimal::Decimal;
use shared::models::{
    ExternalOrder, ExternalOrderDetail, ExternalOrderStatus, Order, OrderItem, OrderStatus,
    PaymentMethod, Product,
};

use super::notifier::OrderNotifier;
use crate::orders::{OrderError, OrderResult, validate};
use crate::store::{PosStore, StoreError};
use crate::tax::TaxPolicy;

#[derive(Clone)]
pub struct ExternalOrderPipeline {
    store: PosStore,
    notifier: OrderNotifier,
    policy: TaxPolicy,
}

impl ExternalOrderPipeline {
    pub fn new(store: PosStore, notifier: OrderNotifier, policy: TaxPolicy) -> Self {
        Self {
            store,
            notifier,
            policy,
        }
    }

    /// Accept a public submission: durable record first, push second
    pub fn submit(
        &self,
        input: shared::models::ExternalOrderSubmit,
    ) -> OrderResult<ExternalOrderDetail> {
        validate::validate_submit(&input)?;

        let txn = self.store.begin_write()?;

        // Resolve the full cart against the tenant catalog before writing
        // anything; an unknown product aborts the submission.
        let mut resolved: Vec<(u32, Product, Decimal)> = Vec::with_capacity(input.items.len());
        let mut total = Decimal::ZERO;
        for item in &input.items {
            let product = self
                .store
                .get_product_txn(&txn, &item.product_id)?
                .filter(|p| p.admin_user_id == input.admin_user_id)
                .ok_or_else(|| {
                    OrderError::Validation(format!("unknown product {}", item.product_id))
                })?;
            // External consumption is takeaway: outdoor rate class applies
            let rate = self.policy.effective_rate(product.tax_class, false);
            total += product.price * Decimal::from(item.quantity);
            resolved.push((item.quantity, product, rate));
        }
        let total = crate::tax::round_money(total);
        let created_at = shared::util::now_rfc3339();

        let order_id = self.store.next_order_id(&txn)?;
        let order = Order {
            id: order_id,
            total,
            status: OrderStatus::Pending,
            timestamp: created_at.clone(),
            payment_method: PaymentMethod::External,
            cash_received: None,
            table_id: None,
            user_id: input.admin_user_id.clone(),
        };
        self.store.put_order(&txn, &order)?;

        for (quantity, product, rate) in &resolved {
            let row = OrderItem {
                id: self.store.next_item_id(&txn)?,
                order_id: Some(order_id),
                external_order_id: None,
                product_id: product.id.clone(),
                product_name: product.name.clone(),
                quantity: *quantity,
                price: product.price,
                tax_rate: *rate,
            };
            self.store.put_item(&txn, &row)?;
        }

        let external = ExternalOrder {
            id: uuid::Uuid::new_v4().to_string(),
            order_id,
            total,
            status: ExternalOrderStatus::Pending,
            admin_user_id: input.admin_user_id,
            source: input.source.unwrap_or_else(|| "public_menu".to_string()),
            customer_name: input.customer_name,
            customer_phone: input.customer_phone,
            customer_note: input.customer_note,
            created_at,
        };
        self.store.put_external(&txn, &external)?;

        // The shadow record owns its own item copies, independent of the
        // paired order's rows
        let mut external_items = Vec::with_capacity(resolved.len());
        for (quantity, product, rate) in &resolved {
            let row = OrderItem {
                id: self.store.next_item_id(&txn)?,
                order_id: None,
                external_order_id: Some(external.id.clone()),
                product_id: product.id.clone(),
                product_name: product.name.clone(),
                quantity: *quantity,
                price: product.price,
                tax_rate: *rate,
            };
            self.store.put_item(&txn, &row)?;
            external_items.push(row);
        }

        txn.commit().map_err(StoreError::from)?;
        tracing::info!(
            external_id = %external.id,
            order_id,
            admin_user_id = %external.admin_user_id,
            total = %external.total,
            "external order ingested"
        );

        self.notifier.publish(external.clone());

        Ok(ExternalOrderDetail {
            external,
            items: external_items,
        })
    }

    /// Staff-driven status transition; re-applying the current status is a
    /// no-op success. Terminal transitions mirror onto the paired order so
    /// table-free reporting stays coherent.
    pub fn update_status(
        &self,
        id: &str,
        status: ExternalOrderStatus,
    ) -> OrderResult<ExternalOrder> {
        let txn = self.store.begin_write()?;
        let mut external = self
            .store
            .get_external_txn(&txn, id)?
            .ok_or_else(|| OrderError::NotFound(format!("external order {id}")))?;

        if external.status == status {
            // idempotent re-apply; nothing to write
            return Ok(external);
        }

        external.status = status;
        self.store.put_external(&txn, &external)?;

        let mirrored = match status {
            ExternalOrderStatus::Completed => Some(OrderStatus::Completed),
            ExternalOrderStatus::Cancelled => Some(OrderStatus::Cancelled),
            _ => None,
        };
        if let Some(order_status) = mirrored
            && let Some(mut order) = self.store.get_order_txn(&txn, external.order_id)?
        {
            order.status = order_status;
            self.store.put_order(&txn, &order)?;
        }

        txn.commit().map_err(StoreError::from)?;
        tracing::info!(external_id = %id, status = ?status, "external order status changed");
        Ok(external)
    }

    /// Polling fallback for clients that missed the push
    pub fn list_pending_by_admin(
        &self,
        admin_user_id: &str,
    ) -> OrderResult<Vec<ExternalOrderDetail>> {
        let mut details = Vec::new();
        for external in self.store.list_external_pending(admin_user_id)? {
            let items = self.store.items_for_external(&external.id)?;
            details.push(ExternalOrderDetail { external, items });
        }
        Ok(details)
    }

    /// Fetch one external order with its items
    pub fn get(&self, id: &str) -> OrderResult<ExternalOrderDetail> {
        let external = self
            .store
            .get_external(id)?
            .ok_or_else(|| OrderError::NotFound(format!("external order {id}")))?;
        let items = self.store.items_for_external(id)?;
        Ok(ExternalOrderDetail { external, items })
    }
}

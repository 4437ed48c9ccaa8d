//! End-to-end order lifecycle against a file-backed store
//!
//! Drives the core services the way the API layer does: seed a catalog,
//! ring up orders against tables, ingest a public submission, transition
//! statuses, and check the daily report and the occupancy invariant at
//! every step.

use rust_decimal::Decimal;
use tempfile::TempDir;

use pos_server::auth::{CurrentUser, Role};
use pos_server::core::{Config, ServerState};
use pos_server::external::ExternalOrderPipeline;
use pos_server::orders::{OrderError, OrderManager};
use pos_server::store::PosStore;
use pos_server::tables;

use shared::models::{
    ExternalItemInput, ExternalOrderStatus, ExternalOrderSubmit, OrderCreate, OrderItemInput,
    OrderStatus, OrderStatusUpdate, OrderUpdate, PaymentMethod, Product, TaxClass,
};

struct Harness {
    _dir: TempDir,
    state: ServerState,
}

impl Harness {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let mut config = Config::from_env();
        config.work_dir = dir.path().to_string_lossy().into_owned();
        config.table_count = 4;
        config.timezone = chrono_tz::UTC;

        let store = PosStore::open(dir.path().join("pos.redb")).unwrap();
        let state = ServerState::with_store(config, store).unwrap();

        for (id, name, price_cents, class) in [
            ("espresso", "Espresso", 250, TaxClass::Standard),
            ("pizza", "Pizza Margherita", 850, TaxClass::Reduced),
            ("tiramisu", "Tiramisu", 500, TaxClass::Reduced),
        ] {
            state
                .store
                .upsert_product(&Product {
                    id: id.to_string(),
                    admin_user_id: "admin-1".to_string(),
                    name: name.to_string(),
                    price: Decimal::new(price_cents, 2),
                    tax_class: class,
                })
                .unwrap();
        }
        Self { _dir: dir, state }
    }

    fn admin(&self) -> CurrentUser {
        CurrentUser {
            id: "admin-1".to_string(),
            username: "boss".to_string(),
            role: Role::Admin,
            parent_user: None,
        }
    }

    fn orders(&self) -> &OrderManager {
        &self.state.orders
    }

    fn pipeline(&self) -> &ExternalOrderPipeline {
        &self.state.pipeline
    }

    fn store(&self) -> &PosStore {
        &self.state.store
    }
}

fn item(product_id: &str, quantity: u32, price_cents: i64, rate_cents: i64) -> OrderItemInput {
    OrderItemInput {
        product_id: product_id.to_string(),
        quantity,
        price: Decimal::new(price_cents, 2),
        tax_rate: Decimal::new(rate_cents, 2),
    }
}

fn dine_in(table_id: u64, items: Vec<OrderItemInput>) -> OrderCreate {
    let total = items
        .iter()
        .map(|i| i.price * Decimal::from(i.quantity))
        .sum();
    OrderCreate {
        total,
        status: OrderStatus::Pending,
        payment_method: PaymentMethod::Card,
        cash_received: None,
        table_id: Some(table_id),
        timestamp: None,
        items,
    }
}

#[test]
fn full_dine_in_lifecycle() {
    let h = Harness::new();
    let admin = h.admin();

    // ring up a table, cart of 2×espresso + 1×pizza
    let created = h
        .orders()
        .create_order(
            dine_in(1, vec![item("espresso", 2, 250, 1900), item("pizza", 1, 850, 1900)]),
            Some(&admin),
        )
        .unwrap();
    assert_eq!(created.order.total, Decimal::new(1350, 2));
    assert_eq!(created.items.len(), 2);
    assert!(created.table.as_ref().unwrap().occupied);
    assert!(tables::occupancy_consistent(h.store()).unwrap());

    // guest adds dessert: the UI sends the complete new cart
    let updated = h
        .orders()
        .update_order(
            created.order.id,
            OrderUpdate {
                total: Some(Decimal::new(1850, 2)),
                items: Some(vec![
                    item("espresso", 2, 250, 1900),
                    item("pizza", 1, 850, 1900),
                    item("tiramisu", 1, 500, 1900),
                ]),
                ..Default::default()
            },
            Some(&admin),
        )
        .unwrap();
    assert_eq!(updated.items.len(), 3);
    // old rows are gone, not orphaned
    let old_ids: Vec<u64> = created.items.iter().map(|i| i.id).collect();
    assert!(updated.items.iter().all(|i| !old_ids.contains(&i.id)));

    // checkout frees the table atomically
    let completed = h
        .orders()
        .update_order_status(
            created.order.id,
            OrderStatusUpdate {
                status: OrderStatus::Completed,
            },
            Some(&admin),
        )
        .unwrap();
    assert_eq!(completed.order.status, OrderStatus::Completed);
    assert!(!h.store().get_table(1).unwrap().unwrap().occupied);
    assert!(tables::occupancy_consistent(h.store()).unwrap());
}

#[test]
fn park_and_resume_on_table_switch() {
    let h = Harness::new();
    let admin = h.admin();

    // auto-park-on-switch arrives server-side as a parked create
    let mut input = dine_in(2, vec![item("pizza", 1, 850, 1900)]);
    input.status = OrderStatus::Parked;
    let parked = h.orders().create_order(input, Some(&admin)).unwrap();
    assert!(h.store().get_table(2).unwrap().unwrap().occupied);

    // the parked cart moves to another table when resumed
    h.orders()
        .update_order(
            parked.order.id,
            OrderUpdate {
                status: Some(OrderStatus::Pending),
                table_id: Some(3),
                ..Default::default()
            },
            Some(&admin),
        )
        .unwrap();
    assert!(!h.store().get_table(2).unwrap().unwrap().occupied);
    assert!(h.store().get_table(3).unwrap().unwrap().occupied);
    assert!(tables::occupancy_consistent(h.store()).unwrap());
}

#[test]
fn failed_create_leaves_no_trace() {
    let h = Harness::new();
    let admin = h.admin();

    let err = h
        .orders()
        .create_order(
            dine_in(1, vec![item("espresso", 1, 250, 1900), item("ghost", 1, 100, 1900)]),
            Some(&admin),
        )
        .unwrap_err();
    assert!(matches!(err, OrderError::NotFound(_)));

    assert!(h.store().list_orders().unwrap().is_empty());
    assert!(!h.store().get_table(1).unwrap().unwrap().occupied);

    // unauthenticated caller cannot write either
    let err = h
        .orders()
        .create_order(dine_in(1, vec![item("espresso", 1, 250, 1900)]), None)
        .unwrap_err();
    assert!(matches!(err, OrderError::Unauthorized));
    assert!(h.store().list_orders().unwrap().is_empty());
}

#[tokio::test]
async fn external_submission_reaches_staff_and_report() {
    let h = Harness::new();
    let mut rx = h.state.notifier.subscribe();

    let detail = h
        .pipeline()
        .submit(ExternalOrderSubmit {
            admin_user_id: "admin-1".to_string(),
            source: Some("qr_menu".to_string()),
            customer_name: "Ana".to_string(),
            customer_phone: "+49150000000".to_string(),
            customer_note: None,
            items: vec![
                ExternalItemInput {
                    product_id: "pizza".to_string(),
                    quantity: 2,
                },
                ExternalItemInput {
                    product_id: "espresso".to_string(),
                    quantity: 1,
                },
            ],
        })
        .unwrap();

    // catalog-priced total: 2×8.50 + 2.50
    assert_eq!(detail.external.total, Decimal::new(1950, 2));

    // the push carried the full record to the subscriber
    let event = rx.recv().await.unwrap();
    assert_eq!(event.order.id, detail.external.id);

    // polling fallback sees it too
    let pending = h.pipeline().list_pending_by_admin("admin-1").unwrap();
    assert_eq!(pending.len(), 1);

    // staff completes it (twice - idempotent), paired order follows
    h.pipeline()
        .update_status(&detail.external.id, ExternalOrderStatus::Completed)
        .unwrap();
    let again = h
        .pipeline()
        .update_status(&detail.external.id, ExternalOrderStatus::Completed)
        .unwrap();
    assert_eq!(again.status, ExternalOrderStatus::Completed);
    assert!(h.pipeline().list_pending_by_admin("admin-1").unwrap().is_empty());

    // the completed paired order lands in today's report
    let today = chrono::Utc::now().format("%Y-%m-%d").to_string();
    let report = h.state.reporter.daily_sales(&today).unwrap();
    assert_eq!(report.order_count, 1);
    assert_eq!(report.total, Decimal::new(1950, 2));

    // takeaway food at the reduced rate, drink at the standard rate
    let pizza = report.items.iter().find(|i| i.product_id == "pizza").unwrap();
    assert_eq!(pizza.tax_rate, Decimal::new(700, 2));
    let espresso = report
        .items
        .iter()
        .find(|i| i.product_id == "espresso")
        .unwrap();
    assert_eq!(espresso.tax_rate, Decimal::new(1900, 2));
}

#[test]
fn daily_report_spans_only_the_requested_day() {
    let h = Harness::new();
    let admin = h.admin();

    for (table, ts) in [(1u64, "2024-01-01T12:00:00+00:00"), (2, "2024-01-01T20:00:00+00:00")] {
        let mut input = dine_in(table, vec![item("espresso", 2, 500, 1900)]);
        input.timestamp = Some(ts.to_string());
        input.total = Decimal::new(1000, 2);
        let created = h.orders().create_order(input, Some(&admin)).unwrap();
        h.orders()
            .update_order_status(
                created.order.id,
                OrderStatusUpdate {
                    status: OrderStatus::Completed,
                },
                Some(&admin),
            )
            .unwrap();
    }

    let report = h.state.reporter.daily_sales("2024-01-01").unwrap();
    assert_eq!(report.order_count, 2);
    assert_eq!(report.total, Decimal::new(2000, 2));
    assert_eq!(report.items.len(), 1);
    assert_eq!(report.items[0].quantity, 4);

    let empty = h.state.reporter.daily_sales("2024-01-02").unwrap();
    assert_eq!(empty.order_count, 0);
    assert_eq!(empty.total, Decimal::ZERO);
    assert!(empty.items.is_empty());
}

//! Data models

pub mod daily_report;
pub mod dining_table;
pub mod external_order;
pub mod order;
pub mod product;
pub mod tax;

pub use daily_report::{DailySalesItem, DailySalesReport};
pub use dining_table::DiningTable;
pub use external_order::{
    ExternalItemInput, ExternalOrder, ExternalOrderDetail, ExternalOrderStatus,
    ExternalOrderStatusUpdate, ExternalOrderSubmit,
};
pub use order::{
    Order, OrderCreate, OrderDetail, OrderItem, OrderItemInput, OrderStatus, OrderStatusUpdate,
    OrderUpdate, PaymentMethod,
};
pub use product::{Product, ProductUpsert};
pub use tax::{RateSummary, TaxBreakdown, TaxClass};

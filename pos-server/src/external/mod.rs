//! External Order Ingestion & Notification
//!
//! - **pipeline**: public submission → durable order + shadow record
//! - **notifier**: best-effort broadcast to connected staff clients

pub mod notifier;
pub mod pipeline;

pub use notifier::{EXTERNAL_ORDER_TOPIC, ExternalOrderEvent, OrderNotifier};
pub use pipeline::ExternalOrderPipeline;

//! Broadcast fan-out for external-order events
//!
//! Fire-and-forget push: every connected subscriber receives every publish
//! independently (fan-out, not queue-with-ack), and with no subscriber the
//! event is simply dropped. Delivery is not guaranteed — the pending-list
//! polling query is the system of record; this channel only makes the
//! staff UI update sooner.

use serde::{Deserialize, Serialize};
use shared::models::ExternalOrder;
use tokio::sync::broadcast;

/// Fixed topic carried on every event
pub const EXTERNAL_ORDER_TOPIC: &str = "external_order.created";

/// Broadcast channel capacity; lagging subscribers skip, they do not block
const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Event pushed to staff clients when a public order lands
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalOrderEvent {
    pub topic: String,
    pub order: ExternalOrder,
}

/// Fan-out publisher handed to the ingestion pipeline
#[derive(Clone)]
pub struct OrderNotifier {
    tx: broadcast::Sender<ExternalOrderEvent>,
}

impl OrderNotifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Publish after commit; never blocks on subscribers
    pub fn publish(&self, order: ExternalOrder) {
        let event = ExternalOrderEvent {
            topic: EXTERNAL_ORDER_TOPIC.to_string(),
            order,
        };
        match self.tx.send(event) {
            Ok(receivers) => {
                tracing::debug!(receivers, "external order event published");
            }
            Err(_) => {
                tracing::debug!("no subscribers connected, external order event dropped");
            }
        }
    }

    /// Subscribe to the event stream; each receiver sees every subsequent
    /// publish
    pub fn subscribe(&self) -> broadcast::Receiver<ExternalOrderEvent> {
        self.tx.subscribe()
    }
}

impl Default for OrderNotifier {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Event Handler Interface
// Defines the contract for handling order lifecycle events
// ============================================================================

use crate::domain::{AssetId, OrderId, OwnerId, Price, Quantity, Side};
use chrono::{DateTime, Utc};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Events emitted by the lifecycle manager after the store has committed
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OrderEvent {
    /// Order validated and persisted as open
    OrderAccepted {
        order_id: OrderId,
        asset_id: AssetId,
        side: Side,
        price: Option<Price>,
        quantity: Quantity,
        timestamp: DateTime<Utc>,
    },

    /// Order rejected before persistence
    OrderRejected {
        owner_id: OwnerId,
        asset_id: AssetId,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    /// Order cancelled by its owner
    OrderCancelled {
        order_id: OrderId,
        asset_id: AssetId,
        remaining_quantity: Quantity,
        timestamp: DateTime<Utc>,
    },

    /// Cancellation matched no cancellable order owned by the caller
    CancelRejected {
        order_id: OrderId,
        owner_id: OwnerId,
        timestamp: DateTime<Utc>,
    },
}

/// Event handler trait for processing lifecycle events
/// Implementations can handle logging, metrics, notifications, etc.
pub trait EventHandler: Send + Sync {
    /// Handle an order event
    fn on_event(&self, event: OrderEvent);

    /// Batch event handler (optional optimization)
    fn on_events(&self, events: Vec<OrderEvent>) {
        for event in events {
            self.on_event(event);
        }
    }
}

/// No-op event handler for testing
pub struct NoOpEventHandler;

impl EventHandler for NoOpEventHandler {
    fn on_event(&self, _event: OrderEvent) {}
}

/// Logging event handler
pub struct LoggingEventHandler;

impl EventHandler for LoggingEventHandler {
    fn on_event(&self, event: OrderEvent) {
        tracing::debug!("Order lifecycle event: {:?}", event);
    }
}

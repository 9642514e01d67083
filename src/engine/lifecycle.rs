// ============================================================================
// Order Lifecycle Manager
// Validates, persists and cancels resting orders
// ============================================================================

use crate::domain::config::{DEFAULT_MAX_PAGE_SIZE, DEFAULT_PAGE_SIZE};
use crate::domain::{
    ExecutionType, NewOrder, Order, OrderId, OrderStatus, OrderUpdate, OwnerId, Page,
    PageRequest, Trade, TradeFilter,
};
use crate::error::{EngineError, EngineResult};
use crate::interfaces::{
    AssetCatalog, EventHandler, LiquiditySource, OrderEvent, OrderQuery, OrderStore, TradeHistory,
};
use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Owns every order mutation this engine performs.
///
/// Mutations go straight to the store as single calls; the only in-process
/// follow-up is invalidating the asset's cached levels, which happens before
/// the call returns.
pub struct OrderLifecycleManager {
    orders: Arc<dyn OrderStore>,
    catalog: Arc<dyn AssetCatalog>,
    trades: Arc<dyn TradeHistory>,
    liquidity: Arc<dyn LiquiditySource>,
    event_handler: Arc<dyn EventHandler>,
    default_page_size: usize,
    max_page_size: usize,
}

impl OrderLifecycleManager {
    pub fn new(
        orders: Arc<dyn OrderStore>,
        catalog: Arc<dyn AssetCatalog>,
        trades: Arc<dyn TradeHistory>,
        liquidity: Arc<dyn LiquiditySource>,
        event_handler: Arc<dyn EventHandler>,
    ) -> Self {
        Self {
            orders,
            catalog,
            trades,
            liquidity,
            event_handler,
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }

    /// Builder method: listing page sizes
    pub fn with_page_sizes(mut self, default_size: usize, max_size: usize) -> Self {
        self.default_page_size = default_size;
        self.max_page_size = max_size;
        self
    }

    /// Check a submission without touching the store
    pub fn validate_order(&self, order: &NewOrder) -> EngineResult<()> {
        if order.owner_id.as_str().is_empty() {
            return Err(EngineError::InvalidOrder("Owner id is required".to_string()));
        }

        if order.asset_id.as_str().is_empty() {
            return Err(EngineError::InvalidOrder("Asset id is required".to_string()));
        }

        if order.quantity <= Decimal::ZERO {
            return Err(EngineError::InvalidOrder(
                "Quantity must be positive".to_string(),
            ));
        }

        match (order.execution_type, order.price) {
            (ExecutionType::Limit, None) => {
                return Err(EngineError::InvalidOrder(
                    "Limit orders must have a price".to_string(),
                ));
            },
            (ExecutionType::Limit, Some(price)) if price <= Decimal::ZERO => {
                return Err(EngineError::InvalidOrder(
                    "Price must be positive".to_string(),
                ));
            },
            (ExecutionType::Market, Some(_)) => {
                return Err(EngineError::InvalidOrder(
                    "Market orders must not have a price".to_string(),
                ));
            },
            _ => {},
        }

        if matches!(&order.client_order_id, Some(key) if key.trim().is_empty()) {
            return Err(EngineError::InvalidOrder(
                "Client order id must not be blank".to_string(),
            ));
        }

        Ok(())
    }

    /// Validate and persist a new open order.
    ///
    /// Replaying a submission with the same owner and `client_order_id`
    /// returns the order stored the first time.
    pub fn place_order(&self, submission: NewOrder) -> EngineResult<Order> {
        if let Err(err) = self.validate_order(&submission) {
            warn!(owner = %submission.owner_id, asset = %submission.asset_id, error = %err, "order rejected");
            self.event_handler.on_event(OrderEvent::OrderRejected {
                owner_id: submission.owner_id.clone(),
                asset_id: submission.asset_id.clone(),
                reason: err.to_string(),
                timestamp: Utc::now(),
            });
            return Err(err);
        }

        let known = self
            .catalog
            .contains(&submission.asset_id)
            .map_err(|e| EngineError::read_failed("place_order", e))?;
        if !known {
            debug!(asset = %submission.asset_id, "order for unknown asset");
            return Err(EngineError::NotFound);
        }

        let idempotent = submission.client_order_id.is_some();
        let order_id = OrderId::new();
        let stored = self
            .orders
            .insert(Order::open(order_id, submission))
            .map_err(|e| {
                warn!(order_id = %order_id, error = %e, "order insert failed");
                EngineError::write_failed("place_order", idempotent, e)
            })?;

        // Committed: drop cached levels before anyone can observe the order
        self.liquidity.invalidate(&stored.asset_id);

        if stored.id != order_id {
            debug!(order_id = %stored.id, "replayed submission returned the stored order");
            return Ok(stored);
        }

        info!(
            order_id = %stored.id,
            owner = %stored.owner_id,
            asset = %stored.asset_id,
            side = %stored.side,
            quantity = %stored.quantity,
            "order placed"
        );
        self.event_handler.on_event(OrderEvent::OrderAccepted {
            order_id: stored.id,
            asset_id: stored.asset_id.clone(),
            side: stored.side,
            price: stored.price,
            quantity: stored.quantity,
            timestamp: Utc::now(),
        });

        Ok(stored)
    }

    /// Cancel a resting order on behalf of its owner.
    ///
    /// An unknown id, another owner's order and an order that is already
    /// filled or cancelled all report the same `NotFound`.
    pub fn cancel_order(&self, order_id: OrderId, owner_id: &OwnerId) -> EngineResult<Order> {
        let cancelled = self
            .orders
            .update_where(
                order_id,
                owner_id,
                &OrderStatus::RESTING,
                &OrderUpdate::cancel(),
            )
            .map_err(|e| {
                warn!(order_id = %order_id, error = %e, "order cancel failed");
                EngineError::write_failed("cancel_order", false, e)
            })?;

        let Some(order) = cancelled else {
            debug!(order_id = %order_id, owner = %owner_id, "cancel matched no order");
            self.event_handler.on_event(OrderEvent::CancelRejected {
                order_id,
                owner_id: owner_id.clone(),
                timestamp: Utc::now(),
            });
            return Err(EngineError::NotFound);
        };

        self.liquidity.invalidate(&order.asset_id);

        info!(order_id = %order.id, asset = %order.asset_id, "order cancelled");
        self.event_handler.on_event(OrderEvent::OrderCancelled {
            order_id: order.id,
            asset_id: order.asset_id.clone(),
            remaining_quantity: order.remaining_quantity,
            timestamp: Utc::now(),
        });

        Ok(order)
    }

    /// An owner's orders, newest first
    pub fn get_user_orders(
        &self,
        owner_id: &OwnerId,
        query: &OrderQuery,
        page: PageRequest,
    ) -> EngineResult<Page<Order>> {
        let (offset, limit) = page.resolve(self.default_page_size, self.max_page_size)?;
        self.orders
            .orders_by_owner(owner_id, query, offset, limit)
            .map_err(|e| EngineError::read_failed("get_user_orders", e))
    }

    /// Executed trades matching `filter`, newest first
    pub fn get_trades(&self, filter: &TradeFilter, page: PageRequest) -> EngineResult<Page<Trade>> {
        let (offset, limit) = page.resolve(self.default_page_size, self.max_page_size)?;
        self.trades
            .trades(filter, offset, limit)
            .map_err(|e| EngineError::read_failed("get_trades", e))
    }
}

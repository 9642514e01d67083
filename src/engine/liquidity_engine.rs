// ============================================================================
// Liquidity Engine
// Request-scoped facade over aggregation, estimation and order lifecycle
// ============================================================================

use crate::domain::{
    AssetId, EngineConfig, EstimateRequest, ExecutionEstimate, NewOrder, Order, OrderBookSnapshot,
    OrderId, OwnerId, Page, PageRequest, PriceLevel, Side, Trade, TradeFilter,
};
use crate::engine::{ExecutionEstimator, FeePolicy, OrderLifecycleManager, SnapshotBuilder};
use crate::error::{EngineError, EngineResult};
use crate::interfaces::{
    AssetCatalog, EventHandler, LiquiditySource, OrderQuery, OrderStore, TradeHistory,
};
use std::sync::Arc;
use tracing::debug;

/// Entry point for every operation the engine exposes.
///
/// Holds no book of its own: each call reads from or writes to the stores,
/// optionally through a cached liquidity source.
pub struct LiquidityEngine {
    config: EngineConfig,
    catalog: Arc<dyn AssetCatalog>,
    liquidity: Arc<dyn LiquiditySource>,
    snapshots: SnapshotBuilder,
    estimator: ExecutionEstimator,
    lifecycle: OrderLifecycleManager,
}

impl LiquidityEngine {
    /// Wire an engine from its collaborators. Fails on an invalid config.
    pub fn new(
        config: EngineConfig,
        orders: Arc<dyn OrderStore>,
        trades: Arc<dyn TradeHistory>,
        catalog: Arc<dyn AssetCatalog>,
        liquidity: Arc<dyn LiquiditySource>,
        event_handler: Arc<dyn EventHandler>,
    ) -> EngineResult<Self> {
        config.validate()?;

        let snapshots = SnapshotBuilder::new(Arc::clone(&trades), config.max_depth);
        let estimator = ExecutionEstimator::new(
            FeePolicy::new(config.fees),
            config.high_slippage_threshold_pct,
        );
        let lifecycle = OrderLifecycleManager::new(
            orders,
            Arc::clone(&catalog),
            trades,
            Arc::clone(&liquidity),
            event_handler,
        )
        .with_page_sizes(config.default_page_size, config.max_page_size);

        Ok(Self {
            config,
            catalog,
            liquidity,
            snapshots,
            estimator,
            lifecycle,
        })
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Top `depth` levels of both sides plus the last trade price.
    ///
    /// `depth` must be in `1..=max_depth`. An unknown asset is `NotFound`; a
    /// known asset with no resting orders yields an empty snapshot.
    pub fn get_order_book(&self, asset_id: &AssetId, depth: usize) -> EngineResult<OrderBookSnapshot> {
        self.snapshots.validate_depth(depth)?;
        self.ensure_asset(asset_id, "get_order_book")?;

        let levels = self.liquidity.book_levels(asset_id)?;
        let snapshot = self.snapshots.build(asset_id, &levels, depth)?;
        debug!(
            asset = %asset_id,
            depth,
            bids = snapshot.bids.len(),
            asks = snapshot.asks.len(),
            source = self.liquidity.name(),
            "order book snapshot"
        );
        Ok(snapshot)
    }

    /// Snapshot at the configured default depth
    pub fn get_default_order_book(&self, asset_id: &AssetId) -> EngineResult<OrderBookSnapshot> {
        self.get_order_book(asset_id, self.config.default_depth)
    }

    /// Ordered levels for one side, at most `max_levels` when given
    pub fn get_levels(
        &self,
        asset_id: &AssetId,
        side: Side,
        max_levels: Option<usize>,
    ) -> EngineResult<Vec<PriceLevel>> {
        let levels = self.liquidity.book_levels(asset_id)?;
        Ok(levels.top(side, max_levels.unwrap_or(usize::MAX)))
    }

    /// Advisory quote for a hypothetical order; nothing is reserved
    pub fn estimate_order(&self, request: &EstimateRequest) -> EngineResult<ExecutionEstimate> {
        let request = self.estimator.validate(request)?;
        self.ensure_asset(&request.asset_id, "estimate_order")?;

        let levels = self.liquidity.book_levels(&request.asset_id)?;
        let opposing = levels.side(request.side.opposite());
        let estimate = self.estimator.estimate(request, opposing)?;

        debug!(
            asset = %estimate.request.asset_id,
            side = %estimate.request.side,
            requested = %estimate.request.quantity,
            matched = %estimate.matched_quantity,
            slippage_pct = %estimate.slippage_pct,
            warnings = estimate.warnings.len(),
            "execution estimate"
        );
        Ok(estimate)
    }

    // ========================================================================
    // Order lifecycle
    // ========================================================================

    pub fn validate_order(&self, order: &NewOrder) -> EngineResult<()> {
        self.lifecycle.validate_order(order)
    }

    pub fn place_order(&self, order: NewOrder) -> EngineResult<Order> {
        self.lifecycle.place_order(order)
    }

    pub fn cancel_order(&self, order_id: OrderId, owner_id: &OwnerId) -> EngineResult<Order> {
        self.lifecycle.cancel_order(order_id, owner_id)
    }

    pub fn get_user_orders(
        &self,
        owner_id: &OwnerId,
        query: &OrderQuery,
        page: PageRequest,
    ) -> EngineResult<Page<Order>> {
        self.lifecycle.get_user_orders(owner_id, query, page)
    }

    pub fn get_trades(&self, filter: &TradeFilter, page: PageRequest) -> EngineResult<Page<Trade>> {
        self.lifecycle.get_trades(filter, page)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Drop cached levels for `asset_id`. Writers that change the order store
    /// behind the engine's back are picked up through the store's book
    /// version anyway; this forces the next read to reload regardless.
    pub fn invalidate(&self, asset_id: &AssetId) {
        self.liquidity.invalidate(asset_id);
    }

    /// Name of the liquidity source backing reads ("direct" or "cached")
    pub fn liquidity_source(&self) -> &str {
        self.liquidity.name()
    }

    fn ensure_asset(&self, asset_id: &AssetId, operation: &'static str) -> EngineResult<()> {
        let known = self
            .catalog
            .contains(asset_id)
            .map_err(|e| EngineError::read_failed(operation, e))?;
        if known {
            Ok(())
        } else {
            Err(EngineError::NotFound)
        }
    }
}

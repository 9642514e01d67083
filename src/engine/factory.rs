// ============================================================================
// Liquidity Engine Factory
// Creates liquidity engines with proper configuration
// ============================================================================

use crate::domain::{EngineConfig, FeeSchedule};
use crate::engine::{CachedLiquidity, LiquidityEngine, PriceLevelAggregator};
use crate::error::{EngineError, EngineResult};
use crate::interfaces::{
    AssetCatalog, EventHandler, LiquiditySource, NoOpEventHandler, OrderStore, TradeHistory,
};
use rust_decimal::Decimal;
use std::sync::Arc;

// ============================================================================
// Factory Functions
// ============================================================================

/// Creates a liquidity engine from configuration over a single store that
/// serves orders, trades and the asset catalog
///
/// # Arguments
/// * `config` - Engine configuration
/// * `store` - Backing store for every collaborator interface
/// * `event_handler` - Event handler for order lifecycle events
///
/// # Example
/// ```
/// use liquidity_engine::prelude::*;
/// use liquidity_engine::engine::factory::create_from_config;
/// use std::sync::Arc;
///
/// let store = Arc::new(InMemoryStore::with_assets(["BTC-USD"]));
/// let engine = create_from_config(EngineConfig::default(), store, Arc::new(NoOpEventHandler)).unwrap();
/// assert_eq!(engine.liquidity_source(), "cached");
/// ```
pub fn create_from_config<S>(
    config: EngineConfig,
    store: Arc<S>,
    event_handler: Arc<dyn EventHandler>,
) -> EngineResult<LiquidityEngine>
where
    S: OrderStore + TradeHistory + AssetCatalog + 'static,
{
    let liquidity = create_liquidity_source(&config, store.clone());
    LiquidityEngine::new(
        config,
        store.clone(),
        store.clone(),
        store,
        liquidity,
        event_handler,
    )
}

/// Creates the read path for aggregated levels: direct store reads, wrapped in
/// a snapshot cache keyed on the store's book version when the configuration
/// enables one
pub fn create_liquidity_source(
    config: &EngineConfig,
    orders: Arc<dyn OrderStore>,
) -> Arc<dyn LiquiditySource> {
    let direct: Arc<dyn LiquiditySource> =
        Arc::new(PriceLevelAggregator::new(Arc::clone(&orders)));
    if config.cache_enabled {
        Arc::new(CachedLiquidity::new(direct, orders))
    } else {
        direct
    }
}

// ============================================================================
// Builder Pattern for Advanced Configuration
// ============================================================================

/// Builder for creating liquidity engines with fluent API
///
/// # Example
/// ```
/// use liquidity_engine::prelude::*;
/// use liquidity_engine::engine::factory::LiquidityEngineBuilder;
/// use rust_decimal::Decimal;
/// use std::sync::Arc;
///
/// let store = Arc::new(InMemoryStore::with_assets(["ETH-USD"]));
/// let engine = LiquidityEngineBuilder::new()
///     .with_store(store)
///     .with_max_depth(25)
///     .with_fees(Decimal::new(3, 3), Decimal::new(1, 3))
///     .without_cache()
///     .build()
///     .unwrap();
/// assert_eq!(engine.config().max_depth, 25);
/// ```
pub struct LiquidityEngineBuilder {
    config: EngineConfig,
    orders: Option<Arc<dyn OrderStore>>,
    trades: Option<Arc<dyn TradeHistory>>,
    catalog: Option<Arc<dyn AssetCatalog>>,
    event_handler: Arc<dyn EventHandler>,
}

impl LiquidityEngineBuilder {
    /// Create a new builder with the default configuration
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            orders: None,
            trades: None,
            catalog: None,
            event_handler: Arc::new(NoOpEventHandler),
        }
    }

    /// Replace the whole configuration
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    // ========================================================================
    // Collaborators
    // ========================================================================

    /// Use one store for orders, trades and the asset catalog
    pub fn with_store<S>(mut self, store: Arc<S>) -> Self
    where
        S: OrderStore + TradeHistory + AssetCatalog + 'static,
    {
        self.orders = Some(store.clone() as Arc<dyn OrderStore>);
        self.trades = Some(store.clone() as Arc<dyn TradeHistory>);
        self.catalog = Some(store as Arc<dyn AssetCatalog>);
        self
    }

    pub fn with_order_store(mut self, orders: Arc<dyn OrderStore>) -> Self {
        self.orders = Some(orders);
        self
    }

    pub fn with_trade_history(mut self, trades: Arc<dyn TradeHistory>) -> Self {
        self.trades = Some(trades);
        self
    }

    pub fn with_asset_catalog(mut self, catalog: Arc<dyn AssetCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn with_event_handler(mut self, event_handler: Arc<dyn EventHandler>) -> Self {
        self.event_handler = event_handler;
        self
    }

    // ========================================================================
    // Engine Parameters
    // ========================================================================

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.config.max_depth = depth;
        self
    }

    pub fn with_default_depth(mut self, depth: usize) -> Self {
        self.config.default_depth = depth;
        self
    }

    pub fn with_fees(mut self, taker_rate: Decimal, maker_rate: Decimal) -> Self {
        self.config.fees = FeeSchedule::new(taker_rate, maker_rate);
        self
    }

    pub fn with_high_slippage_threshold(mut self, pct: Decimal) -> Self {
        self.config.high_slippage_threshold_pct = pct;
        self
    }

    pub fn with_page_sizes(mut self, default_size: usize, max_size: usize) -> Self {
        self.config.default_page_size = default_size;
        self.config.max_page_size = max_size;
        self
    }

    /// Read every book straight from the order store
    pub fn without_cache(mut self) -> Self {
        self.config.cache_enabled = false;
        self
    }

    /// Build the liquidity engine
    pub fn build(self) -> EngineResult<LiquidityEngine> {
        let orders = self
            .orders
            .ok_or_else(|| EngineError::InvalidConfig("An order store is required".to_string()))?;
        let trades = self
            .trades
            .ok_or_else(|| EngineError::InvalidConfig("A trade history is required".to_string()))?;
        let catalog = self
            .catalog
            .ok_or_else(|| EngineError::InvalidConfig("An asset catalog is required".to_string()))?;

        let liquidity = create_liquidity_source(&self.config, Arc::clone(&orders));
        LiquidityEngine::new(
            self.config,
            orders,
            trades,
            catalog,
            liquidity,
            self.event_handler,
        )
    }
}

impl Default for LiquidityEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

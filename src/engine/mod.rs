// ============================================================================
// Engine Module
// Contains the aggregation, estimation and order lifecycle logic
// ============================================================================

mod aggregator;
mod cache;
mod estimator;
mod fee;
mod lifecycle;
mod liquidity_engine;
mod snapshot;

pub mod factory;

pub use aggregator::{aggregate_levels, PriceLevelAggregator};
pub use cache::{CacheStats, CachedLiquidity, SnapshotCache};
pub use estimator::ExecutionEstimator;
pub use factory::{create_from_config, create_liquidity_source, LiquidityEngineBuilder};
pub use fee::FeePolicy;
pub use lifecycle::OrderLifecycleManager;
pub use liquidity_engine::LiquidityEngine;
pub use snapshot::SnapshotBuilder;

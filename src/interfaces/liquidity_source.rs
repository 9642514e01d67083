// ============================================================================
// Liquidity Source Interface
// Where snapshot and estimate reads obtain aggregated levels
// ============================================================================

use crate::domain::{AssetId, BookLevels};
use crate::error::EngineResult;
use std::sync::Arc;

/// Strategy interface for obtaining the aggregated book of one asset.
/// Implementations: straight aggregation over the store, or a read-through cache.
pub trait LiquiditySource: Send + Sync {
    /// Aggregated levels for both sides, untruncated, in matching priority.
    /// A failure on either side fails the whole read.
    fn book_levels(&self, asset_id: &AssetId) -> EngineResult<Arc<BookLevels>>;

    /// Drop anything derived from the asset's orders. Called after every
    /// committed mutation and before the mutating call returns.
    fn invalidate(&self, _asset_id: &AssetId) {}

    /// Get the source name for logging/metrics
    fn name(&self) -> &str;
}

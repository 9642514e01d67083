// ============================================================================
// Price-Level Aggregator
// Groups resting orders for one asset/side into ordered price levels
// ============================================================================

use crate::domain::{AssetId, BookLevels, Order, PriceLevel, Quantity, Side};
use crate::error::{EngineError, EngineResult};
use crate::interfaces::{LiquiditySource, OrderStore};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Aggregate raw order rows into price levels.
///
/// Keeps only orders for `asset_id` on `side` that are open or partially
/// filled, carry a price and still have quantity left. Orders at the same
/// price collapse into one level. Bids come out highest first, asks lowest
/// first, truncated to `max_levels` when given. Fails with `InvalidInput`
/// when a level's total quantity leaves the decimal range.
///
/// # Example
/// ```text
/// Asks: 2.47 x 100 (A), 2.46 x 300 (B), 2.47 x 200 (C)
///
/// Levels: 2.46 x 300 (1 order)
///         2.47 x 300 (2 orders)
/// ```
pub fn aggregate_levels(
    orders: &[Order],
    asset_id: &AssetId,
    side: Side,
    max_levels: Option<usize>,
) -> EngineResult<Vec<PriceLevel>> {
    let mut grouped: BTreeMap<Decimal, (Quantity, usize)> = BTreeMap::new();

    for order in orders {
        if order.asset_id != *asset_id || order.side != side || !order.is_resting() {
            continue;
        }
        let Some(price) = order.price else {
            continue;
        };

        let entry = grouped.entry(price).or_insert((Decimal::ZERO, 0));
        entry.0 = entry
            .0
            .checked_add(order.remaining_quantity)
            .ok_or_else(|| {
                EngineError::InvalidInput(format!(
                    "Resting quantity at {} overflows the decimal range",
                    price
                ))
            })?;
        entry.1 += 1;
    }

    let levels = grouped
        .into_iter()
        .map(|(price, (quantity, count))| PriceLevel::new(price, quantity, count));
    let limit = max_levels.unwrap_or(usize::MAX);

    Ok(match side {
        Side::Bid => levels.rev().take(limit).collect(),
        Side::Ask => levels.take(limit).collect(),
    })
}

/// Aggregation over the order store, without caching
pub struct PriceLevelAggregator {
    store: Arc<dyn OrderStore>,
}

impl PriceLevelAggregator {
    pub fn new(store: Arc<dyn OrderStore>) -> Self {
        Self { store }
    }

    /// Ordered levels for one side. An empty result means no liquidity.
    pub fn get_levels(
        &self,
        asset_id: &AssetId,
        side: Side,
        max_levels: Option<usize>,
    ) -> EngineResult<Vec<PriceLevel>> {
        let rows = self.store.resting_orders(asset_id, side).map_err(|e| {
            warn!(asset = %asset_id, side = %side, error = %e, "resting order read failed");
            EngineError::read_failed("get_levels", e)
        })?;

        let levels = aggregate_levels(&rows, asset_id, side, max_levels)?;
        debug!(
            asset = %asset_id,
            side = %side,
            orders = rows.len(),
            levels = levels.len(),
            "aggregated price levels"
        );
        Ok(levels)
    }
}

impl LiquiditySource for PriceLevelAggregator {
    fn book_levels(&self, asset_id: &AssetId) -> EngineResult<Arc<BookLevels>> {
        let bids = self.get_levels(asset_id, Side::Bid, None)?;
        let asks = self.get_levels(asset_id, Side::Ask, None)?;
        Ok(Arc::new(BookLevels::new(bids, asks)))
    }

    fn name(&self) -> &str {
        "direct"
    }
}

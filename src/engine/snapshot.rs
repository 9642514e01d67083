// ============================================================================
// Order Book Snapshot Builder
// Composes both sides and the last trade price into a book view
// ============================================================================

use crate::domain::{AssetId, BookLevels, OrderBookSnapshot, Side};
use crate::error::{EngineError, EngineResult};
use crate::interfaces::TradeHistory;
use std::sync::Arc;
use tracing::warn;

pub struct SnapshotBuilder {
    trades: Arc<dyn TradeHistory>,
    max_depth: usize,
}

impl SnapshotBuilder {
    pub fn new(trades: Arc<dyn TradeHistory>, max_depth: usize) -> Self {
        Self { trades, max_depth }
    }

    /// Depth must be in `1..=max_depth`; anything else is rejected, not clamped
    pub fn validate_depth(&self, depth: usize) -> EngineResult<()> {
        if depth == 0 {
            return Err(EngineError::InvalidInput(
                "Depth must be positive".to_string(),
            ));
        }
        if depth > self.max_depth {
            return Err(EngineError::InvalidInput(format!(
                "Depth {} exceeds maximum {}",
                depth, self.max_depth
            )));
        }
        Ok(())
    }

    /// Build a snapshot from already aggregated levels.
    ///
    /// The asset is assumed to exist; an empty `levels` yields an empty but
    /// valid snapshot.
    pub fn build(
        &self,
        asset_id: &AssetId,
        levels: &BookLevels,
        depth: usize,
    ) -> EngineResult<OrderBookSnapshot> {
        self.validate_depth(depth)?;

        let last_trade_price = self.trades.last_trade_price(asset_id).map_err(|e| {
            warn!(asset = %asset_id, error = %e, "last trade price read failed");
            EngineError::read_failed("get_order_book", e)
        })?;

        Ok(OrderBookSnapshot::with_depth(
            asset_id.clone(),
            levels.top(Side::Bid, depth),
            levels.top(Side::Ask, depth),
            last_trade_price,
        ))
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OrderId, Page, Price, PriceLevel, Trade, TradeFilter};
    use crate::error::StoreError;
    use crate::store::InMemoryStore;
    use rust_decimal_macros::dec;

    fn levels() -> BookLevels {
        BookLevels::new(
            vec![
                PriceLevel::new(dec!(2.45), dec!(100), 1),
                PriceLevel::new(dec!(2.44), dec!(200), 2),
                PriceLevel::new(dec!(2.43), dec!(300), 1),
            ],
            vec![
                PriceLevel::new(dec!(2.46), dec!(500), 1),
                PriceLevel::new(dec!(2.47), dec!(300), 1),
            ],
        )
    }

    #[test]
    fn test_depth_bounds() {
        let builder = SnapshotBuilder::new(Arc::new(InMemoryStore::new()), 50);
        assert!(builder.validate_depth(1).is_ok());
        assert!(builder.validate_depth(50).is_ok());
        assert!(matches!(
            builder.validate_depth(0),
            Err(EngineError::InvalidInput(_))
        ));
        assert!(matches!(
            builder.validate_depth(51),
            Err(EngineError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_build_truncates_each_side() {
        let store = Arc::new(InMemoryStore::new());
        let asset = AssetId::from("BTC-USD");
        store.record_trade(Trade::new(
            asset.clone(),
            OrderId::new(),
            OrderId::new(),
            dec!(2.455),
            dec!(10),
        ));
        let builder = SnapshotBuilder::new(store, 50);

        let snapshot = builder.build(&asset, &levels(), 2).unwrap();
        assert_eq!(snapshot.bids.len(), 2);
        assert_eq!(snapshot.asks.len(), 2);
        assert_eq!(snapshot.spread, Some(dec!(0.01)));
        assert_eq!(snapshot.last_trade_price, Some(dec!(2.455)));
    }

    #[test]
    fn test_empty_book_is_valid() {
        let builder = SnapshotBuilder::new(Arc::new(InMemoryStore::new()), 50);
        let snapshot = builder
            .build(&AssetId::from("BTC-USD"), &BookLevels::default(), 10)
            .unwrap();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.spread, None);
        assert_eq!(snapshot.last_trade_price, None);
    }

    struct UnreachableHistory;

    impl TradeHistory for UnreachableHistory {
        fn last_trade_price(&self, _asset_id: &AssetId) -> Result<Option<Price>, StoreError> {
            Err(StoreError::Unavailable("history offline".to_string()))
        }

        fn trades(
            &self,
            _filter: &TradeFilter,
            _offset: usize,
            _limit: usize,
        ) -> Result<Page<Trade>, StoreError> {
            Err(StoreError::Unavailable("history offline".to_string()))
        }
    }

    #[test]
    fn test_trade_history_failure_is_retryable() {
        let builder = SnapshotBuilder::new(Arc::new(UnreachableHistory), 50);
        let err = builder
            .build(&AssetId::from("BTC-USD"), &levels(), 5)
            .unwrap_err();
        assert!(err.is_retryable());
    }
}

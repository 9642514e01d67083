// ============================================================================
// Order Book Domain Model
// ============================================================================

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::{AssetId, Price, Quantity, Side};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ============================================================================
// Price Level
// ============================================================================

/// Aggregate resting liquidity at one exact price on one side.
/// Derived from the resting orders; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PriceLevel {
    pub price: Price,
    /// Sum of the remaining quantity of every resting order at this price
    pub quantity: Quantity,
    pub order_count: usize,
}

impl PriceLevel {
    pub fn new(price: Price, quantity: Quantity, order_count: usize) -> Self {
        Self {
            price,
            quantity,
            order_count,
        }
    }

    /// Price times quantity, `None` on overflow
    pub fn notional(&self) -> Option<Decimal> {
        self.price.checked_mul(self.quantity)
    }
}

// ============================================================================
// Book Levels
// ============================================================================

/// Full aggregated liquidity for one asset, both sides in matching priority
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookLevels {
    /// Highest bid first
    pub bids: Vec<PriceLevel>,
    /// Lowest ask first
    pub asks: Vec<PriceLevel>,
}

impl BookLevels {
    pub fn new(bids: Vec<PriceLevel>, asks: Vec<PriceLevel>) -> Self {
        Self { bids, asks }
    }

    pub fn side(&self, side: Side) -> &[PriceLevel] {
        match side {
            Side::Bid => &self.bids,
            Side::Ask => &self.asks,
        }
    }

    /// At most `max_levels` levels of one side, best first
    pub fn top(&self, side: Side, max_levels: usize) -> Vec<PriceLevel> {
        let levels = self.side(side);
        levels[..levels.len().min(max_levels)].to_vec()
    }
}

// ============================================================================
// Order Book Snapshot
// ============================================================================

/// Immutable view of both sides of one asset's book
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrderBookSnapshot {
    pub asset_id: AssetId,
    /// Bid levels, strictly descending by price
    pub bids: Vec<PriceLevel>,
    /// Ask levels, strictly ascending by price
    pub asks: Vec<PriceLevel>,
    /// Best ask minus best bid; `None` unless both sides have liquidity
    pub spread: Option<Decimal>,
    /// Mid price
    pub mid_price: Option<Decimal>,
    pub last_trade_price: Option<Price>,
    pub as_of: DateTime<Utc>,
}

impl OrderBookSnapshot {
    pub fn new(asset_id: AssetId) -> Self {
        Self {
            asset_id,
            bids: Vec::new(),
            asks: Vec::new(),
            spread: None,
            mid_price: None,
            last_trade_price: None,
            as_of: Utc::now(),
        }
    }

    pub fn with_depth(
        asset_id: AssetId,
        bids: Vec<PriceLevel>,
        asks: Vec<PriceLevel>,
        last_trade_price: Option<Price>,
    ) -> Self {
        // bid + spread / 2 stays between the two prices and cannot overflow
        let (spread, mid_price) = match (bids.first(), asks.first()) {
            (Some(bid), Some(ask)) => {
                let spread = ask.price - bid.price;
                (Some(spread), Some(bid.price + spread / Decimal::TWO))
            },
            _ => (None, None),
        };

        Self {
            asset_id,
            bids,
            asks,
            spread,
            mid_price,
            last_trade_price,
            as_of: Utc::now(),
        }
    }

    pub fn best_bid(&self) -> Option<Price> {
        self.bids.first().map(|level| level.price)
    }

    pub fn best_ask(&self) -> Option<Price> {
        self.asks.first().map(|level| level.price)
    }

    /// Sum of bid quantities, `None` on overflow
    pub fn total_bid_quantity(&self) -> Option<Quantity> {
        total_quantity(&self.bids)
    }

    /// Sum of ask quantities, `None` on overflow
    pub fn total_ask_quantity(&self) -> Option<Quantity> {
        total_quantity(&self.asks)
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }
}

fn total_quantity(levels: &[PriceLevel]) -> Option<Quantity> {
    levels
        .iter()
        .try_fold(Decimal::ZERO, |total, level| total.checked_add(level.quantity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_order_book_snapshot() {
        let snapshot = OrderBookSnapshot::with_depth(
            AssetId::from("BTC-USD"),
            vec![PriceLevel::new(dec!(50000), dec!(1), 1)],
            vec![PriceLevel::new(dec!(50100), dec!(2), 3)],
            Some(dec!(50050)),
        );

        assert_eq!(snapshot.best_bid(), Some(dec!(50000)));
        assert_eq!(snapshot.best_ask(), Some(dec!(50100)));
        assert_eq!(snapshot.spread, Some(dec!(100)));
        assert_eq!(snapshot.mid_price, Some(dec!(50050)));
        assert_eq!(snapshot.total_ask_quantity(), Some(dec!(2)));
    }

    #[test]
    fn test_one_sided_book_has_no_spread() {
        let snapshot = OrderBookSnapshot::with_depth(
            AssetId::from("BTC-USD"),
            Vec::new(),
            vec![PriceLevel::new(dec!(2.46), dec!(500), 2)],
            None,
        );

        assert_eq!(snapshot.spread, None);
        assert_eq!(snapshot.mid_price, None);
        assert!(!snapshot.is_empty());
    }

    #[test]
    fn test_book_levels_top() {
        let levels = BookLevels::new(
            vec![
                PriceLevel::new(dec!(2.45), dec!(100), 1),
                PriceLevel::new(dec!(2.44), dec!(200), 2),
            ],
            vec![PriceLevel::new(dec!(2.46), dec!(500), 1)],
        );

        assert_eq!(levels.top(Side::Bid, 1), vec![PriceLevel::new(dec!(2.45), dec!(100), 1)]);
        assert_eq!(levels.top(Side::Ask, 10).len(), 1);
        assert_eq!(levels.side(Side::Bid).len(), 2);
    }

    #[test]
    fn test_extreme_levels_do_not_panic() {
        let huge = PriceLevel::new(Decimal::MAX, Decimal::MAX, 1);
        assert_eq!(huge.notional(), None);
        assert_eq!(PriceLevel::new(dec!(2.46), dec!(100), 1).notional(), Some(dec!(246)));

        let snapshot = OrderBookSnapshot::with_depth(
            AssetId::from("BTC-USD"),
            vec![
                PriceLevel::new(Decimal::MAX - Decimal::TWO, Decimal::MAX, 1),
                PriceLevel::new(dec!(1), Decimal::MAX, 1),
            ],
            vec![huge],
            None,
        );
        assert_eq!(snapshot.total_bid_quantity(), None);
        assert_eq!(snapshot.total_ask_quantity(), Some(Decimal::MAX));
        assert_eq!(snapshot.spread, Some(Decimal::TWO));
        assert_eq!(snapshot.mid_price, Some(Decimal::MAX - Decimal::ONE));
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = OrderBookSnapshot::new(AssetId::from("ETH-USD"));
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.total_bid_quantity(), Some(Decimal::ZERO));
        assert_eq!(snapshot.best_bid(), None);
    }
}

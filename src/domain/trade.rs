// ============================================================================
// Trade Domain Model
// ============================================================================

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::{AssetId, OrderId, Price, Quantity};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An executed trade, recorded by the matching collaborator.
/// This engine only reads trades.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Trade {
    /// Unique trade identifier
    pub id: Uuid,

    pub asset_id: AssetId,

    /// Order ID on the bid side
    pub bid_order_id: OrderId,

    /// Order ID on the ask side
    pub ask_order_id: OrderId,

    /// Execution price
    pub price: Price,

    /// Executed quantity
    pub quantity: Quantity,

    pub executed_at: DateTime<Utc>,
}

impl Trade {
    pub fn new(
        asset_id: AssetId,
        bid_order_id: OrderId,
        ask_order_id: OrderId,
        price: Price,
        quantity: Quantity,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            asset_id,
            bid_order_id,
            ask_order_id,
            price,
            quantity,
            executed_at: Utc::now(),
        }
    }

    /// Builder method: override the execution time
    pub fn executed_at(mut self, at: DateTime<Utc>) -> Self {
        self.executed_at = at;
        self
    }

    /// Notional value of the trade (price * quantity), `None` on overflow
    pub fn notional_value(&self) -> Option<Decimal> {
        self.price.checked_mul(self.quantity)
    }

    pub fn involves(&self, order_id: OrderId) -> bool {
        self.bid_order_id == order_id || self.ask_order_id == order_id
    }
}

/// Criteria for trade history listings. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TradeFilter {
    pub asset_id: Option<AssetId>,
    pub order_id: Option<OrderId>,
    /// Inclusive lower bound on execution time
    pub since: Option<DateTime<Utc>>,
    /// Exclusive upper bound on execution time
    pub until: Option<DateTime<Utc>>,
}

impl TradeFilter {
    pub fn for_asset(asset_id: AssetId) -> Self {
        Self {
            asset_id: Some(asset_id),
            ..Self::default()
        }
    }

    pub fn with_order(mut self, order_id: OrderId) -> Self {
        self.order_id = Some(order_id);
        self
    }

    pub fn between(mut self, since: DateTime<Utc>, until: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self.until = Some(until);
        self
    }

    pub fn matches(&self, trade: &Trade) -> bool {
        self.asset_id
            .as_ref()
            .map_or(true, |asset| *asset == trade.asset_id)
            && self.order_id.map_or(true, |id| trade.involves(id))
            && self.since.map_or(true, |since| trade.executed_at >= since)
            && self.until.map_or(true, |until| trade.executed_at < until)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn trade() -> Trade {
        Trade::new(
            AssetId::from("BTC-USD"),
            OrderId::new(),
            OrderId::new(),
            dec!(100.5),
            dec!(2),
        )
    }

    #[test]
    fn test_notional_value_with_fractional() {
        assert_eq!(trade().notional_value(), Some(dec!(201.0)));
    }

    #[test]
    fn test_filter_matching() {
        let trade = trade();

        assert!(TradeFilter::default().matches(&trade));
        assert!(TradeFilter::for_asset(AssetId::from("BTC-USD")).matches(&trade));
        assert!(!TradeFilter::for_asset(AssetId::from("ETH-USD")).matches(&trade));
        assert!(TradeFilter::default()
            .with_order(trade.ask_order_id)
            .matches(&trade));
        assert!(!TradeFilter::default()
            .with_order(OrderId::new())
            .matches(&trade));
    }

    #[test]
    fn test_filter_time_window_is_half_open() {
        let trade = trade();
        let at = trade.executed_at;

        assert!(TradeFilter::default()
            .between(at, at + Duration::seconds(1))
            .matches(&trade));
        assert!(!TradeFilter::default()
            .between(at - Duration::seconds(1), at)
            .matches(&trade));
    }
}

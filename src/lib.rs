// ============================================================================
// Liquidity Engine Library
// Order book aggregation and execution estimation over a persisted order store
// ============================================================================

//! # Liquidity Engine
//!
//! Read-side order book engine for markets whose orders live in an external
//! store.
//!
//! ## Features
//!
//! - **Price-level aggregation** of resting orders, best price first
//! - **Order book snapshots** with spread, mid price and last trade price
//! - **Execution estimates** with fill breakdown, maker/taker fees, slippage
//!   and liquidity warnings
//! - **Order lifecycle**: validation, idempotent placement and owner-only
//!   cancellation as a single conditional update
//! - **Snapshot cache** keyed on the store's per-asset book version and
//!   invalidated by every committed mutation
//!
//! ## Example
//!
//! ```rust
//! use liquidity_engine::prelude::*;
//! use rust_decimal::Decimal;
//! use std::sync::Arc;
//!
//! let store = Arc::new(InMemoryStore::with_assets(["BTC-USD"]));
//! let engine = create_from_config(EngineConfig::default(), store, Arc::new(NoOpEventHandler)).unwrap();
//!
//! // Rest an ask
//! engine
//!     .place_order(NewOrder::limit("seller", "BTC-USD", Side::Ask, Decimal::new(246, 2), Decimal::from(500)))
//!     .unwrap();
//!
//! // Get order book snapshot
//! let snapshot = engine.get_order_book(&AssetId::from("BTC-USD"), 10).unwrap();
//! println!("Best ask: {:?}", snapshot.best_ask());
//!
//! // Quote a market buy against it
//! let estimate = engine
//!     .estimate_order(&EstimateRequest::market("BTC-USD", Side::Bid, Decimal::from(100)))
//!     .unwrap();
//! assert_eq!(estimate.average_price, Some(Decimal::new(246, 2)));
//! ```

pub mod domain;
pub mod engine;
pub mod error;
pub mod interfaces;
pub mod store;
pub mod telemetry;

// Re-exports for convenience
pub mod prelude {
    pub use crate::domain::order::state::{OrderStatus, OrderTransition};
    pub use crate::domain::{
        AssetId, BookLevels, EngineConfig, EstimateRequest, EstimateWarning, ExecutionEstimate,
        ExecutionType, FeeSchedule, Fill, NewOrder, Order, OrderBookSnapshot, OrderId,
        OrderUpdate, OwnerId, Page, PageRequest, Price, PriceLevel, Quantity, Side, Trade,
        TradeFilter,
    };
    pub use crate::engine::{
        aggregate_levels, create_from_config, CachedLiquidity, ExecutionEstimator, FeePolicy,
        LiquidityEngine, LiquidityEngineBuilder, PriceLevelAggregator,
    };
    pub use crate::error::{EngineError, EngineResult, ErrorKind, StoreError};
    pub use crate::interfaces::{
        AssetCatalog, EventHandler, LiquiditySource, LoggingEventHandler, NoOpEventHandler,
        OrderEvent, OrderQuery, OrderStore, TradeHistory,
    };
    pub use crate::store::InMemoryStore;
}

#[cfg(test)]
mod integration_tests {
    use super::prelude::*;
    use chrono::{Duration, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn setup(config: EngineConfig) -> (Arc<InMemoryStore>, LiquidityEngine) {
        let store = Arc::new(InMemoryStore::with_assets(["BTC-USD", "ETH-USD"]));
        let engine = create_from_config(config, store.clone(), Arc::new(NoOpEventHandler)).unwrap();
        (store, engine)
    }

    fn btc() -> AssetId {
        AssetId::from("BTC-USD")
    }

    fn place(engine: &LiquidityEngine, owner: &str, side: Side, price: Price, qty: Quantity) -> Order {
        engine
            .place_order(NewOrder::limit(owner, "BTC-USD", side, price, qty))
            .unwrap()
    }

    #[test]
    fn test_end_to_end_book_and_estimate() {
        let (store, engine) = setup(EngineConfig::default());

        place(&engine, "s1", Side::Ask, dec!(2.46), dec!(300));
        place(&engine, "s2", Side::Ask, dec!(2.46), dec!(200));
        place(&engine, "s3", Side::Ask, dec!(2.47), dec!(300));
        place(&engine, "s4", Side::Ask, dec!(2.48), dec!(200));
        place(&engine, "b1", Side::Bid, dec!(2.45), dec!(100));
        place(&engine, "b2", Side::Bid, dec!(2.44), dec!(200));
        store.record_trade(Trade::new(
            btc(),
            OrderId::new(),
            OrderId::new(),
            dec!(2.455),
            dec!(10),
        ));

        let snapshot = engine.get_order_book(&btc(), 10).unwrap();
        assert_eq!(
            snapshot.asks,
            vec![
                PriceLevel::new(dec!(2.46), dec!(500), 2),
                PriceLevel::new(dec!(2.47), dec!(300), 1),
                PriceLevel::new(dec!(2.48), dec!(200), 1),
            ]
        );
        assert_eq!(snapshot.best_bid(), Some(dec!(2.45)));
        assert_eq!(snapshot.spread, Some(dec!(0.01)));
        assert_eq!(snapshot.last_trade_price, Some(dec!(2.455)));
        assert!(snapshot.bids.windows(2).all(|w| w[0].price > w[1].price));
        assert!(snapshot.asks.windows(2).all(|w| w[0].price < w[1].price));

        let estimate = engine
            .estimate_order(&EstimateRequest::market("BTC-USD", Side::Bid, dec!(1000)))
            .unwrap();
        assert_eq!(estimate.matched_quantity, dec!(1000));
        assert_eq!(estimate.average_price, Some(dec!(2.467)));
        assert_eq!(estimate.fee_rate, dec!(0.002));
        assert_eq!(estimate.fee_amount, dec!(4.934));
        assert_eq!(estimate.levels_consumed(), 3);
        assert!(estimate.warnings.is_empty());

        // Quotes never touch the book
        let after = engine.get_order_book(&btc(), 10).unwrap();
        assert_eq!(after.asks, snapshot.asks);
    }

    #[test]
    fn test_cancel_invalidates_cached_book() {
        let (_, engine) = setup(EngineConfig::default());
        let best = place(&engine, "alice", Side::Bid, dec!(2.45), dec!(100));
        place(&engine, "bob", Side::Bid, dec!(2.44), dec!(100));

        // Warm the cache
        assert_eq!(
            engine.get_order_book(&btc(), 5).unwrap().best_bid(),
            Some(dec!(2.45))
        );

        engine
            .cancel_order(best.id, &OwnerId::from("alice"))
            .unwrap();
        assert_eq!(
            engine.get_order_book(&btc(), 5).unwrap().best_bid(),
            Some(dec!(2.44))
        );

        // Estimates read through the same cache
        let sell = engine
            .estimate_order(&EstimateRequest::market("BTC-USD", Side::Ask, dec!(50)))
            .unwrap();
        assert_eq!(sell.best_price, Some(dec!(2.44)));
    }

    #[test]
    fn test_rejected_cancels_leave_state_unchanged() {
        let (store, engine) = setup(EngineConfig::default());
        let order = place(&engine, "alice", Side::Ask, dec!(2.46), dec!(100));

        let stranger = engine
            .cancel_order(order.id, &OwnerId::from("mallory"))
            .unwrap_err();
        let unknown = engine
            .cancel_order(OrderId::new(), &OwnerId::from("alice"))
            .unwrap_err();
        assert_eq!(stranger.kind(), ErrorKind::NotFound);
        assert_eq!(unknown.kind(), ErrorKind::NotFound);
        assert_eq!(stranger.to_string(), unknown.to_string());
        assert_eq!(store.get_order(order.id).unwrap().status, OrderStatus::Open);

        engine
            .cancel_order(order.id, &OwnerId::from("alice"))
            .unwrap();
        let before = store.get_order(order.id).unwrap();
        assert!(engine
            .cancel_order(order.id, &OwnerId::from("alice"))
            .is_err());
        assert_eq!(store.get_order(order.id).unwrap(), before);
    }

    #[test]
    fn test_concurrent_cancels_have_one_winner() {
        let (_, engine) = setup(EngineConfig::default());
        let order = place(&engine, "alice", Side::Bid, dec!(2.45), dec!(100));
        let owner = OwnerId::from("alice");

        let successes = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| engine.cancel_order(order.id, &owner).is_ok()))
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap_or(false))
                .filter(|won| *won)
                .count()
        });

        assert_eq!(successes, 1);
        assert!(engine.get_order_book(&btc(), 5).unwrap().bids.is_empty());
    }

    #[test]
    fn test_fill_outside_the_engine_reaches_cached_reads() {
        let (store, engine) = setup(EngineConfig::default());
        let ask = place(&engine, "s1", Side::Ask, dec!(2.46), dec!(500));

        // Warm the cache
        let warm = engine.get_order_book(&btc(), 10).unwrap();
        assert_eq!(warm.asks, vec![PriceLevel::new(dec!(2.46), dec!(500), 1)]);

        // Matching fills 400 and records the trade without calling the engine
        store
            .update_where(
                ask.id,
                &OwnerId::from("s1"),
                &OrderStatus::RESTING,
                &OrderUpdate::default()
                    .with_status(OrderStatus::PartiallyFilled)
                    .with_remaining_quantity(dec!(100)),
            )
            .unwrap()
            .unwrap();
        store.record_trade(Trade::new(btc(), OrderId::new(), ask.id, dec!(2.46), dec!(400)));

        let snapshot = engine.get_order_book(&btc(), 10).unwrap();
        assert_eq!(snapshot.asks, vec![PriceLevel::new(dec!(2.46), dec!(100), 1)]);
        assert_eq!(snapshot.last_trade_price, Some(dec!(2.46)));

        let estimate = engine
            .estimate_order(&EstimateRequest::market("BTC-USD", Side::Bid, dec!(300)))
            .unwrap();
        assert_eq!(estimate.matched_quantity, dec!(100));
        assert_eq!(estimate.unmatched_quantity, dec!(200));
        assert!(estimate.has_warning(EstimateWarning::InsufficientLiquidity));
    }

    #[test]
    fn test_extreme_book_values_are_rejected_not_panicking() {
        let (_, engine) = setup(EngineConfig::default());
        let huge = Decimal::from(1_000_000_000_000_000i64);
        place(&engine, "whale", Side::Ask, huge, huge);

        let result = engine.estimate_order(&EstimateRequest::market("BTC-USD", Side::Bid, huge));
        assert_eq!(result.unwrap_err().kind(), ErrorKind::InvalidInput);

        // the book itself is still readable
        let snapshot = engine.get_order_book(&btc(), 10).unwrap();
        assert_eq!(snapshot.best_ask(), Some(huge));
        assert_eq!(snapshot.asks[0].notional(), None);
    }

    #[test]
    fn test_unknown_asset_and_invalid_requests() {
        let (_, engine) = setup(EngineConfig::uncached());
        let doge = AssetId::from("DOGE-USD");

        assert!(matches!(
            engine.get_order_book(&doge, 10),
            Err(EngineError::NotFound)
        ));
        assert!(matches!(
            engine.get_order_book(&btc(), 0),
            Err(EngineError::InvalidInput(_))
        ));
        assert!(matches!(
            engine.estimate_order(&EstimateRequest::market("BTC-USD", Side::Bid, dec!(0))),
            Err(EngineError::InvalidInput(_))
        ));
        assert!(matches!(
            engine.place_order(NewOrder::limit("alice", "BTC-USD", Side::Bid, dec!(0), dec!(1))),
            Err(EngineError::InvalidOrder(_))
        ));

        // Known asset, no orders: valid empty book and a zero-match quote
        let empty = engine.get_order_book(&AssetId::from("ETH-USD"), 10).unwrap();
        assert!(empty.is_empty());
        let quote = engine
            .estimate_order(&EstimateRequest::market("ETH-USD", Side::Bid, dec!(5)))
            .unwrap();
        assert_eq!(quote.matched_quantity, dec!(0));
        assert_eq!(quote.average_price, None);
        assert!(quote.has_warning(EstimateWarning::InsufficientLiquidity));
    }

    #[test]
    fn test_listings_are_newest_first_and_paginated() {
        let (store, engine) = setup(EngineConfig::default().with_page_sizes(2, 10));
        for i in 1..=5 {
            place(&engine, "alice", Side::Bid, Decimal::from(i), dec!(1));
        }
        let owner = OwnerId::from("alice");

        let page = engine
            .get_user_orders(&owner, &OrderQuery::default(), PageRequest::default())
            .unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].price, Some(dec!(5)));

        let now = Utc::now();
        for minutes in [3, 1, 2] {
            store.record_trade(
                Trade::new(btc(), OrderId::new(), OrderId::new(), Decimal::from(minutes), dec!(1))
                    .executed_at(now - Duration::minutes(minutes)),
            );
        }
        let trades = engine
            .get_trades(&TradeFilter::for_asset(btc()), PageRequest::first(10))
            .unwrap();
        let prices: Vec<Price> = trades.items.iter().map(|t| t.price).collect();
        assert_eq!(prices, vec![dec!(1), dec!(2), dec!(3)]);

        let window = engine
            .get_trades(
                &TradeFilter::for_asset(btc()).between(now - Duration::minutes(2), now),
                PageRequest::first(10),
            )
            .unwrap();
        assert_eq!(window.total, 2);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_snapshot_and_estimate_serialize() {
        let (_, engine) = setup(EngineConfig::default());
        place(&engine, "alice", Side::Ask, dec!(2.46), dec!(10));

        let snapshot = engine.get_order_book(&btc(), 5).unwrap();
        let json = serde_json::to_string(&snapshot).unwrap();
        let decoded: OrderBookSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, snapshot);

        let estimate = engine
            .estimate_order(&EstimateRequest::market("BTC-USD", Side::Bid, dec!(20)))
            .unwrap();
        let value = serde_json::to_value(&estimate).unwrap();
        assert_eq!(value["warnings"][0], "insufficient_liquidity");
        assert_eq!(value["request"]["side"], "bid");
    }
}

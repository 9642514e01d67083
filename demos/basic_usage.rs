// ============================================================================
// Basic Usage Example
// ============================================================================

use liquidity_engine::prelude::*;
use rust_decimal::Decimal;
use std::sync::Arc;

fn main() -> Result<(), EngineError> {
    #[cfg(feature = "logging")]
    liquidity_engine::telemetry::init_logging();

    println!("=== Liquidity Engine Example ===\n");

    let store = Arc::new(InMemoryStore::with_assets(["BTC-USD"]));
    let engine = LiquidityEngineBuilder::new()
        .with_store(store)
        .with_event_handler(Arc::new(LoggingEventHandler))
        .build()?;

    println!("Created liquidity engine for BTC-USD\n");

    // Resting asks at 2.46, 2.47, 2.48
    println!("Placing ask orders...");
    for (i, (price, quantity)) in [(246, 500), (247, 300), (248, 200)].iter().enumerate() {
        engine.place_order(NewOrder::limit(
            format!("seller_{}", i),
            "BTC-USD",
            Side::Ask,
            Decimal::new(*price, 2),
            Decimal::from(*quantity),
        ))?;
    }

    // Resting bids at 2.45, 2.44
    println!("Placing bid orders...");
    let mut bid_ids = Vec::new();
    for (i, price) in [245, 244].iter().enumerate() {
        let order = engine.place_order(NewOrder::limit(
            format!("buyer_{}", i),
            "BTC-USD",
            Side::Bid,
            Decimal::new(*price, 2),
            Decimal::from(400),
        ))?;
        bid_ids.push((order.id, order.owner_id));
    }

    let asset = AssetId::from("BTC-USD");
    println!("\n=== Order Book Snapshot ===");
    let snapshot = engine.get_order_book(&asset, 5)?;

    println!("\nBids:");
    for level in &snapshot.bids {
        println!("  {} @ {} ({} orders)", level.quantity, level.price, level.order_count);
    }

    println!("\nAsks:");
    for level in &snapshot.asks {
        println!("  {} @ {} ({} orders)", level.quantity, level.price, level.order_count);
    }

    println!("\nSpread: {:?}", snapshot.spread);
    println!("Mid Price: {:?}", snapshot.mid_price);

    println!("\n=== Estimating Market Buy of 1000 ===");
    let estimate =
        engine.estimate_order(&EstimateRequest::market("BTC-USD", Side::Bid, Decimal::from(1000)))?;

    for fill in &estimate.breakdown {
        println!("  {} @ {}", fill.quantity, fill.price);
    }
    println!("Average price: {:?}", estimate.average_price);
    println!("Fee: {} (rate {})", estimate.fee_amount, estimate.fee_rate);
    println!("Slippage: {}%", estimate.slippage_pct.round_dp(4));
    for warning in &estimate.warnings {
        println!("Warning: {}", warning);
    }

    println!("\n=== Cancelling Best Bid ===");
    if let Some((order_id, owner_id)) = bid_ids.first() {
        let cancelled = engine.cancel_order(*order_id, owner_id)?;
        println!("Cancelled {} ({:?})", cancelled.id, cancelled.status);
    }

    let snapshot = engine.get_order_book(&asset, 5)?;
    println!("Best bid is now: {:?}", snapshot.best_bid());

    Ok(())
}

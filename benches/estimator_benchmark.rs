// ============================================================================
// Liquidity Engine Benchmarks
// ============================================================================
//
// Benchmark Categories:
// 1. Aggregation - Grouping raw resting orders into price levels
// 2. Estimation - Walking a deep opposing book
// 3. Snapshot - Full read path through the engine, cached and uncached
// 4. Churn - Cached reads interleaved with place/cancel invalidations
// ============================================================================

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use liquidity_engine::prelude::*;
use rust_decimal::Decimal;
use std::hint::black_box;
use std::sync::Arc;

fn resting_asks(num_orders: usize, distinct_prices: usize) -> Vec<Order> {
    (0..num_orders)
        .map(|i| {
            let price = Decimal::new(50_000_00 + (i % distinct_prices) as i64, 2);
            Order::open(
                OrderId::new(),
                NewOrder::limit("maker", "BTC-USD", Side::Ask, price, Decimal::ONE),
            )
        })
        .collect()
}

fn deep_book(levels: usize) -> Vec<PriceLevel> {
    (0..levels)
        .map(|i| PriceLevel::new(Decimal::new(50_000_00 + i as i64, 2), Decimal::from(10), 3))
        .collect()
}

// ============================================================================
// Aggregation
// ============================================================================

fn benchmark_aggregate_levels(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate_levels");
    let asset = AssetId::from("BTC-USD");

    for num_orders in [100, 1000, 10000].iter() {
        let orders = resting_asks(*num_orders, 200);
        group.bench_with_input(
            BenchmarkId::from_parameter(num_orders),
            &orders,
            |b, orders| {
                b.iter(|| black_box(aggregate_levels(orders, &asset, Side::Ask, Some(50))));
            },
        );
    }

    group.finish();
}

// ============================================================================
// Estimation
// ============================================================================

fn benchmark_estimate(c: &mut Criterion) {
    let mut group = c.benchmark_group("estimate_market_buy");
    let estimator = ExecutionEstimator::new(FeePolicy::default(), Decimal::from(5));

    for levels in [10, 100, 1000].iter() {
        let book = deep_book(*levels);
        // Sweeps roughly three quarters of the book
        let quantity = Decimal::from(*levels as i64 * 10 * 3 / 4);
        let request = EstimateRequest::market("BTC-USD", Side::Bid, quantity);

        group.bench_with_input(BenchmarkId::from_parameter(levels), &book, |b, book| {
            b.iter(|| black_box(estimator.estimate(request.clone(), book)));
        });
    }

    group.finish();
}

// ============================================================================
// Snapshot Read Path
// ============================================================================

fn benchmark_order_book_snapshot(c: &mut Criterion) {
    let mut group = c.benchmark_group("order_book_snapshot");

    for cached in [false, true].iter() {
        let store = Arc::new(InMemoryStore::with_assets(["BTC-USD"]));
        for order in resting_asks(5000, 500) {
            store.seed_order(order).ok();
        }
        let config = EngineConfig::default().with_cache(*cached);
        let engine = create_from_config(config, store, Arc::new(NoOpEventHandler))
            .expect("valid benchmark config");
        let asset = AssetId::from("BTC-USD");

        let label = if *cached { "cached" } else { "direct" };
        group.bench_function(label, |b| {
            b.iter(|| black_box(engine.get_order_book(&asset, 20)));
        });
    }

    group.finish();
}

// ============================================================================
// Snapshot Reads Under Churn
// ============================================================================

fn benchmark_snapshot_under_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot_under_churn");
    let owner = OwnerId::from("churner");

    for cached in [false, true].iter() {
        let store = Arc::new(InMemoryStore::with_assets(["BTC-USD"]));
        for order in resting_asks(5000, 500) {
            store.seed_order(order).ok();
        }
        let config = EngineConfig::default().with_cache(*cached);
        let engine = create_from_config(config, store, Arc::new(NoOpEventHandler))
            .expect("valid benchmark config");
        let asset = AssetId::from("BTC-USD");
        let label = if *cached { "cached" } else { "direct" };

        // One place and one cancel per `reads_per_write` snapshot reads
        for reads_per_write in [1usize, 10, 100].iter() {
            group.bench_with_input(
                BenchmarkId::new(label, reads_per_write),
                reads_per_write,
                |b, &reads| {
                    b.iter(|| {
                        let placed = engine.place_order(NewOrder::limit(
                            "churner",
                            "BTC-USD",
                            Side::Bid,
                            Decimal::new(49_000_00, 2),
                            Decimal::ONE,
                        ));
                        for _ in 0..reads {
                            black_box(engine.get_order_book(&asset, 20).ok());
                        }
                        if let Ok(order) = placed {
                            black_box(engine.cancel_order(order.id, &owner).ok());
                        }
                        for _ in 0..reads {
                            black_box(engine.get_order_book(&asset, 20).ok());
                        }
                    });
                },
            );
        }
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_aggregate_levels,
    benchmark_estimate,
    benchmark_order_book_snapshot,
    benchmark_snapshot_under_churn
);

criterion_main!(benches);

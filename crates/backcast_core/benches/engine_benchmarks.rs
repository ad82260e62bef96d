//! Criterion benchmarks for backcast_core
//!
//! Run with: cargo bench -p backcast_core

use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use jiff::Span;
use jiff::civil::{Date, Weekday, date};

use backcast_core::monte_carlo::simulate_path;
use backcast_core::{
    BacktestOptions, BacktestRequest, BoxMuller, CancellationToken, CoarseAllocation, Engine,
    EngineConfig, Granularity, InMemoryMarketData, MonteCarloParams, NoopCache, NormalSampler,
    PricePoint, PriceSeries,
};

const TICKERS: [(&str, f64); 8] = [
    ("SPY", 0.07),
    ("IWM", 0.08),
    ("EFA", 0.06),
    ("EEM", 0.09),
    ("AGG", 0.04),
    ("TLT", 0.045),
    ("VNQ", 0.07),
    ("GLD", 0.05),
];

fn trading_days(start: Date, end: Date) -> Vec<Date> {
    start
        .series(Span::new().days(1))
        .take_while(|d| *d <= end)
        .filter(|d| !matches!(d.weekday(), Weekday::Saturday | Weekday::Sunday))
        .collect()
}

fn create_market() -> InMemoryMarketData {
    let days = trading_days(date(1999, 1, 1), date(2024, 12, 31));
    TICKERS
        .iter()
        .enumerate()
        .map(|(k, (ticker, drift))| {
            let points = days
                .iter()
                .enumerate()
                .map(|(i, d)| {
                    let t = i as f64 / 252.0;
                    let close = 100.0 * (drift * t).exp() * (1.0 + 0.05 * (t * 3.0 + k as f64).sin());
                    PricePoint { date: *d, close }
                })
                .collect();
            PriceSeries::new(*ticker, points)
        })
        .collect()
}

fn create_engine() -> Engine {
    Engine::new(
        Arc::new(create_market()),
        Arc::new(NoopCache),
        EngineConfig::default().with_cache_enabled(false),
    )
    .unwrap()
}

fn bench_backtest(c: &mut Criterion) {
    let engine = create_engine();
    let token = CancellationToken::new();
    let mut group = c.benchmark_group("backtest");

    for granularity in [Granularity::Daily, Granularity::Monthly] {
        let request = BacktestRequest::new(CoarseAllocation::new(60, 30, 5, 5))
            .between(date(1999, 1, 1), date(2024, 12, 31))
            .options(BacktestOptions::default().granularity(granularity));
        group.bench_with_input(
            BenchmarkId::new("26yr_balanced", format!("{granularity:?}")),
            &request,
            |b, request| b.iter(|| engine.run_backtest(black_box(request), &token)),
        );
    }

    group.finish();
}

fn bench_monte_carlo(c: &mut Criterion) {
    let engine = create_engine();
    let token = CancellationToken::new();
    let mut group = c.benchmark_group("monte_carlo");

    for simulations in [1_000, 10_000].iter() {
        let params = MonteCarloParams::new(1_000_000.0, 0.08, 0.15, 30)
            .contribution(25_000.0)
            .withdrawal(50_000.0)
            .simulations(*simulations)
            .seed(42);
        group.bench_with_input(
            BenchmarkId::new("simulations", simulations),
            simulations,
            |b, _| b.iter(|| engine.run_monte_carlo(black_box(&params), &token)),
        );
    }

    group.finish();
}

fn bench_single_path(c: &mut Criterion) {
    let params = MonteCarloParams::new(1_000_000.0, 0.08, 0.15, 30);
    let mut sampler = BoxMuller::seeded(42);

    c.bench_function("single_path_30yr", |b| {
        b.iter(|| simulate_path(black_box(&params), &mut sampler))
    });
    c.bench_function("box_muller_draw", |b| {
        b.iter(|| sampler.next_standard_normal())
    });
}

criterion_group!(benches, bench_backtest, bench_monte_carlo, bench_single_path);
criterion_main!(benches);

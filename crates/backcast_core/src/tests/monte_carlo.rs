//! Distribution properties of the Monte Carlo projection
//!
//! These tests verify that:
//! - Percentiles are ordered and rates stay within [0, 100]
//! - Zero volatility collapses the distribution
//! - More volatility widens it and contributions lift it
//! - A seeded run does not depend on the size of the thread pool
//! - Returns too large to project are rejected instead of producing ∞
//! - The reference 10,000 × 30-year run finishes well inside two seconds

use std::sync::Arc;
use std::time::Instant;

use super::fixtures::engine;
use crate::cache::NoopCache;
use crate::cancel::CancellationToken;
use crate::error::{EngineError, ValidationError};
use crate::model::MonteCarloParams;

fn run(params: &MonteCarloParams) -> crate::model::MonteCarloResult {
    engine(Arc::new(NoopCache))
        .run_monte_carlo(params, &CancellationToken::new())
        .unwrap()
}

#[test]
fn test_percentiles_are_ordered() {
    let result = run(&MonteCarloParams::new(500_000.0, 0.06, 0.12, 25)
        .simulations(1_000)
        .seed(3));
    assert!(result.percentile_5 <= result.median_final_value);
    assert!(result.median_final_value <= result.percentile_95);
    assert!((0.0..=100.0).contains(&result.success_rate));
    assert_eq!(result.num_simulations, 1_000);
    assert_eq!(result.years, 25);
}

#[test]
fn test_zero_volatility_collapses_spread() {
    let result = run(&MonteCarloParams::new(100_000.0, 0.07, 0.0, 30)
        .simulations(500)
        .seed(5));
    let spread = (result.percentile_95 - result.percentile_5) / result.median_final_value;
    assert!(spread < 0.01, "{spread}");
    let expected = 100_000.0 * (0.07f64 * 30.0).exp();
    assert!((result.median_final_value - expected).abs() / expected < 1e-9);
}

#[test]
fn test_higher_volatility_widens_spread() {
    let base = MonteCarloParams::new(100_000.0, 0.07, 0.05, 20)
        .simulations(2_000)
        .seed(21);
    let calm = run(&base);
    let wild = run(&MonteCarloParams {
        volatility: 0.25,
        ..base
    });
    assert!(
        wild.percentile_95 - wild.percentile_5 > calm.percentile_95 - calm.percentile_5,
        "calm {calm:?} wild {wild:?}"
    );
}

#[test]
fn test_contributions_raise_median() {
    let base = MonteCarloParams::new(100_000.0, 0.06, 0.15, 20)
        .simulations(2_000)
        .seed(8);
    let without = run(&base);
    let with = run(&base.clone().contribution(10_000.0));
    assert!(with.median_final_value > without.median_final_value);
}

#[test]
fn test_seeded_run_independent_of_thread_count() {
    let params = MonteCarloParams::new(250_000.0, 0.05, 0.18, 15)
        .simulations(3_333)
        .seed(99);

    let on = |threads: usize| {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .unwrap()
            .install(|| run(&params))
    };
    let single = on(1);
    let many = on(4);

    assert_eq!(single.median_final_value, many.median_final_value);
    assert_eq!(single.percentile_5, many.percentile_5);
    assert_eq!(single.percentile_95, many.percentile_95);
    assert_eq!(single.success_rate, many.success_rate);
}

#[test]
fn test_success_probability_is_monotone_in_target() {
    let params = MonteCarloParams::new(100_000.0, 0.06, 0.15, 10)
        .simulations(2_000)
        .seed(17);
    let engine = engine(Arc::new(NoopCache));
    let token = CancellationToken::new();

    let low = engine
        .calculate_success_probability(&params, 50_000.0, &token)
        .unwrap();
    let high = engine
        .calculate_success_probability(&params, 400_000.0, &token)
        .unwrap();
    assert!(low >= high);
    assert!((0.0..=100.0).contains(&low));
    assert_eq!(
        engine
            .calculate_success_probability(&params, 0.0, &token)
            .unwrap(),
        100.0
    );
}

#[test]
fn test_retirement_scenario_runs_fast() {
    let params = MonteCarloParams::new(1_000_000.0, 0.08, 0.15, 30)
        .contribution(25_000.0)
        .withdrawal(50_000.0)
        .simulations(10_000);

    let started = Instant::now();
    let result = run(&params);
    let elapsed = started.elapsed();

    assert!(elapsed.as_millis() < 2_000, "{elapsed:?}");
    assert!((0.0..=100.0).contains(&result.success_rate));
    assert!(result.execution_time_ms < 2_000.0);
    assert!(result.percentile_5 >= 0.0);
}

#[test]
fn test_overflowing_return_is_rejected() {
    let engine = engine(Arc::new(NoopCache));
    let token = CancellationToken::new();
    let params = MonteCarloParams::new(1_000.0, 800.0, 0.1, 2)
        .simulations(100)
        .seed(4);

    let err = engine.run_monte_carlo(&params, &token).unwrap_err();
    assert!(
        matches!(
            err,
            EngineError::Validation(ValidationError::OutOfRange {
                field: "expected_return",
                ..
            })
        ),
        "{err}"
    );
    assert!(
        engine
            .calculate_success_probability(&params, 1_000.0, &token)
            .is_err()
    );

    // A steep but representable return still projects to finite values
    let steep = run(&MonteCarloParams {
        expected_return: 200.0,
        ..params
    });
    assert!(steep.percentile_95.is_finite());
    let json = serde_json::to_string(&steep).unwrap();
    assert!(!json.contains("null"), "{json}");
}

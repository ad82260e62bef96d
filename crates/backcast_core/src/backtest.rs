//! Historical backtest simulator
//!
//! Steps a resolved allocation over aligned daily closes, rebalancing back to
//! target weights at every period boundary, then hands the resulting value
//! path to the analytics. Everything here is deterministic: the same aligned
//! prices and plan produce a bit-identical [`BacktestResult`].

use jiff::civil::Date;
use serde::Serialize;
use tracing::debug;

use crate::analysis::{crisis_impact, max_drawdown, summarize, volatility_bands};
use crate::cancel::CancellationToken;
use crate::config::{BacktestOptions, Granularity, RebalanceFrequency};
use crate::date_math::years_between;
use crate::error::{EngineError, MarketDataError};
use crate::market_data::AlignedPrices;
use crate::model::{
    AnnualReturn, BacktestMetadata, BacktestResult, CRISIS_WINDOWS, ResolvedAllocation,
    ValuePoint, VolatilityBand,
};

/// Fully-resolved inputs of one backtest.
///
/// Every default has been applied, so two plans that serialize identically
/// describe the same computation. The result cache keys on this.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestPlan {
    pub allocation: ResolvedAllocation,
    pub initial_capital: f64,
    pub start_date: Date,
    pub end_date: Date,
    pub options: BacktestOptions,
}

/// Raw output of stepping through the price matrix
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedPath {
    pub values: Vec<ValuePoint>,
    pub annual_returns: Vec<AnnualReturn>,
}

/// Share counts per ticker, in the order of [`AlignedPrices::tickers`]
#[derive(Debug, Clone)]
struct Holdings {
    shares: Vec<f64>,
}

impl Holdings {
    fn allocate(value: f64, weights: &[f64], closes: impl Iterator<Item = f64>) -> Self {
        let shares = weights
            .iter()
            .zip(closes)
            .map(|(w, price)| value * w / price)
            .collect();
        Self { shares }
    }

    fn value(&self, closes: impl Iterator<Item = f64>) -> f64 {
        self.shares
            .iter()
            .zip(closes)
            .map(|(shares, price)| shares * price)
            .sum()
    }
}

/// Calendar-year accumulator
struct YearTracker {
    year: i16,
    start_value: f64,
    closed: Vec<AnnualReturn>,
}

impl YearTracker {
    fn new(year: i16, start_value: f64) -> Self {
        Self {
            year,
            start_value,
            closed: Vec::new(),
        }
    }

    fn close(&mut self, end_value: f64) {
        self.closed.push(AnnualReturn {
            year: self.year,
            return_pct: (end_value / self.start_value - 1.0) * 100.0,
            start_value: self.start_value,
            end_value,
        });
    }

    /// Close the running year when `date` falls in a later one. The new year
    /// opens at the value of its first observation.
    fn observe(&mut self, date: Date, value: f64) {
        if date.year() != self.year {
            self.close(value);
            self.year = date.year();
            self.start_value = value;
        }
    }

    fn finish(mut self, final_value: f64) -> Vec<AnnualReturn> {
        self.close(final_value);
        self.closed
    }
}

/// Step the portfolio through every aligned date.
///
/// The first date buys `capital · w / price` shares of each ticker and records
/// exactly `initial_capital`. Later dates mark holdings to market and rebalance
/// on the first date of each new period.
pub fn simulate_path(
    prices: &AlignedPrices,
    initial_capital: f64,
    frequency: RebalanceFrequency,
    check_interval: usize,
    cancel: &CancellationToken,
) -> Result<SimulatedPath, EngineError> {
    let Some(&first_date) = prices.dates.first() else {
        return Err(MarketDataError::Provider("no aligned price observations".into()).into());
    };
    let check_interval = check_interval.max(1);

    let mut holdings = Holdings::allocate(initial_capital, &prices.weights, prices.closes_at(0));
    let mut last_rebalance = first_date;
    let mut years = YearTracker::new(first_date.year(), initial_capital);

    let mut values = Vec::with_capacity(prices.len());
    values.push(ValuePoint {
        date: first_date,
        value: initial_capital,
    });

    for (i, &date) in prices.dates.iter().enumerate().skip(1) {
        if i % check_interval == 0 {
            cancel.check()?;
        }

        let value = holdings.value(prices.closes_at(i));
        if frequency.is_boundary(last_rebalance, date) {
            holdings = Holdings::allocate(value, &prices.weights, prices.closes_at(i));
            last_rebalance = date;
        }

        years.observe(date, value);
        values.push(ValuePoint { date, value });
    }

    let final_value = values.last().map_or(initial_capital, |p| p.value);
    Ok(SimulatedPath {
        values,
        annual_returns: years.finish(final_value),
    })
}

/// Compound annual growth rate in percent. Zero when no time elapsed.
pub fn cagr(initial: f64, final_value: f64, years: f64) -> f64 {
    if years <= 0.0 || initial <= 0.0 {
        return 0.0;
    }
    ((final_value / initial).powf(1.0 / years) - 1.0) * 100.0
}

/// First point of each calendar month plus the final point
pub fn aggregate_monthly<T: Copy>(points: &[T], date_of: impl Fn(&T) -> Date) -> Vec<T> {
    let mut out = Vec::new();
    let mut last_month = None;
    for point in points {
        let date = date_of(point);
        let month = (date.year(), date.month());
        if last_month != Some(month) {
            out.push(*point);
            last_month = Some(month);
        }
    }
    if let Some(last) = points.last() {
        let already = out.last().is_some_and(|p| date_of(p) == date_of(last));
        if !already {
            out.push(*last);
        }
    }
    out
}

/// Run a complete backtest on already-aligned prices.
pub fn run_backtest(
    prices: &AlignedPrices,
    plan: &BacktestPlan,
    check_interval: usize,
    cancel: &CancellationToken,
) -> Result<BacktestResult, EngineError> {
    let path = simulate_path(
        prices,
        plan.initial_capital,
        plan.options.rebalance_frequency,
        check_interval,
        cancel,
    )?;
    let SimulatedPath {
        values,
        annual_returns,
    } = path;

    let (Some(first), Some(last)) = (values.first(), values.last()) else {
        return Err(MarketDataError::Provider("no aligned price observations".into()).into());
    };
    let final_value = last.value;
    let years = years_between(first.date, last.date);

    let statistics = summarize(&annual_returns);
    let drawdown = max_drawdown(&values)
        .ok_or_else(|| MarketDataError::Provider("no aligned price observations".into()))?;
    let crises = crisis_impact(&values, &CRISIS_WINDOWS);
    let bands = plan
        .options
        .include_volatility_bands
        .then(|| volatility_bands(&values, statistics.volatility / 100.0));

    let data_points = values.len();
    let (portfolio_values, volatility_bands) = match plan.options.granularity {
        Granularity::Daily => (values, bands),
        Granularity::Monthly => (
            aggregate_monthly(&values, |p: &ValuePoint| p.date),
            bands.map(|b| aggregate_monthly(&b, |p: &VolatilityBand| p.date)),
        ),
    };

    debug!(
        data_points,
        final_value,
        years = annual_returns.len(),
        "backtest complete"
    );

    Ok(BacktestResult {
        allocation: plan.allocation.weights.clone(),
        initial_capital: plan.initial_capital,
        start_date: plan.start_date,
        end_date: plan.end_date,
        rebalance_frequency: plan.options.rebalance_frequency,
        final_value,
        total_return: (final_value / plan.initial_capital - 1.0) * 100.0,
        cagr: cagr(plan.initial_capital, final_value, years),
        portfolio_values,
        annual_returns,
        statistics,
        max_drawdown: drawdown,
        crisis_impact: crises,
        volatility_bands,
        metadata: BacktestMetadata {
            data_points,
            granularity: plan.options.granularity,
        },
    })
}

//! Market-data collaborator interface and price alignment
//!
//! The engine never fetches prices itself. A [`MarketDataProvider`] is injected at
//! construction; [`load_aligned`] asks it once per distinct ticker (in parallel),
//! validates what comes back and lines the series up on their common trading
//! dates.

use jiff::civil::Date;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::cancel::CancellationToken;
use crate::error::{EngineError, MarketDataError};
use crate::model::{PriceSeries, ResolvedAllocation};

/// Source of daily close prices.
///
/// Implementations must return the observations within `[start, end]` in date
/// order, or [`MarketDataError::Unavailable`] when the ticker is unknown.
pub trait MarketDataProvider: Send + Sync {
    fn load_series(
        &self,
        ticker: &str,
        start: Date,
        end: Date,
    ) -> Result<PriceSeries, MarketDataError>;
}

/// Provider backed by series held in memory. Useful for fixtures and for callers
/// that preload data.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMarketData {
    series: FxHashMap<String, PriceSeries>,
}

impl InMemoryMarketData {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a ticker's full history
    pub fn insert(&mut self, series: PriceSeries) {
        self.series.insert(series.ticker.clone(), series);
    }

    #[must_use]
    pub fn with_series(mut self, series: PriceSeries) -> Self {
        self.insert(series);
        self
    }

    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }
}

impl FromIterator<PriceSeries> for InMemoryMarketData {
    fn from_iter<I: IntoIterator<Item = PriceSeries>>(iter: I) -> Self {
        let mut data = InMemoryMarketData::new();
        for series in iter {
            data.insert(series);
        }
        data
    }
}

impl MarketDataProvider for InMemoryMarketData {
    fn load_series(
        &self,
        ticker: &str,
        start: Date,
        end: Date,
    ) -> Result<PriceSeries, MarketDataError> {
        self.series
            .get(ticker)
            .map(|s| s.window(start, end))
            .ok_or_else(|| MarketDataError::Unavailable {
                ticker: ticker.to_string(),
            })
    }
}

/// Price matrix for one backtest, aligned on dates common to every ticker.
///
/// `prices[t][i]` is the close of `tickers[t]` on `dates[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedPrices {
    pub dates: Vec<Date>,
    pub tickers: Vec<String>,
    pub weights: Vec<f64>,
    pub prices: Vec<Vec<f64>>,
}

impl AlignedPrices {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Close of every ticker at step `i`
    pub fn closes_at(&self, i: usize) -> impl Iterator<Item = f64> + '_ {
        self.prices.iter().map(move |p| p[i])
    }
}

/// Load and align every series the allocation needs.
///
/// All-or-nothing: the first missing or malformed series aborts the load.
pub fn load_aligned(
    provider: &dyn MarketDataProvider,
    allocation: &ResolvedAllocation,
    start: Date,
    end: Date,
    cancel: &CancellationToken,
) -> Result<AlignedPrices, EngineError> {
    cancel.check()?;

    let series = allocation
        .tickers
        .clone()
        .into_par_iter()
        .map(|tw| {
            let series = provider.load_series(&tw.ticker, start, end)?;
            validate_series(&tw.ticker, &series)?;
            debug!(
                ticker = %tw.ticker,
                observations = series.len(),
                "loaded price series"
            );
            Ok(series)
        })
        .collect::<Result<Vec<_>, MarketDataError>>()?;

    cancel.check()?;
    align(allocation, &series, start, end)
}

fn validate_series(ticker: &str, series: &PriceSeries) -> Result<(), MarketDataError> {
    if series.is_empty() {
        return Err(MarketDataError::Unavailable {
            ticker: ticker.to_string(),
        });
    }
    if !series.is_ordered() {
        return Err(MarketDataError::Provider(format!(
            "series for {ticker} is not strictly increasing by date"
        )));
    }
    if let Some(bad) = series
        .points
        .iter()
        .find(|p| !(p.close.is_finite() && p.close > 0.0))
    {
        return Err(MarketDataError::InvalidPrice {
            ticker: ticker.to_string(),
            date: bad.date,
            close: bad.close,
        });
    }
    Ok(())
}

/// Intersection of two sorted, duplicate-free date lists
fn intersect_sorted(a: &[Date], b: &[Date]) -> Vec<Date> {
    let mut out = Vec::with_capacity(a.len().min(b.len()));
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out
}

fn align(
    allocation: &ResolvedAllocation,
    series: &[PriceSeries],
    start: Date,
    end: Date,
) -> Result<AlignedPrices, EngineError> {
    let mut dates: Vec<Date> = match series.first() {
        Some(first) => first.points.iter().map(|p| p.date).collect(),
        None => Vec::new(),
    };
    for s in series.iter().skip(1) {
        let other: Vec<Date> = s.points.iter().map(|p| p.date).collect();
        dates = intersect_sorted(&dates, &other);
    }
    if dates.is_empty() {
        return Err(MarketDataError::NoCommonDates { start, end }.into());
    }

    let prices = series
        .iter()
        .map(|s| {
            s.points
                .iter()
                .filter(|p| dates.binary_search(&p.date).is_ok())
                .map(|p| p.close)
                .collect::<Vec<_>>()
        })
        .collect();

    Ok(AlignedPrices {
        dates,
        tickers: allocation.tickers.iter().map(|t| t.ticker.clone()).collect(),
        weights: allocation.tickers.iter().map(|t| t.weight).collect(),
        prices,
    })
}

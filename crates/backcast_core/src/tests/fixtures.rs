//! Frozen synthetic market data
//!
//! Weekday closes for every benchmark ticker from 1999 through 2010. Prices are a
//! pure function of the date: a per-ticker drift, a small seasonal wobble and,
//! for risk assets, a crash from October 2007 to early March 2009 that takes
//! equities down by more than half before recovering by the end of 2010.

use std::sync::{Arc, Mutex};

use jiff::Span;
use jiff::civil::{Date, Weekday, date};

use crate::cache::ResultCache;
use crate::config::EngineConfig;
use crate::date_math::fast_days_between;
use crate::engine::Engine;
use crate::error::MarketDataError;
use crate::market_data::{InMemoryMarketData, MarketDataProvider};
use crate::model::{PricePoint, PriceSeries};

pub const FIXTURE_START: Date = date(1999, 1, 1);
pub const FIXTURE_END: Date = date(2010, 12, 31);

const CRASH_START: Date = date(2007, 10, 1);
const CRASH_TROUGH: Date = date(2009, 3, 2);

/// (ticker, starting price, annual drift, crash beta, wobble phase)
const PROFILES: &[(&str, f64, f64, f64, f64)] = &[
    ("SPY", 120.0, 0.07, 1.0, 0.0),
    ("IWM", 50.0, 0.08, 1.1, 0.7),
    ("EFA", 60.0, 0.06, 1.0, 1.3),
    ("EEM", 30.0, 0.09, 1.2, 2.1),
    ("AGG", 100.0, 0.04, 0.0, 2.9),
    ("TLT", 90.0, 0.045, 0.0, 3.7),
    ("VNQ", 40.0, 0.07, 1.1, 4.3),
    ("GLD", 45.0, 0.05, 0.0, 5.1),
];

pub fn weekdays(start: Date, end: Date) -> Vec<Date> {
    start
        .series(Span::new().days(1))
        .take_while(|d| *d <= end)
        .filter(|d| !matches!(d.weekday(), Weekday::Saturday | Weekday::Sunday))
        .collect()
}

/// Multiplicative crash factor: 1 outside the episode, 0.45 at the trough
fn crash_factor(d: Date) -> f64 {
    let depth = 0.55;
    if d < CRASH_START {
        return 1.0;
    }
    if d <= CRASH_TROUGH {
        let t = f64::from(fast_days_between(CRASH_START, d))
            / f64::from(fast_days_between(CRASH_START, CRASH_TROUGH));
        return 1.0 - depth * t;
    }
    let t = (f64::from(fast_days_between(CRASH_TROUGH, d))
        / f64::from(fast_days_between(CRASH_TROUGH, FIXTURE_END)))
    .min(1.0);
    1.0 - depth * (1.0 - t)
}

fn close(d: Date, base: f64, drift: f64, beta: f64, phase: f64) -> f64 {
    let days = f64::from(fast_days_between(FIXTURE_START, d));
    let trend = base * (drift * days / 365.25).exp();
    let wobble = 1.0 + 0.02 * (days / 45.0 + phase).sin();
    let crash = 1.0 - beta * (1.0 - crash_factor(d));
    trend * wobble * crash.max(0.05)
}

pub fn series(ticker: &str) -> PriceSeries {
    let &(_, base, drift, beta, phase) = PROFILES
        .iter()
        .find(|p| p.0 == ticker)
        .expect("fixture ticker");
    PriceSeries::new(
        ticker,
        weekdays(FIXTURE_START, FIXTURE_END)
            .into_iter()
            .map(|d| PricePoint {
                date: d,
                close: close(d, base, drift, beta, phase),
            })
            .collect(),
    )
}

pub fn market() -> InMemoryMarketData {
    PROFILES.iter().map(|p| series(p.0)).collect()
}

pub fn engine_with(market: Arc<dyn MarketDataProvider>, cache: Arc<dyn ResultCache>) -> Engine {
    Engine::new(market, cache, EngineConfig::default()).unwrap()
}

pub fn engine(cache: Arc<dyn ResultCache>) -> Engine {
    engine_with(Arc::new(market()), cache)
}

/// Provider that records every ticker it is asked for
pub struct RecordingMarket {
    inner: InMemoryMarketData,
    pub requests: Mutex<Vec<String>>,
}

impl RecordingMarket {
    pub fn new() -> Self {
        Self {
            inner: market(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requested(&self) -> Vec<String> {
        let mut tickers = self.requests.lock().unwrap().clone();
        tickers.sort();
        tickers
    }
}

impl MarketDataProvider for RecordingMarket {
    fn load_series(
        &self,
        ticker: &str,
        start: Date,
        end: Date,
    ) -> Result<PriceSeries, MarketDataError> {
        self.requests.lock().unwrap().push(ticker.to_string());
        self.inner.load_series(ticker, start, end)
    }
}

#[test]
fn test_fixture_has_deep_2008_decline() {
    let spy = series("SPY");
    let before = spy
        .points
        .iter()
        .find(|p| p.date >= CRASH_START)
        .unwrap()
        .close;
    let trough = spy
        .points
        .iter()
        .find(|p| p.date >= CRASH_TROUGH)
        .unwrap()
        .close;
    assert!(trough / before < 0.6, "{trough} / {before}");
    assert!(spy.points.iter().all(|p| p.close > 0.0));
    assert!(spy.is_ordered());
}

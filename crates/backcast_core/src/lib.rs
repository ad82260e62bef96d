//! Portfolio backtesting and projection engine
//!
//! This crate answers two questions about an asset allocation:
//! - How would it have performed historically? [`Engine::run_backtest`] replays
//!   daily closes with periodic rebalancing and reports returns, drawdowns,
//!   crisis behavior and volatility bands.
//! - How might it perform in future? [`Engine::run_monte_carlo`] projects the
//!   portfolio under geometric Brownian motion across thousands of paths.
//!
//! Market data and the result cache are collaborators injected at construction.
//!
//! ```ignore
//! use std::sync::Arc;
//! use backcast_core::{
//!     BacktestRequest, CancellationToken, CoarseAllocation, Engine, EngineConfig,
//!     InMemoryCache, InMemoryMarketData,
//! };
//!
//! let engine = Engine::new(
//!     Arc::new(InMemoryMarketData::new()),
//!     Arc::new(InMemoryCache::new()),
//!     EngineConfig::default(),
//! )?;
//!
//! let request = BacktestRequest::new(CoarseAllocation::new(60, 30, 5, 5)).capital(250_000.0);
//! let result = engine.run_backtest(&request, &CancellationToken::new())?;
//! println!("CAGR {:.2}%", result.cagr);
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod allocation;
pub mod analysis;
pub mod backtest;
pub mod cache;
pub mod cancel;
pub mod date_math;
pub mod engine;
pub mod error;
pub mod market_data;
pub mod monte_carlo;
pub mod sampler;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod config;
pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use cache::{InMemoryCache, NoopCache, ResultCache};
pub use cancel::CancellationToken;
pub use config::{BacktestOptions, EngineConfig, Granularity, RebalanceFrequency};
pub use engine::Engine;
pub use error::{CacheError, EngineError, MarketDataError, ValidationError};
pub use market_data::{InMemoryMarketData, MarketDataProvider};
pub use model::{
    AllocationInput, AllocationWeight, BacktestRequest, BacktestResult, CoarseAllocation,
    MonteCarloParams, MonteCarloResult, PricePoint, PriceSeries,
};
pub use sampler::{BoxMuller, NormalSampler, SamplerSource, SeededSource};

//! Post-run analytics over a backtest's value path.
//!
//! Every function here is pure: it reads the daily path (or the annual returns
//! derived from it) and produces one section of the [`BacktestResult`].
//!
//! - [`summarize`] - best/worst year, mean and population volatility
//! - [`max_drawdown`] - deepest peak-to-trough episode and its recovery
//! - [`crisis_impact`] - behavior inside fixed historical stress windows
//! - [`volatility_bands`] - ±1σ envelope around the realized path
//!
//! [`BacktestResult`]: crate::model::BacktestResult

mod crisis;
mod drawdown;
mod statistics;
mod volatility;

pub use crisis::*;
pub use drawdown::*;
pub use statistics::*;
pub use volatility::*;

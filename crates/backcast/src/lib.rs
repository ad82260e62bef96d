//! Command-line front end for `backcast_core`
//!
//! Reads per-ticker CSV price files from a data directory, runs backtests and
//! Monte Carlo projections, and prints JSON (or a short text summary) to stdout.

pub mod cli;
pub mod commands;
pub mod csv_provider;
pub mod logging;
pub mod settings;

pub use cli::{Cli, Command};
pub use commands::{build_engine, run};
pub use csv_provider::CsvMarketData;
pub use logging::init_logging;
pub use settings::{Settings, default_config_path};

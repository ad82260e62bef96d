//! Engine configuration
//!
//! `EngineConfig` holds the process-wide knobs set once at startup. Per-request
//! knobs live in [`BacktestOptions`] and
//! [`MonteCarloParams`](crate::model::MonteCarloParams). Every default is
//! enumerated once, in the `default_*` functions below, so a config file may omit
//! any field.
//!
//! ```ignore
//! let config: EngineConfig = serde_saphyr::from_str("cache_ttl_secs: 3600\n")?;
//! assert_eq!(config.default_initial_capital, 100_000.0);
//! ```

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

mod options;

pub use options::{BacktestOptions, Granularity, RebalanceFrequency};

fn default_true() -> bool {
    true
}

fn default_cache_ttl_secs() -> u64 {
    86_400
}

fn default_initial_capital() -> f64 {
    100_000.0
}

fn default_start_date() -> Date {
    jiff::civil::date(1999, 1, 1)
}

fn default_monte_carlo_batch_size() -> usize {
    100
}

fn default_max_simulations() -> usize {
    1_000_000
}

fn default_cancellation_check_interval() -> usize {
    256
}

/// Process-wide engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Whether backtest results are memoized in the injected cache
    #[serde(default = "default_true")]
    pub cache_enabled: bool,

    /// Time-to-live for cached backtest results
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Capital used when a backtest request omits it
    #[serde(default = "default_initial_capital")]
    pub default_initial_capital: f64,

    /// Start date used when a backtest request omits it
    #[serde(default = "default_start_date")]
    pub default_start_date: Date,

    /// Paths simulated per Monte Carlo work unit. Each batch owns its own generator.
    #[serde(default = "default_monte_carlo_batch_size")]
    pub monte_carlo_batch_size: usize,

    /// Upper bound on `num_simulations` accepted from a request
    #[serde(default = "default_max_simulations")]
    pub max_simulations: usize,

    /// Trading days stepped between cancellation checks in a backtest
    #[serde(default = "default_cancellation_check_interval")]
    pub cancellation_check_interval: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_enabled: default_true(),
            cache_ttl_secs: default_cache_ttl_secs(),
            default_initial_capital: default_initial_capital(),
            default_start_date: default_start_date(),
            monte_carlo_batch_size: default_monte_carlo_batch_size(),
            max_simulations: default_max_simulations(),
            cancellation_check_interval: default_cancellation_check_interval(),
        }
    }
}

impl EngineConfig {
    /// Create a configuration with every field at its default
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.monte_carlo_batch_size == 0 {
            return Err(EngineError::Config(
                "monte_carlo_batch_size must be at least 1".into(),
            ));
        }
        if self.max_simulations == 0 {
            return Err(EngineError::Config(
                "max_simulations must be at least 1".into(),
            ));
        }
        if self.cancellation_check_interval == 0 {
            return Err(EngineError::Config(
                "cancellation_check_interval must be at least 1".into(),
            ));
        }
        if !(self.default_initial_capital.is_finite() && self.default_initial_capital > 0.0) {
            return Err(EngineError::Config(format!(
                "default_initial_capital must be positive (got {})",
                self.default_initial_capital
            )));
        }
        Ok(())
    }

    /// Builder-style override of the cache switch
    #[must_use]
    pub fn with_cache_enabled(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    /// Builder-style override of the Monte Carlo batch size
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.monte_carlo_batch_size = batch_size;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert!(config.cache_enabled);
        assert_eq!(config.cache_ttl_secs, 86_400);
        assert_eq!(config.default_initial_capital, 100_000.0);
        assert_eq!(config.default_start_date, jiff::civil::date(1999, 1, 1));
        assert_eq!(config.monte_carlo_batch_size, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"cache_enabled": false, "cache_ttl_secs": 60}"#).unwrap();
        assert!(!config.cache_enabled);
        assert_eq!(config.cache_ttl_secs, 60);
        assert_eq!(config.max_simulations, 1_000_000);
    }

    #[test]
    fn test_validate_rejects_zero_batch() {
        let config = EngineConfig::default().with_batch_size(0);
        assert!(matches!(config.validate(), Err(EngineError::Config(_))));
    }
}

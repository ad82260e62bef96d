//! Request types accepted by the engine API

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::config::BacktestOptions;
use crate::error::ValidationError;
use crate::model::AllocationInput;
use crate::sampler::BOX_MULLER_MAX_ABS;

/// A historical backtest request. Omitted fields fall back to the engine config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestRequest {
    pub allocation: AllocationInput,
    #[serde(default)]
    pub initial_capital: Option<f64>,
    #[serde(default)]
    pub start_date: Option<Date>,
    /// Defaults to today
    #[serde(default)]
    pub end_date: Option<Date>,
    #[serde(default)]
    pub options: BacktestOptions,
}

impl BacktestRequest {
    pub fn new(allocation: impl Into<AllocationInput>) -> Self {
        Self {
            allocation: allocation.into(),
            initial_capital: None,
            start_date: None,
            end_date: None,
            options: BacktestOptions::default(),
        }
    }

    #[must_use]
    pub fn capital(mut self, initial_capital: f64) -> Self {
        self.initial_capital = Some(initial_capital);
        self
    }

    #[must_use]
    pub fn between(mut self, start: Date, end: Date) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    #[must_use]
    pub fn options(mut self, options: BacktestOptions) -> Self {
        self.options = options;
        self
    }
}

fn default_num_simulations() -> usize {
    10_000
}

/// Parameters of a forward GBM projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloParams {
    pub initial_value: f64,
    /// Annual drift μ, e.g. 0.08
    pub expected_return: f64,
    /// Annual volatility σ, e.g. 0.15
    pub volatility: f64,
    pub years: u32,
    #[serde(default)]
    pub annual_contribution: f64,
    #[serde(default)]
    pub annual_withdrawal: f64,
    #[serde(default = "default_num_simulations")]
    pub num_simulations: usize,
    /// Fixed seed for a reproducible run; `None` draws a fresh one per call
    #[serde(default)]
    pub seed: Option<u64>,
    /// Return every simulated path alongside the summary
    #[serde(default)]
    pub keep_paths: bool,
}

impl MonteCarloParams {
    pub fn new(initial_value: f64, expected_return: f64, volatility: f64, years: u32) -> Self {
        Self {
            initial_value,
            expected_return,
            volatility,
            years,
            annual_contribution: 0.0,
            annual_withdrawal: 0.0,
            num_simulations: default_num_simulations(),
            seed: None,
            keep_paths: false,
        }
    }

    #[must_use]
    pub fn contribution(mut self, amount: f64) -> Self {
        self.annual_contribution = amount;
        self
    }

    #[must_use]
    pub fn withdrawal(mut self, amount: f64) -> Self {
        self.annual_withdrawal = amount;
        self
    }

    #[must_use]
    pub fn simulations(mut self, n: usize) -> Self {
        self.num_simulations = n;
        self
    }

    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[must_use]
    pub fn keep_paths(mut self) -> Self {
        self.keep_paths = true;
        self
    }

    /// Natural log of the largest value any Box–Muller path can reach.
    ///
    /// Every year grows by at most `exp(μ + BOX_MULLER_MAX_ABS·σ)`, and
    /// contributions are bounded by paying them all in up front.
    fn log_value_ceiling(&self) -> f64 {
        let years = f64::from(self.years);
        let worst_year = (self.expected_return + BOX_MULLER_MAX_ABS * self.volatility).max(0.0);
        let base = self.initial_value + years * self.annual_contribution;
        base.ln().max(0.0) + years * worst_year
    }

    /// Check every field before a run starts so no path can produce NaN or ∞.
    pub fn validate(&self, max_simulations: usize) -> Result<(), ValidationError> {
        if !(self.initial_value.is_finite() && self.initial_value > 0.0) {
            return Err(ValidationError::OutOfRange {
                field: "initial_value",
                value: self.initial_value,
                reason: "must be positive and finite",
            });
        }
        if !self.expected_return.is_finite() {
            return Err(ValidationError::OutOfRange {
                field: "expected_return",
                value: self.expected_return,
                reason: "must be finite",
            });
        }
        if !(self.volatility.is_finite() && self.volatility >= 0.0) {
            return Err(ValidationError::OutOfRange {
                field: "volatility",
                value: self.volatility,
                reason: "must be non-negative and finite",
            });
        }
        if self.years == 0 {
            return Err(ValidationError::OutOfRange {
                field: "years",
                value: 0.0,
                reason: "must be at least 1",
            });
        }
        for (field, value) in [
            ("annual_contribution", self.annual_contribution),
            ("annual_withdrawal", self.annual_withdrawal),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ValidationError::OutOfRange {
                    field,
                    value,
                    reason: "must be non-negative and finite",
                });
            }
        }
        let paid_in = self.initial_value + f64::from(self.years) * self.annual_contribution;
        if !paid_in.is_finite() {
            return Err(ValidationError::OutOfRange {
                field: "annual_contribution",
                value: self.annual_contribution,
                reason: "total contributions over the horizon must be finite",
            });
        }
        if self.log_value_ceiling() >= f64::MAX.ln() {
            return Err(ValidationError::OutOfRange {
                field: "expected_return",
                value: self.expected_return,
                reason: "projected values would overflow with this return, volatility and horizon",
            });
        }
        if self.num_simulations == 0 || self.num_simulations > max_simulations {
            return Err(ValidationError::OutOfRange {
                field: "num_simulations",
                value: self.num_simulations as f64,
                reason: "must be between 1 and the configured maximum",
            });
        }
        Ok(())
    }
}

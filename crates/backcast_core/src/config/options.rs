//! Per-request backtest options.

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::date_math::{month_ordinal, quarter};

/// How often holdings are traded back to their target weights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RebalanceFrequency {
    #[default]
    Monthly,
    Quarterly,
    Annually,
}

impl RebalanceFrequency {
    /// Identifier of the rebalance period a date falls in.
    ///
    /// Two dates belong to the same period exactly when their keys are equal.
    #[must_use]
    pub fn period_key(self, date: Date) -> i32 {
        match self {
            RebalanceFrequency::Monthly => month_ordinal(date),
            RebalanceFrequency::Quarterly => i32::from(date.year()) * 4 + i32::from(quarter(date)),
            RebalanceFrequency::Annually => i32::from(date.year()),
        }
    }

    /// Whether `date` starts a new period relative to the last rebalance date
    #[must_use]
    pub fn is_boundary(self, last_rebalance: Date, date: Date) -> bool {
        self.period_key(date) != self.period_key(last_rebalance)
    }
}

/// Resolution of the value path returned to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Daily,
    /// First observation of each month plus the final observation
    Monthly,
}

fn default_true() -> bool {
    true
}

/// Options accepted alongside a backtest request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BacktestOptions {
    #[serde(default)]
    pub rebalance_frequency: RebalanceFrequency,

    #[serde(default)]
    pub granularity: Granularity,

    #[serde(default = "default_true")]
    pub include_volatility_bands: bool,
}

impl Default for BacktestOptions {
    fn default() -> Self {
        Self {
            rebalance_frequency: RebalanceFrequency::default(),
            granularity: Granularity::default(),
            include_volatility_bands: default_true(),
        }
    }
}

impl BacktestOptions {
    #[must_use]
    pub fn rebalance(mut self, frequency: RebalanceFrequency) -> Self {
        self.rebalance_frequency = frequency;
        self
    }

    #[must_use]
    pub fn granularity(mut self, granularity: Granularity) -> Self {
        self.granularity = granularity;
        self
    }

    #[must_use]
    pub fn volatility_bands(mut self, include: bool) -> Self {
        self.include_volatility_bands = include;
        self
    }
}

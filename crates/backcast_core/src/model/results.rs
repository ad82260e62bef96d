//! Output types of backtest and Monte Carlo runs

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::config::{Granularity, RebalanceFrequency};
use crate::model::AllocationWeight;

/// Portfolio value observed on one trading day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValuePoint {
    pub date: Date,
    pub value: f64,
}

/// Calendar-year performance record
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnnualReturn {
    pub year: i16,
    /// `(end_value / start_value - 1) * 100`
    pub return_pct: f64,
    pub start_value: f64,
    pub end_value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearReturn {
    pub year: i16,
    pub return_pct: f64,
}

/// Summary statistics over annual returns, all in percent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortfolioStatistics {
    pub best_year: YearReturn,
    pub worst_year: YearReturn,
    pub average_return: f64,
    /// Population standard deviation of annual returns
    pub volatility: f64,
    pub positive_years: usize,
    pub negative_years: usize,
}

/// Deepest peak-to-trough decline of a value path
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrawdownEpisode {
    /// Decline from peak to trough as a positive percentage in [0, 100]
    pub max_drawdown_pct: f64,
    pub peak_date: Date,
    pub trough_date: Date,
    /// First date the path exceeds `peak_value` again; `None` while unrecovered
    pub recovery_date: Option<Date>,
    pub peak_value: f64,
    pub trough_value: f64,
}

/// Portfolio behavior over one historical stress window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrisisImpact {
    pub name: String,
    pub start: Date,
    pub end: Date,
    pub start_value: f64,
    pub end_value: f64,
    pub lowest_value: f64,
    pub lowest_date: Date,
    pub return_pct: f64,
    /// Deepest decline relative to `start_value`, as a positive percentage
    pub max_drawdown: f64,
    pub color: String,
}

/// ±1σ envelope around the value path at one date
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolatilityBand {
    pub date: Date,
    pub upper: f64,
    pub lower: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BacktestMetadata {
    /// Daily observations simulated, independent of output granularity
    pub data_points: usize,
    pub granularity: Granularity,
}

/// Complete result of a historical backtest. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub allocation: Vec<AllocationWeight>,
    pub initial_capital: f64,
    pub start_date: Date,
    pub end_date: Date,
    pub rebalance_frequency: RebalanceFrequency,

    pub final_value: f64,
    /// Percent gain over the whole window
    pub total_return: f64,
    /// Compound annual growth rate, in percent
    pub cagr: f64,

    pub portfolio_values: Vec<ValuePoint>,
    pub annual_returns: Vec<AnnualReturn>,
    pub statistics: PortfolioStatistics,
    pub max_drawdown: DrawdownEpisode,
    pub crisis_impact: Vec<CrisisImpact>,
    pub volatility_bands: Option<Vec<VolatilityBand>>,
    pub metadata: BacktestMetadata,
}

/// One simulated trajectory: `years + 1` values, the first being the initial value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationPath {
    pub values: Vec<f64>,
}

impl SimulationPath {
    pub fn final_value(&self) -> f64 {
        self.values.last().copied().unwrap_or(0.0)
    }
}

/// Reduced outcome of a Monte Carlo run. Never cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloResult {
    /// Percentage of paths whose final value exceeds the initial value
    pub success_rate: f64,
    pub median_final_value: f64,
    pub percentile_5: f64,
    pub percentile_95: f64,
    pub execution_time_ms: f64,
    pub num_simulations: usize,
    pub years: u32,
    /// Every simulated path, only when the request asked to keep them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paths: Option<Vec<SimulationPath>>,
}

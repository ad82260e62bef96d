//! Command-line interface definition

use std::path::PathBuf;

use backcast_core::{
    BacktestOptions, BacktestRequest, CoarseAllocation, Granularity, MonteCarloParams,
    RebalanceFrequency,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use jiff::civil::Date;

#[derive(Parser, Debug)]
#[command(name = "backcast")]
#[command(about = "Historical backtests and Monte Carlo projections for portfolio allocations")]
pub struct Cli {
    /// Settings file (default: ~/.backcast/config.yaml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory of <TICKER>.csv price files (default: from settings, then ~/.backcast/data)
    #[arg(short, long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Write daily log files under <DIR> instead of stderr
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replay an allocation over historical prices
    Backtest(BacktestArgs),
    /// Backtest several allocations from a request file, side by side
    Compare(CompareArgs),
    /// Project a portfolio forward under geometric Brownian motion
    MonteCarlo(MonteCarloArgs),
    /// Probability of ending at or above a target value
    SuccessProbability(SuccessArgs),
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebalanceArg {
    Monthly,
    Quarterly,
    Annually,
}

impl From<RebalanceArg> for RebalanceFrequency {
    fn from(arg: RebalanceArg) -> Self {
        match arg {
            RebalanceArg::Monthly => RebalanceFrequency::Monthly,
            RebalanceArg::Quarterly => RebalanceFrequency::Quarterly,
            RebalanceArg::Annually => RebalanceFrequency::Annually,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GranularityArg {
    Daily,
    Monthly,
}

impl From<GranularityArg> for Granularity {
    fn from(arg: GranularityArg) -> Self {
        match arg {
            GranularityArg::Daily => Granularity::Daily,
            GranularityArg::Monthly => Granularity::Monthly,
        }
    }
}

#[derive(Args, Debug)]
pub struct OutputArgs {
    /// Print a short human-readable summary instead of JSON
    #[arg(long)]
    pub summary: bool,
}

#[derive(Args, Debug)]
pub struct BacktestArgs {
    /// YAML or JSON request file; inline flags below are ignored when given
    #[arg(short, long)]
    pub request: Option<PathBuf>,

    /// Stock bucket percentage
    #[arg(long, default_value_t = 60)]
    pub stocks: u32,
    /// Bond bucket percentage
    #[arg(long, default_value_t = 40)]
    pub bonds: u32,
    /// Alternatives bucket percentage
    #[arg(long, default_value_t = 0)]
    pub alternatives: u32,
    /// Cash bucket percentage
    #[arg(long, default_value_t = 0)]
    pub cash: u32,

    #[arg(long)]
    pub capital: Option<f64>,
    #[arg(long)]
    pub start: Option<Date>,
    #[arg(long)]
    pub end: Option<Date>,

    #[arg(long, value_enum, default_value_t = RebalanceArg::Monthly)]
    pub rebalance: RebalanceArg,
    #[arg(long, value_enum, default_value_t = GranularityArg::Daily)]
    pub granularity: GranularityArg,

    /// Leave volatility bands out of the result
    #[arg(long)]
    pub no_bands: bool,

    #[command(flatten)]
    pub output: OutputArgs,
}

impl BacktestArgs {
    /// Request built from the inline flags
    pub fn inline_request(&self) -> BacktestRequest {
        let options = BacktestOptions::default()
            .rebalance(self.rebalance.into())
            .granularity(self.granularity.into())
            .volatility_bands(!self.no_bands);
        BacktestRequest {
            allocation: CoarseAllocation::new(self.stocks, self.bonds, self.alternatives, self.cash)
                .into(),
            initial_capital: self.capital,
            start_date: self.start,
            end_date: self.end,
            options,
        }
    }
}

#[derive(Args, Debug)]
pub struct CompareArgs {
    /// YAML or JSON file holding a list of backtest requests
    #[arg(short, long)]
    pub request: PathBuf,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug, Clone)]
pub struct ProjectionArgs {
    /// YAML or JSON parameter file; inline flags below are ignored when given
    #[arg(short, long)]
    pub request: Option<PathBuf>,

    #[arg(long, default_value_t = 1_000_000.0)]
    pub initial_value: f64,
    /// Annual expected return as a fraction
    #[arg(long, default_value_t = 0.07)]
    pub expected_return: f64,
    /// Annual volatility as a fraction
    #[arg(long, default_value_t = 0.15)]
    pub volatility: f64,
    #[arg(long, default_value_t = 30)]
    pub years: u32,
    #[arg(long, default_value_t = 0.0)]
    pub contribution: f64,
    #[arg(long, default_value_t = 0.0)]
    pub withdrawal: f64,
    #[arg(long, default_value_t = 10_000)]
    pub simulations: usize,
    /// Fixed seed for reproducible output
    #[arg(long)]
    pub seed: Option<u64>,
}

impl ProjectionArgs {
    pub fn inline_params(&self) -> MonteCarloParams {
        let mut params = MonteCarloParams::new(
            self.initial_value,
            self.expected_return,
            self.volatility,
            self.years,
        )
        .contribution(self.contribution)
        .withdrawal(self.withdrawal)
        .simulations(self.simulations);
        params.seed = self.seed;
        params
    }
}

#[derive(Args, Debug)]
pub struct MonteCarloArgs {
    #[command(flatten)]
    pub projection: ProjectionArgs,

    /// Include every simulated path in the JSON output
    #[arg(long)]
    pub keep_paths: bool,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug)]
pub struct SuccessArgs {
    #[command(flatten)]
    pub projection: ProjectionArgs,

    /// Final value a path must reach to count as a success
    #[arg(long)]
    pub target: f64,
}

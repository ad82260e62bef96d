mod allocation;
mod crisis;
mod prices;
mod requests;
mod results;

pub use allocation::{
    AllocationInput, AllocationWeight, CoarseAllocation, ResolvedAllocation, TickerWeight,
};
pub use crisis::{CRISIS_WINDOWS, CrisisWindow};
pub use prices::{PricePoint, PriceSeries};
pub use requests::{BacktestRequest, MonteCarloParams};
pub use results::{
    AnnualReturn, BacktestMetadata, BacktestResult, CrisisImpact, DrawdownEpisode,
    MonteCarloResult, PortfolioStatistics, SimulationPath, ValuePoint, VolatilityBand,
    YearReturn,
};

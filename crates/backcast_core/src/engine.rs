//! Engine facade
//!
//! [`Engine`] is the only entry point callers need. It owns the injected
//! collaborators (market data and result cache) plus the configuration, applies
//! request defaults and validation at the boundary, and dispatches to the
//! backtest simulator and the Monte Carlo engine.

use std::sync::Arc;
use std::time::Duration;

use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use tracing::{debug, info, warn};

use crate::allocation::resolve;
use crate::backtest::{BacktestPlan, run_backtest};
use crate::cache::{BacktestCache, ResultCache, backtest_key};
use crate::cancel::CancellationToken;
use crate::config::EngineConfig;
use crate::error::{EngineError, Result, ValidationError};
use crate::market_data::{MarketDataProvider, load_aligned};
use crate::model::{BacktestRequest, BacktestResult, MonteCarloParams, MonteCarloResult};
use crate::monte_carlo::MonteCarloEngine;
use crate::sampler::{SamplerSource, SeededSource};

pub struct Engine {
    market_data: Arc<dyn MarketDataProvider>,
    cache: BacktestCache,
    monte_carlo: MonteCarloEngine,
    config: EngineConfig,
}

impl Engine {
    /// Build an engine over the given collaborators. Fails if `config` is invalid.
    pub fn new(
        market_data: Arc<dyn MarketDataProvider>,
        cache: Arc<dyn ResultCache>,
        config: EngineConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            market_data,
            cache: BacktestCache::new(
                cache,
                Duration::from_secs(config.cache_ttl_secs),
                config.cache_enabled,
            ),
            monte_carlo: MonteCarloEngine::new(&config),
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Apply defaults to a request and validate it, without touching market data.
    pub fn plan(&self, request: &BacktestRequest) -> Result<BacktestPlan> {
        let initial_capital = request
            .initial_capital
            .unwrap_or(self.config.default_initial_capital);
        if !(initial_capital.is_finite() && initial_capital > 0.0) {
            return Err(ValidationError::OutOfRange {
                field: "initial_capital",
                value: initial_capital,
                reason: "must be positive and finite",
            }
            .into());
        }

        let start_date = request.start_date.unwrap_or(self.config.default_start_date);
        let end_date = request
            .end_date
            .unwrap_or_else(|| jiff::Zoned::now().date());
        if end_date < start_date {
            return Err(ValidationError::InvalidDateRange {
                start: start_date,
                end: end_date,
            }
            .into());
        }

        Ok(BacktestPlan {
            allocation: resolve(&request.allocation)?,
            initial_capital,
            start_date,
            end_date,
            options: request.options,
        })
    }

    /// Replay an allocation over historical prices.
    ///
    /// Identical resolved requests are served from the cache while the entry
    /// lives; a cache failure only costs a recomputation.
    pub fn run_backtest(
        &self,
        request: &BacktestRequest,
        cancel: &CancellationToken,
    ) -> Result<BacktestResult> {
        let plan = self.plan(request)?;

        let key = match backtest_key(&plan) {
            Ok(key) => Some(key),
            Err(err) => {
                warn!(error = %err, "could not derive cache key");
                None
            }
        };
        if let Some(hit) = key.as_deref().and_then(|k| self.cache.lookup(k)) {
            return Ok(hit);
        }

        let prices = load_aligned(
            self.market_data.as_ref(),
            &plan.allocation,
            plan.start_date,
            plan.end_date,
            cancel,
        )
        .inspect_err(|err| {
            if matches!(err, EngineError::Cancelled) {
                debug!("backtest cancelled while loading prices");
            }
        })?;

        let result = run_backtest(
            &prices,
            &plan,
            self.config.cancellation_check_interval,
            cancel,
        )?;

        info!(
            tickers = prices.tickers.len(),
            data_points = result.metadata.data_points,
            final_value = result.final_value,
            cagr = result.cagr,
            "backtest finished"
        );

        if let Some(key) = key.as_deref() {
            self.cache.store(key, &result);
        }
        Ok(result)
    }

    /// Run several backtests side by side. Results come back in request order;
    /// the first failure fails the comparison.
    pub fn compare_allocations(
        &self,
        requests: &[BacktestRequest],
        cancel: &CancellationToken,
    ) -> Result<Vec<BacktestResult>> {
        requests
            .par_iter()
            .map(|request| self.run_backtest(request, cancel))
            .collect()
    }

    /// Monte Carlo projection seeded from `params.seed`, or freshly when unset
    pub fn run_monte_carlo(
        &self,
        params: &MonteCarloParams,
        cancel: &CancellationToken,
    ) -> Result<MonteCarloResult> {
        self.run_monte_carlo_with(params, &Self::source_for(params), cancel)
    }

    /// Monte Carlo projection drawing from a caller-supplied sampler source
    pub fn run_monte_carlo_with<S: SamplerSource>(
        &self,
        params: &MonteCarloParams,
        source: &S,
        cancel: &CancellationToken,
    ) -> Result<MonteCarloResult> {
        let result = self.monte_carlo.simulate(params, source, cancel)?;
        info!(
            num_simulations = result.num_simulations,
            success_rate = result.success_rate,
            execution_time_ms = result.execution_time_ms,
            "monte carlo finished"
        );
        Ok(result)
    }

    /// Percentage of simulated paths ending at or above `target_value`
    pub fn calculate_success_probability(
        &self,
        params: &MonteCarloParams,
        target_value: f64,
        cancel: &CancellationToken,
    ) -> Result<f64> {
        self.calculate_success_probability_with(
            params,
            target_value,
            &Self::source_for(params),
            cancel,
        )
    }

    pub fn calculate_success_probability_with<S: SamplerSource>(
        &self,
        params: &MonteCarloParams,
        target_value: f64,
        source: &S,
        cancel: &CancellationToken,
    ) -> Result<f64> {
        self.monte_carlo
            .success_probability(params, target_value, source, cancel)
    }

    fn source_for(params: &MonteCarloParams) -> SeededSource {
        params
            .seed
            .map_or_else(SeededSource::from_entropy, SeededSource::new)
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("cache", &self.cache)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

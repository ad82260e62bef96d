//! Forward Monte Carlo projection under geometric Brownian motion
//!
//! Each year of a path draws `Z ~ N(0, 1)` and applies
//! `r = exp((μ − σ²/2) + σZ) − 1`, then adds the contribution, subtracts the
//! withdrawal and floors the value at zero.
//!
//! Paths are simulated in fixed-size batches on the rayon pool. Every batch
//! gets its own sampler from the [`SamplerSource`], keyed by batch index, so a
//! seeded run gives the same answer on any number of threads.

use std::time::Instant;

use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::debug;

use crate::cancel::CancellationToken;
use crate::config::EngineConfig;
use crate::error::{EngineError, ValidationError};
use crate::model::{MonteCarloParams, MonteCarloResult, SimulationPath};
use crate::sampler::{NormalSampler, SamplerSource};

/// Advance one path year by year, reporting each new value, and return the
/// final value.
///
/// Validated parameters keep Box–Muller paths finite; a sampler drawing beyond
/// that range fails the path instead of emitting ∞.
fn step_path<S: NormalSampler + ?Sized>(
    params: &MonteCarloParams,
    sampler: &mut S,
    mut on_value: impl FnMut(f64),
) -> Result<f64, EngineError> {
    let drift = params.expected_return - params.volatility.powi(2) / 2.0;
    let mut value = params.initial_value;
    for year in 1..=params.years {
        let z = sampler.next_standard_normal();
        let annual_return = (drift + params.volatility * z).exp() - 1.0;
        value = value * (1.0 + annual_return) + params.annual_contribution
            - params.annual_withdrawal;
        if !value.is_finite() {
            return Err(EngineError::NonFiniteValue { year });
        }
        value = value.max(0.0);
        on_value(value);
    }
    Ok(value)
}

/// One path of `years + 1` values starting at `initial_value`
pub fn simulate_path<S: NormalSampler + ?Sized>(
    params: &MonteCarloParams,
    sampler: &mut S,
) -> Result<SimulationPath, EngineError> {
    let mut values = Vec::with_capacity(params.years as usize + 1);
    values.push(params.initial_value);
    step_path(params, sampler, |v| values.push(v))?;
    Ok(SimulationPath { values })
}

/// Value at index `floor(n · p)` of an ascending slice, clamped to the last element
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = ((sorted.len() as f64 * p).floor() as usize).min(sorted.len() - 1);
    sorted[idx]
}

/// Share of `values` satisfying `pred`, as a percentage
fn percent_where(values: &[f64], pred: impl Fn(f64) -> bool) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().filter(|&&v| pred(v)).count() as f64 / values.len() as f64 * 100.0
}

/// Outcome of simulating every path of a run, in batch order
struct Simulated {
    finals: Vec<f64>,
    paths: Option<Vec<SimulationPath>>,
}

/// Parallel path simulator
#[derive(Debug, Clone, Copy)]
pub struct MonteCarloEngine {
    batch_size: usize,
    max_simulations: usize,
}

impl MonteCarloEngine {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            batch_size: config.monte_carlo_batch_size.max(1),
            max_simulations: config.max_simulations,
        }
    }

    /// Run the projection and reduce it to percentiles and a success rate.
    ///
    /// A path succeeds when its final value is strictly above the initial value.
    pub fn simulate<S: SamplerSource>(
        &self,
        params: &MonteCarloParams,
        source: &S,
        cancel: &CancellationToken,
    ) -> Result<MonteCarloResult, EngineError> {
        params.validate(self.max_simulations)?;
        let started = Instant::now();

        let Simulated { mut finals, paths } =
            self.run_paths(params, source, params.keep_paths, cancel)?;
        let success_rate = percent_where(&finals, |v| v > params.initial_value);
        finals.sort_by(f64::total_cmp);

        let execution_time_ms = started.elapsed().as_secs_f64() * 1000.0;
        debug!(
            num_simulations = params.num_simulations,
            years = params.years,
            execution_time_ms,
            "monte carlo complete"
        );

        Ok(MonteCarloResult {
            success_rate,
            median_final_value: percentile(&finals, 0.5),
            percentile_5: percentile(&finals, 0.05),
            percentile_95: percentile(&finals, 0.95),
            execution_time_ms,
            num_simulations: params.num_simulations,
            years: params.years,
            paths,
        })
    }

    /// Percentage of paths whose final value reaches `target_value`
    pub fn success_probability<S: SamplerSource>(
        &self,
        params: &MonteCarloParams,
        target_value: f64,
        source: &S,
        cancel: &CancellationToken,
    ) -> Result<f64, EngineError> {
        params.validate(self.max_simulations)?;
        if !target_value.is_finite() {
            return Err(ValidationError::OutOfRange {
                field: "target_value",
                value: target_value,
                reason: "must be finite",
            }
            .into());
        }

        let Simulated { finals, .. } = self.run_paths(params, source, false, cancel)?;
        Ok(percent_where(&finals, |v| v >= target_value))
    }

    fn run_paths<S: SamplerSource>(
        &self,
        params: &MonteCarloParams,
        source: &S,
        keep_paths: bool,
        cancel: &CancellationToken,
    ) -> Result<Simulated, EngineError> {
        let n = params.num_simulations;
        let batch_size = self.batch_size;
        let num_batches = n.div_ceil(batch_size);

        let batches = (0..num_batches)
            .into_par_iter()
            .map(|i| -> Result<_, EngineError> {
                cancel.check()?;
                let mut sampler = source.sampler_for(i as u64);
                let size = if i == num_batches - 1 {
                    n - i * batch_size
                } else {
                    batch_size
                };

                let mut finals = Vec::with_capacity(size);
                let mut paths = keep_paths.then(|| Vec::with_capacity(size));
                for _ in 0..size {
                    match paths.as_mut() {
                        Some(paths) => {
                            let path = simulate_path(params, &mut sampler)?;
                            finals.push(path.final_value());
                            paths.push(path);
                        }
                        None => finals.push(step_path(params, &mut sampler, |_| {})?),
                    }
                }
                Ok((finals, paths))
            })
            .collect::<Result<Vec<_>, EngineError>>();

        let batches = match batches {
            Ok(batches) => batches,
            Err(err) => {
                debug!(error = %err, "monte carlo run aborted");
                return Err(err);
            }
        };

        let mut finals = Vec::with_capacity(n);
        let mut paths = keep_paths.then(|| Vec::with_capacity(n));
        for (batch_finals, batch_paths) in batches {
            finals.extend(batch_finals);
            if let (Some(all), Some(batch)) = (paths.as_mut(), batch_paths) {
                all.extend(batch);
            }
        }
        Ok(Simulated { finals, paths })
    }
}

//! Command execution
//!
//! Each command returns the text to print on stdout so it can be tested without
//! capturing the process output.

use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

use backcast_core::{
    BacktestRequest, BacktestResult, CancellationToken, Engine, InMemoryCache, MonteCarloParams,
    MonteCarloResult, NoopCache, ResultCache,
};
use color_eyre::eyre::{WrapErr, eyre};
use serde::de::DeserializeOwned;
use tracing::info;

use crate::cli::{BacktestArgs, Command, CompareArgs, MonteCarloArgs, ProjectionArgs, SuccessArgs};
use crate::csv_provider::CsvMarketData;
use crate::settings::Settings;

/// Build an engine over CSV price files in `data_dir`
pub fn build_engine(settings: &Settings, data_dir: &Path) -> color_eyre::Result<Engine> {
    let cache: Arc<dyn ResultCache> = if settings.engine.cache_enabled {
        Arc::new(InMemoryCache::new())
    } else {
        Arc::new(NoopCache)
    };
    info!(data_dir = %data_dir.display(), "using CSV market data");
    Ok(Engine::new(
        Arc::new(CsvMarketData::new(data_dir)),
        cache,
        settings.engine.clone(),
    )?)
}

/// Parse a YAML (or JSON) request file
pub fn load_request<T: DeserializeOwned>(path: &Path) -> color_eyre::Result<T> {
    let content = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read request file {}", path.display()))?;
    serde_saphyr::from_str(&content)
        .map_err(|e| eyre!("{e}"))
        .wrap_err_with(|| format!("invalid request file {}", path.display()))
}

pub fn run(engine: &Engine, command: &Command) -> color_eyre::Result<String> {
    let cancel = CancellationToken::new();
    match command {
        Command::Backtest(args) => backtest(engine, args, &cancel),
        Command::Compare(args) => compare(engine, args, &cancel),
        Command::MonteCarlo(args) => monte_carlo(engine, args, &cancel),
        Command::SuccessProbability(args) => success_probability(engine, args, &cancel),
    }
}

fn backtest(
    engine: &Engine,
    args: &BacktestArgs,
    cancel: &CancellationToken,
) -> color_eyre::Result<String> {
    let request: BacktestRequest = match &args.request {
        Some(path) => load_request(path)?,
        None => args.inline_request(),
    };
    let result = engine.run_backtest(&request, cancel)?;
    if args.output.summary {
        Ok(backtest_summary(&result))
    } else {
        Ok(serde_json::to_string_pretty(&result)?)
    }
}

fn compare(
    engine: &Engine,
    args: &CompareArgs,
    cancel: &CancellationToken,
) -> color_eyre::Result<String> {
    let requests: Vec<BacktestRequest> = load_request(&args.request)?;
    let results = engine.compare_allocations(&requests, cancel)?;
    if args.output.summary {
        Ok(results
            .iter()
            .map(backtest_summary)
            .collect::<Vec<_>>()
            .join("\n"))
    } else {
        Ok(serde_json::to_string_pretty(&results)?)
    }
}

fn projection_params(args: &ProjectionArgs) -> color_eyre::Result<MonteCarloParams> {
    match &args.request {
        Some(path) => load_request(path),
        None => Ok(args.inline_params()),
    }
}

fn monte_carlo(
    engine: &Engine,
    args: &MonteCarloArgs,
    cancel: &CancellationToken,
) -> color_eyre::Result<String> {
    let mut params = projection_params(&args.projection)?;
    params.keep_paths |= args.keep_paths;
    let result = engine.run_monte_carlo(&params, cancel)?;
    if args.output.summary {
        Ok(monte_carlo_summary(&result))
    } else {
        Ok(serde_json::to_string_pretty(&result)?)
    }
}

fn success_probability(
    engine: &Engine,
    args: &SuccessArgs,
    cancel: &CancellationToken,
) -> color_eyre::Result<String> {
    let params = projection_params(&args.projection)?;
    let probability = engine.calculate_success_probability(&params, args.target, cancel)?;
    Ok(format!(
        "{probability:.2}% of {} paths end at or above {:.2}",
        params.num_simulations, args.target
    ))
}

pub fn backtest_summary(result: &BacktestResult) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Backtest {} to {} ({:?} rebalance)",
        result.start_date, result.end_date, result.rebalance_frequency
    );
    let _ = writeln!(
        out,
        "  {:>14.2} -> {:>14.2}   total {:+.2}%   CAGR {:+.2}%",
        result.initial_capital, result.final_value, result.total_return, result.cagr
    );
    let stats = &result.statistics;
    let _ = writeln!(
        out,
        "  best {} {:+.2}%   worst {} {:+.2}%   volatility {:.2}%",
        stats.best_year.year,
        stats.best_year.return_pct,
        stats.worst_year.year,
        stats.worst_year.return_pct,
        stats.volatility
    );
    let dd = &result.max_drawdown;
    let recovery = dd
        .recovery_date
        .map_or_else(|| "not recovered".to_string(), |d| format!("recovered {d}"));
    let _ = writeln!(
        out,
        "  max drawdown {:.2}% ({} to {}, {recovery})",
        dd.max_drawdown_pct, dd.peak_date, dd.trough_date
    );
    for crisis in &result.crisis_impact {
        let _ = writeln!(
            out,
            "  {:<24} {:+.2}%   drawdown {:.2}%",
            crisis.name, crisis.return_pct, crisis.max_drawdown
        );
    }
    out
}

pub fn monte_carlo_summary(result: &MonteCarloResult) -> String {
    format!(
        "{} paths over {} years in {:.1} ms\n  success {:.2}%   p5 {:.2}   median {:.2}   p95 {:.2}\n",
        result.num_simulations,
        result.years,
        result.execution_time_ms,
        result.success_rate,
        result.percentile_5,
        result.median_final_value,
        result.percentile_95
    )
}

//! Backtest command implementation.

use super::{fmt_opt, fmt_pct};
use crate::{data, signals};
use anyhow::{Result, bail};
use std::path::Path;
use tracing::info;
use vnflow_eval::{Backtest, BacktestConfig, BacktestResult, forward_return};
use vnflow_research::composite_score;
use vnflow_traits::{AnalysisConfig, Field};

/// Run the quintile long-short backtest on the composite score, or on a
/// single named signal.
pub(crate) fn run_backtest(
    path: &Path,
    signal: Option<&str>,
    horizon: usize,
    format: &str,
    config: &AnalysisConfig,
) -> Result<()> {
    check_horizon(horizon)?;
    let panel = data::load_panel(path)?;
    let close = panel.require(Field::Close)?;

    let (name, score) = match signal {
        Some(name) => {
            let signal = signals::create_signal(name, config)?;
            (signal.output().name().to_string(), signal.compute(&panel)?)
        }
        None => ("composite_score".to_string(), composite_score(&panel, config)?.1),
    };

    let forward = forward_return(close, horizon);
    let result = Backtest::new(BacktestConfig::from_analysis(config, horizon)).run_with_returns(&score, &forward);
    info!(
        ticker = panel.ticker().unwrap_or("-"),
        signal = %name,
        sample = result.sample_size,
        "backtest complete"
    );

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    super::header("Backtesting");
    println!("Ticker:   {}", panel.ticker().unwrap_or("-"));
    println!("Signal:   {name}");
    println!("Horizon:  {horizon} sessions");
    println!();
    print_result(&result);

    Ok(())
}

/// A holding period of zero sessions has no forward return.
fn check_horizon(horizon: usize) -> Result<()> {
    if horizon == 0 {
        bail!("horizon must be at least 1 session");
    }
    Ok(())
}

fn print_result(result: &BacktestResult) {
    println!("{:<8} {:>8} {:>10} {:>10} {:>10}", "Quintile", "Count", "Mean", "Median", "Std");
    println!("{}", "-".repeat(50));
    for q in &result.quintile_returns {
        println!(
            "{:<8} {:>8} {:>10} {:>10} {:>10}",
            q.label,
            q.count,
            fmt_pct(q.mean),
            fmt_pct(q.median),
            fmt_pct(q.std)
        );
    }
    println!();
    println!("Sample:        {} sessions ({:?} binning)", result.sample_size, result.binning);
    println!("Spread Q5-Q1:  {}", fmt_pct(result.spread_mean));
    println!("Spread std:    {}", fmt_pct(result.spread_std));
    println!(
        "Sharpe:        {} (annualized over {} periods)",
        fmt_opt(result.sharpe_ratio, 2),
        result.periods_per_year
    );
    println!(
        "t-test:        t = {}, p = {}{}",
        fmt_opt(result.spread_test.test.t_statistic, 3),
        fmt_opt(result.spread_test.test.p_value, 4),
        if result.spread_test.test.significant { " (significant)" } else { "" }
    );
    println!(
        "Monotonic:     {} (rank corr {})",
        result.monotonicity.is_monotonic,
        fmt_opt(result.monotonicity.correlation, 3)
    );
    println!();
}

//! Research command implementation.

use super::{fmt_opt, fmt_pct};
use crate::data;
use anyhow::{Context, Result, bail};
use std::path::PathBuf;
use tracing::warn;
use vnflow_research::{
    CompositeReport, ConflictReport, LeadLagReport, Question, SelfTradingReport, TickerReport, ValuationReport,
    rank_by_composite, run_universe,
};
use vnflow_traits::{AnalysisConfig, Outcome};

/// Resolves question names; an empty list means every question.
pub(crate) fn parse_questions(names: &[String]) -> Result<Vec<Question>> {
    if names.is_empty() {
        return Ok(Question::ALL.to_vec());
    }
    names
        .iter()
        .map(|name| match Question::from_name(name.trim()) {
            Some(q) => Ok(q),
            None => {
                let known: Vec<&str> = Question::ALL.iter().map(|q| q.name()).collect();
                bail!("Unknown question: '{name}'. Expected one of: {}", known.join(", "))
            }
        })
        .collect()
}

/// Answer the requested questions for every panel.
pub(crate) fn run_research(
    paths: &[PathBuf],
    questions: &[Question],
    format: &str,
    start: Option<&str>,
    end: Option<&str>,
    config: &AnalysisConfig,
) -> Result<()> {
    let mut panels = Vec::with_capacity(paths.len());
    for path in paths {
        let panel = data::load_panel(path).with_context(|| format!("loading panel {}", path.display()))?;
        panels.push(data::clip(panel, start, end)?);
    }

    let results = run_universe(&panels, config, questions)?;

    if format == "json" {
        let values = results
            .iter()
            .zip(paths)
            .map(|(result, path)| match result {
                Ok(report) => serde_json::to_value(report),
                Err(e) => Ok(serde_json::json!({ "file": path.display().to_string(), "error": e.to_string() })),
            })
            .collect::<serde_json::Result<Vec<_>>>()?;
        println!("{}", serde_json::to_string_pretty(&values)?);
        return Ok(());
    }

    super::header("Research Report");
    println!("Questions: {}", questions.iter().map(|q| q.name()).collect::<Vec<_>>().join(", "));
    println!("Panels:    {}", panels.len());

    for (result, path) in results.iter().zip(paths) {
        match result {
            Ok(report) => print_report(report),
            Err(e) => warn!(file = %path.display(), error = %e, "ticker failed"),
        }
    }

    let ranking = rank_by_composite(&results);
    if ranking.len() > 1 {
        println!("\nComposite ranking (latest score):");
        for entry in &ranking {
            println!("  {:>3}. {:8} {:>8.3}", entry.rank, entry.ticker, entry.value);
        }
    }
    println!();

    Ok(())
}

fn print_report(report: &TickerReport) {
    println!("\n{}", "=".repeat(64));
    print!("{}", report.ticker);
    if let (Some(first), Some(last)) = (report.summary.start, report.summary.end) {
        print!("  {first} to {last}");
    }
    println!("  ({} sessions)", report.summary.rows);
    println!("{}", "=".repeat(64));

    section("Lead-lag", &report.lead_lag, print_lead_lag);
    section("Self-trading", &report.self_trading, print_self_trading);
    section("Conflicts", &report.conflicts, print_conflicts);
    section("Valuation", &report.valuation, print_valuation);
    section("Composite", &report.composite, print_composite);
}

fn section<T>(title: &str, outcome: &Outcome<T>, print: fn(&T)) {
    println!("\n{title}:");
    match outcome {
        Outcome::Computed(value) => print(value),
        Outcome::Skipped { reason } => println!("  skipped: {reason}"),
    }
}

fn print_lead_lag(report: &LeadLagReport) {
    println!("  {:>8} {:>10} {:>10} {:>10} {:>8}", "horizon", "Q5-Q1", "p", "IC", "IC p");
    for h in &report.horizons {
        println!(
            "  {:>8} {:>10} {:>10} {:>10} {:>8}",
            h.horizon,
            fmt_pct(h.quintiles.spread.spread),
            fmt_opt(h.quintiles.spread.test.p_value, 4),
            fmt_opt(h.ic.ic, 4),
            fmt_opt(h.ic.p_value, 4),
        );
    }
    println!(
        "  Best ADV window: {} sessions (horizon {})",
        report.window_search.best_window, report.window_search.horizon
    );
    if let Some(regimes) = report.regimes.computed() {
        for regime in [&regimes.bull, &regimes.bear] {
            match regime {
                Outcome::Computed(r) => println!(
                    "  {:5} {:>5} rows  Q5-Q1 {}  IC {}",
                    r.regime.to_string(),
                    r.rows,
                    fmt_pct(r.quintiles.spread.spread),
                    fmt_opt(r.ic.ic, 4)
                ),
                Outcome::Skipped { reason } => println!("  regime skipped: {reason}"),
            }
        }
    }
    match report.decay.half_life {
        Some(h) => println!("  IC half-life: {h:.1} sessions"),
        None => println!("  IC half-life: not reached"),
    }
    let significant = report.significant_horizons();
    if significant.is_empty() {
        println!("  No significant horizon");
    } else {
        println!("  Significant at horizons: {significant:?}");
    }
}

fn print_self_trading(report: &SelfTradingReport) {
    let a = &report.availability;
    println!(
        "  Coverage: {}/{} sessions ({:.1}%)",
        a.data_points,
        a.total_points,
        a.coverage * 100.0
    );
    for c in &report.comparisons {
        let adv = c.adv.computed().and_then(|t| t.ic.ic);
        let gtgd = c.gtgd.computed().and_then(|t| t.ic.ic);
        println!(
            "  horizon {:>3}: IC ADV {:>8}  IC GTGD {:>8}",
            c.horizon,
            fmt_opt(adv, 4),
            fmt_opt(gtgd, 4)
        );
    }
    match report.best_method {
        Some(method) => println!("  Best normalization: {method}"),
        None => println!("  Best normalization: undetermined"),
    }
}

fn print_conflicts(report: &ConflictReport) {
    println!(
        "  {} classified sessions, {:.1}% in conflict",
        report.classified_days,
        report.conflict_share * 100.0
    );
    for s in &report.states {
        let returns: Vec<String> = s
            .forward
            .iter()
            .map(|h| format!("{}d {}", h.horizon, fmt_pct(h.stats.mean)))
            .collect();
        println!(
            "  {:24} {:>5} ({:>5.1}%)  {}",
            s.state.label(),
            s.days,
            s.share * 100.0,
            returns.join("  ")
        );
    }
    println!("  Leader: {:?}", report.leadership.leader);
    if let Some(regimes) = report.regimes.computed() {
        for regime in [&regimes.bull, &regimes.bear] {
            match regime {
                Outcome::Computed(r) => {
                    let means: Vec<String> = r.states.iter().map(|s| fmt_pct(s.mean)).collect();
                    println!(
                        "  {:5} {:>5} rows  {}d mean by state: {}",
                        r.regime.to_string(),
                        r.rows,
                        r.horizon,
                        means.join("  ")
                    );
                }
                Outcome::Skipped { reason } => println!("  regime skipped: {reason}"),
            }
        }
    }
}

fn print_valuation(report: &ValuationReport) {
    for f in &report.fields {
        match &f.current {
            Some(current) => println!(
                "  {:5} {:>8.2} on {}  percentile {:>6}  {}",
                f.field.name(),
                current.value,
                current.date,
                fmt_opt(current.percentile, 1),
                current.zone
            ),
            None => println!("  {:5} no observations", f.field.name()),
        }
        if let Some(d) = f.deciles.computed() {
            println!(
                "        cheap {}  expensive {}  spread {}  monotonic {}",
                fmt_pct(d.cheap_return),
                fmt_pct(d.expensive_return),
                fmt_pct(d.cheap_expensive_spread),
                d.monotonicity.is_monotonic
            );
        }
        if let Some(p) = &f.prediction {
            println!(
                "        expected {}d return {} [{}, {}] from decile {} (n={})",
                vnflow_research::valuation::DECILE_HORIZON,
                fmt_pct(Some(p.expected_return)),
                fmt_pct(Some(p.lower)),
                fmt_pct(Some(p.upper)),
                p.decile,
                p.sample_size
            );
        }
    }
}

fn print_composite(report: &CompositeReport) {
    let inputs: Vec<&str> = report.inputs.iter().map(|f| f.name()).collect();
    println!("  Inputs: {}", inputs.join(", "));
    println!("  Latest score: {}", fmt_opt(report.latest_score, 3));
    let bt = &report.backtest;
    println!(
        "  Q5-Q1 {}  Sharpe {}  p {}",
        fmt_pct(bt.spread_mean),
        fmt_opt(bt.sharpe_ratio, 2),
        fmt_opt(bt.spread_test.test.p_value, 4)
    );
    match &report.capm {
        Outcome::Computed(c) => println!(
            "  CAPM alpha {} annual, beta {:.2} (n={})",
            fmt_pct(Some(c.alpha_annual)),
            c.beta,
            c.sample_size
        ),
        Outcome::Skipped { reason } => println!("  CAPM skipped: {reason}"),
    }
}

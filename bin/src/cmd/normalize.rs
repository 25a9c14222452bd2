//! Normalize command implementation.

use crate::data;
use anyhow::Result;
use std::path::Path;
use tracing::info;
use vnflow_combine::CompositeScorer;
use vnflow_signals::{SignalFrame, normalize_all};
use vnflow_traits::AnalysisConfig;

/// Compute every signal for a panel and print the trailing sessions.
pub(crate) fn normalize_panel(
    path: &Path,
    start: Option<&str>,
    end: Option<&str>,
    tail: usize,
    config: &AnalysisConfig,
) -> Result<()> {
    super::header("Signal Normalization");

    let panel = data::clip(data::load_panel(path)?, start, end)?;
    let summary = panel.summary();
    println!("Ticker:   {}", panel.ticker().unwrap_or("-"));
    if let (Some(first), Some(last)) = (summary.start, summary.end) {
        println!("Period:   {first} to {last} ({} sessions)", summary.rows);
    }
    println!();

    let mut frame = normalize_all(&panel, config)?;
    CompositeScorer::default().attach(&mut frame)?;
    info!(
        computed = frame.fields().count(),
        skipped = frame.skipped().len(),
        "signals normalized"
    );

    print_tail(&frame, tail);

    if !frame.skipped().is_empty() {
        println!("\nSkipped:");
        for (field, reason) in frame.skipped() {
            println!("  {:22} {reason}", field.name());
        }
    }
    println!();

    Ok(())
}

fn print_tail(frame: &SignalFrame, tail: usize) {
    let fields: Vec<_> = frame.fields().collect();
    if fields.is_empty() {
        println!("No signals could be computed.");
        return;
    }

    print!("{:<12}", "date");
    for field in &fields {
        print!(" {:>22}", field.name());
    }
    println!();
    println!("{}", "-".repeat(12 + 23 * fields.len()));

    let start = frame.len().saturating_sub(tail);
    for (row, date) in frame.dates().iter().enumerate().skip(start) {
        print!("{:<12}", date.to_string());
        for field in &fields {
            let value = frame.get(*field).and_then(|values| values[row]);
            print!(" {:>22}", super::fmt_opt(value, 4));
        }
        println!();
    }
}

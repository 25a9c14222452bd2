//! CLI subcommand modules.
//!
//! This module contains the implementations for all vnflow CLI subcommands.

pub(crate) mod backtest;
pub(crate) mod normalize;
pub(crate) mod research;
pub(crate) mod signals;

/// Formats an optional statistic, `n/a` when absent.
pub(crate) fn fmt_opt(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.precision$}"))
}

/// Formats an optional return as a percentage.
pub(crate) fn fmt_pct(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:+.2}%", v * 100.0))
}

/// Prints a boxed section header.
pub(crate) fn header(title: &str) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║ {title:^60} ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");
}

//! vnflow CLI binary.
//!
//! Command-line interface for flow and valuation signal research on
//! Vietnamese equities.

mod cmd;
mod data;
mod signals;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;
use vnflow_traits::AnalysisConfig;

#[derive(Parser)]
#[command(name = "vnflow")]
#[command(about = "Flow and valuation signal research for Vietnamese equities", long_about = None)]
#[command(version)]
struct Cli {
    /// Analysis configuration (JSON); defaults apply when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Show detailed output and debug logs
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available signals
    Signals {
        /// Filter by category
        #[arg(long)]
        category: Option<String>,
    },

    /// Compute every normalized signal for one panel
    Normalize {
        /// Panel file (JSON)
        panel: PathBuf,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end: Option<String>,

        /// Number of trailing sessions to print
        #[arg(short, long, default_value = "10")]
        tail: usize,
    },

    /// Answer research questions for one or more panels
    Research {
        /// Panel files (JSON), one per ticker
        #[arg(required = true)]
        panels: Vec<PathBuf>,

        /// Questions to answer (lead_lag, self_trading, conflicts, valuation, composite)
        #[arg(short, long, value_delimiter = ',')]
        questions: Vec<String>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end: Option<String>,
    },

    /// Run the quintile long-short backtest
    Backtest {
        /// Panel file (JSON)
        panel: PathBuf,

        /// Signal to test instead of the composite score
        #[arg(short, long)]
        signal: Option<String>,

        /// Holding horizon in sessions
        #[arg(short = 'H', long, default_value = "5")]
        horizon: usize,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    let config = match path {
        Some(p) => AnalysisConfig::from_json_file(p)
            .with_context(|| format!("loading config {}", p.display()))?,
        None => AnalysisConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Signals { category } => {
            cmd::signals::list_signals(category.as_deref(), cli.verbose);
        }
        Commands::Normalize {
            panel,
            start,
            end,
            tail,
        } => {
            cmd::normalize::normalize_panel(&panel, start.as_deref(), end.as_deref(), tail, &config)?;
        }
        Commands::Research {
            panels,
            questions,
            format,
            start,
            end,
        } => {
            let questions = cmd::research::parse_questions(&questions)?;
            cmd::research::run_research(&panels, &questions, &format, start.as_deref(), end.as_deref(), &config)?;
        }
        Commands::Backtest {
            panel,
            signal,
            horizon,
            format,
        } => {
            cmd::backtest::run_backtest(&panel, signal.as_deref(), horizon, &format, &config)?;
        }
    }

    Ok(())
}

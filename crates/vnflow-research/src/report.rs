//! Per-ticker report and the parallel universe runner.

use crate::composite::{CompositeReport, composite_analysis};
use crate::conflicts::{ConflictReport, conflict_analysis};
use crate::lead_lag::{LeadLagReport, lead_lag_analysis};
use crate::self_trading::{SelfTradingReport, self_trading_analysis};
use crate::valuation::{ValuationReport, valuation_analysis};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, instrument};
use vnflow_eval::{RankDirection, RankedEntry, rank_snapshot};
use vnflow_traits::{AnalysisConfig, MergedPanel, Outcome, PanelSummary, Result};

/// One of the research questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Question {
    /// Does foreign flow lead returns?
    LeadLag,
    /// Is self-trading flow informative, and which normalization works best?
    SelfTrading,
    /// What follows sessions where the two groups disagree?
    Conflicts,
    /// Do cheap valuations earn more?
    Valuation,
    /// Does the composite score earn a spread?
    Composite,
}

impl Question {
    /// Every question in report order.
    pub const ALL: [Self; 5] = [
        Self::LeadLag,
        Self::SelfTrading,
        Self::Conflicts,
        Self::Valuation,
        Self::Composite,
    ];

    /// Short name used on the command line.
    pub const fn name(self) -> &'static str {
        match self {
            Self::LeadLag => "lead_lag",
            Self::SelfTrading => "self_trading",
            Self::Conflicts => "conflicts",
            Self::Valuation => "valuation",
            Self::Composite => "composite",
        }
    }

    /// Parses a short name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|q| q.name() == name)
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// All research results for one ticker.
///
/// A question that was not requested, or whose inputs the panel lacks, is
/// [`Outcome::Skipped`] with the reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerReport {
    /// Ticker label, `-` when the panel has none.
    pub ticker: String,
    /// Data coverage of the panel.
    pub summary: PanelSummary,
    /// Lead-lag question.
    pub lead_lag: Outcome<LeadLagReport>,
    /// Self-trading question.
    pub self_trading: Outcome<SelfTradingReport>,
    /// Conflict question.
    pub conflicts: Outcome<ConflictReport>,
    /// Valuation question.
    pub valuation: Outcome<ValuationReport>,
    /// Composite question.
    pub composite: Outcome<CompositeReport>,
}

impl TickerReport {
    /// Questions that produced a result.
    pub fn computed(&self) -> Vec<Question> {
        let flags = [
            self.lead_lag.is_computed(),
            self.self_trading.is_computed(),
            self.conflicts.is_computed(),
            self.valuation.is_computed(),
            self.composite.is_computed(),
        ];
        Question::ALL
            .into_iter()
            .zip(flags)
            .filter_map(|(q, ok)| ok.then_some(q))
            .collect()
    }
}

fn answer<T>(
    question: Question,
    questions: &[Question],
    run: impl FnOnce() -> Result<T>,
) -> Result<Outcome<T>> {
    if questions.contains(&question) {
        Outcome::from_result(run())
    } else {
        Ok(Outcome::skipped("not requested"))
    }
}

/// Runs the requested questions on one panel.
///
/// # Errors
///
/// Only non-recoverable errors (invalid configuration or malformed input)
/// are returned; data gaps mark the affected question skipped.
#[instrument(skip_all, fields(ticker = panel.ticker().unwrap_or("-")))]
pub fn run_ticker(panel: &MergedPanel, config: &AnalysisConfig, questions: &[Question]) -> Result<TickerReport> {
    let report = TickerReport {
        ticker: panel.ticker().unwrap_or("-").to_string(),
        summary: panel.summary(),
        lead_lag: answer(Question::LeadLag, questions, || lead_lag_analysis(panel, config))?,
        self_trading: answer(Question::SelfTrading, questions, || self_trading_analysis(panel, config))?,
        conflicts: answer(Question::Conflicts, questions, || conflict_analysis(panel, config))?,
        valuation: answer(Question::Valuation, questions, || valuation_analysis(panel, config))?,
        composite: answer(Question::Composite, questions, || composite_analysis(panel, config))?,
    };
    info!(rows = panel.len(), computed = report.computed().len(), "ticker analyzed");
    Ok(report)
}

/// Runs the requested questions on every panel in parallel.
///
/// Each panel is analyzed independently on a rayon worker; the results come
/// back in input order, one per panel.
///
/// # Errors
///
/// Returns [`vnflow_traits::VnflowError::InvalidConfig`] before any work
/// when `config` fails validation.
pub fn run_universe(
    panels: &[MergedPanel],
    config: &AnalysisConfig,
    questions: &[Question],
) -> Result<Vec<Result<TickerReport>>> {
    config.validate()?;
    info!(tickers = panels.len(), questions = questions.len(), "running research universe");
    Ok(panels
        .par_iter()
        .map(|panel| run_ticker(panel, config, questions))
        .collect())
}

/// Tickers ordered by their latest composite score, highest first.
///
/// Failed tickers and tickers without a score are left out.
pub fn rank_by_composite(reports: &[Result<TickerReport>]) -> Vec<RankedEntry> {
    let snapshot: Vec<(&str, Option<f64>)> = reports
        .iter()
        .flatten()
        .map(|r| (r.ticker.as_str(), r.composite.computed().and_then(|c| c.latest_score)))
        .collect();
    rank_snapshot(&snapshot, RankDirection::HigherIsBetter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vnflow_traits::{Date, Field};

    fn panel(ticker: &str, n: usize) -> MergedPanel {
        let dates: Vec<Date> = (0..n)
            .map(|i| Date::from_num_days_from_ce_opt(738_000 + i as i32).unwrap())
            .collect();
        MergedPanel::new(
            dates,
            vec![
                (Field::Close, (0..n).map(|i| Some(10.0 + (i % 4) as f64)).collect()),
                (Field::ForeignNetBuyVal, (0..n).map(|i| Some(((i * 5) % 9) as f64 - 4.0)).collect()),
            ],
        )
        .unwrap()
        .with_ticker(ticker)
    }

    #[test]
    fn test_question_names() {
        for q in Question::ALL {
            assert_eq!(Question::from_name(q.name()), Some(q));
        }
        assert_eq!(Question::from_name("momentum"), None);
        assert_eq!(Question::SelfTrading.to_string(), "self_trading");
    }

    #[test]
    fn test_unrequested_questions_are_skipped() {
        let report = run_ticker(&panel("HPG", 80), &AnalysisConfig::default(), &[Question::LeadLag]).unwrap();
        assert_eq!(report.ticker, "HPG");
        assert!(report.lead_lag.is_computed());
        assert_eq!(report.valuation.reason(), Some("not requested"));
        assert_eq!(report.computed(), vec![Question::LeadLag]);
    }

    #[test]
    fn test_missing_inputs_are_skipped() {
        let report = run_ticker(&panel("HPG", 80), &AnalysisConfig::default(), &Question::ALL).unwrap();
        assert!(!report.self_trading.is_computed());
        assert!(!report.conflicts.is_computed());
        assert!(!report.valuation.is_computed());
        assert!(report.conflicts.reason().unwrap().contains("self_net_buy_val"));
    }

    #[test]
    fn test_universe_keeps_input_order() {
        let panels: Vec<MergedPanel> = ["HPG", "VCB", "NKG", "TCB"]
            .iter()
            .enumerate()
            .map(|(k, t)| panel(t, 60 + k * 10))
            .collect();
        let reports = run_universe(&panels, &AnalysisConfig::default(), &Question::ALL).unwrap();
        let tickers: Vec<String> = reports.into_iter().map(|r| r.unwrap().ticker).collect();
        assert_eq!(tickers, ["HPG", "VCB", "NKG", "TCB"]);
    }

    #[test]
    fn test_universe_rejects_bad_config() {
        let config = AnalysisConfig {
            significance_level: 1.5,
            ..Default::default()
        };
        assert!(run_universe(&[], &config, &Question::ALL).is_err());
    }

    #[test]
    fn test_rank_by_composite_drops_unscored() {
        let config = AnalysisConfig {
            zscore_window: 20,
            ..Default::default()
        };
        let mut panels: Vec<MergedPanel> = ["HPG", "VCB", "TCB"]
            .iter()
            .enumerate()
            .map(|(k, t)| panel(t, 90 + k * 7))
            .collect();
        let dates: Vec<Date> = (0..50)
            .map(|i| Date::from_num_days_from_ce_opt(738_000 + i).unwrap())
            .collect();
        panels.push(
            MergedPanel::new(dates, vec![(Field::Close, vec![Some(10.0); 50])])
                .unwrap()
                .with_ticker("VNM"),
        );

        let reports = run_universe(&panels, &config, &[Question::Composite]).unwrap();
        let ranking = rank_by_composite(&reports);
        assert_eq!(ranking.len(), 3);
        assert!(ranking.iter().all(|e| e.ticker != "VNM"));
        assert_eq!(ranking[0].rank, 1);
        assert!(ranking.windows(2).all(|w| w[0].value >= w[1].value));
    }
}

//! What happens when foreign and self-trading flows disagree?

use serde::{Deserialize, Serialize};
use vnflow_eval::{
    GroupStats, LagCorrelation, LagScanConfig, SignificanceConfig, forward_return, group_stats, lagged_correlation_scan,
    strongest_lag,
};
use vnflow_signals::{ConflictState, MarketRegime, conflict_states, panel_regimes};
use vnflow_traits::{AnalysisConfig, Field, MergedPanel, Outcome, Result, VnflowError};

/// Horizons at which conflict states are evaluated.
pub const CONFLICT_HORIZONS: [usize; 2] = [5, 10];

/// Horizon of the bull/bear conflict split.
pub const CONFLICT_REGIME_HORIZON: usize = 5;

/// Forward-return summary at one horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizonStats {
    /// Forward-return horizon in sessions.
    pub horizon: usize,
    /// Forward return on sessions in the state.
    pub stats: GroupStats,
}

/// How often a state occurs and what follows it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSummary {
    /// The state.
    pub state: ConflictState,
    /// Sessions in the state.
    pub days: usize,
    /// Share of classified sessions, in percent.
    pub share: f64,
    /// Forward returns after the state.
    pub forward: Vec<HorizonStats>,
}

/// Which investor group moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Leader {
    /// Foreign flow predicts later self-trading flow.
    Foreign,
    /// Self-trading flow predicts later foreign flow.
    SelfTrading,
    /// No significant lead either way.
    Neither,
}

/// Lagged-correlation scans in both directions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leadership {
    /// Foreign flow at `t - lag` against self-trading flow at `t`.
    pub foreign_leads_self: Vec<LagCorrelation>,
    /// Self-trading flow at `t - lag` against foreign flow at `t`.
    pub self_leads_foreign: Vec<LagCorrelation>,
    /// Verdict.
    pub leader: Leader,
}

/// Conflict-state returns restricted to one market regime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictRegimeResult {
    /// The regime.
    pub regime: MarketRegime,
    /// Sessions in the regime.
    pub rows: usize,
    /// Forward-return horizon in sessions.
    pub horizon: usize,
    /// Forward return per state, in [`ConflictState::ALL`] order.
    pub states: Vec<GroupStats>,
}

/// Bull and bear conflict results side by side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictRegimeSplit {
    /// Bull market sessions.
    pub bull: Outcome<ConflictRegimeResult>,
    /// Bear market sessions.
    pub bear: Outcome<ConflictRegimeResult>,
}

/// Conflict report for one ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictReport {
    /// Sessions where both flows had a direction.
    pub classified_days: usize,
    /// One summary per state, in [`ConflictState::ALL`] order.
    pub states: Vec<StateSummary>,
    /// Share of classified sessions where the groups disagreed, in percent.
    pub conflict_share: f64,
    /// Who leads whom.
    pub leadership: Leadership,
    /// State returns by market regime; skipped without a benchmark.
    pub regimes: Outcome<ConflictRegimeSplit>,
}

fn significant_count(rows: &[LagCorrelation]) -> usize {
    rows.iter().filter(|r| r.significant).count()
}

/// More significant lags wins; a tie goes to the stronger single lag.
fn pick_leader(foreign_leads: &[LagCorrelation], self_leads: &[LagCorrelation]) -> Leader {
    let (f, s) = (significant_count(foreign_leads), significant_count(self_leads));
    if f == 0 && s == 0 {
        return Leader::Neither;
    }
    if f != s {
        return if f > s { Leader::Foreign } else { Leader::SelfTrading };
    }
    let strength = |rows: &[LagCorrelation]| {
        strongest_lag(rows)
            .and_then(|r| r.correlation)
            .map_or(0.0, f64::abs)
    };
    if strength(foreign_leads) >= strength(self_leads) {
        Leader::Foreign
    } else {
        Leader::SelfTrading
    }
}

/// Runs the conflict question.
///
/// Forward returns are raw close-to-close returns, not excess returns.
///
/// # Errors
///
/// Returns [`VnflowError::MissingColumn`] unless the panel has foreign flow,
/// self-trading net flow, and close prices.
pub fn conflict_analysis(panel: &MergedPanel, config: &AnalysisConfig) -> Result<ConflictReport> {
    let foreign = panel
        .foreign_flow()
        .ok_or_else(|| VnflowError::MissingColumn(Field::ForeignNetBuyVal.name().into()))?;
    let self_net = panel
        .self_trading()
        .net()
        .ok_or_else(|| VnflowError::MissingColumn(Field::SelfNetBuyVal.name().into()))?;
    let close = panel.require(Field::Close)?;

    let states = conflict_states(foreign, self_net);
    let groups: Vec<Option<usize>> = states
        .iter()
        .map(|s| s.and_then(|s| ConflictState::ALL.iter().position(|a| *a == s).map(|p| p + 1)))
        .collect();
    let labels: Vec<String> = ConflictState::ALL.iter().map(|s| s.label().to_string()).collect();

    let mut per_horizon = Vec::with_capacity(CONFLICT_HORIZONS.len());
    for h in CONFLICT_HORIZONS {
        let fwd = forward_return(close, h);
        per_horizon.push((h, group_stats(&groups, &fwd, &labels)));
    }

    let classified_days = states.iter().flatten().count();
    let share = |days: usize| {
        if classified_days == 0 {
            0.0
        } else {
            days as f64 / classified_days as f64 * 100.0
        }
    };

    let summaries: Vec<StateSummary> = ConflictState::ALL
        .iter()
        .enumerate()
        .map(|(k, state)| {
            let days = states.iter().filter(|s| **s == Some(*state)).count();
            StateSummary {
                state: *state,
                days,
                share: share(days),
                forward: per_horizon
                    .iter()
                    .map(|(h, stats)| HorizonStats {
                        horizon: *h,
                        stats: stats[k].clone(),
                    })
                    .collect(),
            }
        })
        .collect();

    let conflict_days = states.iter().flatten().filter(|s| s.is_conflict()).count();

    let scan = LagScanConfig {
        max_lag: config.max_lag,
        min_observations: config.min_lag_observations,
    };
    let sig = SignificanceConfig::from(config);
    let foreign_leads_self = lagged_correlation_scan(foreign, self_net, &scan, &sig);
    let self_leads_foreign = lagged_correlation_scan(self_net, foreign, &scan, &sig);
    let leader = pick_leader(&foreign_leads_self, &self_leads_foreign);
    let regimes = Outcome::from_result(regime_split(panel, &groups, &labels, close, config))?;

    Ok(ConflictReport {
        classified_days,
        states: summaries,
        conflict_share: share(conflict_days),
        leadership: Leadership {
            foreign_leads_self,
            self_leads_foreign,
            leader,
        },
        regimes,
    })
}

fn regime_split(
    panel: &MergedPanel,
    groups: &[Option<usize>],
    labels: &[String],
    close: &[Option<f64>],
    config: &AnalysisConfig,
) -> Result<ConflictRegimeSplit> {
    let regimes = panel_regimes(panel, config.regime_ma_window)?;
    let fwd = forward_return(close, CONFLICT_REGIME_HORIZON);

    let one = |regime: MarketRegime| -> Outcome<ConflictRegimeResult> {
        let rows = regimes.iter().filter(|r| **r == Some(regime)).count();
        if rows < config.min_sample_size {
            return Outcome::from(VnflowError::InsufficientData(format!(
                "{rows} {regime} sessions, need {}",
                config.min_sample_size
            )));
        }
        let in_regime: Vec<Option<usize>> = groups
            .iter()
            .zip(&regimes)
            .map(|(g, r)| if *r == Some(regime) { *g } else { None })
            .collect();
        Outcome::Computed(ConflictRegimeResult {
            regime,
            rows,
            horizon: CONFLICT_REGIME_HORIZON,
            states: group_stats(&in_regime, &fwd, labels),
        })
    };

    Ok(ConflictRegimeSplit {
        bull: one(MarketRegime::Bull),
        bear: one(MarketRegime::Bear),
    })
}

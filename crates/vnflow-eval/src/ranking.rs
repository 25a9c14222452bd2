//! Cross-sectional ranking of a per-ticker snapshot.

use serde::{Deserialize, Serialize};

/// Which end of a metric is better.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankDirection {
    /// Larger values rank first.
    HigherIsBetter,
    /// Smaller values rank first.
    LowerIsBetter,
    /// Values inside `[lo, hi]` rank first; outside, by distance to the nearest bound.
    OptimalRange(f64, f64),
}

impl RankDirection {
    /// Sort key where smaller is better.
    fn key(self, value: f64) -> f64 {
        match self {
            Self::HigherIsBetter => -value,
            Self::LowerIsBetter => value,
            Self::OptimalRange(lo, hi) => {
                if (lo..=hi).contains(&value) {
                    0.0
                } else {
                    (value - lo).abs().min((value - hi).abs())
                }
            }
        }
    }
}

/// Ranks `values` so that 1 is best.
///
/// Ties share the lowest rank of their block (`min` method), so three-way
/// tie for first gives ranks 1, 1, 1 and the next value 4. Missing values are
/// left unranked.
///
/// # Example
///
/// ```
/// use vnflow_eval::ranking::{RankDirection, rank_cross_section};
///
/// let roe = [Some(0.18), Some(0.22), None, Some(0.18)];
/// let ranks = rank_cross_section(&roe, RankDirection::HigherIsBetter);
/// assert_eq!(ranks, vec![Some(2), Some(1), None, Some(2)]);
/// ```
pub fn rank_cross_section(values: &[Option<f64>], direction: RankDirection) -> Vec<Option<usize>> {
    let keyed: Vec<(usize, f64)> = values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|v| (i, direction.key(v))))
        .collect();

    let mut ranks = vec![None; values.len()];
    for (i, key) in &keyed {
        let better = keyed.iter().filter(|(_, other)| other < key).count();
        ranks[*i] = Some(better + 1);
    }
    ranks
}

/// One ticker's place in a ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntry {
    /// Ticker symbol.
    pub ticker: String,
    /// Metric value.
    pub value: f64,
    /// 1 = best.
    pub rank: usize,
}

/// Ranks a `(ticker, value)` snapshot and returns it best first.
///
/// Tickers with a missing value are dropped. Ties keep input order.
pub fn rank_snapshot<S: AsRef<str>>(snapshot: &[(S, Option<f64>)], direction: RankDirection) -> Vec<RankedEntry> {
    let values: Vec<Option<f64>> = snapshot.iter().map(|(_, v)| *v).collect();
    let ranks = rank_cross_section(&values, direction);

    let mut entries: Vec<RankedEntry> = snapshot
        .iter()
        .zip(ranks)
        .filter_map(|((ticker, value), rank)| {
            Some(RankedEntry {
                ticker: ticker.as_ref().to_string(),
                value: (*value)?,
                rank: rank?,
            })
        })
        .collect();
    entries.sort_by_key(|e| e.rank);
    entries
}

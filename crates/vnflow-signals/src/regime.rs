//! Bull and bear market regimes from the benchmark's moving average.

use serde::{Deserialize, Serialize};
use std::fmt;
use vnflow_traits::{Field, MergedPanel, Result};

/// Market regime of one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarketRegime {
    /// Benchmark closed above its moving average.
    Bull,
    /// Benchmark closed at or below its moving average.
    Bear,
}

impl fmt::Display for MarketRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bull => f.write_str("Bull"),
            Self::Bear => f.write_str("Bear"),
        }
    }
}

/// Trailing moving average that emits from the first available value.
fn expanding_ma(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            let (sum, n) = values[start..=i]
                .iter()
                .flatten()
                .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
            (n > 0).then(|| sum / n as f64)
        })
        .collect()
}

/// Regime of every session of a benchmark close series.
///
/// The moving average needs only one observation, so the regime is defined
/// from the first session with a benchmark close.
///
/// # Panics
///
/// Panics if `ma_window` is zero.
pub fn market_regimes(benchmark: &[Option<f64>], ma_window: usize) -> Vec<Option<MarketRegime>> {
    assert!(ma_window > 0, "moving-average window must be positive");
    let ma = expanding_ma(benchmark, ma_window);
    benchmark
        .iter()
        .zip(&ma)
        .map(|(b, m)| {
            let (b, m) = ((*b)?, (*m)?);
            Some(if b > m { MarketRegime::Bull } else { MarketRegime::Bear })
        })
        .collect()
}

/// Regimes of a panel's benchmark.
///
/// # Errors
///
/// Returns [`vnflow_traits::VnflowError::MissingColumn`] without a benchmark column.
pub fn panel_regimes(panel: &MergedPanel, ma_window: usize) -> Result<Vec<Option<MarketRegime>>> {
    Ok(market_regimes(panel.require(Field::BenchmarkClose)?, ma_window))
}

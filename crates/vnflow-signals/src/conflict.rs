//! Foreign versus self-trading agreement states.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Joint direction of foreign and self-trading net flow on one session.
///
/// Only strictly positive or strictly negative flows have a direction. A
/// session where either side nets to exactly zero is left unclassified
/// rather than counted as selling, so [`ConflictState::BothSell`] holds only
/// sessions where both groups sold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConflictState {
    /// Both groups net buyers.
    BothBuy,
    /// Foreign buying while self-trading sells.
    ForeignBuySelfSell,
    /// Foreign selling while self-trading buys.
    ForeignSellSelfBuy,
    /// Both groups net sellers.
    BothSell,
}

impl ConflictState {
    /// All states in reporting order.
    pub const ALL: [Self; 4] = [
        Self::BothBuy,
        Self::ForeignBuySelfSell,
        Self::ForeignSellSelfBuy,
        Self::BothSell,
    ];

    /// Classifies one session.
    ///
    /// A missing flow, or a flow of exactly zero, has no direction and
    /// yields `None`.
    pub fn classify(foreign: Option<f64>, self_net: Option<f64>) -> Option<Self> {
        let (f, s) = (foreign?, self_net?);
        if f == 0.0 || s == 0.0 {
            return None;
        }
        Some(match (f > 0.0, s > 0.0) {
            (true, true) => Self::BothBuy,
            (true, false) => Self::ForeignBuySelfSell,
            (false, true) => Self::ForeignSellSelfBuy,
            (false, false) => Self::BothSell,
        })
    }

    /// Human-readable label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::BothBuy => "Both Buy",
            Self::ForeignBuySelfSell => "Foreign Buy, Self Sell",
            Self::ForeignSellSelfBuy => "Foreign Sell, Self Buy",
            Self::BothSell => "Both Sell",
        }
    }

    /// Whether the two groups disagree.
    pub const fn is_conflict(self) -> bool {
        matches!(self, Self::ForeignBuySelfSell | Self::ForeignSellSelfBuy)
    }
}

impl fmt::Display for ConflictState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classifies every session of two aligned flow series.
///
/// # Panics
///
/// Panics if the slices differ in length.
pub fn conflict_states(foreign: &[Option<f64>], self_net: &[Option<f64>]) -> Vec<Option<ConflictState>> {
    assert_eq!(foreign.len(), self_net.len(), "flows must be aligned");
    foreign
        .iter()
        .zip(self_net)
        .map(|(f, s)| ConflictState::classify(*f, *s))
        .collect()
}

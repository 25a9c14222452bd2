//! Trading-flow signals.
//!
//! Three normalizations of a net-buy-value series:
//! - [`AdvRelative`]: net flow as a multiple of typical daily flow
//! - [`GtgdRelative`]: net flow as a share of gross trading value
//! - [`FlowZScore`]: rolling z-score used for composite scoring

pub mod adv;
pub mod gtgd;
pub mod zscore;

pub use adv::{AdvRelative, AdvRelativeConfig, adv_relative};
pub use gtgd::{GtgdRelative, gtgd_relative};
pub use zscore::{FlowZScore, FlowZScoreConfig};

use serde::{Deserialize, Serialize};
use vnflow_traits::{Field, SignalField};

/// Which investor group's flow a signal reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlowSource {
    /// Foreign investors.
    Foreign,
    /// Securities companies' proprietary desks.
    SelfTrading,
}

impl FlowSource {
    /// The net-buy-value field of this source.
    pub const fn net_field(self) -> Field {
        match self {
            Self::Foreign => Field::ForeignNetBuyVal,
            Self::SelfTrading => Field::SelfNetBuyVal,
        }
    }

    /// Output column of the ADV-relative signal.
    pub const fn adv_output(self) -> SignalField {
        match self {
            Self::Foreign => SignalField::ForeignSignalAdv20,
            Self::SelfTrading => SignalField::SelfSignalAdv20,
        }
    }

    /// Output column of the rolling z-score.
    pub const fn zscore_output(self) -> SignalField {
        match self {
            Self::Foreign => SignalField::ForeignZscore,
            Self::SelfTrading => SignalField::SelfZscore,
        }
    }
}

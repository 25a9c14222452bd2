//! Closed vocabulary of panel columns.
//!
//! Every input column a panel may carry is a [`Field`], and every derived
//! column produced by the signal builders is a [`SignalField`]. Column names
//! only appear here; the rest of the workspace refers to the enums.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of the date key column in tabular inputs and outputs.
pub const DATE_COLUMN: &str = "date";

/// How a field behaves after an outer-join merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    /// Prices are carried forward across missing sessions.
    Price,
    /// Trading flows stay missing; a gap is not a zero.
    Flow,
    /// Valuation multiples stay missing.
    Valuation,
}

impl FieldKind {
    /// Whether gaps in this kind of field are forward-filled on merge.
    pub const fn forward_fill(self) -> bool {
        matches!(self, Self::Price)
    }
}

/// A recognized raw input column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// Ticker close price.
    Close,
    /// Benchmark index (VN-Index) close.
    BenchmarkClose,
    /// Foreign investors' net buy value.
    ForeignNetBuyVal,
    /// Proprietary (self) trading net buy value.
    SelfNetBuyVal,
    /// Proprietary trading gross buy value.
    SelfBuyVal,
    /// Proprietary trading gross sell value.
    SelfSellVal,
    /// Price to earnings.
    Pe,
    /// Price to book.
    Pb,
    /// Price to cash flow per share.
    Pcfs,
}

impl Field {
    /// All fields in canonical column order.
    pub const ALL: [Self; 9] = [
        Self::Close,
        Self::BenchmarkClose,
        Self::ForeignNetBuyVal,
        Self::SelfNetBuyVal,
        Self::SelfBuyVal,
        Self::SelfSellVal,
        Self::Pe,
        Self::Pb,
        Self::Pcfs,
    ];

    /// The valuation multiples, in reporting order.
    pub const VALUATION: [Self; 3] = [Self::Pe, Self::Pb, Self::Pcfs];

    /// Canonical column name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Close => "close",
            Self::BenchmarkClose => "benchmark_close",
            Self::ForeignNetBuyVal => "foreign_net_buy_val",
            Self::SelfNetBuyVal => "self_net_buy_val",
            Self::SelfBuyVal => "self_buy_val",
            Self::SelfSellVal => "self_sell_val",
            Self::Pe => "pe",
            Self::Pb => "pb",
            Self::Pcfs => "pcfs",
        }
    }

    /// Merge behavior of this field.
    pub const fn kind(self) -> FieldKind {
        match self {
            Self::Close | Self::BenchmarkClose => FieldKind::Price,
            Self::ForeignNetBuyVal | Self::SelfNetBuyVal | Self::SelfBuyVal | Self::SelfSellVal => {
                FieldKind::Flow
            }
            Self::Pe | Self::Pb | Self::Pcfs => FieldKind::Valuation,
        }
    }

    /// Resolves a column name, accepting `vnindex_close` as an alias for the benchmark.
    pub fn from_name(name: &str) -> Option<Self> {
        if name == "vnindex_close" {
            return Some(Self::BenchmarkClose);
        }
        Self::ALL.into_iter().find(|f| f.name() == name)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A derived signal column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalField {
    /// Foreign net buy relative to its average daily volume.
    ForeignSignalAdv20,
    /// Self net buy relative to its average daily volume.
    SelfSignalAdv20,
    /// Self net buy relative to self gross trading value.
    SelfSignalGtgd,
    /// Rolling z-score of foreign net buy.
    ForeignZscore,
    /// Rolling z-score of self net buy.
    SelfZscore,
    /// Rolling percentile of PE.
    PePercentile,
    /// Rolling percentile of PB.
    PbPercentile,
    /// Rolling percentile of PCF.
    PcfsPercentile,
    /// Combined composite score.
    CompositeScore,
}

impl SignalField {
    /// All derived fields in output column order.
    pub const ALL: [Self; 9] = [
        Self::ForeignSignalAdv20,
        Self::SelfSignalAdv20,
        Self::SelfSignalGtgd,
        Self::ForeignZscore,
        Self::SelfZscore,
        Self::PePercentile,
        Self::PbPercentile,
        Self::PcfsPercentile,
        Self::CompositeScore,
    ];

    /// Column name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::ForeignSignalAdv20 => "foreign_signal_adv20",
            Self::SelfSignalAdv20 => "self_signal_adv20",
            Self::SelfSignalGtgd => "self_signal_gtgd",
            Self::ForeignZscore => "foreign_zscore",
            Self::SelfZscore => "self_zscore",
            Self::PePercentile => "pe_percentile",
            Self::PbPercentile => "pb_percentile",
            Self::PcfsPercentile => "pcfs_percentile",
            Self::CompositeScore => "composite_score",
        }
    }

    /// Percentile column derived from a valuation field, if any.
    pub const fn percentile_of(field: Field) -> Option<Self> {
        match field {
            Field::Pe => Some(Self::PePercentile),
            Field::Pb => Some(Self::PbPercentile),
            Field::Pcfs => Some(Self::PcfsPercentile),
            _ => None,
        }
    }

    /// Resolves a column name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }
}

impl fmt::Display for SignalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

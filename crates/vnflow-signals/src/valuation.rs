//! Valuation percentile signals and zones.
//!
//! Each valuation multiple (PE, PB, PCF) is turned into its rolling
//! percentile rank against the trailing three years of its own history.
//! Valuation gaps are never filled, so a missing multiple stays missing.

use serde::{Deserialize, Serialize};
use std::fmt;
use vnflow_traits::stats::rolling_percentile_rank;
use vnflow_traits::{Field, MergedPanel, Result, Signal, SignalField, VnflowError};

/// Rolling percentile (0-100) of a valuation multiple.
#[derive(Debug, Clone)]
pub struct ValuationPercentile {
    field: [Field; 1],
    output: SignalField,
    window: usize,
}

impl ValuationPercentile {
    /// Creates the percentile signal of `field` over `window` sessions.
    ///
    /// # Errors
    ///
    /// Returns [`VnflowError::InvalidData`] when `field` is not a valuation multiple.
    pub fn new(field: Field, window: usize) -> Result<Self> {
        let output = SignalField::percentile_of(field).ok_or_else(|| {
            VnflowError::InvalidData(format!("{field} is not a valuation field"))
        })?;
        Ok(Self {
            field: [field],
            output,
            window,
        })
    }

    /// Percentile signals for PE, PB and PCF.
    pub fn all(window: usize) -> Vec<Self> {
        Field::VALUATION
            .into_iter()
            .filter_map(|f| Self::new(f, window).ok())
            .collect()
    }

    /// The valuation field this signal ranks.
    pub const fn field(&self) -> Field {
        self.field[0]
    }
}

impl Signal for ValuationPercentile {
    fn name(&self) -> &str {
        self.output.name()
    }

    fn output(&self) -> SignalField {
        self.output
    }

    fn lookback(&self) -> usize {
        self.window
    }

    fn required_fields(&self) -> &[Field] {
        &self.field
    }

    fn compute(&self, panel: &MergedPanel) -> Result<Vec<Option<f64>>> {
        self.validate(panel)?;
        Ok(rolling_percentile_rank(panel.require(self.field())?, self.window))
    }
}

/// Coarse valuation bucket of a percentile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValuationZone {
    /// Percentile at or below 20.
    VeryCheap,
    /// Percentile in (20, 40].
    Cheap,
    /// Percentile in (40, 60].
    Fair,
    /// Percentile in (60, 80].
    Expensive,
    /// Percentile above 80.
    VeryExpensive,
    /// No percentile available.
    Unknown,
}

impl ValuationZone {
    /// Classifies a percentile.
    pub fn classify(percentile: Option<f64>) -> Self {
        match percentile {
            None => Self::Unknown,
            Some(p) if p <= 20.0 => Self::VeryCheap,
            Some(p) if p <= 40.0 => Self::Cheap,
            Some(p) if p <= 60.0 => Self::Fair,
            Some(p) if p <= 80.0 => Self::Expensive,
            Some(_) => Self::VeryExpensive,
        }
    }

    /// Human-readable label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::VeryCheap => "Very Cheap",
            Self::Cheap => "Cheap",
            Self::Fair => "Fair",
            Self::Expensive => "Expensive",
            Self::VeryExpensive => "Very Expensive",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ValuationZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Zone of every row of a percentile series.
pub fn valuation_zones(percentiles: &[Option<f64>]) -> Vec<ValuationZone> {
    percentiles.iter().map(|p| ValuationZone::classify(*p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use vnflow_traits::Date;

    #[test]
    fn test_zone_boundaries() {
        assert_eq!(ValuationZone::classify(None), ValuationZone::Unknown);
        assert_eq!(ValuationZone::classify(Some(0.0)), ValuationZone::VeryCheap);
        assert_eq!(ValuationZone::classify(Some(20.0)), ValuationZone::VeryCheap);
        assert_eq!(ValuationZone::classify(Some(20.1)), ValuationZone::Cheap);
        assert_eq!(ValuationZone::classify(Some(60.0)), ValuationZone::Fair);
        assert_eq!(ValuationZone::classify(Some(80.0)), ValuationZone::Expensive);
        assert_eq!(ValuationZone::classify(Some(95.0)), ValuationZone::VeryExpensive);
        assert_eq!(ValuationZone::VeryExpensive.to_string(), "Very Expensive");
    }

    #[test]
    fn test_rejects_non_valuation_field() {
        assert!(ValuationPercentile::new(Field::Close, 10).is_err());
        assert_eq!(ValuationPercentile::all(756).len(), 3);
    }

    #[test]
    fn test_percentile_signal_keeps_gaps() {
        let dates: Vec<Date> = (0..5)
            .map(|i| Date::from_num_days_from_ce_opt(738_000 + i).unwrap())
            .collect();
        let pe = vec![Some(10.0), Some(12.0), None, Some(11.0), Some(9.0)];
        let panel = MergedPanel::new(dates, vec![(Field::Pe, pe)]).unwrap();

        let signal = ValuationPercentile::new(Field::Pe, 4).unwrap();
        assert_eq!(signal.name(), "pe_percentile");
        let p = signal.compute(&panel).unwrap();
        assert!(p[0].is_none());
        assert_relative_eq!(p[1].unwrap(), 100.0);
        assert!(p[2].is_none());
        // 11.0 against [10.0, 12.0]
        assert_relative_eq!(p[3].unwrap(), 50.0);
        // 9.0 against [12.0, 11.0]; 10.0 has left the window
        assert_relative_eq!(p[4].unwrap(), 0.0);
    }
}

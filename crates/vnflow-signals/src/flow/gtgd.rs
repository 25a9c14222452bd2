//! GTGD-relative flow signal.

use vnflow_traits::{Field, MergedPanel, Result, Signal, SignalField};

const REQUIRED: [Field; 3] = [Field::SelfNetBuyVal, Field::SelfBuyVal, Field::SelfSellVal];

/// Self-trading net flow as a share of gross self-trading value.
///
/// Bounded in [-1, 1] whenever buy and sell values are consistent with the
/// net value. Only self-trading data carries gross values, so the signal is
/// tied to that source.
#[derive(Debug, Clone, Copy, Default)]
pub struct GtgdRelative;

impl Signal for GtgdRelative {
    fn name(&self) -> &str {
        "self_gtgd_relative"
    }

    fn output(&self) -> SignalField {
        SignalField::SelfSignalGtgd
    }

    fn lookback(&self) -> usize {
        0
    }

    fn required_fields(&self) -> &[Field] {
        &REQUIRED
    }

    fn compute(&self, panel: &MergedPanel) -> Result<Vec<Option<f64>>> {
        self.validate(panel)?;
        Ok(gtgd_relative(
            panel.require(Field::SelfNetBuyVal)?,
            panel.require(Field::SelfBuyVal)?,
            panel.require(Field::SelfSellVal)?,
        ))
    }
}

/// Computes `net / (buy + sell)` row by row.
///
/// A zero-trading day (`buy + sell == 0`) is null, not zero.
///
/// # Panics
///
/// Panics if the slices differ in length.
pub fn gtgd_relative(
    net: &[Option<f64>],
    buy: &[Option<f64>],
    sell: &[Option<f64>],
) -> Vec<Option<f64>> {
    assert!(
        net.len() == buy.len() && buy.len() == sell.len(),
        "net, buy and sell must be aligned"
    );
    net.iter()
        .zip(buy.iter().zip(sell))
        .map(|(n, (b, s))| {
            let total = (*b)? + (*s)?;
            if total == 0.0 {
                return None;
            }
            Some((*n)? / total)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use vnflow_traits::Date;

    #[test]
    fn test_gtgd_basic() {
        let net = vec![Some(50.0), Some(-20.0)];
        let buy = vec![Some(75.0), Some(40.0)];
        let sell = vec![Some(25.0), Some(60.0)];
        let signal = gtgd_relative(&net, &buy, &sell);
        assert_relative_eq!(signal[0].unwrap(), 0.5);
        assert_relative_eq!(signal[1].unwrap(), -0.2);
    }

    #[test]
    fn test_zero_trading_day_is_null() {
        let signal = gtgd_relative(&[Some(0.0)], &[Some(0.0)], &[Some(0.0)]);
        assert_eq!(signal, vec![None]);
    }

    #[test]
    fn test_missing_input_is_null() {
        let signal = gtgd_relative(&[Some(1.0), None], &[None, Some(1.0)], &[Some(1.0), Some(1.0)]);
        assert_eq!(signal, vec![None, None]);
    }

    #[test]
    fn test_requires_gross_values() {
        let date = Date::from_ymd_opt(2024, 1, 2).unwrap();
        let panel = MergedPanel::new(vec![date], vec![(Field::SelfNetBuyVal, vec![Some(1.0)])]).unwrap();
        assert!(GtgdRelative.compute(&panel).is_err());
    }
}

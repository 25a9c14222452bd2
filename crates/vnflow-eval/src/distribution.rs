//! Tail probabilities of the reference distributions.

use statrs::distribution::{ContinuousCDF, FisherSnedecor, StudentsT};

/// Two-sided p-value of a t statistic with `df` degrees of freedom.
pub(crate) fn t_two_sided(t: f64, df: f64) -> Option<f64> {
    if t.is_infinite() {
        return Some(0.0);
    }
    let dist = StudentsT::new(0.0, 1.0, df).ok()?;
    Some((2.0 * dist.sf(t.abs())).min(1.0))
}

/// Upper-tail p-value of an F statistic.
pub(crate) fn f_upper(f: f64, d1: f64, d2: f64) -> Option<f64> {
    if f.is_infinite() {
        return Some(0.0);
    }
    let dist = FisherSnedecor::new(d1, d2).ok()?;
    Some(dist.sf(f))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_t_two_sided() {
        // t = 2.228 is the 97.5% quantile with 10 df
        assert_abs_diff_eq!(t_two_sided(2.228, 10.0).unwrap(), 0.05, epsilon = 1e-3);
        assert_abs_diff_eq!(t_two_sided(0.0, 10.0).unwrap(), 1.0, epsilon = 1e-12);
        assert_eq!(t_two_sided(f64::INFINITY, 3.0), Some(0.0));
        assert!(t_two_sided(1.0, 0.0).is_none());
    }

    #[test]
    fn test_f_upper() {
        // F(2, 12) critical value at 5% is 3.885
        assert_abs_diff_eq!(f_upper(3.885, 2.0, 12.0).unwrap(), 0.05, epsilon = 1e-3);
    }
}

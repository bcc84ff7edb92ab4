//! Growth-rate helpers

/// Annualized growth rate between two volumes `periods` years apart.
///
/// Returns `0.0` when either endpoint is non-positive (or not finite) or
/// when `periods` is zero, instead of an undefined fractional power.
pub fn annualized_growth(start: f64, end: f64, periods: u32) -> f64 {
    if periods == 0 || !start.is_finite() || !end.is_finite() || start <= 0.0 || end <= 0.0 {
        return 0.0;
    }

    (end / start).powf(1.0 / periods as f64) - 1.0
}

/// Same as [`annualized_growth`], expressed as a percentage.
pub fn annualized_growth_pct(start: f64, end: f64, periods: u32) -> f64 {
    annualized_growth(start, end, periods) * 100.0
}

/// Year-over-year change in percent. `None` when the previous value is not positive.
pub fn year_over_year_pct(previous: f64, current: f64) -> Option<f64> {
    if previous > 0.0 && previous.is_finite() && current.is_finite() {
        Some((current / previous - 1.0) * 100.0)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_annualized_growth() {
        assert_relative_eq!(annualized_growth(100.0, 121.0, 2), 0.1, epsilon = 1e-12);
        assert_relative_eq!(annualized_growth_pct(100.0, 121.0, 2), 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_degenerate_endpoints() {
        assert_eq!(annualized_growth(0.0, 100.0, 2), 0.0);
        assert_eq!(annualized_growth(100.0, -5.0, 2), 0.0);
        assert_eq!(annualized_growth(100.0, 200.0, 0), 0.0);
    }

    #[test]
    fn test_year_over_year() {
        assert_relative_eq!(year_over_year_pct(200.0, 210.0).unwrap(), 5.0, epsilon = 1e-9);
        assert!(year_over_year_pct(0.0, 10.0).is_none());
    }
}

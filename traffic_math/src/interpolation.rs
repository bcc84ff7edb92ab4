//! Compound-growth interpolation between sparse yearly observations
//!
//! Census campaigns are not run every year. Between two measured years the
//! volume is assumed to grow at a constant annual rate, so each gap is filled
//! along the geometric path that joins its bounding observations.

use crate::{MathError, Result};

/// Longest gap between two observations that will be filled
pub const MAX_GAP_YEARS: u32 = 1000;

/// Per-period compound growth rate that takes `start` to `end` in `periods` steps.
///
/// A zero starting value has no defined rate and collapses to `0.0`, which
/// yields a flat segment. Negative or non-finite inputs are rejected.
pub fn compound_growth_rate(start: f64, end: f64, periods: u32) -> Result<f64> {
    if periods == 0 {
        return Err(MathError::InvalidInput(
            "Number of periods must be at least 1".to_string(),
        ));
    }
    if !start.is_finite() || !end.is_finite() {
        return Err(MathError::InvalidInput(format!(
            "Growth endpoints must be finite (start={}, end={})",
            start, end
        )));
    }
    if start < 0.0 || end < 0.0 {
        return Err(MathError::InvalidInput(format!(
            "Growth endpoints must be non-negative (start={}, end={})",
            start, end
        )));
    }

    if start == 0.0 {
        return Ok(0.0);
    }

    Ok((end / start).powf(1.0 / periods as f64) - 1.0)
}

/// Fill every missing year between consecutive observations.
///
/// `points` must hold at least two `(year, value)` pairs in strictly
/// ascending year order. The result covers every year from the first to the
/// last observation; observed years keep their value bit-for-bit.
pub fn geometric_fill(points: &[(i32, f64)]) -> Result<Vec<(i32, f64)>> {
    if points.len() < 2 {
        return Err(MathError::InsufficientData(format!(
            "Need at least 2 observations to interpolate, got {}",
            points.len()
        )));
    }

    let mut dense = Vec::new();

    for pair in points.windows(2) {
        let (y0, v0) = pair[0];
        let (y1, v1) = pair[1];

        if y1 <= y0 {
            return Err(MathError::InvalidInput(format!(
                "Observation years must be strictly ascending ({} follows {})",
                y1, y0
            )));
        }

        let span = y1
            .checked_sub(y0)
            .and_then(|gap| u32::try_from(gap).ok())
            .filter(|gap| *gap <= MAX_GAP_YEARS)
            .ok_or_else(|| {
                MathError::InvalidInput(format!(
                    "Gap between {} and {} exceeds {} years",
                    y0, y1, MAX_GAP_YEARS
                ))
            })?;
        let rate = compound_growth_rate(v0, v1, span)?;

        dense.push((y0, v0));
        for k in 1..span {
            dense.push((y0 + k as i32, v0 * (1.0 + rate).powi(k as i32)));
        }
    }

    // The last observation is copied as-is rather than recomputed from the rate
    if let Some(&last) = points.last() {
        dense.push(last);
    }

    Ok(dense)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_compound_growth_rate() {
        // 100 -> 121 over two periods is 10% per period
        let rate = compound_growth_rate(100.0, 121.0, 2).unwrap();
        assert_relative_eq!(rate, 0.1, epsilon = 1e-12);

        let flat = compound_growth_rate(0.0, 500.0, 3).unwrap();
        assert_eq!(flat, 0.0);
    }

    #[test]
    fn test_compound_growth_rate_rejects_bad_input() {
        assert!(compound_growth_rate(-10.0, 100.0, 2).is_err());
        assert!(compound_growth_rate(10.0, f64::NAN, 2).is_err());
        assert!(compound_growth_rate(10.0, 20.0, 0).is_err());
    }

    #[test]
    fn test_geometric_fill_keeps_observations() {
        let points = [(2015, 1000.0), (2017, 1200.0), (2018, 1300.0), (2020, 1600.0)];
        let dense = geometric_fill(&points).unwrap();

        let years: Vec<i32> = dense.iter().map(|(y, _)| *y).collect();
        assert_eq!(years, (2015..=2020).collect::<Vec<_>>());

        for (year, value) in points {
            let filled = dense.iter().find(|(y, _)| *y == year).unwrap().1;
            assert_eq!(filled, value);
        }
    }

    #[test]
    fn test_geometric_fill_midpoint() {
        let dense = geometric_fill(&[(2020, 100.0), (2022, 400.0)]).unwrap();
        // Doubling each year: 100 -> 200 -> 400
        assert_relative_eq!(dense[1].1, 200.0, epsilon = 1e-9);
    }

    #[test]
    fn test_geometric_fill_decreasing_interval() {
        let dense = geometric_fill(&[(2010, 800.0), (2014, 400.0)]).unwrap();
        for w in dense.windows(2) {
            assert!(w[1].1 < w[0].1);
        }
    }

    #[test]
    fn test_geometric_fill_zero_start_is_flat() {
        let dense = geometric_fill(&[(2010, 0.0), (2013, 300.0)]).unwrap();
        assert_eq!(dense[1].1, 0.0);
        assert_eq!(dense[2].1, 0.0);
        assert_eq!(dense[3].1, 300.0);
    }

    #[test]
    fn test_geometric_fill_errors() {
        assert!(geometric_fill(&[(2020, 10.0)]).is_err());
        assert!(geometric_fill(&[(2020, 10.0), (2020, 12.0)]).is_err());
        assert!(geometric_fill(&[(2020, 10.0), (2022, -5.0)]).is_err());
    }

    #[test]
    fn test_geometric_fill_rejects_huge_gaps() {
        assert!(matches!(
            geometric_fill(&[(i32::MIN, 1.0), (i32::MAX, 2.0)]),
            Err(MathError::InvalidInput(_))
        ));
        assert!(matches!(
            geometric_fill(&[(0, 1.0), (2_000_000_000, 2.0)]),
            Err(MathError::InvalidInput(_))
        ));

        let dense = geometric_fill(&[(1000, 1.0), (2000, 2.0)]).unwrap();
        assert_eq!(dense.len(), 1001);
    }
}

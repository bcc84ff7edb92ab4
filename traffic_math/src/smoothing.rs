//! Damped-trend exponential smoothing
//!
//! Holt's method with a damping factor `phi` applied to the trend, in its
//! additive and multiplicative forms:
//!
//! ```text
//! Additive:        F(t+h) = L(t) + (phi + phi^2 + ... + phi^h) * T(t)
//! Multiplicative:  F(t+h) = L(t) * T(t)^(phi + phi^2 + ... + phi^h)
//! ```
//!
//! Because the exponents shrink geometrically, the trend contribution
//! flattens out over long horizons instead of growing without bound.

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

/// How the trend component combines with the level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendKind {
    /// Trend is an absolute increment per period
    Additive,
    /// Trend is a growth ratio per period
    Multiplicative,
}

impl std::fmt::Display for TrendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrendKind::Additive => write!(f, "additive"),
            TrendKind::Multiplicative => write!(f, "multiplicative"),
        }
    }
}

/// Smoothing parameters of a damped Holt model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DampedParams {
    /// Level smoothing constant, in (0, 1)
    pub alpha: f64,
    /// Trend smoothing constant, in (0, 1)
    pub beta: f64,
    /// Trend damping factor, in (0, 1]
    pub phi: f64,
}

/// Damped Holt smoothing state, updated one observation at a time
#[derive(Debug, Clone)]
pub struct DampedHolt {
    kind: TrendKind,
    params: DampedParams,
    level: Option<f64>,
    trend: Option<f64>,
    values_seen: usize,
    sse: f64,
}

impl DampedHolt {
    /// Create a new damped Holt smoother
    pub fn new(kind: TrendKind, alpha: f64, beta: f64, phi: f64) -> Result<Self> {
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(MathError::InvalidInput(
                "Alpha must be between 0 and 1 (exclusive)".to_string(),
            ));
        }
        if !(beta > 0.0 && beta < 1.0) {
            return Err(MathError::InvalidInput(
                "Beta must be between 0 and 1 (exclusive)".to_string(),
            ));
        }
        if !(phi > 0.0 && phi <= 1.0) {
            return Err(MathError::InvalidInput(
                "Damping factor must be in (0, 1]".to_string(),
            ));
        }

        Ok(Self {
            kind,
            params: DampedParams { alpha, beta, phi },
            level: None,
            trend: None,
            values_seen: 0,
            sse: 0.0,
        })
    }

    /// Feed the next observation into the smoother.
    ///
    /// The first value seeds the level, the second one seeds the trend
    /// (difference or ratio of the two) and is then smoothed like any other.
    pub fn update(&mut self, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(MathError::InvalidInput(format!(
                "Observation must be finite, got {}",
                value
            )));
        }
        if self.kind == TrendKind::Multiplicative && value <= 0.0 {
            return Err(MathError::InvalidInput(format!(
                "Multiplicative trend requires strictly positive values, got {}",
                value
            )));
        }

        match (self.level, self.trend) {
            (None, _) => {
                self.level = Some(value);
            }
            (Some(first), None) => {
                let initial_trend = match self.kind {
                    TrendKind::Additive => value - first,
                    TrendKind::Multiplicative => value / first,
                };
                self.step(first, initial_trend, value)?;
            }
            (Some(level), Some(trend)) => {
                self.step(level, trend, value)?;
            }
        }

        self.values_seen += 1;
        Ok(())
    }

    fn step(&mut self, prev_level: f64, prev_trend: f64, value: f64) -> Result<()> {
        let DampedParams { alpha, beta, phi } = self.params;
        let fitted = self.project(prev_level, prev_trend, phi);

        let level = alpha * value + (1.0 - alpha) * fitted;
        let trend = match self.kind {
            TrendKind::Additive => beta * (level - prev_level) + (1.0 - beta) * phi * prev_trend,
            TrendKind::Multiplicative => {
                beta * (level / prev_level) + (1.0 - beta) * prev_trend.powf(phi)
            }
        };

        if !level.is_finite() || !trend.is_finite() {
            return Err(MathError::CalculationError(format!(
                "Non-finite {} state (level={}, trend={})",
                self.kind, level, trend
            )));
        }
        if self.kind == TrendKind::Multiplicative && (level <= 0.0 || trend <= 0.0) {
            return Err(MathError::CalculationError(format!(
                "Multiplicative state left the positive domain (level={}, trend={})",
                level, trend
            )));
        }

        self.sse += (value - fitted).powi(2);
        self.level = Some(level);
        self.trend = Some(trend);
        Ok(())
    }

    /// Apply `exponent` units of damped trend to `level`
    fn project(&self, level: f64, trend: f64, exponent: f64) -> f64 {
        match self.kind {
            TrendKind::Additive => level + exponent * trend,
            TrendKind::Multiplicative => level * trend.powf(exponent),
        }
    }

    /// Forecast `h` periods after the last observation
    pub fn forecast(&self, h: usize) -> Result<f64> {
        match (self.level, self.trend) {
            (Some(level), Some(trend)) => {
                let phi = self.params.phi;
                let damped_steps: f64 = (1..=h).map(|i| phi.powi(i as i32)).sum();
                let value = self.project(level, trend, damped_steps);
                if value.is_finite() {
                    Ok(value)
                } else {
                    Err(MathError::CalculationError(format!(
                        "Forecast {} periods ahead is not finite",
                        h
                    )))
                }
            }
            _ => Err(MathError::InsufficientData(
                "Not enough data to make a forecast. Need at least 2 points.".to_string(),
            )),
        }
    }

    /// Forecast every period from 1 through `horizon`
    pub fn forecast_path(&self, horizon: usize) -> Result<Vec<f64>> {
        (1..=horizon).map(|h| self.forecast(h)).collect()
    }

    /// Get the current level
    pub fn level(&self) -> Result<f64> {
        self.level.ok_or_else(|| {
            MathError::InsufficientData("Level not calculated yet".to_string())
        })
    }

    /// Get the current trend
    pub fn trend(&self) -> Result<f64> {
        self.trend.ok_or_else(|| {
            MathError::InsufficientData("Trend not calculated yet".to_string())
        })
    }

    /// Sum of squared one-step-ahead errors seen so far
    pub fn sse(&self) -> f64 {
        self.sse
    }

    pub fn kind(&self) -> TrendKind {
        self.kind
    }

    pub fn params(&self) -> DampedParams {
        self.params
    }

    pub fn values_seen(&self) -> usize {
        self.values_seen
    }

    /// Fit alpha and beta for a fixed damping factor.
    ///
    /// Every `(alpha, beta)` pair on a regular grid with spacing `step`
    /// inside (0, 1) is evaluated and the one with the smallest sum of
    /// squared one-step-ahead errors wins. Ties keep the first pair found,
    /// so the result is deterministic.
    pub fn fit_grid(kind: TrendKind, phi: f64, data: &[f64], step: f64) -> Result<Self> {
        if data.len() < 2 {
            return Err(MathError::InsufficientData(format!(
                "Need at least 2 points to fit a trend, got {}",
                data.len()
            )));
        }
        if !(step > 0.0 && step <= 0.5) {
            return Err(MathError::InvalidInput(
                "Grid step must be in (0, 0.5]".to_string(),
            ));
        }

        let grid = grid_points(step);
        let mut best: Option<DampedHolt> = None;
        let mut last_error = None;

        for &alpha in &grid {
            for &beta in &grid {
                let mut model = Self::new(kind, alpha, beta, phi)?;
                let outcome = data.iter().try_for_each(|&value| model.update(value));

                match outcome {
                    Ok(()) => {
                        let better = best.as_ref().map_or(true, |b| model.sse < b.sse);
                        if better {
                            best = Some(model);
                        }
                    }
                    Err(err) => last_error = Some(err),
                }
            }
        }

        match (best, last_error) {
            (Some(model), _) => Ok(model),
            (None, Some(err)) => Err(err),
            (None, None) => Err(MathError::CalculationError(
                "No parameter combination could be evaluated".to_string(),
            )),
        }
    }
}

fn grid_points(step: f64) -> Vec<f64> {
    (1..)
        .map(|k| k as f64 * step)
        .take_while(|v| *v < 1.0 - 1e-9)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parameter_validation() {
        assert!(DampedHolt::new(TrendKind::Additive, 0.0, 0.5, 0.8).is_err());
        assert!(DampedHolt::new(TrendKind::Additive, 0.5, 1.0, 0.8).is_err());
        assert!(DampedHolt::new(TrendKind::Additive, 0.5, 0.5, 0.0).is_err());
        assert!(DampedHolt::new(TrendKind::Additive, 0.5, 0.5, f64::NAN).is_err());
        assert!(DampedHolt::new(TrendKind::Multiplicative, 0.5, 0.5, 1.0).is_ok());
    }

    #[test]
    fn test_additive_initialization() {
        let mut model = DampedHolt::new(TrendKind::Additive, 0.5, 0.5, 1.0).unwrap();
        model.update(10.0).unwrap();
        assert!(model.trend().is_err());

        // Perfectly linear data is tracked exactly without damping
        model.update(20.0).unwrap();
        model.update(30.0).unwrap();
        assert_relative_eq!(model.level().unwrap(), 30.0, epsilon = 1e-9);
        assert_relative_eq!(model.trend().unwrap(), 10.0, epsilon = 1e-9);
        assert_relative_eq!(model.forecast(2).unwrap(), 50.0, epsilon = 1e-9);
        assert_relative_eq!(model.sse(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_damping_limits_growth() {
        let mut damped = DampedHolt::new(TrendKind::Additive, 0.5, 0.5, 0.8).unwrap();
        let mut undamped = DampedHolt::new(TrendKind::Additive, 0.5, 0.5, 1.0).unwrap();
        for value in [10.0, 20.0, 30.0, 40.0] {
            damped.update(value).unwrap();
            undamped.update(value).unwrap();
        }

        let far_damped = damped.forecast(50).unwrap();
        let far_undamped = undamped.forecast(50).unwrap();
        assert!(far_damped < far_undamped);

        // The damped path converges: increments shrink every period
        let path = damped.forecast_path(10).unwrap();
        let steps: Vec<f64> = path.windows(2).map(|w| w[1] - w[0]).collect();
        assert!(steps.windows(2).all(|s| s[1] < s[0]));
    }

    #[test]
    fn test_multiplicative_geometric_data() {
        let data: Vec<f64> = (0..8).map(|i| 100.0 * 1.1_f64.powi(i)).collect();
        let mut model = DampedHolt::new(TrendKind::Multiplicative, 0.5, 0.5, 1.0).unwrap();
        for value in &data {
            model.update(*value).unwrap();
        }
        assert_relative_eq!(model.trend().unwrap(), 1.1, epsilon = 1e-9);
        assert_relative_eq!(model.forecast(1).unwrap(), data[7] * 1.1, epsilon = 1e-6);
    }

    #[test]
    fn test_multiplicative_rejects_non_positive() {
        let mut model = DampedHolt::new(TrendKind::Multiplicative, 0.5, 0.5, 0.8).unwrap();
        model.update(100.0).unwrap();
        assert!(model.update(0.0).is_err());
        assert!(model.update(-1.0).is_err());
    }

    #[test]
    fn test_fit_grid_prefers_lower_error() {
        let data = [100.0, 112.0, 125.0, 139.0, 156.0, 174.0];
        let fitted = DampedHolt::fit_grid(TrendKind::Additive, 0.8, &data, 0.05).unwrap();
        assert_eq!(fitted.values_seen(), data.len());

        let reference = {
            let mut m = DampedHolt::new(TrendKind::Additive, 0.5, 0.5, 0.8).unwrap();
            for v in data {
                m.update(v).unwrap();
            }
            m
        };
        assert!(fitted.sse() <= reference.sse());
    }

    #[test]
    fn test_fit_grid_errors() {
        assert!(matches!(
            DampedHolt::fit_grid(TrendKind::Additive, 0.8, &[1.0], 0.05),
            Err(MathError::InsufficientData(_))
        ));
        assert!(DampedHolt::fit_grid(TrendKind::Multiplicative, 0.8, &[0.0, 10.0, 20.0], 0.05)
            .is_err());
        assert!(DampedHolt::fit_grid(TrendKind::Additive, 0.8, &[1.0, 2.0], 0.0).is_err());
    }

    #[test]
    fn test_grid_points() {
        let grid = grid_points(0.25);
        assert_eq!(grid, vec![0.25, 0.5, 0.75]);
        assert_eq!(grid_points(0.05).len(), 19);
    }
}

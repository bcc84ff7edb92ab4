//! Forecast stabilization: anchoring and monotonic floor
//!
//! A damped trend may bend downwards once its momentum is damped away, and
//! its first forecast year need not line up with the last census. The raw
//! forecast is therefore rescaled so that its implied starting point equals
//! the last known volume, then floored so that demand never drops below the
//! highest level already reached.

use crate::error::{ForecastError, Result};
use crate::series::{AdjustedForecast, DenseSeries, RawForecast};

/// Scale factor that moves the raw forecast's implied base onto `last_value`.
///
/// The base is backed out from the first two forecast years: the first
/// value divided by the one-step ratio between them. When that base (or the
/// ratio itself) is not a positive finite number, the factor is `1.0`.
pub fn anchor_factor(raw: &[f64], last_value: f64) -> f64 {
    if raw.len() < 2 {
        return 1.0;
    }

    let ratio = raw[1] / raw[0];
    if !ratio.is_finite() || ratio <= 0.0 {
        return 1.0;
    }

    let base = raw[0] / ratio;
    if !base.is_finite() || base <= 0.0 {
        return 1.0;
    }

    let factor = last_value / base;
    if factor.is_finite() {
        factor
    } else {
        1.0
    }
}

/// Multiply every forecast value by the anchoring factor
pub fn anchor(raw: &[f64], last_value: f64) -> Vec<f64> {
    let factor = anchor_factor(raw, last_value);
    raw.iter().map(|v| v * factor).collect()
}

/// Replace every value below the running maximum by that maximum.
///
/// The running maximum starts at `floor`.
pub fn apply_floor(values: &[f64], floor: f64) -> Vec<f64> {
    let mut floor = floor;
    values
        .iter()
        .map(|&value| {
            if value < floor {
                floor
            } else {
                floor = value;
                value
            }
        })
        .collect()
}

/// Anchor the raw forecast to the last dense value, then floor it
pub fn stabilize(dense: &DenseSeries, raw: &RawForecast) -> Result<AdjustedForecast> {
    let (last_year, last_value) = dense.last();
    if raw.start_year() != last_year + 1 {
        return Err(ForecastError::ValidationError(format!(
            "Forecast starts in {} but history ends in {}",
            raw.start_year(),
            last_year
        )));
    }

    let factor = anchor_factor(raw.values(), last_value);
    let scaled: Vec<f64> = raw.values().iter().map(|v| v * factor).collect();
    let floored = apply_floor(&scaled, last_value);

    let lifted = scaled
        .iter()
        .zip(&floored)
        .filter(|(s, f)| s != f)
        .count();
    tracing::debug!(factor, floored_years = lifted, "Forecast stabilized");

    AdjustedForecast::new(raw.start_year(), floored)
}

//! Ordered trend-model fitting with fallback
//!
//! Candidates are tried in the order they were given. The first one that
//! trains and forecasts successfully is used; failures of the earlier
//! candidates are kept so the caller can report them.

use crate::error::{FitFailure, ForecastError, Result};
use crate::models::damped_trend::DampedTrend;
use crate::models::{ForecastModel, TrainedForecastModel};
use crate::series::{DenseSeries, RawForecast, HORIZON_YEARS};

/// Outcome of a successful fit
#[derive(Debug, Clone)]
pub struct TrendFit<T> {
    /// The model that produced the forecast
    pub trained: T,
    /// Forecast for the horizon, starting the year after the series ends
    pub raw: RawForecast,
    /// Candidates that failed before this one succeeded
    pub failures: Vec<FitFailure>,
}

/// Tries a list of forecast models in order
#[derive(Debug, Clone)]
pub struct TrendFitter<M: ForecastModel = DampedTrend> {
    candidates: Vec<M>,
    horizon: usize,
}

impl TrendFitter<DampedTrend> {
    /// Multiplicative damped trend first, additive damped trend as fallback
    pub fn damped(damping: f64, grid_step: f64) -> Result<Self> {
        let candidates = vec![
            DampedTrend::multiplicative(damping)?.with_grid_step(grid_step)?,
            DampedTrend::additive(damping)?.with_grid_step(grid_step)?,
        ];
        Self::new(candidates, HORIZON_YEARS)
    }
}

impl<M: ForecastModel> TrendFitter<M> {
    /// Create a fitter from candidates in order of preference
    pub fn new(candidates: Vec<M>, horizon: usize) -> Result<Self> {
        if candidates.is_empty() {
            return Err(ForecastError::InvalidParameter(
                "At least one candidate model is required".to_string(),
            ));
        }
        // Anchoring looks at the first two forecast years
        if horizon < 2 {
            return Err(ForecastError::InvalidParameter(
                "Forecast horizon must be at least 2 years".to_string(),
            ));
        }

        Ok(Self {
            candidates,
            horizon,
        })
    }

    pub fn candidates(&self) -> &[M] {
        &self.candidates
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// Fit the first candidate that works and forecast the horizon
    pub fn fit(&self, series: &DenseSeries) -> Result<TrendFit<M::Trained>> {
        let mut failures = Vec::new();

        for candidate in &self.candidates {
            let attempt = candidate.train(series).and_then(|trained| {
                let forecast = trained.forecast(self.horizon)?;
                let raw = forecast.into_raw_forecast(series.end_year() + 1)?;
                Ok((trained, raw))
            });

            match attempt {
                Ok((trained, raw)) => {
                    tracing::info!(
                        model = trained.name(),
                        fallbacks = failures.len(),
                        "Trend model selected"
                    );
                    return Ok(TrendFit {
                        trained,
                        raw,
                        failures,
                    });
                }
                Err(err) => {
                    tracing::warn!(model = candidate.name(), error = %err, "Trend model failed");
                    failures.push(FitFailure {
                        model: candidate.name().to_string(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        Err(ForecastError::FitFailed(failures))
    }
}

//! Damped-trend exponential smoothing models

use crate::error::{ForecastError, Result};
use crate::models::{ForecastModel, ForecastResult, TrainedForecastModel};
use crate::series::DenseSeries;
use traffic_math::smoothing::{DampedHolt, DampedParams, TrendKind};

/// Default damping applied to the trend
pub const DEFAULT_DAMPING: f64 = 0.8;

/// Default spacing of the alpha/beta search grid
pub const DEFAULT_GRID_STEP: f64 = 0.05;

/// Holt model with a fixed trend damping factor
#[derive(Debug, Clone)]
pub struct DampedTrend {
    /// Name of the model
    name: String,
    /// Additive or multiplicative trend
    kind: TrendKind,
    /// Trend damping factor
    damping: f64,
    /// Spacing of the smoothing parameter grid
    grid_step: f64,
}

/// Trained damped-trend model
#[derive(Debug, Clone)]
pub struct TrainedDampedTrend {
    /// Name of the model
    name: String,
    /// Smoother state after the last observation
    smoother: DampedHolt,
}

impl DampedTrend {
    /// Create a new damped-trend model
    pub fn new(kind: TrendKind, damping: f64) -> Result<Self> {
        if !(damping > 0.0 && damping <= 1.0) {
            return Err(ForecastError::InvalidParameter(
                "Damping must be in (0, 1]".to_string(),
            ));
        }

        Ok(Self {
            name: format!("Damped {} trend (phi={})", kind, damping),
            kind,
            damping,
            grid_step: DEFAULT_GRID_STEP,
        })
    }

    pub fn multiplicative(damping: f64) -> Result<Self> {
        Self::new(TrendKind::Multiplicative, damping)
    }

    pub fn additive(damping: f64) -> Result<Self> {
        Self::new(TrendKind::Additive, damping)
    }

    /// Use a different spacing for the alpha/beta search
    pub fn with_grid_step(mut self, grid_step: f64) -> Result<Self> {
        if !(grid_step > 0.0 && grid_step <= 0.5) {
            return Err(ForecastError::InvalidParameter(
                "Grid step must be in (0, 0.5]".to_string(),
            ));
        }
        self.grid_step = grid_step;
        Ok(self)
    }

    pub fn kind(&self) -> TrendKind {
        self.kind
    }

    pub fn damping(&self) -> f64 {
        self.damping
    }
}

impl ForecastModel for DampedTrend {
    type Trained = TrainedDampedTrend;

    fn train(&self, data: &DenseSeries) -> Result<Self::Trained> {
        let smoother = DampedHolt::fit_grid(self.kind, self.damping, data.values(), self.grid_step)?;

        let params = smoother.params();
        tracing::debug!(
            model = %self.name,
            alpha = params.alpha,
            beta = params.beta,
            sse = smoother.sse(),
            "Damped trend fitted"
        );

        Ok(TrainedDampedTrend {
            name: self.name.clone(),
            smoother,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedDampedTrend {
    /// Fitted smoothing parameters
    pub fn params(&self) -> DampedParams {
        self.smoother.params()
    }

    pub fn kind(&self) -> TrendKind {
        self.smoother.kind()
    }
}

impl TrainedForecastModel for TrainedDampedTrend {
    fn forecast(&self, horizon: usize) -> Result<ForecastResult> {
        let values = self.smoother.forecast_path(horizon)?;

        ForecastResult::new(values, horizon)
    }

    fn sse(&self) -> f64 {
        self.smoother.sse()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

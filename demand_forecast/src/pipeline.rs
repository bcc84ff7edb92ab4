//! End-to-end forecasting pipeline for one road segment
//!
//! observations -> dense series -> raw forecast -> adjusted forecast -> diagnosis

use crate::config::AppConfig;
use crate::data::SegmentRecord;
use crate::diagnostics::{Classifier, DiagnosticResult, KeywordRules, RoadProfile};
use crate::error::{FitFailure, Result};
use crate::fitting::TrendFitter;
use crate::models::damped_trend::{DampedTrend, DEFAULT_DAMPING, DEFAULT_GRID_STEP};
use crate::models::TrainedForecastModel;
use crate::report::{projection_table, Kpis, SegmentReport, SegmentSummary};
use crate::series::{AdjustedForecast, DenseSeries, ObservationSet, RawForecast};
use crate::stabilizer::stabilize;
use chrono::Utc;
use traffic_math::smoothing::DampedParams;

/// Everything computed for one segment
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    pub dense: DenseSeries,
    pub raw: RawForecast,
    pub adjusted: AdjustedForecast,
    /// Name of the trend model that was used
    pub model: String,
    pub params: DampedParams,
    /// Models tried and rejected before the one used
    pub fallbacks: Vec<FitFailure>,
    pub diagnostic: DiagnosticResult,
}

/// Stateless pipeline; one instance can serve any number of segments
#[derive(Debug, Clone)]
pub struct DemandPipeline {
    fitter: TrendFitter<DampedTrend>,
    rules: KeywordRules,
    classifier: Classifier,
}

impl DemandPipeline {
    pub fn new(fitter: TrendFitter<DampedTrend>, rules: KeywordRules, classifier: Classifier) -> Self {
        Self {
            fitter,
            rules,
            classifier,
        }
    }

    /// Pipeline with default damping, thresholds, and keywords
    pub fn with_defaults() -> Result<Self> {
        Ok(Self::new(
            TrendFitter::damped(DEFAULT_DAMPING, DEFAULT_GRID_STEP)?,
            KeywordRules::default(),
            Classifier::default(),
        ))
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(
            TrendFitter::damped(config.model.damping, config.model.grid_step)?,
            config.keyword_rules(),
            Classifier::new(config.thresholds()?),
        ))
    }

    pub fn rules(&self) -> &KeywordRules {
        &self.rules
    }

    /// Run the forecast and diagnosis for one observation set
    pub fn run(&self, observations: &ObservationSet, profile: RoadProfile) -> Result<PipelineOutput> {
        let dense = observations.densify()?;
        let fit = self.fitter.fit(&dense)?;
        let adjusted = stabilize(&dense, &fit.raw)?;
        let diagnostic = self.classifier.diagnose(&dense, &adjusted, profile)?;

        tracing::info!(
            current_year = diagnostic.current_year,
            current_volume = diagnostic.current_volume,
            saturation_year = ?diagnostic.saturation_year,
            category = ?diagnostic.category,
            "Segment diagnosed"
        );

        Ok(PipelineOutput {
            dense,
            raw: fit.raw,
            adjusted,
            model: fit.trained.name().to_string(),
            params: fit.trained.params(),
            fallbacks: fit.failures,
            diagnostic,
        })
    }

    /// Run the pipeline for a dataset record and build its report
    pub fn run_segment(&self, record: &SegmentRecord) -> Result<SegmentReport> {
        let span = tracing::info_span!("segment", road = %record.road_id, label = %record.label());
        let _guard = span.enter();

        let missing = record.missing_years();
        if !missing.is_empty() {
            tracing::warn!(?missing, "Census years without volume");
        }

        let observations = record.observations()?;
        let profile = record.profile(&self.rules);
        let output = self.run(&observations, profile)?;

        let kpis = Kpis::from_forecast(&output.adjusted, &output.diagnostic)?;
        let projection = projection_table(&output.dense, &output.adjusted);

        Ok(SegmentReport {
            segment: SegmentSummary::from(record),
            model: output.model,
            kpis,
            diagnostic: output.diagnostic,
            projection,
            history: output.dense,
            forecast: output.adjusted,
            generated_at: Utc::now(),
        })
    }
}

//! Segment report: KPIs, diagnosis, and the yearly projection table

use crate::data::SegmentRecord;
use crate::diagnostics::{DiagnosticResult, SHORT_TERM_YEARS};
use crate::error::{ForecastError, Result};
use crate::series::{AdjustedForecast, DenseSeries};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use traffic_math::growth::year_over_year_pct;

/// Descriptive fields of the reported segment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentSummary {
    pub road_id: String,
    pub official_road_id: String,
    pub road_name: String,
    pub station: String,
    pub sub_sector: Option<String>,
    pub classification: Option<String>,
    pub surface: String,
    pub carriageway: String,
}

impl From<&SegmentRecord> for SegmentSummary {
    fn from(record: &SegmentRecord) -> Self {
        Self {
            road_id: record.road_id.clone(),
            official_road_id: record.official_road_id.clone(),
            road_name: record.road_name.clone(),
            station: record.station.clone(),
            sub_sector: record.sub_sector.clone(),
            classification: record.classification.clone(),
            surface: record.surface.clone(),
            carriageway: record.carriageway.clone(),
        }
    }
}

/// Headline figures of a forecast
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Kpis {
    pub current_year: i32,
    pub current_volume: f64,
    pub short_term_year: i32,
    pub short_term_volume: f64,
    pub horizon_year: i32,
    pub horizon_volume: f64,
    pub short_term_growth_pct: f64,
    pub long_term_growth_pct: f64,
}

impl Kpis {
    pub fn from_forecast(adjusted: &AdjustedForecast, diagnostic: &DiagnosticResult) -> Result<Self> {
        let short_term_year = diagnostic.current_year + SHORT_TERM_YEARS;
        let short_term_volume = adjusted.get(short_term_year).ok_or_else(|| {
            ForecastError::ValidationError(format!(
                "Forecast does not cover the short-term year {}",
                short_term_year
            ))
        })?;
        let (horizon_year, horizon_volume) = adjusted.last();

        Ok(Self {
            current_year: diagnostic.current_year,
            current_volume: diagnostic.current_volume,
            short_term_year,
            short_term_volume,
            horizon_year,
            horizon_volume,
            short_term_growth_pct: diagnostic.growth.short_term_pct,
            long_term_growth_pct: diagnostic.growth.long_term_pct,
        })
    }
}

/// One line of the projection table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectionRow {
    pub year: i32,
    /// Projected volume, truncated to whole vehicles
    pub volume: i64,
    /// Change against the previous year, e.g. `"3.4%"`; `"-"` when undefined
    pub growth: String,
}

/// Projection table for the forecast horizon.
///
/// The first row's growth is measured against the last year of history.
pub fn projection_table(dense: &DenseSeries, adjusted: &AdjustedForecast) -> Vec<ProjectionRow> {
    let mut previous = dense.last().1;
    adjusted
        .iter()
        .map(|(year, value)| {
            let growth = match year_over_year_pct(previous, value) {
                Some(pct) => format!("{:.1}%", pct),
                None => "-".to_string(),
            };
            previous = value;
            ProjectionRow {
                year,
                volume: value as i64,
                growth,
            }
        })
        .collect()
}

/// Full report for one road segment
#[derive(Debug, Clone, Serialize)]
pub struct SegmentReport {
    pub segment: SegmentSummary,
    /// Trend model that produced the forecast
    pub model: String,
    pub kpis: Kpis,
    pub diagnostic: DiagnosticResult,
    pub projection: Vec<ProjectionRow>,
    pub history: DenseSeries,
    pub forecast: AdjustedForecast,
    pub generated_at: DateTime<Utc>,
}

impl SegmentReport {
    /// Serialize the report as pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for SegmentReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.segment;
        let k = &self.kpis;

        writeln!(f, "Road demand report: {}", s.road_name)?;
        writeln!(f, "  Official road id: {}", s.official_road_id)?;
        writeln!(f, "  Station:          {}", s.station)?;
        if let Some(sector) = &s.sub_sector {
            writeln!(f, "  Sector:           {}", sector)?;
        }
        writeln!(f, "  Surface:          {}", s.surface)?;
        if let Some(classification) = &s.classification {
            writeln!(f, "  Classification:   {}", classification)?;
        }
        writeln!(f, "  Carriageway:      {}", s.carriageway)?;
        writeln!(f, "  Model:            {}", self.model)?;
        writeln!(f)?;

        writeln!(
            f,
            "Census {}:      {} veh/day",
            k.current_year, k.current_volume as i64
        )?;
        writeln!(
            f,
            "Projection {}:  {} veh/day ({:.2}%/yr)",
            k.short_term_year, k.short_term_volume as i64, k.short_term_growth_pct
        )?;
        writeln!(
            f,
            "Projection {}:  {} veh/day ({:.2}%/yr)",
            k.horizon_year, k.horizon_volume as i64, k.long_term_growth_pct
        )?;
        match self.diagnostic.saturation_year {
            Some(year) => writeln!(f, "Saturation year:  {}", year)?,
            None => writeln!(f, "Saturation year:  none within horizon")?,
        }
        writeln!(f)?;

        writeln!(
            f,
            "[{}] {}: {}",
            self.diagnostic.severity(),
            self.diagnostic.category.title(),
            self.diagnostic.message()
        )?;
        writeln!(f)?;

        writeln!(f, "{:>6}  {:>10}  {:>8}", "Year", "veh/day", "Growth")?;
        for row in &self.projection {
            writeln!(f, "{:>6}  {:>10}  {:>8}", row.year, row.volume, row.growth)?;
        }
        Ok(())
    }
}

//! Growth rates, saturation search, and intervention classification
//!
//! The free-text surface and carriageway descriptions of a segment are first
//! normalized into [`RoadProfile`]; the decision tree in [`Classifier`] only
//! ever sees that tagged form.

use crate::error::{ForecastError, Result};
use crate::series::{AdjustedForecast, DenseSeries};
use serde::{Deserialize, Serialize};
use std::fmt;
use traffic_math::growth::annualized_growth_pct;

/// Volume (veh/day) above which a single carriageway is over capacity
pub const SATURATION_THRESHOLD: f64 = 5000.0;

/// Volume (veh/day) above which an unpaved road should be paved
pub const PAVING_THRESHOLD: f64 = 300.0;

/// Offset in years of the short-term KPI
pub const SHORT_TERM_YEARS: i32 = 2;

/// Keywords that mark a surface as earth, gravel, or soil
pub const DEFAULT_UNPAVED_KEYWORDS: [&str; 8] = [
    "TIERRA", "RIPIO", "GRAVA", "SUELO", "EARTH", "GRAVEL", "SOIL", "DIRT",
];

/// Keywords that mark a road as dual carriageway
pub const DEFAULT_DUAL_KEYWORDS: [&str; 2] = ["DOBLE", "DUAL"];

/// Pavement surface class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceType {
    Unpaved,
    Paved,
}

/// Carriageway configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CarriagewayType {
    Single,
    Dual,
}

/// Keyword lists used to normalize free-text descriptions
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordRules {
    unpaved: Vec<String>,
    dual: Vec<String>,
}

impl Default for KeywordRules {
    fn default() -> Self {
        Self::new(DEFAULT_UNPAVED_KEYWORDS, DEFAULT_DUAL_KEYWORDS)
    }
}

impl KeywordRules {
    /// Matching is case-insensitive; blank keywords are ignored
    pub fn new<U, D>(unpaved: U, dual: D) -> Self
    where
        U: IntoIterator,
        U::Item: AsRef<str>,
        D: IntoIterator,
        D::Item: AsRef<str>,
    {
        fn normalize<I>(words: I) -> Vec<String>
        where
            I: IntoIterator,
            I::Item: AsRef<str>,
        {
            words
                .into_iter()
                .map(|w| w.as_ref().trim().to_uppercase())
                .filter(|w| !w.is_empty())
                .collect()
        }

        Self {
            unpaved: normalize(unpaved),
            dual: normalize(dual),
        }
    }

    fn mentions(keywords: &[String], text: &str) -> bool {
        let text = text.to_uppercase();
        keywords.iter().any(|k| text.contains(k.as_str()))
    }
}

/// Normalized classification inputs for one segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoadProfile {
    pub surface: SurfaceType,
    pub carriageway: CarriagewayType,
}

impl RoadProfile {
    pub fn new(surface: SurfaceType, carriageway: CarriagewayType) -> Self {
        Self {
            surface,
            carriageway,
        }
    }

    /// Derive the profile from the raw surface and carriageway descriptions.
    ///
    /// A dual keyword counts in either description.
    pub fn from_descriptions(surface: &str, carriageway: &str, rules: &KeywordRules) -> Self {
        let surface_type = if KeywordRules::mentions(&rules.unpaved, surface) {
            SurfaceType::Unpaved
        } else {
            SurfaceType::Paved
        };

        let carriageway_type = if KeywordRules::mentions(&rules.dual, surface)
            || KeywordRules::mentions(&rules.dual, carriageway)
        {
            CarriagewayType::Dual
        } else {
            CarriagewayType::Single
        };

        Self::new(surface_type, carriageway_type)
    }
}

/// Annualized growth rates, in percent
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GrowthRates {
    /// From the current year to the short-term year
    pub short_term_pct: f64,
    /// From the short-term year to the end of the horizon
    pub long_term_pct: f64,
}

impl GrowthRates {
    /// Growth from `current` to `short_term` over `short_years`, and from
    /// `short_term` to `horizon` over the remaining years.
    pub fn compute(
        current: f64,
        short_term: f64,
        horizon: f64,
        short_years: u32,
        horizon_years: u32,
    ) -> Self {
        Self {
            short_term_pct: annualized_growth_pct(current, short_term, short_years),
            long_term_pct: annualized_growth_pct(
                short_term,
                horizon,
                horizon_years.saturating_sub(short_years),
            ),
        }
    }
}

/// First year at or after `from_year` whose volume reaches `threshold`.
///
/// Years before `from_year` are ignored on purpose: a past excursion above
/// the threshold that has since subsided does not count.
pub fn find_saturation_year<I>(points: I, from_year: i32, threshold: f64) -> Option<i32>
where
    I: IntoIterator<Item = (i32, f64)>,
{
    let mut candidates: Vec<(i32, f64)> = points
        .into_iter()
        .filter(|(year, _)| *year >= from_year)
        .collect();
    candidates.sort_by_key(|(year, _)| *year);

    candidates
        .into_iter()
        .find(|(_, volume)| *volume >= threshold)
        .map(|(year, _)| year)
}

/// How urgently a category should be acted upon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    Warning,
    Ok,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Critical => write!(f, "CRITICAL"),
            Severity::Warning => write!(f, "WARNING"),
            Severity::Ok => write!(f, "OK"),
        }
    }
}

/// Recommended intervention for a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum InterventionCategory {
    /// Unpaved road above the paving threshold
    PavingPriority,
    /// Unpaved road with low traffic
    Maintain,
    /// Single carriageway already over capacity
    SaturatedNow,
    /// Single carriageway projected to saturate in `year`
    FutureAlert { year: i32 },
    /// Single carriageway with enough capacity over the horizon
    NormalOperation,
    /// Dual carriageway
    AdequateStandard,
}

impl InterventionCategory {
    pub fn severity(&self) -> Severity {
        match self {
            InterventionCategory::PavingPriority | InterventionCategory::SaturatedNow => {
                Severity::Critical
            }
            InterventionCategory::FutureAlert { .. } => Severity::Warning,
            InterventionCategory::Maintain
            | InterventionCategory::NormalOperation
            | InterventionCategory::AdequateStandard => Severity::Ok,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            InterventionCategory::PavingPriority => "HIGH PRIORITY",
            InterventionCategory::Maintain => "MAINTENANCE",
            InterventionCategory::SaturatedNow => "SATURATION",
            InterventionCategory::FutureAlert { .. } => "ALERT",
            InterventionCategory::NormalOperation => "NORMAL OPERATION",
            InterventionCategory::AdequateStandard => "ADEQUATE STANDARD",
        }
    }

    /// Human-readable recommendation for the census year and volume
    pub fn message(&self, current_year: i32, current_volume: f64) -> String {
        let volume = current_volume as i64;
        match self {
            InterventionCategory::PavingPriority => format!(
                "Granular road carrying {} veh/day exceeds the paving threshold. Paving is recommended.",
                volume
            ),
            InterventionCategory::Maintain => format!(
                "Low traffic ({} veh/day). Keep the surface graded.",
                volume
            ),
            InterventionCategory::SaturatedNow => format!(
                "Single carriageway carrying {} veh/day. A second carriageway study is suggested.",
                volume
            ),
            InterventionCategory::FutureAlert { year } if *year <= current_year => format!(
                "Single carriageway carrying {} veh/day has reached its capacity in {}. Plan the widening now.",
                volume, year
            ),
            InterventionCategory::FutureAlert { year } => format!(
                "Saturation projected for {}. Plan the widening before then.",
                year
            ),
            InterventionCategory::NormalOperation => "Capacity is sufficient.".to_string(),
            InterventionCategory::AdequateStandard => {
                "Dual carriageway matches the demand.".to_string()
            }
        }
    }
}

/// Volume thresholds used by the classifier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Single-carriageway capacity, veh/day
    pub saturation: f64,
    /// Paving threshold for unpaved roads, veh/day
    pub paving: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            saturation: SATURATION_THRESHOLD,
            paving: PAVING_THRESHOLD,
        }
    }
}

impl Thresholds {
    pub fn new(saturation: f64, paving: f64) -> Result<Self> {
        if !(saturation.is_finite() && saturation > 0.0) {
            return Err(ForecastError::InvalidParameter(
                "Saturation threshold must be positive".to_string(),
            ));
        }
        if !(paving.is_finite() && paving > 0.0) {
            return Err(ForecastError::InvalidParameter(
                "Paving threshold must be positive".to_string(),
            ));
        }
        Ok(Self { saturation, paving })
    }
}

/// Decision tree from profile and volumes to an intervention category
#[derive(Debug, Clone, Copy, Default)]
pub struct Classifier {
    thresholds: Thresholds,
}

impl Classifier {
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    pub fn classify(
        &self,
        profile: RoadProfile,
        current_volume: f64,
        saturation_year: Option<i32>,
    ) -> InterventionCategory {
        match (profile.surface, profile.carriageway) {
            (SurfaceType::Unpaved, _) => {
                if current_volume > self.thresholds.paving {
                    InterventionCategory::PavingPriority
                } else {
                    InterventionCategory::Maintain
                }
            }
            (SurfaceType::Paved, CarriagewayType::Dual) => InterventionCategory::AdequateStandard,
            (SurfaceType::Paved, CarriagewayType::Single) => {
                if current_volume > self.thresholds.saturation {
                    InterventionCategory::SaturatedNow
                } else if let Some(year) = saturation_year {
                    InterventionCategory::FutureAlert { year }
                } else {
                    InterventionCategory::NormalOperation
                }
            }
        }
    }

    /// Compute growth rates, saturation year, and category for a forecast
    pub fn diagnose(
        &self,
        dense: &DenseSeries,
        adjusted: &AdjustedForecast,
        profile: RoadProfile,
    ) -> Result<DiagnosticResult> {
        let (current_year, current_volume) = dense.last();
        let short_year = current_year + SHORT_TERM_YEARS;
        let (horizon_year, horizon_volume) = adjusted.last();

        let short_volume = adjusted.get(short_year).ok_or_else(|| {
            ForecastError::ValidationError(format!(
                "Forecast does not cover the short-term year {}",
                short_year
            ))
        })?;

        let growth = GrowthRates::compute(
            current_volume,
            short_volume,
            horizon_volume,
            SHORT_TERM_YEARS as u32,
            (horizon_year - current_year).max(0) as u32,
        );

        let saturation_year = find_saturation_year(
            dense.iter().chain(adjusted.iter()),
            current_year,
            self.thresholds.saturation,
        );

        let category = self.classify(profile, current_volume, saturation_year);

        Ok(DiagnosticResult {
            current_year,
            current_volume,
            growth,
            saturation_year,
            category,
        })
    }
}

/// Diagnosis of one segment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosticResult {
    /// Last census year
    pub current_year: i32,
    /// Volume in the last census year
    pub current_volume: f64,
    pub growth: GrowthRates,
    /// First year from the current one on that reaches saturation
    pub saturation_year: Option<i32>,
    pub category: InterventionCategory,
}

impl DiagnosticResult {
    pub fn severity(&self) -> Severity {
        self.category.severity()
    }

    pub fn message(&self) -> String {
        self.category.message(self.current_year, self.current_volume)
    }
}

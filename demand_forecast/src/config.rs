//! Runtime configuration, read from a TOML file
//!
//! Every section and key is optional; missing values fall back to the
//! defaults below.

use crate::diagnostics::{
    KeywordRules, Thresholds, DEFAULT_DUAL_KEYWORDS, DEFAULT_UNPAVED_KEYWORDS, PAVING_THRESHOLD,
    SATURATION_THRESHOLD,
};
use crate::error::{ForecastError, Result};
use crate::models::damped_trend::{DEFAULT_DAMPING, DEFAULT_GRID_STEP};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_CONFIG_PATH: &str = "config/road_report.toml";
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub dataset: DatasetSection,
    pub logging: LoggingSection,
    pub model: ModelSection,
    pub diagnostic: DiagnosticSection,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct DatasetSection {
    /// CSV file with one row per road segment
    pub path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct LoggingSection {
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ModelSection {
    /// Trend damping factor, in (0, 1]
    pub damping: f64,
    /// Spacing of the alpha/beta search grid, in (0, 0.5]
    pub grid_step: f64,
}

impl Default for ModelSection {
    fn default() -> Self {
        Self {
            damping: DEFAULT_DAMPING,
            grid_step: DEFAULT_GRID_STEP,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DiagnosticSection {
    pub saturation_threshold: f64,
    pub paving_threshold: f64,
    pub unpaved_keywords: Vec<String>,
    pub dual_keywords: Vec<String>,
}

impl Default for DiagnosticSection {
    fn default() -> Self {
        Self {
            saturation_threshold: SATURATION_THRESHOLD,
            paving_threshold: PAVING_THRESHOLD,
            unpaved_keywords: DEFAULT_UNPAVED_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            dual_keywords: DEFAULT_DUAL_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

pub fn load_default() -> Result<AppConfig> {
    load_from_path(DEFAULT_CONFIG_PATH)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<AppConfig> {
    let contents = std::fs::read_to_string(path)?;
    AppConfig::from_toml(&contents)
}

impl AppConfig {
    /// Parse and validate a TOML document
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let damping = self.model.damping;
        if !(damping > 0.0 && damping <= 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "model.damping must be in (0, 1], got {}",
                damping
            )));
        }
        let grid_step = self.model.grid_step;
        if !(grid_step > 0.0 && grid_step <= 0.5) {
            return Err(ForecastError::InvalidParameter(format!(
                "model.grid_step must be in (0, 0.5], got {}",
                grid_step
            )));
        }
        self.thresholds()?;
        self.log_level()?;
        Ok(())
    }

    pub fn dataset_path(&self) -> Option<&Path> {
        let path = self.dataset.path.as_deref()?;
        if path.as_os_str().is_empty() {
            None
        } else {
            Some(path)
        }
    }

    pub fn log_level(&self) -> Result<tracing::Level> {
        tracing::Level::from_str(self.logging.level.trim()).map_err(|_| {
            ForecastError::InvalidParameter(format!(
                "logging.level '{}' is not one of trace, debug, info, warn, error",
                self.logging.level
            ))
        })
    }

    pub fn thresholds(&self) -> Result<Thresholds> {
        Thresholds::new(
            self.diagnostic.saturation_threshold,
            self.diagnostic.paving_threshold,
        )
    }

    pub fn keyword_rules(&self) -> KeywordRules {
        KeywordRules::new(&self.diagnostic.unpaved_keywords, &self.diagnostic.dual_keywords)
    }
}

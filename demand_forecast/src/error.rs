//! Error types for the demand_forecast crate

use std::fmt;
use thiserror::Error;

/// One trend model that could not produce a forecast
#[derive(Debug, Clone, PartialEq)]
pub struct FitFailure {
    /// Name of the model that was attempted
    pub model: String,
    /// Why it failed
    pub reason: String,
}

impl fmt::Display for FitFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.model, self.reason)
    }
}

fn describe_failures(failures: &[FitFailure]) -> String {
    if failures.is_empty() {
        return "no candidate models configured".to_string();
    }
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Custom error types for the demand_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Error related to data validation or processing
    #[error("Data error: {0}")]
    DataError(String),

    /// A column the dataset cannot be read without
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// Too few usable census observations to build a series
    #[error("Insufficient observations: found {found}, need at least {required}")]
    InsufficientObservations { found: usize, required: usize },

    /// A census volume that is negative or not a number
    #[error("Invalid observation for {year}: {value}")]
    InvalidObservation { year: i32, value: f64 },

    /// Every candidate trend model failed
    #[error("Trend fitting failed: {}", describe_failures(.0))]
    FitFailed(Vec<FitFailure>),

    /// Error related to parameter validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error from mathematical operations
    #[error("Math error: {0}")]
    MathError(#[from] traffic_math::MathError),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from CSV parsing
    #[error("CSV error: {0}")]
    CsvError(String),

    /// Error from configuration parsing
    #[error("Config error: {0}")]
    ConfigError(String),

    /// Error from JSON serialization
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<csv::Error> for ForecastError {
    fn from(err: csv::Error) -> Self {
        ForecastError::CsvError(err.to_string())
    }
}

impl From<toml::de::Error> for ForecastError {
    fn from(err: toml::de::Error) -> Self {
        ForecastError::ConfigError(err.to_string())
    }
}

impl From<serde_json::Error> for ForecastError {
    fn from(err: serde_json::Error) -> Self {
        ForecastError::SerializationError(err.to_string())
    }
}

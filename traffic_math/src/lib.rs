//! # Traffic Math
//!
//! Numerical building blocks for traffic demand forecasting.
//! This crate provides the compound-growth interpolation used to densify
//! sparse census observations, damped-trend exponential smoothing, and the
//! growth-rate helpers shared by the forecasting pipeline.

use thiserror::Error;

pub mod growth;
pub mod interpolation;
pub mod smoothing;

/// Errors that can occur in traffic-related calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for traffic math operations
pub type Result<T> = std::result::Result<T, MathError>;

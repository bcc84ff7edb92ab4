//! # Demand Forecast
//!
//! Traffic demand forecasting and pavement intervention diagnosis for a
//! single road segment.
//!
//! ## Features
//!
//! - Geometric interpolation of sparse census years into a dense history
//! - Damped-trend forecasting over a fixed 21-year horizon, multiplicative
//!   first with an additive fallback
//! - Anchoring of the forecast to the last census and a monotonic floor
//! - Growth rates, saturation year, and an intervention category
//! - CSV-backed segment dataset and a plain-text / JSON report
//!
//! ## Quick Start
//!
//! ```rust
//! use demand_forecast::diagnostics::{CarriagewayType, RoadProfile, SurfaceType};
//! use demand_forecast::{DemandPipeline, ObservationSet};
//!
//! let observations = ObservationSet::new([
//!     (2015, 1000.0),
//!     (2017, 1200.0),
//!     (2018, 1300.0),
//!     (2020, 1600.0),
//!     (2022, 2000.0),
//!     (2024, 2500.0),
//! ])?;
//!
//! let pipeline = DemandPipeline::with_defaults()?;
//! let profile = RoadProfile::new(SurfaceType::Paved, CarriagewayType::Single);
//! let output = pipeline.run(&observations, profile)?;
//!
//! assert_eq!(output.adjusted.end_year(), 2045);
//! println!("{}", output.diagnostic.message());
//! # Ok::<(), demand_forecast::ForecastError>(())
//! ```

pub mod config;
pub mod data;
pub mod diagnostics;
pub mod error;
pub mod fitting;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod series;
pub mod stabilizer;

// Re-export commonly used types
pub use crate::config::AppConfig;
pub use crate::data::{DataLoader, InMemorySegmentRepository, SegmentRecord, SegmentRepository};
pub use crate::diagnostics::{DiagnosticResult, InterventionCategory, RoadProfile};
pub use crate::error::ForecastError;
pub use crate::models::{ForecastModel, ForecastResult, TrainedForecastModel};
pub use crate::pipeline::{DemandPipeline, PipelineOutput};
pub use crate::report::SegmentReport;
pub use crate::series::{AdjustedForecast, DenseSeries, ObservationSet, RawForecast};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

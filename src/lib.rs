//! # Road Demand
//!
//! `road_demand` bundles the workspace crates: [`traffic_math`] for the
//! numeric building blocks and [`demand_forecast`] for the segment
//! pipeline, dataset access and reports.
//!
//! ## Example
//!
//! ```
//! use road_demand::traffic_math::interpolation::geometric_fill;
//!
//! let dense = geometric_fill(&[(2020, 100.0), (2022, 121.0)]).unwrap();
//! assert_eq!(dense.len(), 3);
//! assert!((dense[1].1 - 110.0).abs() < 1e-9);
//! ```

pub use demand_forecast;
pub use traffic_math;

pub use demand_forecast::{
    DataLoader, DemandPipeline, ForecastError, ObservationSet, RoadProfile, SegmentReport,
    SegmentRepository,
};

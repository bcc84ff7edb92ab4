//! Yearly traffic series: sparse census observations, the dense history
//! built from them, and the raw and adjusted forecasts.

use crate::error::{ForecastError, Result};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::ops::Deref;
use traffic_math::interpolation::geometric_fill;

/// Number of years forecast after the last census
pub const HORIZON_YEARS: usize = 21;

/// Minimum number of census observations needed to build a series
pub const MIN_OBSERVATIONS: usize = 2;

/// Earliest census year accepted in an observation set
pub const MIN_CENSUS_YEAR: i32 = 1900;

/// Latest census year accepted in an observation set
pub const MAX_CENSUS_YEAR: i32 = 2200;

/// Contiguous annual series of volumes starting at `start_year`.
///
/// Never empty and never holds a non-finite value.
#[derive(Debug, Clone, PartialEq)]
pub struct YearSeries {
    start_year: i32,
    values: Vec<f64>,
}

impl YearSeries {
    /// Create a new series; one value per consecutive year from `start_year`
    pub fn new(start_year: i32, values: Vec<f64>) -> Result<Self> {
        if values.is_empty() {
            return Err(ForecastError::ValidationError(
                "A yearly series needs at least one value".to_string(),
            ));
        }
        if let Some((offset, value)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(ForecastError::ValidationError(format!(
                "Non-finite volume {} for year {}",
                value,
                start_year + offset as i32
            )));
        }

        Ok(Self { start_year, values })
    }

    pub fn start_year(&self) -> i32 {
        self.start_year
    }

    pub fn end_year(&self) -> i32 {
        self.start_year + self.values.len() as i32 - 1
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Volumes in year order
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Volume for `year`, if it lies inside the series
    pub fn get(&self, year: i32) -> Option<f64> {
        if year < self.start_year {
            return None;
        }
        self.values.get((year - self.start_year) as usize).copied()
    }

    /// `(year, volume)` pairs in year order
    pub fn iter(&self) -> impl Iterator<Item = (i32, f64)> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(move |(offset, value)| (self.start_year + offset as i32, *value))
    }

    /// Last year and its volume
    pub fn last(&self) -> (i32, f64) {
        (self.end_year(), self.values[self.values.len() - 1])
    }

    pub fn to_map(&self) -> BTreeMap<i32, f64> {
        self.iter().collect()
    }
}

/// Serialized as a `year -> volume` map
impl Serialize for YearSeries {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

macro_rules! year_series_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Serialize)]
        #[serde(transparent)]
        pub struct $name(YearSeries);

        impl Deref for $name {
            type Target = YearSeries;

            fn deref(&self) -> &YearSeries {
                &self.0
            }
        }

        impl $name {
            /// Unwrap into the underlying yearly series
            pub fn into_inner(self) -> YearSeries {
                self.0
            }
        }
    };
}

year_series_newtype!(
    /// Every year between the first and last census, gaps interpolated
    DenseSeries
);

year_series_newtype!(
    /// Model output for the horizon, before any adjustment
    RawForecast
);

year_series_newtype!(
    /// Forecast after anchoring and flooring; never decreases year over year
    AdjustedForecast
);

impl DenseSeries {
    /// Wrap an already contiguous series of at least two years
    pub fn new(start_year: i32, values: Vec<f64>) -> Result<Self> {
        if values.len() < MIN_OBSERVATIONS {
            return Err(ForecastError::InsufficientObservations {
                found: values.len(),
                required: MIN_OBSERVATIONS,
            });
        }
        Ok(Self(YearSeries::new(start_year, values)?))
    }
}

impl RawForecast {
    pub fn new(start_year: i32, values: Vec<f64>) -> Result<Self> {
        Ok(Self(YearSeries::new(start_year, values)?))
    }
}

impl AdjustedForecast {
    /// Build an adjusted forecast, checking that it never decreases
    pub fn new(start_year: i32, values: Vec<f64>) -> Result<Self> {
        if let Some(pos) = values.windows(2).position(|w| w[1] < w[0]) {
            return Err(ForecastError::ValidationError(format!(
                "Adjusted forecast decreases in {}",
                start_year + pos as i32 + 1
            )));
        }
        Ok(Self(YearSeries::new(start_year, values)?))
    }
}

/// Sparse census observations for one road segment.
///
/// Holds at least two years; every volume is finite and non-negative.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObservationSet {
    points: BTreeMap<i32, f64>,
}

impl ObservationSet {
    /// Build an observation set from `(year, volume)` pairs.
    ///
    /// Negative or non-finite volumes are treated as a data-quality error,
    /// since a fractional power of a negative ratio has no real value.
    /// Years must lie in `MIN_CENSUS_YEAR..=MAX_CENSUS_YEAR`, which also
    /// bounds the length of the dense series.
    pub fn new<I>(points: I) -> Result<Self>
    where
        I: IntoIterator<Item = (i32, f64)>,
    {
        let mut map = BTreeMap::new();
        for (year, value) in points {
            if !(MIN_CENSUS_YEAR..=MAX_CENSUS_YEAR).contains(&year) {
                return Err(ForecastError::ValidationError(format!(
                    "Census year {} outside {}..={}",
                    year, MIN_CENSUS_YEAR, MAX_CENSUS_YEAR
                )));
            }
            if !value.is_finite() || value < 0.0 {
                return Err(ForecastError::InvalidObservation { year, value });
            }
            if map.insert(year, value).is_some() {
                return Err(ForecastError::ValidationError(format!(
                    "Duplicate observation for year {}",
                    year
                )));
            }
        }

        if map.len() < MIN_OBSERVATIONS {
            return Err(ForecastError::InsufficientObservations {
                found: map.len(),
                required: MIN_OBSERVATIONS,
            });
        }

        Ok(Self { points: map })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, year: i32) -> Option<f64> {
        self.points.get(&year).copied()
    }

    /// `(year, volume)` pairs in ascending year order
    pub fn iter(&self) -> impl Iterator<Item = (i32, f64)> + '_ {
        self.points.iter().map(|(y, v)| (*y, *v))
    }

    pub fn first_year(&self) -> i32 {
        self.iter().next().map(|(y, _)| y).unwrap_or_default()
    }

    pub fn last_year(&self) -> i32 {
        self.last().0
    }

    /// Most recent census year and its volume
    pub fn last(&self) -> (i32, f64) {
        self.points
            .iter()
            .next_back()
            .map(|(y, v)| (*y, *v))
            .unwrap_or_default()
    }

    /// Fill the gaps between census years with compound growth
    pub fn densify(&self) -> Result<DenseSeries> {
        let points: Vec<(i32, f64)> = self.iter().collect();
        let dense = geometric_fill(&points)?;
        let start_year = dense.first().map(|(y, _)| *y).unwrap_or_default();
        DenseSeries::new(start_year, dense.into_iter().map(|(_, v)| v).collect())
    }
}

//! Road segment records and the dataset they are loaded from
//!
//! The dataset is a CSV export with one row per road segment: identifiers,
//! descriptive fields and one `TMDA <year>` column per census campaign.
//! It is read once into an immutable [`InMemorySegmentRepository`] that is
//! handed to whoever needs to look segments up.

use crate::diagnostics::{KeywordRules, RoadProfile};
use crate::error::{ForecastError, Result};
use crate::series::ObservationSet;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Census campaigns present in the dataset
pub const CENSUS_YEARS: [i32; 6] = [2015, 2017, 2018, 2020, 2022, 2024];

/// Canonical identifier for route 115
pub const ROUTE_115_CANONICAL: &str = "Ruta 115 CH";

/// Spellings of route 115 found in the source spreadsheets
pub const ROUTE_115_VARIANTS: [&str; 5] =
    ["115 Canales", "115 CANALES", "115-Canales", "115 CH", "115-CH"];

/// Carriageway text used when the dataset has no carriageway column
pub const UNKNOWN_CARRIAGEWAY: &str = "No Inf";

const ROAD_ID_HEADERS: &[&str] = &["ROL"];
const OFFICIAL_ID_HEADERS: &[&str] = &["ROL NUEVO"];
const ROAD_NAME_HEADERS: &[&str] = &["NOMBRE DEL CAMINO"];
const STATION_HEADERS: &[&str] = &["ESTACIÓN", "ESTACION"];
const SECTOR_HEADERS: &[&str] = &["SECTOR"];
const CLASSIFICATION_HEADERS: &[&str] = &["CLASIFICACIÓN", "CLASIFICACION"];
const SURFACE_HEADERS: &[&str] = &["TIPO DE CARPETA"];
const CARRIAGEWAY_HEADERS: &[&str] = &["CALZADA"];

/// Header of the volume column for a census year
pub fn volume_column(year: i32) -> String {
    format!("TMDA {}", year)
}

/// Trim a road identifier and map known variants to their canonical form
pub fn normalize_road_id(raw: &str) -> String {
    let trimmed = raw.trim();
    if ROUTE_115_VARIANTS.contains(&trimmed) {
        ROUTE_115_CANONICAL.to_string()
    } else {
        trimmed.to_string()
    }
}

/// One road segment as read from the dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentRecord {
    /// Road identifier used for selection
    pub road_id: String,
    /// Official road identifier
    pub official_road_id: String,
    /// Road name
    pub road_name: String,
    /// Counting station label
    pub station: String,
    /// Sub-sector label, when the road is split further
    pub sub_sector: Option<String>,
    /// Functional classification of the road
    pub classification: Option<String>,
    /// Pavement surface description
    pub surface: String,
    /// Carriageway description
    pub carriageway: String,
    /// Census volume per year; `None` when the cell is blank or unreadable
    pub volumes: BTreeMap<i32, Option<f64>>,
    /// Raw text of volume cells that are not numbers, by year
    #[serde(default)]
    pub unreadable: BTreeMap<i32, String>,
}

impl SegmentRecord {
    /// Label shown when picking a segment of a road
    pub fn label(&self) -> String {
        match &self.sub_sector {
            Some(sector) => format!("{} ({}, {})", self.road_name, self.station, sector),
            None => format!("{} ({})", self.road_name, self.station),
        }
    }

    /// Census years left blank in the dataset
    pub fn missing_years(&self) -> Vec<i32> {
        self.volumes
            .iter()
            .filter(|(year, v)| v.is_none() && !self.unreadable.contains_key(year))
            .map(|(y, _)| *y)
            .collect()
    }

    /// Usable census volumes of this segment.
    ///
    /// Fails if any volume cell could not be read as a number; blank
    /// cells are skipped.
    pub fn observations(&self) -> Result<ObservationSet> {
        if let Some((year, cell)) = self.unreadable.iter().next() {
            return Err(ForecastError::DataError(format!(
                "Unreadable volume '{}' for {} in segment {}",
                cell,
                year,
                self.label()
            )));
        }

        ObservationSet::new(
            self.volumes
                .iter()
                .filter_map(|(year, value)| value.map(|v| (*year, v))),
        )
    }

    /// Surface and carriageway classes of this segment
    pub fn profile(&self, rules: &KeywordRules) -> RoadProfile {
        RoadProfile::from_descriptions(&self.surface, &self.carriageway, rules)
    }
}

/// Read-only access to road segments
pub trait SegmentRepository {
    /// Distinct road identifiers, sorted
    fn roads(&self) -> Vec<&str>;

    /// Segments of one road, in dataset order
    fn segments(&self, road_id: &str) -> Vec<&SegmentRecord>;

    /// Segment of `road_id` whose label is `label`
    fn find(&self, road_id: &str, label: &str) -> Option<&SegmentRecord> {
        self.segments(road_id)
            .into_iter()
            .find(|record| record.label() == label)
    }
}

/// Segments held in memory, loaded once
#[derive(Debug, Clone, Default)]
pub struct InMemorySegmentRepository {
    records: Vec<SegmentRecord>,
}

impl InMemorySegmentRepository {
    pub fn new(records: Vec<SegmentRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[SegmentRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl SegmentRepository for InMemorySegmentRepository {
    fn roads(&self) -> Vec<&str> {
        let roads: BTreeSet<&str> = self.records.iter().map(|r| r.road_id.as_str()).collect();
        roads.into_iter().collect()
    }

    fn segments(&self, road_id: &str) -> Vec<&SegmentRecord> {
        self.records
            .iter()
            .filter(|r| r.road_id == road_id)
            .collect()
    }
}

/// Data loader for the segment dataset
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load segments from a CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<InMemorySegmentRepository> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let repository = Self::from_reader(file)?;

        tracing::info!(
            path = %path.display(),
            segments = repository.len(),
            "Segment dataset loaded"
        );
        Ok(repository)
    }

    /// Load segments from any CSV source
    pub fn from_reader<R: Read>(reader: R) -> Result<InMemorySegmentRepository> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let layout = ColumnLayout::detect(&headers)?;

        let mut records = Vec::new();
        for (index, row) in csv_reader.records().enumerate() {
            let row = row?;
            // Header is line 1
            let line = index + 2;
            match layout.parse_row(&row, line) {
                Some(record) => records.push(record),
                None => tracing::warn!(line, "Skipping row without road identifier"),
            }
        }

        Ok(InMemorySegmentRepository::new(records))
    }
}

/// Column positions found in the header row
#[derive(Debug)]
struct ColumnLayout {
    road_id: usize,
    official_road_id: Option<usize>,
    road_name: usize,
    station: usize,
    sub_sector: Option<usize>,
    classification: Option<usize>,
    surface: usize,
    carriageway: Option<usize>,
    volumes: Vec<(i32, usize)>,
}

impl ColumnLayout {
    fn detect(headers: &csv::StringRecord) -> Result<Self> {
        let names: Vec<String> = headers
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_uppercase())
            .collect();

        let find = |aliases: &[&str]| -> Option<usize> {
            names
                .iter()
                .position(|name| aliases.iter().any(|alias| name == &alias.to_uppercase()))
        };
        let require = |aliases: &[&str]| -> Result<usize> {
            find(aliases).ok_or_else(|| ForecastError::MissingColumn(aliases[0].to_string()))
        };

        let road_id = require(ROAD_ID_HEADERS)?;
        let road_name = require(ROAD_NAME_HEADERS)?;
        let station = require(STATION_HEADERS)?;
        let surface = require(SURFACE_HEADERS)?;

        // Every census campaign is part of the history
        let volumes = CENSUS_YEARS
            .iter()
            .map(|&year| {
                let header = volume_column(year);
                require(&[header.as_str()]).map(|column| (year, column))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            road_id,
            official_road_id: find(OFFICIAL_ID_HEADERS),
            road_name,
            station,
            sub_sector: find(SECTOR_HEADERS),
            classification: find(CLASSIFICATION_HEADERS),
            surface,
            carriageway: find(CARRIAGEWAY_HEADERS),
            volumes,
        })
    }

    fn parse_row(&self, row: &csv::StringRecord, line: usize) -> Option<SegmentRecord> {
        let text = |column: usize| row.get(column).unwrap_or("").trim().to_string();
        let optional_text = |column: Option<usize>| {
            column
                .map(|c| text(c))
                .filter(|value| !value.is_empty())
        };

        let road_id = normalize_road_id(&text(self.road_id));
        if road_id.is_empty() {
            return None;
        }

        let official_road_id = optional_text(self.official_road_id)
            .map(|id| normalize_road_id(&id))
            .unwrap_or_else(|| road_id.clone());

        let mut volumes = BTreeMap::new();
        let mut unreadable = BTreeMap::new();
        for &(year, column) in &self.volumes {
            let cell = text(column);
            match parse_volume(&cell) {
                Some(parsed) => {
                    volumes.insert(year, parsed);
                }
                None => {
                    tracing::warn!(line, year, value = %cell, "Unreadable volume");
                    volumes.insert(year, None);
                    unreadable.insert(year, cell);
                }
            }
        }

        Some(SegmentRecord {
            road_id,
            official_road_id,
            road_name: text(self.road_name),
            station: text(self.station),
            sub_sector: optional_text(self.sub_sector),
            classification: optional_text(self.classification),
            surface: text(self.surface),
            carriageway: optional_text(self.carriageway)
                .unwrap_or_else(|| UNKNOWN_CARRIAGEWAY.to_string()),
            volumes,
            unreadable,
        })
    }
}

/// `Some(None)` for a blank cell, `None` when the cell is not a finite number
fn parse_volume(cell: &str) -> Option<Option<f64>> {
    if cell.is_empty() {
        return Some(None);
    }
    match cell.parse::<f64>() {
        Ok(value) if value.is_finite() => Some(Some(value)),
        _ => None,
    }
}

//! Schema normalization: maps raw CSV columns onto the canonical names the
//! pipeline uses and coerces cells into typed records.
//!
//! Coercion never fails. A cell that cannot be parsed becomes missing, and a
//! row missing any field its record type needs is dropped rather than
//! repaired. Only a required *column* that is absent after alias resolution
//! aborts the load.

use chrono::{NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::model::{AvailabilityObservation, JoinedObservation, StationMarker, StationRecord, StationType};
use crate::table::RawTable;

/// Canonical column plus the source names it may appear under.
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub canonical: &'static str,
    pub sources: &'static [&'static str],
    pub required: bool,
}

impl ColumnSpec {
    pub const fn required(canonical: &'static str, sources: &'static [&'static str]) -> Self {
        Self { canonical, sources, required: true }
    }

    pub const fn optional(canonical: &'static str, sources: &'static [&'static str]) -> Self {
        Self { canonical, sources, required: false }
    }
}

const STATION_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::required("station_id", &["station_id"]),
    ColumnSpec::required("name", &["name"]),
    ColumnSpec::required("cross_street", &["cross_street"]),
    ColumnSpec::required("latitude", &["latitude", "lat"]),
    ColumnSpec::required("longitude", &["longitude", "lon"]),
    ColumnSpec::optional("station_type", &["station_type", "type"]),
];

pub const MARKER_POSITIONAL: &[&str] = &["name", "latitude", "longitude", "description", "type"];

const MARKER_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::required("name", &["name"]),
    ColumnSpec::required("latitude", &["latitude", "lat"]),
    ColumnSpec::required("longitude", &["longitude", "lon"]),
    ColumnSpec::optional("description", &["description"]),
    ColumnSpec::required("station_type", &["type", "station_type"]),
];

const AVAILABILITY_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::required("year", &["year"]),
    ColumnSpec::required("month", &["month"]),
    ColumnSpec::required("day", &["day"]),
    ColumnSpec::required("hour", &["hour"]),
    ColumnSpec::required("station_id", &["station_id"]),
    ColumnSpec::required("mean_available_docks", &["mean_available_docks"]),
];

const INTERACTIVE_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::required("time", &["time"]),
    ColumnSpec::required("station_id", &["station_id"]),
    ColumnSpec::required("name", &["name"]),
    ColumnSpec::required("cross_street", &["cross_street"]),
    ColumnSpec::required("latitude", &["latitude", "lat"]),
    ColumnSpec::required("longitude", &["longitude", "lon"]),
    ColumnSpec::required("available_bikes", &["available_bikes"]),
    ColumnSpec::optional("station_type", &["station_type", "type"]),
];

/// Trims a header. A byte-order mark is already gone after
/// [`TextEncoding::decode`](crate::source::TextEncoding::decode).
pub fn clean_header(header: &str) -> String {
    header.trim().to_string()
}

/// `cross_street` <-> `cross street`.
fn swap_separator(name: &str) -> String {
    if name.contains('_') {
        name.replace('_', " ")
    } else {
        name.replace(' ', "_")
    }
}

/// Index of the header matching `spec`, trying every exact source name
/// before any separator alias.
pub fn resolve_column(headers: &[String], spec: &ColumnSpec) -> Option<usize> {
    spec.sources
        .iter()
        .find_map(|src| headers.iter().position(|h| h == src))
        .or_else(|| {
            spec.sources.iter().find_map(|src| {
                let alias = swap_separator(src);
                headers.iter().position(|h| *h == alias)
            })
        })
}

/// Table holding exactly the resolved canonical columns.
#[derive(Debug, Clone)]
pub struct NormalizedTable {
    columns: Vec<&'static str>,
    rows: Vec<Vec<Option<String>>>,
}

impl NormalizedTable {
    pub fn columns(&self) -> &[&'static str] {
        &self.columns
    }

    pub fn has_column(&self, canonical: &str) -> bool {
        self.columns.contains(&canonical)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> impl Iterator<Item = NormalizedRow<'_>> {
        self.rows.iter().map(move |cells| NormalizedRow { columns: &self.columns, cells })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NormalizedRow<'a> {
    columns: &'a [&'static str],
    cells: &'a [Option<String>],
}

impl<'a> NormalizedRow<'a> {
    /// Trimmed text, `None` when the column is absent or the cell empty.
    pub fn text(&self, column: &str) -> Option<&'a str> {
        let cells: &'a [Option<String>] = self.cells;
        let idx = self.columns.iter().position(|c| *c == column)?;
        cells[idx].as_deref()
    }

    /// Lower-cased text, for categorical keys.
    pub fn category(&self, column: &str) -> Option<String> {
        self.text(column).map(|s| s.to_lowercase())
    }

    pub fn float(&self, column: &str) -> Option<f64> {
        self.text(column).and_then(parse_float)
    }

    pub fn int(&self, column: &str) -> Option<i64> {
        self.text(column).and_then(parse_int)
    }
}

/// Resolves `specs` against `raw` and keeps only the canonical columns.
///
/// Optional columns that cannot be resolved are left out; callers check
/// [`NormalizedTable::has_column`].
pub fn normalize(raw: &RawTable, specs: &[ColumnSpec], dataset: &str) -> Result<NormalizedTable> {
    let headers: Vec<String> = raw.headers.iter().map(|h| clean_header(h)).collect();

    let mut columns = Vec::new();
    let mut indices = Vec::new();
    for spec in specs {
        match resolve_column(&headers, spec) {
            Some(idx) => {
                columns.push(spec.canonical);
                indices.push(idx);
            }
            None if spec.required => {
                return Err(PipelineError::missing_column(dataset, spec.canonical));
            }
            None => debug!(dataset, column = spec.canonical, "Optional column absent"),
        }
    }

    let rows = raw
        .rows
        .iter()
        .map(|row| {
            indices
                .iter()
                .map(|&i| {
                    row.get(i)
                        .map(|cell| cell.trim())
                        .filter(|cell| !cell.is_empty())
                        .map(str::to_string)
                })
                .collect()
        })
        .collect();

    Ok(NormalizedTable { columns, rows })
}

/// Parses a finite float; anything else is missing.
pub fn parse_float(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses an integer, accepting integral floats such as `"42.0"`.
pub fn parse_int(s: &str) -> Option<i64> {
    let s = s.trim();
    if let Ok(v) = s.parse::<i64>() {
        return Some(v);
    }
    let v = parse_float(s)?;
    if v.fract() == 0.0 && v >= i64::MIN as f64 && v <= i64::MAX as f64 {
        Some(v as i64)
    } else {
        None
    }
}

/// Non-negative bike count, rounding half-to-even like the dataframe
/// library the source figures were produced with.
pub fn parse_bike_count(s: &str) -> Option<u32> {
    let v = parse_float(s)?.round_ties_even();
    if v < 0.0 || v > u32::MAX as f64 {
        return None;
    }
    Some(v as u32)
}

const TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

/// Composes an hourly timestamp from split calendar fields.
pub fn compose_timestamp(year: i64, month: i64, day: i64, hour: i64) -> Option<NaiveDateTime> {
    let date = NaiveDate::from_ymd_opt(
        i32::try_from(year).ok()?,
        u32::try_from(month).ok()?,
        u32::try_from(day).ok()?,
    )?;
    date.and_hms_opt(u32::try_from(hour).ok()?, 0, 0)
}

/// Row accounting for one typed load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeStats {
    pub total_rows: usize,
    pub kept: usize,
    pub dropped: usize,
}

/// Typed records plus the accounting of what was dropped.
#[derive(Debug, Clone)]
pub struct Normalized<T> {
    pub records: Vec<T>,
    pub stats: NormalizeStats,
}

fn collect_rows<T, F>(table: &NormalizedTable, dataset: &str, build: F) -> Normalized<T>
where
    F: Fn(&NormalizedRow<'_>) -> Option<T>,
{
    let records: Vec<T> = table.rows().filter_map(|row| build(&row)).collect();
    let stats = NormalizeStats {
        total_rows: table.row_count(),
        kept: records.len(),
        dropped: table.row_count() - records.len(),
    };
    debug!(
        dataset,
        total = stats.total_rows,
        kept = stats.kept,
        dropped = stats.dropped,
        "Normalized rows"
    );
    Normalized { records, stats }
}

fn coordinates(row: &NormalizedRow<'_>) -> Option<(f64, f64)> {
    Some((row.float("latitude")?, row.float("longitude")?))
}

fn station_type(row: &NormalizedRow<'_>) -> Option<StationType> {
    row.category("station_type")?.parse().ok()
}

/// Station metadata (`station_id, name, cross_street, lat/lon`).
pub fn normalize_stations(raw: &RawTable) -> Result<Normalized<StationRecord>> {
    let table = normalize(raw, STATION_COLUMNS, "stations")?;
    Ok(collect_rows(&table, "stations", |row| {
        let (latitude, longitude) = coordinates(row)?;
        Some(StationRecord {
            station_id: row.int("station_id")?,
            name: row.text("name")?.to_string(),
            cross_street: row.text("cross_street")?.to_string(),
            latitude,
            longitude,
            station_type: station_type(row),
        })
    }))
}

/// Map markers (`name, latitude, longitude, description, type`).
///
/// Files whose headers do not resolve but have exactly five columns are
/// renamed by position first.
pub fn normalize_markers(raw: &RawTable) -> Result<Normalized<StationMarker>> {
    let table = match normalize(raw, MARKER_COLUMNS, "markers") {
        Ok(table) => table,
        Err(err @ PipelineError::MissingColumn { .. }) => {
            let mut renamed = raw.clone();
            if !renamed.rename_positional(MARKER_POSITIONAL) {
                return Err(err);
            }
            debug!("Marker headers unrecognised, renamed by position");
            normalize(&renamed, MARKER_COLUMNS, "markers")?
        }
        Err(err) => return Err(err),
    };

    Ok(collect_rows(&table, "markers", |row| {
        let (latitude, longitude) = coordinates(row)?;
        Some(StationMarker {
            name: row.text("name")?.to_string(),
            latitude,
            longitude,
            description: row.text("description").map(str::to_string),
            station_type: station_type(row)?,
        })
    }))
}

/// Time-bucketed history (`year, month, day, hour, station_id,
/// mean_available_docks`).
pub fn normalize_availability(raw: &RawTable) -> Result<Normalized<AvailabilityObservation>> {
    let table = normalize(raw, AVAILABILITY_COLUMNS, "availability")?;
    Ok(collect_rows(&table, "availability", |row| {
        Some(AvailabilityObservation {
            station_id: row.int("station_id")?,
            timestamp: compose_timestamp(
                row.int("year")?,
                row.int("month")?,
                row.int("day")?,
                row.int("hour")?,
            )?,
            available_bikes: parse_bike_count(row.text("mean_available_docks")?)?,
        })
    }))
}

/// Pre-joined interactive dataset.
pub fn normalize_interactive(raw: &RawTable) -> Result<Normalized<JoinedObservation>> {
    let table = normalize(raw, INTERACTIVE_COLUMNS, "interactive")?;
    Ok(collect_rows(&table, "interactive", |row| {
        let (latitude, longitude) = coordinates(row)?;
        Some(JoinedObservation {
            station_id: row.int("station_id")?,
            timestamp: parse_timestamp(row.text("time")?)?,
            available_bikes: parse_bike_count(row.text("available_bikes")?)?,
            name: row.text("name")?.to_string(),
            cross_street: row.text("cross_street")?.to_string(),
            latitude,
            longitude,
            station_type: station_type(row),
        })
    }))
}

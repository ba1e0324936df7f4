//! Typed records produced by the normalizer and consumed downstream.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::calendar::TimeBucket;

/// Whether a station belongs to the new or the old network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StationType {
    New,
    Old,
}

impl FromStr for StationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "new" => Ok(StationType::New),
            "old" => Ok(StationType::Old),
            other => Err(format!("unknown station type '{other}'")),
        }
    }
}

impl fmt::Display for StationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StationType::New => f.write_str("new"),
            StationType::Old => f.write_str("old"),
        }
    }
}

/// Station metadata row, keyed by `station_id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationRecord {
    pub station_id: i64,
    pub name: String,
    pub cross_street: String,
    pub latitude: f64,
    pub longitude: f64,
    pub station_type: Option<StationType>,
}

impl StationRecord {
    /// Part of `cross_street` before the first `/`, or the whole string
    /// when there is no separator.
    pub fn neighborhood(&self) -> &str {
        neighborhood_of(&self.cross_street)
    }
}

pub fn neighborhood_of(cross_street: &str) -> &str {
    match cross_street.split_once('/') {
        Some((head, _)) => head.trim(),
        None => cross_street.trim(),
    }
}

/// Map marker for the station map view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationMarker {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub description: Option<String>,
    pub station_type: StationType,
}

/// One (station, hour) availability sample before the station join.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AvailabilityObservation {
    pub station_id: i64,
    pub timestamp: NaiveDateTime,
    pub available_bikes: u32,
}

/// Availability sample carrying its station metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinedObservation {
    pub station_id: i64,
    pub timestamp: NaiveDateTime,
    pub available_bikes: u32,
    pub name: String,
    pub cross_street: String,
    pub latitude: f64,
    pub longitude: f64,
    pub station_type: Option<StationType>,
}

/// Joined observation with its calendar features. This is the row type
/// every filter and aggregation works on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    pub station_id: i64,
    pub timestamp: NaiveDateTime,
    pub available_bikes: u32,
    pub name: String,
    pub cross_street: String,
    pub latitude: f64,
    pub longitude: f64,
    pub station_type: Option<StationType>,
    #[serde(flatten)]
    pub bucket: TimeBucket,
}

impl Observation {
    pub fn neighborhood(&self) -> &str {
        neighborhood_of(&self.cross_street)
    }
}

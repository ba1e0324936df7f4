//! Query predicates selecting the rows a report is computed over.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::model::{Observation, StationMarker, StationType};
use crate::report::Report;

/// Inclusive hour window within a single day.
///
/// Overnight windows such as 22–2 are rejected at construction; they are
/// never wrapped around midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HourRange {
    start: u32,
    end: u32,
}

impl HourRange {
    pub fn new(start: u32, end: u32) -> Result<Self> {
        if start > 23 || end > 23 {
            return Err(PipelineError::InvalidQuery(format!(
                "hour range {start}-{end} outside 0-23"
            )));
        }
        if start > end {
            return Err(PipelineError::InvalidQuery(format!(
                "hour range {start}-{end} wraps past midnight, which is not supported"
            )));
        }
        Ok(HourRange { start, end })
    }

    pub fn single(hour: u32) -> Result<Self> {
        Self::new(hour, hour)
    }

    pub fn contains(&self, hour: u32) -> bool {
        self.start <= hour && hour <= self.end
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }
}

/// Inclusive date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// A reversed range is accepted and simply matches nothing.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange { start, end }
    }

    pub fn single(date: NaiveDate) -> Self {
        DateRange { start: date, end: date }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub enum StationSelector {
    #[default]
    All,
    Id(i64),
    Name(String),
}

impl StationSelector {
    fn matches(&self, obs: &Observation) -> bool {
        match self {
            StationSelector::All => true,
            StationSelector::Id(id) => obs.station_id == *id,
            StationSelector::Name(name) => obs.name == *name,
        }
    }
}

/// User-selected predicates. Every `None` field matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Query {
    pub station: StationSelector,
    pub date_range: Option<DateRange>,
    pub hour_range: Option<HourRange>,
    pub station_types: Option<BTreeSet<StationType>>,
}

impl Query {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_station(mut self, station: StationSelector) -> Self {
        self.station = station;
        self
    }

    pub fn with_dates(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }

    pub fn with_hours(mut self, range: HourRange) -> Self {
        self.hour_range = Some(range);
        self
    }

    pub fn with_types<I: IntoIterator<Item = StationType>>(mut self, types: I) -> Self {
        self.station_types = Some(types.into_iter().collect());
        self
    }

    pub fn matches(&self, obs: &Observation) -> bool {
        if !self.station.matches(obs) {
            return false;
        }
        if let Some(range) = &self.date_range {
            if !range.contains(obs.bucket.date) {
                return false;
            }
        }
        if let Some(range) = &self.hour_range {
            if !range.contains(obs.bucket.hour) {
                return false;
            }
        }
        if let Some(types) = &self.station_types {
            // Rows without a known type never satisfy a type filter.
            match obs.station_type {
                Some(t) if types.contains(&t) => {}
                _ => return false,
            }
        }
        true
    }
}

/// Returns the matching subset; an empty subset is a valid outcome.
pub fn apply(observations: &[Observation], query: &Query) -> Vec<Observation> {
    let subset: Vec<Observation> = observations
        .iter()
        .filter(|obs| query.matches(obs))
        .cloned()
        .collect();
    debug!(total = observations.len(), matched = subset.len(), "Applied query");
    subset
}

/// Markers whose type is in `types`, for the station map.
pub fn filter_markers(markers: &[StationMarker], types: &BTreeSet<StationType>) -> Report<Vec<StationMarker>> {
    Report::from_rows(
        markers
            .iter()
            .filter(|m| types.contains(&m.station_type))
            .cloned()
            .collect(),
    )
}

/// Sorted distinct dates present in `observations`.
pub fn available_dates(observations: &[Observation]) -> Vec<NaiveDate> {
    observations
        .iter()
        .map(|o| o.bucket.date)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Sorted distinct station names present in `observations`.
pub fn station_names(observations: &[Observation]) -> Vec<String> {
    observations
        .iter()
        .map(|o| o.name.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

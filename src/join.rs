//! Inner join of availability samples onto station metadata.

use std::collections::HashMap;
use tracing::debug;

use crate::calendar::{HolidayCalendar, bucket};
use crate::model::{AvailabilityObservation, JoinedObservation, Observation, StationRecord};

/// Joins every availability row whose `station_id` exists in `stations`.
///
/// Rows without station metadata are dropped. Station ids are assumed
/// unique; if one repeats, the last record wins.
pub fn join_stations(
    availability: &[AvailabilityObservation],
    stations: &[StationRecord],
) -> Vec<JoinedObservation> {
    let by_id: HashMap<i64, &StationRecord> = stations.iter().map(|s| (s.station_id, s)).collect();

    let joined: Vec<JoinedObservation> = availability
        .iter()
        .filter_map(|obs| {
            let station = by_id.get(&obs.station_id)?;
            Some(JoinedObservation {
                station_id: obs.station_id,
                timestamp: obs.timestamp,
                available_bikes: obs.available_bikes,
                name: station.name.clone(),
                cross_street: station.cross_street.clone(),
                latitude: station.latitude,
                longitude: station.longitude,
                station_type: station.station_type,
            })
        })
        .collect();

    debug!(
        availability = availability.len(),
        stations = stations.len(),
        joined = joined.len(),
        "Joined availability with stations"
    );
    joined
}

/// Attaches calendar features, building the holiday calendar once for the
/// span of years in `joined`.
pub fn with_calendar(joined: Vec<JoinedObservation>) -> Vec<Observation> {
    let calendar = HolidayCalendar::spanning(joined.iter().map(|j| j.timestamp.date()));
    with_calendar_using(joined, &calendar)
}

pub fn with_calendar_using(joined: Vec<JoinedObservation>, calendar: &HolidayCalendar) -> Vec<Observation> {
    joined
        .into_iter()
        .map(|j| Observation {
            bucket: bucket(j.timestamp, calendar),
            station_id: j.station_id,
            timestamp: j.timestamp,
            available_bikes: j.available_bikes,
            name: j.name,
            cross_street: j.cross_street,
            latitude: j.latitude,
            longitude: j.longitude,
            station_type: j.station_type,
        })
        .collect()
}

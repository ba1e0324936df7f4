//! Chronic-empty and chronic-full ratios per station.

use serde::Serialize;

use super::utility::by_station;
use crate::model::Observation;
use crate::report::Report;

/// A station is a problem station when its ratio is strictly above this.
pub const PROBLEM_THRESHOLD: f64 = 0.10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationSaturation {
    pub station_id: i64,
    pub name: String,
    pub observations: usize,
    pub max_available: u32,
    pub empty_ratio: f64,
    pub full_ratio: f64,
}

/// Share of samples with no bikes.
pub fn empty_ratio(series: &[u32]) -> Option<f64> {
    ratio(series, |v| v == 0)
}

/// Share of samples at the station's own observed maximum.
pub fn full_ratio(series: &[u32]) -> Option<f64> {
    let max = series.iter().copied().max()?;
    ratio(series, |v| v == max)
}

fn ratio<F: Fn(u32) -> bool>(series: &[u32], hit: F) -> Option<f64> {
    if series.is_empty() {
        return None;
    }
    let hits = series.iter().filter(|v| hit(**v)).count();
    Some(hits as f64 / series.len() as f64)
}

pub fn exceeds(ratio: f64, threshold: f64) -> bool {
    ratio > threshold
}

/// Ratios for every station, ordered by `station_id`.
pub fn station_saturation(observations: &[Observation]) -> Report<Vec<StationSaturation>> {
    Report::guard(observations, |rows| {
        by_station(rows)
            .into_iter()
            .filter_map(|(station_id, group)| {
                let series: Vec<u32> = group.iter().map(|o| o.available_bikes).collect();
                Some(StationSaturation {
                    station_id,
                    name: group.first()?.name.clone(),
                    observations: series.len(),
                    max_available: series.iter().copied().max()?,
                    empty_ratio: empty_ratio(&series)?,
                    full_ratio: full_ratio(&series)?,
                })
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::test_support::obs_at;

    #[test]
    fn test_empty_ratio() {
        assert_eq!(empty_ratio(&[0, 0, 0, 5]), Some(0.75));
        assert_eq!(empty_ratio(&[]), None);
        assert!(exceeds(0.75, PROBLEM_THRESHOLD));
    }

    #[test]
    fn test_threshold_is_strict() {
        assert!(!exceeds(0.10, PROBLEM_THRESHOLD));
        assert!(exceeds(0.1001, PROBLEM_THRESHOLD));
    }

    #[test]
    fn test_full_ratio_uses_observed_max() {
        assert_eq!(full_ratio(&[3, 7, 7, 1]), Some(0.5));
        // all-zero station is at its own maximum every time
        assert_eq!(full_ratio(&[0, 0]), Some(1.0));
    }

    #[test]
    fn test_station_saturation_rows() {
        let rows = vec![
            obs_at(2, (2025, 3, 3), 0, 0),
            obs_at(2, (2025, 3, 3), 1, 0),
            obs_at(2, (2025, 3, 3), 2, 8),
            obs_at(1, (2025, 3, 3), 0, 5),
        ];
        let out = station_saturation(&rows).ready().unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].station_id, 1);
        assert_eq!(out[0].empty_ratio, 0.0);
        assert_eq!(out[0].full_ratio, 1.0);
        assert_eq!(out[1].max_available, 8);
        assert!((out[1].empty_ratio - 2.0 / 3.0).abs() < 1e-12);
    }
}

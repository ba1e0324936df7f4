//! Station "movement": mean absolute change between consecutive samples.

use serde::Serialize;
use std::collections::BTreeMap;

use super::utility::{by_station, mean};
use crate::model::{Observation, neighborhood_of};
use crate::report::Report;

/// Mean of `|x[i] - x[i-1]|` over a time-ordered series.
///
/// Undefined (`None`) with fewer than two values.
pub fn turnover(series: &[u32]) -> Option<f64> {
    let diffs: Vec<f64> = series
        .windows(2)
        .map(|w| (w[1] as f64 - w[0] as f64).abs())
        .collect();
    mean(&diffs)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationTurnover {
    pub station_id: i64,
    pub name: String,
    pub neighborhood: String,
    pub observations: usize,
    pub turnover: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NeighborhoodTurnover {
    pub neighborhood: String,
    pub stations: usize,
    pub mean_turnover: f64,
}

/// Turnover for every station with at least two observations, ordered by
/// `station_id`. Stations with a single sample are left out.
pub fn station_turnover(observations: &[Observation]) -> Report<Vec<StationTurnover>> {
    Report::guard(observations, |rows| {
        by_station(rows)
            .into_iter()
            .filter_map(|(station_id, group)| {
                let series: Vec<u32> = group.iter().map(|o| o.available_bikes).collect();
                let first = group.first()?;
                Some(StationTurnover {
                    station_id,
                    name: first.name.clone(),
                    neighborhood: neighborhood_of(&first.cross_street).to_string(),
                    observations: group.len(),
                    turnover: turnover(&series)?,
                })
            })
            .collect()
    })
}

/// Average station turnover per neighborhood, highest first; ties broken
/// by neighborhood name.
pub fn neighborhood_turnover(observations: &[Observation]) -> Report<Vec<NeighborhoodTurnover>> {
    station_turnover(observations).map(|stations| {
        let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for s in stations {
            groups.entry(s.neighborhood).or_default().push(s.turnover);
        }

        let mut out: Vec<NeighborhoodTurnover> = groups
            .into_iter()
            .filter_map(|(neighborhood, values)| {
                Some(NeighborhoodTurnover {
                    stations: values.len(),
                    mean_turnover: mean(&values)?,
                    neighborhood,
                })
            })
            .collect();
        out.sort_by(|a, b| {
            b.mean_turnover
                .total_cmp(&a.mean_turnover)
                .then_with(|| a.neighborhood.cmp(&b.neighborhood))
        });
        out
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::test_support::{obs_at, obs_in};

    #[test]
    fn test_turnover_undefined_below_two() {
        assert_eq!(turnover(&[]), None);
        assert_eq!(turnover(&[7]), None);
    }

    #[test]
    fn test_turnover_two_values_is_abs_diff() {
        assert_eq!(turnover(&[3, 10]), Some(7.0));
        assert_eq!(turnover(&[10, 3]), Some(7.0));
    }

    #[test]
    fn test_turnover_mean_of_diffs() {
        assert_eq!(turnover(&[10, 4, 0]), Some(5.0));
    }

    #[test]
    fn test_station_turnover_orders_by_time_and_skips_singletons() {
        // inserted out of order: time order is 10, 4, 0
        let rows = vec![
            obs_at(42, (2025, 3, 3), 2, 0),
            obs_at(42, (2025, 3, 3), 0, 10),
            obs_at(42, (2025, 3, 3), 1, 4),
            obs_at(7, (2025, 3, 3), 1, 4),
        ];
        let out = station_turnover(&rows).ready().unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].station_id, 42);
        assert_eq!(out[0].turnover, 5.0);
        assert_eq!(out[0].observations, 3);
    }

    #[test]
    fn test_neighborhood_average_across_stations() {
        let rows = vec![
            obs_in(1, "Gràcia / Verdi", (2025, 3, 3), 0, 0),
            obs_in(1, "Gràcia / Verdi", (2025, 3, 3), 1, 4),
            obs_in(2, "Gràcia / Astúries", (2025, 3, 3), 0, 0),
            obs_in(2, "Gràcia / Astúries", (2025, 3, 3), 1, 2),
            obs_in(3, "Sants", (2025, 3, 3), 0, 0),
            obs_in(3, "Sants", (2025, 3, 3), 1, 1),
            obs_in(4, "Poblenou / Pujades", (2025, 3, 3), 0, 9),
        ];
        let out = neighborhood_turnover(&rows).ready().unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].neighborhood, "Gràcia");
        assert_eq!(out[0].stations, 2);
        assert_eq!(out[0].mean_turnover, 3.0);
        assert_eq!(out[1].neighborhood, "Sants");
    }
}

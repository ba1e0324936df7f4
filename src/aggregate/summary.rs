//! Scalar summary and detail rows for a single filtered snapshot.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::level::AvailabilityLevel;
use crate::model::Observation;
use crate::report::Report;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotSummary {
    pub observations: usize,
    pub stations: usize,
    pub mean_available: f64,
    /// `mean_available` truncated toward zero, as shown on the KPI card.
    pub mean_available_kpi: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotRow {
    pub station_id: i64,
    pub name: String,
    pub cross_street: String,
    pub available_bikes: u32,
    pub latitude: f64,
    pub longitude: f64,
    pub level: AvailabilityLevel,
}

pub fn snapshot_summary(observations: &[Observation]) -> Report<SnapshotSummary> {
    Report::guard(observations, |rows| {
        let total: f64 = rows.iter().map(|o| o.available_bikes as f64).sum();
        let mean_available = total / rows.len() as f64;
        SnapshotSummary {
            observations: rows.len(),
            stations: rows.iter().map(|o| o.station_id).collect::<BTreeSet<_>>().len(),
            mean_available,
            mean_available_kpi: mean_available.trunc() as i64,
        }
    })
}

/// Detail rows, most available bikes first.
pub fn snapshot_rows(observations: &[Observation]) -> Report<Vec<SnapshotRow>> {
    Report::guard(observations, |rows| {
        let mut out: Vec<SnapshotRow> = rows
            .iter()
            .map(|o| SnapshotRow {
                station_id: o.station_id,
                name: o.name.clone(),
                cross_street: o.cross_street.clone(),
                available_bikes: o.available_bikes,
                latitude: o.latitude,
                longitude: o.longitude,
                level: AvailabilityLevel::from_count(o.available_bikes),
            })
            .collect();
        out.sort_by(|a, b| {
            b.available_bikes
                .cmp(&a.available_bikes)
                .then_with(|| a.station_id.cmp(&b.station_id))
        });
        out
    })
}

/// KPI card plus the detail table, as one view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub summary: SnapshotSummary,
    pub rows: Vec<SnapshotRow>,
}

pub fn snapshot(observations: &[Observation]) -> Report<Snapshot> {
    match (snapshot_summary(observations), snapshot_rows(observations)) {
        (Report::Ready(summary), Report::Ready(rows)) => Report::Ready(Snapshot { summary, rows }),
        _ => Report::NoData,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::test_support::obs_at;

    #[test]
    fn test_summary_truncates_kpi() {
        let rows = vec![
            obs_at(1, (2025, 3, 3), 12, 5),
            obs_at(2, (2025, 3, 3), 12, 6),
            obs_at(2, (2025, 3, 3), 12, 6),
        ];
        let s = snapshot_summary(&rows).ready().unwrap();
        assert_eq!(s.observations, 3);
        assert_eq!(s.stations, 2);
        assert!((s.mean_available - 17.0 / 3.0).abs() < 1e-12);
        assert_eq!(s.mean_available_kpi, 5);
    }

    #[test]
    fn test_rows_sorted_desc() {
        let rows = vec![
            obs_at(1, (2025, 3, 3), 12, 1),
            obs_at(2, (2025, 3, 3), 12, 15),
            obs_at(3, (2025, 3, 3), 12, 7),
        ];
        let out = snapshot_rows(&rows).ready().unwrap();
        let ids: Vec<i64> = out.iter().map(|r| r.station_id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
        assert_eq!(out[0].level, AvailabilityLevel::High);
        assert_eq!(out[2].level, AvailabilityLevel::Low);
    }

    #[test]
    fn test_snapshot_carries_kpi_and_rows() {
        let rows = vec![obs_at(1, (2025, 3, 3), 12, 3), obs_at(2, (2025, 3, 3), 12, 12)];
        let view = snapshot(&rows).ready().unwrap();
        assert_eq!(view.summary.mean_available_kpi, 7);
        assert_eq!(view.summary.stations, 2);
        assert_eq!(view.rows[0].station_id, 2);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["summary"]["mean_available_kpi"], 7);
        assert_eq!(json["rows"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_empty_snapshot() {
        assert!(snapshot_summary(&[]).is_no_data());
        assert!(snapshot_rows(&[]).is_no_data());
        assert!(snapshot(&[]).is_no_data());
    }
}

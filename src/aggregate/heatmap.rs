use serde::Serialize;

use super::utility::mean_available_by;
use crate::calendar::DayOfWeek;
use crate::model::Observation;
use crate::report::Report;

/// One weekday row of the heatmap; `hours[h]` is `None` where no
/// observation fell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapRow {
    pub weekday: DayOfWeek,
    pub hours: Vec<Option<f64>>,
}

/// Mean availability by weekday (rows Mon..Sun) and hour (columns 0..23).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapMatrix {
    pub rows: Vec<HeatmapRow>,
}

/// Long-format cell, for flat outputs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapCell {
    pub weekday: DayOfWeek,
    pub hour: u32,
    pub mean_available: Option<f64>,
}

impl HeatmapMatrix {
    /// All 7 x 24 cells in row-major order, undefined cells included.
    pub fn cells(&self) -> Vec<HeatmapCell> {
        self.rows
            .iter()
            .flat_map(|row| {
                row.hours.iter().enumerate().map(move |(hour, mean)| HeatmapCell {
                    weekday: row.weekday,
                    hour: hour as u32,
                    mean_available: *mean,
                })
            })
            .collect()
    }

    pub fn get(&self, weekday: DayOfWeek, hour: u32) -> Option<f64> {
        self.rows
            .get(weekday.index())
            .and_then(|row| row.hours.get(hour as usize).copied().flatten())
    }

    /// Number of defined cells.
    pub fn filled(&self) -> usize {
        self.rows
            .iter()
            .map(|r| r.hours.iter().filter(|c| c.is_some()).count())
            .sum()
    }
}

pub fn weekday_hour_heatmap(observations: &[Observation]) -> Report<HeatmapMatrix> {
    Report::guard(observations, |rows| {
        let means = mean_available_by(rows, |o| (o.bucket.weekday, o.bucket.hour));
        let rows = DayOfWeek::ALL
            .iter()
            .map(|&weekday| HeatmapRow {
                weekday,
                hours: (0..24).map(|h| means.get(&(weekday, h)).copied()).collect(),
            })
            .collect();
        HeatmapMatrix { rows }
    })
}

//! Grouped statistics over (possibly filtered) observation tables.
//!
//! Every entry point returns a [`Report`](crate::report::Report): an empty
//! input table is `NoData`, never a table of zeros.

pub mod heatmap;
pub mod hourly;
pub mod ranking;
pub mod saturation;
pub mod summary;
pub mod turnover;
pub mod utility;

pub use heatmap::{HeatmapCell, HeatmapMatrix, HeatmapRow, weekday_hour_heatmap};
pub use hourly::{
    HolidayHourlyMean, HourlyMean, SeasonHourlyMean, hourly_mean, hourly_mean_by_holiday,
    hourly_mean_by_season,
};
pub use ranking::{RankingMetric, RankingRow, rank_problem_stations, rank_turnover, truncate_percent};
pub use saturation::{PROBLEM_THRESHOLD, StationSaturation, station_saturation};
pub use summary::{Snapshot, SnapshotRow, SnapshotSummary, snapshot, snapshot_rows, snapshot_summary};
pub use turnover::{NeighborhoodTurnover, StationTurnover, neighborhood_turnover, station_turnover};

//! Top-N station rankings.

use serde::Serialize;
use std::cmp::Ordering;

use super::saturation::{exceeds, station_saturation};
use super::turnover::station_turnover;
use crate::model::Observation;
use crate::report::Report;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingMetric {
    Turnover,
    EmptyRatio,
    FullRatio,
}

/// One ranked station. For the ratio metrics `metric_value` is the
/// percentage (ratio * 100), before truncation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingRow {
    pub rank: usize,
    pub station_id: i64,
    pub name: String,
    pub metric: RankingMetric,
    pub metric_value: f64,
    pub display: String,
}

/// Integer percentage, truncated toward zero: 0.129 -> 12.
pub fn truncate_percent(ratio: f64) -> i64 {
    (ratio * 100.0).trunc() as i64
}

/// `(metric_value, display)` for a raw candidate value. Ratios become
/// percentages; their display is the truncated integer.
fn present(metric: RankingMetric, value: f64) -> (f64, String) {
    match metric {
        RankingMetric::Turnover => (value, format!("{value:.2}")),
        RankingMetric::EmptyRatio | RankingMetric::FullRatio => {
            (value * 100.0, format!("{}%", truncate_percent(value)))
        }
    }
}

/// Descending by value, ascending `station_id` on ties.
fn ranking_order(a: &(i64, String, f64), b: &(i64, String, f64)) -> Ordering {
    b.2.total_cmp(&a.2).then_with(|| a.0.cmp(&b.0))
}

/// Sorts `(station_id, name, value)` candidates and keeps the first `n`.
/// For the ratio metrics `value` is the raw ratio in `0..=1`.
pub fn top_n(mut candidates: Vec<(i64, String, f64)>, metric: RankingMetric, n: usize) -> Vec<RankingRow> {
    candidates.sort_by(ranking_order);
    candidates
        .into_iter()
        .take(n)
        .enumerate()
        .map(|(i, (station_id, name, value))| {
            let (metric_value, display) = present(metric, value);
            RankingRow {
                rank: i + 1,
                station_id,
                name,
                metric,
                metric_value,
                display,
            }
        })
        .collect()
}

/// Busiest stations by turnover. Stations with undefined turnover never
/// appear.
pub fn rank_turnover(observations: &[Observation], n: usize) -> Report<Vec<RankingRow>> {
    station_turnover(observations).map(|stations| {
        let candidates = stations
            .into_iter()
            .map(|s| (s.station_id, s.name, s.turnover))
            .collect();
        top_n(candidates, RankingMetric::Turnover, n)
    })
}

/// Stations whose empty (or full) ratio is strictly above `threshold`.
pub fn rank_problem_stations(
    observations: &[Observation],
    metric: RankingMetric,
    threshold: f64,
    n: usize,
) -> Report<Vec<RankingRow>> {
    station_saturation(observations).map(|stations| {
        let candidates = stations
            .into_iter()
            .filter_map(|s| {
                let ratio = match metric {
                    RankingMetric::EmptyRatio => s.empty_ratio,
                    RankingMetric::FullRatio => s.full_ratio,
                    RankingMetric::Turnover => return None,
                };
                exceeds(ratio, threshold).then(|| (s.station_id, s.name, ratio))
            })
            .collect();
        top_n(candidates, metric, n)
    })
}

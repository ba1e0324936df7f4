use serde::Serialize;

use super::utility::mean_available_by;
use crate::calendar::Season;
use crate::model::Observation;
use crate::report::Report;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyMean {
    pub hour: u32,
    pub mean_available: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonHourlyMean {
    pub season: Season,
    pub hour: u32,
    pub mean_available: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HolidayHourlyMean {
    pub hour: u32,
    pub is_holiday: bool,
    pub mean_available: f64,
}

/// Mean available bikes per hour of day.
pub fn hourly_mean(observations: &[Observation]) -> Report<Vec<HourlyMean>> {
    Report::guard(observations, |rows| {
        mean_available_by(rows, |o| o.bucket.hour)
            .into_iter()
            .map(|(hour, mean_available)| HourlyMean { hour, mean_available })
            .collect()
    })
}

/// Mean available bikes per (season, hour), seasons in calendar order.
pub fn hourly_mean_by_season(observations: &[Observation]) -> Report<Vec<SeasonHourlyMean>> {
    Report::guard(observations, |rows| {
        mean_available_by(rows, |o| (o.bucket.season, o.bucket.hour))
            .into_iter()
            .map(|((season, hour), mean_available)| SeasonHourlyMean {
                season,
                hour,
                mean_available,
            })
            .collect()
    })
}

/// Mean available bikes per (hour, holiday flag).
pub fn hourly_mean_by_holiday(observations: &[Observation]) -> Report<Vec<HolidayHourlyMean>> {
    Report::guard(observations, |rows| {
        mean_available_by(rows, |o| (o.bucket.hour, o.bucket.is_holiday))
            .into_iter()
            .map(|((hour, is_holiday), mean_available)| HolidayHourlyMean {
                hour,
                is_holiday,
                mean_available,
            })
            .collect()
    })
}

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike, Weekday};
use serde::Serialize;
use std::fmt;

use super::holidays::HolidayCalendar;
use super::season::Season;

/// ISO-ordered weekday token (`Mon`..`Sun`). Ordering follows the week, so
/// sorting a column of these yields Monday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum DayOfWeek {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Mon,
        DayOfWeek::Tue,
        DayOfWeek::Wed,
        DayOfWeek::Thu,
        DayOfWeek::Fri,
        DayOfWeek::Sat,
        DayOfWeek::Sun,
    ];

    /// Zero-based position in the ISO week.
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(w: Weekday) -> Self {
        DayOfWeek::ALL[w.num_days_from_monday() as usize]
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Calendar features of a single timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeBucket {
    pub date: NaiveDate,
    pub hour: u32,
    pub weekday: DayOfWeek,
    pub season: Season,
    pub is_holiday: bool,
}

/// Derives date, hour, weekday, season and holiday flag for `timestamp`.
pub fn bucket(timestamp: NaiveDateTime, calendar: &HolidayCalendar) -> TimeBucket {
    let date = timestamp.date();
    TimeBucket {
        date,
        hour: timestamp.hour(),
        weekday: DayOfWeek::from(date.weekday()),
        // chrono months are always 1..=12
        season: Season::from_month(date.month()).unwrap_or(Season::Winter),
        is_holiday: calendar.is_holiday(date),
    }
}

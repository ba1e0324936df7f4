use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// Named Barcelona holidays plus the August vacation marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Holiday {
    NewYear,
    SantJordi,
    SantJoan,
    LaMerce,
    Christmas,
    Easter,
    AugustVacation,
}

impl Holiday {
    pub fn is_named(&self) -> bool {
        !matches!(self, Holiday::AugustVacation)
    }
}

/// (month, day, holiday) repeated every year.
const FIXED: &[(u32, u32, Holiday)] = &[
    (1, 1, Holiday::NewYear),
    (4, 23, Holiday::SantJordi),
    (6, 24, Holiday::SantJoan),
    (9, 24, Holiday::LaMerce),
    (12, 25, Holiday::Christmas),
];

/// Easter Sunday for a Gregorian year (anonymous Gregorian algorithm).
pub fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year.rem_euclid(19);
    let b = year.div_euclid(100);
    let c = year.rem_euclid(100);
    let d = b.div_euclid(4);
    let e = b.rem_euclid(4);
    let f = (b + 8).div_euclid(25);
    let g = (b - f + 1).div_euclid(3);
    let h = (19 * a + b - d - g + 15).rem_euclid(30);
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k).rem_euclid(7);
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
}

/// Date set used to flag non-workday observations.
///
/// Lookups are a single hash probe; dates outside the years the calendar
/// was built for are never holidays.
#[derive(Debug, Clone, Default)]
pub struct HolidayCalendar {
    days: HashMap<NaiveDate, Holiday>,
}

impl HolidayCalendar {
    /// Calendar for exactly the given years; repeated years are harmless.
    pub fn for_years<I: IntoIterator<Item = i32>>(years: I) -> Self {
        let mut days = HashMap::new();

        for year in years {
            for &(month, day, holiday) in FIXED {
                if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                    days.insert(date, holiday);
                }
            }

            if let Some(easter) = easter_sunday(year) {
                days.insert(easter, Holiday::Easter);
            }

            // Named holidays were inserted first and keep their label.
            for day in 1..=31 {
                if let Some(date) = NaiveDate::from_ymd_opt(year, 8, day) {
                    days.entry(date).or_insert(Holiday::AugustVacation);
                }
            }
        }

        HolidayCalendar { days }
    }

    /// Builds the calendar for the distinct years present in `dates`. Years
    /// between them that never occur are not filled in. An empty input
    /// yields an empty calendar.
    pub fn spanning<I>(dates: I) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        let years: BTreeSet<i32> = dates.into_iter().map(|d| d.year()).collect();
        Self::for_years(years)
    }

    pub fn holiday(&self, date: NaiveDate) -> Option<Holiday> {
        self.days.get(&date).copied()
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.days.contains_key(&date)
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

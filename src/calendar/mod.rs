//! Calendar features derived from observation timestamps.
//!
//! [`HolidayCalendar`] is built once for the span of years present in the
//! data, then [`bucket`] maps each timestamp to its [`TimeBucket`].

mod bucket;
mod holidays;
mod season;

pub use bucket::{DayOfWeek, TimeBucket, bucket};
pub use holidays::{Holiday, HolidayCalendar, easter_sunday};
pub use season::Season;

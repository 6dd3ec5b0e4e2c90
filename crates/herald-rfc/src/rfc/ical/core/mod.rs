//! iCalendar value types used by rule normalization.
//!
//! Only the value forms that appear in stored recurrence rules are modelled:
//! `DATE`, `DATE-TIME` (floating or `Z`-suffixed) and `HH:MM` end times.

mod datetime;
mod time_of_day;

pub use datetime::DateValue;
pub use time_of_day::parse_time_of_day;

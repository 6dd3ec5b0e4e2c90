use chrono::NaiveTime;

use crate::error::{RfcError, RfcResult};

/// ## Summary
/// Parses an `HH:MM` (or `H:MM`) time of day.
///
/// ## Errors
/// Returns `RfcError::ParseError` if the text is not two colon-separated
/// numbers, or if the hour or minute is out of range.
pub fn parse_time_of_day(text: &str) -> RfcResult<NaiveTime> {
    let trimmed = text.trim();
    let invalid = || RfcError::ParseError(format!("invalid time of day {text:?}"));

    let (hour, minute) = trimmed.split_once(':').ok_or_else(invalid)?;
    if hour.is_empty()
        || hour.len() > 2
        || minute.len() != 2
        || !hour.bytes().chain(minute.bytes()).all(|b| b.is_ascii_digit())
    {
        return Err(invalid());
    }

    let hour = hour.parse::<u32>().map_err(|_err| invalid())?;
    let minute = minute.parse::<u32>().map_err(|_err| invalid())?;
    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(invalid)
}

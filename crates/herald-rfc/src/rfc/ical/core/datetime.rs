use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{RfcError, RfcResult};

/// A `DATE` or `DATE-TIME` value as written in a rule line.
///
/// The value is kept as written: whether it carried a `Z` suffix is recorded
/// separately, since stored rules use `Z` for local wall-clock values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateValue {
    pub naive: NaiveDateTime,
    /// A trailing `Z` was present.
    pub utc: bool,
    /// The value had no time part (`VALUE=DATE` form).
    pub date_only: bool,
}

impl DateValue {
    /// ## Summary
    /// Parses `YYYYMMDD`, `YYYYMMDDTHHMMSS` or `YYYYMMDDTHHMMSSZ`.
    ///
    /// Date-only values get a midnight time.
    ///
    /// ## Errors
    /// Returns `RfcError::ParseError` if the value does not match one of the
    /// accepted shapes or names an impossible date or time.
    pub fn parse(value: &str) -> RfcResult<Self> {
        let value = value.trim();
        let (body, utc) = match value.strip_suffix(['Z', 'z']) {
            Some(body) => (body, true),
            None => (value, false),
        };

        let bytes = body.as_bytes();
        let date = parse_date(body)?;

        match bytes.len() {
            8 => Ok(Self {
                naive: date.and_time(NaiveTime::MIN),
                utc,
                date_only: true,
            }),
            15 if bytes[8].eq_ignore_ascii_case(&b'T') => {
                let hour = parse_digits(body, 9, 11)?;
                let minute = parse_digits(body, 11, 13)?;
                let second = parse_digits(body, 13, 15)?;
                let time = NaiveTime::from_hms_opt(hour, minute, second)
                    .ok_or_else(|| RfcError::ParseError(format!("invalid time in {value:?}")))?;
                Ok(Self {
                    naive: date.and_time(time),
                    utc,
                    date_only: false,
                })
            }
            _ => Err(RfcError::ParseError(format!(
                "unrecognized date-time {value:?}"
            ))),
        }
    }

    /// ## Summary
    /// Formats a wall-clock value in the `Z`-suffixed form the expander works in.
    #[must_use]
    pub fn format_floating(naive: NaiveDateTime) -> String {
        format!("{}Z", naive.format("%Y%m%dT%H%M%S"))
    }
}

fn parse_date(body: &str) -> RfcResult<NaiveDate> {
    if body.len() < 8 {
        return Err(RfcError::ParseError(format!("date too short: {body:?}")));
    }
    let year = parse_digits(body, 0, 4)?;
    let month = parse_digits(body, 4, 6)?;
    let day = parse_digits(body, 6, 8)?;
    let year = i32::try_from(year)
        .map_err(|err| RfcError::ParseError(format!("invalid year in {body:?}: {err}")))?;
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| RfcError::ParseError(format!("invalid date {body:?}")))
}

fn parse_digits(text: &str, start: usize, end: usize) -> RfcResult<u32> {
    let slice = text
        .get(start..end)
        .filter(|digits| digits.bytes().all(|b| b.is_ascii_digit()))
        .ok_or_else(|| RfcError::ParseError(format!("expected digits in {text:?}")))?;
    slice
        .parse::<u32>()
        .map_err(|err| RfcError::ParseError(format!("invalid number in {text:?}: {err}")))
}

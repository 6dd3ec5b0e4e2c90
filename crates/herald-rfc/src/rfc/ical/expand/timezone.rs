//! Timezone resolution and wall-clock/instant conversion.
//!
//! Uses ICU4X for Windows timezone ID to IANA mapping and timezone canonicalization.

use chrono::{DateTime, LocalResult, NaiveDateTime, NaiveTime, Offset, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use herald_core::window::OccurrenceWindow;
use icu::time::zone::WindowsParser;
use icu::time::zone::iana::IanaParserExtended;
use std::collections::HashMap;
use std::str::FromStr;

/// Error during timezone conversion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    /// Unknown or invalid timezone identifier.
    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),
}

/// Resolver for timezone identifiers.
///
/// Holds the resolutions made during one evaluation call. It is created by
/// the caller and passed down explicitly; nothing is shared between calls.
#[derive(Debug, Default)]
pub struct TimeZoneResolver {
    /// Cache of resolved IANA timezones by TZID.
    cache: HashMap<String, Tz>,
}

impl TimeZoneResolver {
    /// Creates a new timezone resolver.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
        }
    }

    /// ## Summary
    /// Resolves a timezone identifier to a `chrono_tz::Tz`.
    ///
    /// Accepts IANA names, IANA aliases and Windows zone names, with or
    /// without the `/mozilla.org/`-style prefixes some clients emit.
    ///
    /// ## Errors
    ///
    /// Returns `ConversionError::UnknownTimezone` if the TZID cannot be resolved.
    ///
    /// ## Side Effects
    ///
    /// Caches successful resolutions to avoid repeated parsing.
    pub fn resolve(&mut self, tzid: &str) -> Result<Tz, ConversionError> {
        if let Some(tz) = self.cache.get(tzid) {
            return Ok(*tz);
        }

        let normalized = normalize_tzid(tzid.trim());

        let tz = Tz::from_str(&normalized)
            .map_err(|_e| ConversionError::UnknownTimezone(tzid.to_string()))?;

        tracing::trace!(tzid, resolved = %tz, "Resolved timezone");
        self.cache.insert(tzid.to_string(), tz);

        Ok(tz)
    }
}

/// Normalizes common calendar-client timezone identifiers to IANA names.
///
/// Uses ICU4X for Windows timezone ID mapping and IANA canonicalization.
fn normalize_tzid(tzid: &str) -> String {
    let stripped = tzid
        .strip_prefix("/mozilla.org/")
        .or_else(|| tzid.strip_prefix("/softwarestudio.org/"))
        .unwrap_or(tzid);

    // Windows names first ("E. South America Standard Time")
    let windows_parser = WindowsParser::new();
    if let Some(tz) = windows_parser.parse(stripped, None) {
        let iana_parser = IanaParserExtended::new();
        for entry in iana_parser.iter() {
            if entry.time_zone == tz {
                return entry.canonical.to_string();
            }
        }
    }

    // IANA canonicalization (Europe/Kiev -> Europe/Kyiv, US/Eastern -> America/New_York)
    let iana_parser = IanaParserExtended::new();
    let parsed = iana_parser.parse(stripped);
    if parsed.time_zone != icu::time::TimeZone::UNKNOWN {
        return parsed.canonical.to_string();
    }

    stripped.to_string()
}

/// ## Summary
/// Converts a wall-clock time in `tz` to an instant.
///
/// DST folds resolve to the earliest instant. Times inside a DST gap are
/// interpreted with the offset in force before the gap, which moves them
/// forward by the length of the gap. The conversion never fails, so a
/// calendar day's occurrence is never lost to a transition.
#[must_use]
pub fn local_to_utc(local: NaiveDateTime, tz: Tz) -> DateTime<Utc> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _latest) => earliest.with_timezone(&Utc),
        LocalResult::None => {
            let day_before = local.checked_sub_signed(TimeDelta::days(1)).unwrap_or(local);
            let before_gap = tz.offset_from_utc_datetime(&day_before).fix();
            let utc = local
                .checked_sub_offset(before_gap)
                .unwrap_or(local);
            tracing::debug!(%local, %tz, "Wall-clock time falls in a DST gap, shifting forward");
            DateTime::from_naive_utc_and_offset(utc, Utc)
        }
    }
}

/// ## Summary
/// Returns the wall-clock time in `tz` at `instant`.
///
/// Instants whose wall clock would fall outside the representable range
/// keep their UTC wall clock.
#[must_use]
pub fn utc_to_local(instant: DateTime<Utc>, tz: Tz) -> NaiveDateTime {
    let naive = instant.naive_utc();
    let offset = tz.offset_from_utc_datetime(&naive).fix();
    naive.checked_add_offset(offset).unwrap_or(naive)
}

/// ## Summary
/// Returns the calendar day containing `instant` in `tz` as a half-open window.
#[must_use]
pub fn local_day(instant: DateTime<Utc>, tz: Tz) -> OccurrenceWindow {
    let date = utc_to_local(instant, tz).date();
    let from = local_to_utc(date.and_time(NaiveTime::MIN), tz);
    let to = date
        .succ_opt()
        .map_or(from, |next| local_to_utc(next.and_time(NaiveTime::MIN), tz));
    OccurrenceWindow::new(from, to)
}

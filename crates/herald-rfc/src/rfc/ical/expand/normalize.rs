//! Rewrites stored rule text into the floating form the expander works in.
//!
//! Stored rules write local wall-clock times with a `Z` suffix, occasionally
//! carry a `TZID`, and sometimes omit the `RRULE:` prefix or the `RRULE` line
//! altogether. Expansion runs on wall-clock values tagged as UTC so that no
//! DST rule is applied while generating dates; the rule's zone is returned
//! separately and applied afterwards.

use chrono::{NaiveDateTime, NaiveTime};
use chrono_tz::Tz;

use super::recurrence::ExpansionError;
use super::timezone::{TimeZoneResolver, local_to_utc, utc_to_local};
use crate::rfc::ical::core::DateValue;

/// Rule appended when the text only has a `DTSTART`.
const SINGLE_OCCURRENCE_RRULE: &str = "RRULE:FREQ=DAILY;COUNT=1";

/// Rule text ready for `rrule::RRuleSet` parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NormalizedRule {
    pub text: String,
    /// Zone in which the floating values are wall-clock times.
    pub zone: Tz,
    pub dtstart: NaiveDateTime,
}

/// One `NAME;PARAM=VALUE:VALUE` line.
#[derive(Debug)]
struct ContentLine<'a> {
    name: String,
    tzid: Option<&'a str>,
    value: &'a str,
}

impl<'a> ContentLine<'a> {
    fn split(line: &'a str) -> Self {
        // A bare "FREQ=..." line is read as the RRULE
        if line
            .get(..5)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("FREQ="))
        {
            return Self {
                name: "RRULE".to_string(),
                tzid: None,
                value: line,
            };
        }

        let (head, value) = line.split_once(':').unwrap_or((line, ""));
        let mut parts = head.split(';');
        let name = parts.next().unwrap_or_default().trim().to_ascii_uppercase();
        let tzid = parts.find_map(|param| {
            let (key, val) = param.split_once('=')?;
            key.trim()
                .eq_ignore_ascii_case("TZID")
                .then_some(val.trim())
        });

        Self { name, tzid, value }
    }
}

/// How values without their own `TZID` are read.
#[derive(Debug, Clone, Copy)]
struct RuleClock {
    zone: Tz,
    /// `DTSTART` carried a `TZID`, so `Z` values are real UTC instants.
    zoned: bool,
    dtstart: NaiveDateTime,
}

impl RuleClock {
    fn wall_clock(&self, value: DateValue, date_only_time: NaiveTime) -> NaiveDateTime {
        if value.date_only {
            value.naive.date().and_time(date_only_time)
        } else if self.zoned && value.utc {
            utc_to_local(value.naive.and_utc(), self.zone)
        } else {
            value.naive
        }
    }
}

/// ## Summary
/// Normalizes stored rule text.
///
/// ## Errors
/// Returns `ExpansionError::MissingDtstart` if no `DTSTART` line exists,
/// `ExpansionError::UnknownTimezone` for unresolvable `TZID`s, and
/// `ExpansionError::InvalidRule` for malformed values or unsupported lines.
pub(crate) fn normalize_rule(
    raw: &str,
    default_zone: Tz,
    resolver: &mut TimeZoneResolver,
) -> Result<NormalizedRule, ExpansionError> {
    let lines: Vec<ContentLine<'_>> = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ContentLine::split)
        .collect();

    let dtstart_line = lines
        .iter()
        .find(|line| line.name == "DTSTART")
        .ok_or(ExpansionError::MissingDtstart)?;

    let (zone, zoned) = match dtstart_line.tzid {
        Some(tzid) => (resolve_zone(tzid, resolver)?, true),
        None => (default_zone, false),
    };
    let dtstart_value = parse_value(dtstart_line.value)?;
    let clock = RuleClock {
        zone,
        zoned,
        dtstart: dtstart_value.naive,
    };

    let mut rewritten = vec![format!(
        "DTSTART:{}",
        DateValue::format_floating(clock.dtstart)
    )];
    let mut has_rrule = false;

    for line in &lines {
        match line.name.as_str() {
            "DTSTART" => {}
            "RRULE" => {
                has_rrule = true;
                rewritten.push(format!("RRULE:{}", rewrite_rrule(line.value, &clock)?));
            }
            "EXDATE" | "RDATE" => {
                rewritten.push(format!(
                    "{}:{}",
                    line.name,
                    rewrite_date_list(line, &clock, resolver)?
                ));
            }
            other => {
                return Err(ExpansionError::InvalidRule(format!(
                    "unsupported rule line {other:?}"
                )));
            }
        }
    }

    if !has_rrule {
        rewritten.insert(1, SINGLE_OCCURRENCE_RRULE.to_string());
    }

    Ok(NormalizedRule {
        text: rewritten.join("\n"),
        zone,
        dtstart: clock.dtstart,
    })
}

fn resolve_zone(tzid: &str, resolver: &mut TimeZoneResolver) -> Result<Tz, ExpansionError> {
    resolver
        .resolve(tzid)
        .map_err(|_err| ExpansionError::UnknownTimezone(tzid.to_string()))
}

fn parse_value(value: &str) -> Result<DateValue, ExpansionError> {
    DateValue::parse(value).map_err(|err| ExpansionError::InvalidRule(err.to_string()))
}

/// Rewrites `UNTIL` into the floating form; other parts pass through.
fn rewrite_rrule(value: &str, clock: &RuleClock) -> Result<String, ExpansionError> {
    let end_of_day = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);

    value
        .split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| match part.split_once('=') {
            Some((key, until)) if key.eq_ignore_ascii_case("UNTIL") => {
                let until = clock.wall_clock(parse_value(until)?, end_of_day);
                Ok(format!("UNTIL={}", DateValue::format_floating(until)))
            }
            _ => Ok(part.to_string()),
        })
        .collect::<Result<Vec<_>, _>>()
        .map(|parts| parts.join(";"))
}

/// Rewrites an `EXDATE`/`RDATE` value list into the rule's floating wall clock.
fn rewrite_date_list(
    line: &ContentLine<'_>,
    clock: &RuleClock,
    resolver: &mut TimeZoneResolver,
) -> Result<String, ExpansionError> {
    let own_zone = line
        .tzid
        .map(|tzid| resolve_zone(tzid, resolver))
        .transpose()?;

    line.value
        .split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| {
            let parsed = parse_value(value)?;
            let wall = match own_zone {
                Some(own) if !parsed.date_only => {
                    utc_to_local(local_to_utc(parsed.naive, own), clock.zone)
                }
                _ => clock.wall_clock(parsed, clock.dtstart.time()),
            };
            Ok(DateValue::format_floating(wall))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(|values| values.join(","))
}

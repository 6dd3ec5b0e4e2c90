//! RRULE expansion using the `rrule` crate.

use chrono::{DateTime, NaiveDateTime, NaiveTime, TimeDelta, Timelike, Utc};
use chrono_tz::Tz;
use herald_core::constants::{DEFAULT_MAX_INSTANCES, MAX_SCANNED_OCCURRENCES};
use herald_core::window::OccurrenceWindow;
use rrule::RRuleSet;

use super::normalize::normalize_rule;
use super::timezone::{TimeZoneResolver, local_to_utc, utc_to_local};

/// Error during recurrence expansion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExpansionError {
    /// Rule text could not be normalized or parsed.
    #[error("Invalid recurrence rule: {0}")]
    InvalidRule(String),

    /// Rule text has no DTSTART line.
    #[error("Recurrence rule has no DTSTART")]
    MissingDtstart,

    /// A TZID in the rule could not be resolved.
    #[error("Unknown timezone in recurrence rule: {0}")]
    UnknownTimezone(String),
}

/// Options for recurrence expansion.
#[derive(Debug, Clone, Copy)]
pub struct ExpansionOptions {
    /// Maximum number of calendar days with occurrences per expansion.
    pub max_instances: u16,

    /// Zone for rule values that carry no TZID.
    pub zone: Tz,
}

impl Default for ExpansionOptions {
    fn default() -> Self {
        Self {
            max_instances: DEFAULT_MAX_INSTANCES,
            zone: Tz::UTC,
        }
    }
}

impl ExpansionOptions {
    /// Creates expansion options for a default zone.
    #[must_use]
    pub fn with_zone(zone: Tz) -> Self {
        Self {
            zone,
            ..Self::default()
        }
    }

    /// Sets the maximum number of instances.
    #[must_use]
    pub fn with_max_instances(mut self, max: u16) -> Self {
        self.max_instances = max;
        self
    }
}

/// Result of expanding a rule over a window.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expansion {
    /// Wall-clock occurrences in the rule's zone, ascending and distinct.
    pub occurrences: Vec<NaiveDateTime>,
    /// The instance or scan limit was reached; later occurrences may be missing.
    pub truncated: bool,
}

/// A parsed recurrence rule bound to the zone its wall-clock values live in.
///
/// Expansion runs on floating values, so the rule produces one occurrence per
/// matching calendar day regardless of DST; `zone` is applied only when an
/// occurrence is turned into an instant.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    rrule_set: RRuleSet,
    zone: Tz,
    dtstart: NaiveDateTime,
    max_instances: u16,
}

impl CompiledRule {
    /// ## Summary
    /// Normalizes and parses stored rule text.
    ///
    /// ## Errors
    ///
    /// Returns an error if:
    /// - The rule has no DTSTART
    /// - A TZID cannot be resolved
    /// - The text is not a valid RRULE set
    pub fn compile(
        rule_text: &str,
        options: ExpansionOptions,
        resolver: &mut TimeZoneResolver,
    ) -> Result<Self, ExpansionError> {
        let normalized = normalize_rule(rule_text, options.zone, resolver)?;

        let rrule_set = normalized
            .text
            .parse::<RRuleSet>()
            .map_err(|e| ExpansionError::InvalidRule(e.to_string()))?
            .limit();

        tracing::trace!(rule = %normalized.text, zone = %normalized.zone, "Compiled recurrence rule");

        Ok(Self {
            rrule_set,
            zone: normalized.zone,
            dtstart: normalized.dtstart,
            max_instances: options.max_instances,
        })
    }

    /// Zone in which the rule's occurrences are wall-clock times.
    #[must_use]
    pub fn zone(&self) -> Tz {
        self.zone
    }

    #[must_use]
    pub fn dtstart(&self) -> NaiveDateTime {
        self.dtstart
    }

    #[must_use]
    pub fn max_instances(&self) -> u16 {
        self.max_instances
    }

    /// ## Summary
    /// Returns the start time of day encoded in DTSTART.
    ///
    /// A DTSTART at `00:00` means no time of day was specified.
    #[must_use]
    pub fn start_time_of_day(&self) -> Option<NaiveTime> {
        let (hour, minute) = (self.dtstart.hour(), self.dtstart.minute());
        if hour + minute == 0 {
            return None;
        }
        NaiveTime::from_hms_opt(hour, minute, 0)
    }

    /// Converts one of this rule's occurrences to an instant.
    #[must_use]
    pub fn instant_of(&self, occurrence: NaiveDateTime) -> DateTime<Utc> {
        local_to_utc(occurrence, self.zone)
    }

    /// Occurrences in ascending wall-clock order, starting at DTSTART.
    ///
    /// The walk ends after [`MAX_SCANNED_OCCURRENCES`] values.
    fn walk(&self) -> impl Iterator<Item = NaiveDateTime> + '_ {
        (&self.rrule_set)
            .into_iter()
            .take(MAX_SCANNED_OCCURRENCES)
            .map(|occurrence| occurrence.naive_utc())
    }

    /// Wall-clock bounds of `window` with one day of slack on each side.
    fn floating_bounds(&self, window: &OccurrenceWindow) -> (NaiveDateTime, NaiveDateTime) {
        let from = utc_to_local(window.from, self.zone);
        let to = utc_to_local(window.to, self.zone);
        (
            from.checked_sub_signed(TimeDelta::days(1)).unwrap_or(from),
            to.checked_add_signed(TimeDelta::days(1)).unwrap_or(to),
        )
    }

    /// ## Summary
    /// Expands the rule over a half-open window of instants.
    ///
    /// Returns the occurrences whose instant lies in `[window.from, window.to)`.
    /// An empty window yields no occurrences.
    ///
    /// The instance limit counts calendar days, so a sub-daily rule covers as
    /// many days as a daily one. Reaching the limit sets `truncated`.
    ///
    /// ## Side Effects
    ///
    /// None - this is a pure function that performs expansion in memory.
    #[must_use]
    pub fn expand(&self, window: &OccurrenceWindow) -> Expansion {
        if window.is_empty() {
            return Expansion::default();
        }

        // The slack covers zone offsets; the exact bounds are enforced on
        // instants below.
        let (lower, upper) = self.floating_bounds(window);

        let mut occurrences: Vec<NaiveDateTime> = Vec::new();
        let mut days: u16 = 0;
        let mut scanned: usize = 0;
        let mut truncated = false;
        let mut reached_end = false;

        for occurrence in self.walk() {
            scanned += 1;
            if occurrence > upper {
                reached_end = true;
                break;
            }
            if occurrence < lower || !window.contains(self.instant_of(occurrence)) {
                continue;
            }

            let new_day = occurrences
                .last()
                .is_none_or(|last| last.date() != occurrence.date());
            if new_day {
                if days == self.max_instances {
                    truncated = true;
                    break;
                }
                days += 1;
            }
            occurrences.push(occurrence);
        }

        if !reached_end && scanned == MAX_SCANNED_OCCURRENCES {
            truncated = true;
        }

        if truncated {
            tracing::warn!(
                max_instances = self.max_instances,
                scanned,
                from = %window.from,
                to = %window.to,
                "Recurrence expansion reached the instance limit"
            );
        }

        occurrences.sort_unstable();
        occurrences.dedup();

        Expansion {
            occurrences,
            truncated,
        }
    }

    /// Returns the first occurrence inside `window`.
    #[must_use]
    pub fn first_in(&self, window: &OccurrenceWindow) -> Option<NaiveDateTime> {
        if window.is_empty() {
            return None;
        }

        let (lower, upper) = self.floating_bounds(window);
        self.walk()
            .take_while(|occurrence| *occurrence <= upper)
            .filter(|occurrence| *occurrence >= lower)
            .find(|occurrence| window.contains(self.instant_of(*occurrence)))
    }

    /// ## Summary
    /// Returns the last occurrence whose instant is strictly before `instant`.
    ///
    /// The whole history up to `instant` is walked, so sub-daily rules report
    /// their true last occurrence.
    #[must_use]
    pub fn last_before(&self, instant: DateTime<Utc>) -> Option<NaiveDateTime> {
        let local = utc_to_local(instant, self.zone);
        let upper = local.checked_add_signed(TimeDelta::days(1)).unwrap_or(local);

        let mut last = None;
        let mut scanned: usize = 0;
        for occurrence in self.walk() {
            scanned += 1;
            if occurrence > upper {
                return last;
            }
            if self.instant_of(occurrence) < instant {
                last = Some(occurrence);
            }
        }

        if scanned == MAX_SCANNED_OCCURRENCES {
            tracing::warn!(%instant, scanned, "History scan reached the occurrence limit");
        }
        last
    }

    /// Returns whether any occurrence lies strictly before `instant`.
    #[must_use]
    pub fn has_occurrence_before(&self, instant: DateTime<Utc>) -> bool {
        self.walk()
            .next()
            .is_some_and(|first| self.instant_of(first) < instant)
    }

    /// ## Summary
    /// Counts the rule's occurrences, stopping at `limit`.
    #[must_use]
    pub fn count_up_to(&self, limit: usize) -> usize {
        self.walk().take(limit).count()
    }

    /// ## Summary
    /// Returns whether the rule expands to exactly one occurrence ever.
    #[must_use]
    pub fn is_single_occurrence(&self) -> bool {
        self.count_up_to(2) == 1
    }
}

/// ## Summary
/// Expands stored rule text over a window.
///
/// Values without a TZID are wall-clock times in `options.zone`.
///
/// ## Errors
///
/// Returns an error if the rule text is malformed; see [`CompiledRule::compile`].
///
/// ## Side Effects
///
/// None - this is a pure function that performs expansion in memory.
pub fn expand_rrule(
    rule_text: &str,
    window: &OccurrenceWindow,
    options: ExpansionOptions,
) -> Result<Expansion, ExpansionError> {
    let mut resolver = TimeZoneResolver::new();
    let rule = CompiledRule::compile(rule_text, options, &mut resolver)?;
    Ok(rule.expand(window))
}

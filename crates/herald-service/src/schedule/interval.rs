//! Resolution of occurrences into concrete `[start, end)` intervals.

use chrono::{DateTime, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use herald_rfc::rfc::ical::core::parse_time_of_day;
use herald_rfc::rfc::ical::expand::{CompiledRule, local_to_utc};
use serde::Serialize;

use herald_core::types::ItemKind;

use super::diagnostic::{Degradation, Diagnostics, ItemRef};

/// One occurrence of an item laid onto the timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedInterval {
    pub item_id: String,
    pub start: DateTime<Utc>,
    /// Absent when the item has no usable end time for this occurrence.
    pub end: Option<DateTime<Utc>>,
    /// Start and end are both known, so the interval can be in progress.
    pub duration_aware: bool,
}

impl ResolvedInterval {
    /// ## Summary
    /// Returns whether `now` lies in `[start, end)` of a duration-aware interval.
    #[must_use]
    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        self.duration_aware && self.end.is_some_and(|end| self.start <= now && now < end)
    }

    /// The end of the interval, or its start when it has no end.
    #[must_use]
    pub fn last_instant(&self) -> DateTime<Utc> {
        self.end.unwrap_or(self.start)
    }
}

/// Turns one item's occurrences into intervals.
///
/// The start time comes from the rule's `DTSTART`; the end time is the
/// item's `HH:MM` end time, parsed once when the resolver is built.
#[derive(Debug, Clone)]
pub struct IntervalResolver {
    item_id: String,
    kind: ItemKind,
    zone: Tz,
    start_time: Option<NaiveTime>,
    end_time: Option<NaiveTime>,
}

impl IntervalResolver {
    /// ## Summary
    /// Builds a resolver for one item.
    ///
    /// An end time that does not parse is reported as `InvalidEndTime` and
    /// dropped. An end time on a rule without a start time is ignored.
    #[must_use]
    pub fn new(
        item: ItemRef<'_>,
        rule: &CompiledRule,
        end_time_of_day: Option<&str>,
        diagnostics: &mut Diagnostics,
    ) -> Self {
        let start_time = rule.start_time_of_day();

        let end_time = match (start_time, end_time_of_day) {
            (Some(_), Some(text)) => match parse_time_of_day(text) {
                Ok(time) => Some(time),
                Err(_err) => {
                    diagnostics.report(
                        Some(item),
                        Degradation::InvalidEndTime {
                            value: text.to_string(),
                        },
                    );
                    None
                }
            },
            (None, Some(text)) => {
                tracing::trace!(item_id = item.id, end_time = text, "Ignoring end time of a rule without start time");
                None
            }
            (_, None) => None,
        };

        Self {
            item_id: item.id.to_string(),
            kind: item.kind,
            zone: rule.zone(),
            start_time,
            end_time,
        }
    }

    #[must_use]
    pub fn item_id(&self) -> &str {
        &self.item_id
    }

    #[must_use]
    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    #[must_use]
    pub fn item(&self) -> ItemRef<'_> {
        ItemRef::new(self.kind, &self.item_id)
    }

    #[must_use]
    pub fn has_start_time(&self) -> bool {
        self.start_time.is_some()
    }

    /// ## Summary
    /// Resolves one occurrence.
    ///
    /// The start is the occurrence's calendar day at the rule's start time,
    /// or midnight when the rule has none. An end earlier than the start is
    /// reported as `AmbiguousInterval` and the occurrence is left without an end.
    pub fn resolve(
        &self,
        occurrence: NaiveDateTime,
        diagnostics: &mut Diagnostics,
    ) -> ResolvedInterval {
        let date = occurrence.date();
        let start = local_to_utc(
            date.and_time(self.start_time.unwrap_or(NaiveTime::MIN)),
            self.zone,
        );

        let end = self
            .start_time
            .and(self.end_time)
            .map(|end_time| local_to_utc(date.and_time(end_time), self.zone))
            .filter(|end| {
                if *end < start {
                    diagnostics.report(
                        Some(self.item()),
                        Degradation::AmbiguousInterval { start, end: *end },
                    );
                    return false;
                }
                true
            });

        ResolvedInterval {
            item_id: self.item_id.clone(),
            start,
            end,
            duration_aware: end.is_some(),
        }
    }
}

/// ## Summary
/// Resolves a single occurrence of `rule` with an optional end time of day.
pub fn resolve_interval(
    item: ItemRef<'_>,
    occurrence: NaiveDateTime,
    rule: &CompiledRule,
    end_time_of_day: Option<&str>,
    diagnostics: &mut Diagnostics,
) -> ResolvedInterval {
    IntervalResolver::new(item, rule, end_time_of_day, diagnostics).resolve(occurrence, diagnostics)
}

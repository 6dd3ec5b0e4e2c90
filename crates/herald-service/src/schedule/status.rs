//! Temporal classification of scheduled items.

use chrono::{DateTime, TimeDelta, Utc};
use chrono_tz::Tz;
use herald_core::types::ItemKind;
use herald_core::window::OccurrenceWindow;
use herald_rfc::rfc::ical::expand::{CompiledRule, local_day};
use serde::Serialize;

use super::diagnostic::Diagnostics;
use super::interval::{IntervalResolver, ResolvedInterval};

/// Where an item stands relative to "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum OccurrenceStatus {
    /// Nothing in the horizon, nothing in progress, and nothing in the past.
    NoOccurrence,
    Upcoming,
    InProgress,
    /// Nothing upcoming or in progress, but at least one past occurrence.
    Expired,
}

impl OccurrenceStatus {
    /// `Upcoming` and `InProgress` items are active.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Upcoming | Self::InProgress)
    }
}

/// Classification of one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemStatus {
    pub item_id: String,
    pub kind: ItemKind,
    pub status: OccurrenceStatus,
    /// Today's interval containing "now", when in progress.
    pub current: Option<ResolvedInterval>,
    /// First occurrence in the upcoming window.
    pub next: Option<ResolvedInterval>,
    /// End (or start, without an end) of the last occurrence, for expired items.
    pub last_occurrence_end: Option<DateTime<Utc>>,
}

impl ItemStatus {
    /// Status of an item whose rule could not be used.
    #[must_use]
    pub fn no_occurrence(item_id: &str, kind: ItemKind) -> Self {
        Self {
            item_id: item_id.to_string(),
            kind,
            status: OccurrenceStatus::NoOccurrence,
            current: None,
            next: None,
            last_occurrence_end: None,
        }
    }
}

/// Classifies items against one reference moment.
///
/// The day and horizon windows are computed once when the classifier is
/// built and reused for every item of the call.
#[derive(Debug, Clone, Copy)]
pub struct StatusClassifier {
    now: DateTime<Utc>,
    today: OccurrenceWindow,
    upcoming: OccurrenceWindow,
}

impl StatusClassifier {
    /// ## Summary
    /// Builds a classifier for `now`.
    ///
    /// "Today" is the calendar day containing `now` in `zone`; the upcoming
    /// window is `[now, now + horizon]`, ending at the last representable
    /// instant when the horizon reaches past it.
    #[must_use]
    pub fn new(now: DateTime<Utc>, zone: Tz, horizon: TimeDelta) -> Self {
        let horizon_end = now
            .checked_add_signed(horizon)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        Self {
            now,
            today: local_day(now, zone),
            upcoming: OccurrenceWindow::through(now, horizon_end),
        }
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    #[must_use]
    pub fn today(&self) -> OccurrenceWindow {
        self.today
    }

    #[must_use]
    pub fn upcoming(&self) -> OccurrenceWindow {
        self.upcoming
    }

    /// ## Summary
    /// Classifies one item.
    ///
    /// Only the earliest occurrence of today is checked for being in progress.
    pub fn classify(
        &self,
        rule: &CompiledRule,
        intervals: &IntervalResolver,
        diagnostics: &mut Diagnostics,
    ) -> ItemStatus {
        let item_id = intervals.item_id();
        let kind = intervals.kind();

        let current = rule
            .first_in(&self.today)
            .map(|occurrence| intervals.resolve(occurrence, diagnostics))
            .filter(|interval| interval.contains(self.now));

        let next = rule
            .first_in(&self.upcoming)
            .map(|occurrence| intervals.resolve(occurrence, diagnostics));

        let (status, last_occurrence_end) = if current.is_some() {
            (OccurrenceStatus::InProgress, None)
        } else if next.is_some() {
            (OccurrenceStatus::Upcoming, None)
        } else if rule.has_occurrence_before(self.now) {
            let last_end = rule
                .last_before(self.now)
                .map(|occurrence| intervals.resolve(occurrence, diagnostics).last_instant());
            (OccurrenceStatus::Expired, last_end)
        } else {
            (OccurrenceStatus::NoOccurrence, None)
        };

        tracing::debug!(item_id, %kind, ?status, "Classified item");

        ItemStatus {
            item_id: item_id.to_string(),
            kind,
            status,
            current,
            next,
            last_occurrence_end,
        }
    }
}

//! Merging of resolved occurrences from many items into one timeline.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use herald_core::item::ScheduledItem;
use herald_core::types::ItemKind;
use herald_core::window::OccurrenceWindow;
use herald_rfc::rfc::ical::expand::{CompiledRule, utc_to_local};
use serde::Serialize;

use super::diagnostic::{Degradation, Diagnostic, Diagnostics, ItemRef};
use super::interval::{IntervalResolver, ResolvedInterval};
use super::status::{ItemStatus, OccurrenceStatus};

/// One row of the merged timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OccurrenceView {
    pub item_id: String,
    pub kind: ItemKind,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub duration_aware: bool,
    /// Status of this row relative to the evaluation moment.
    pub status: OccurrenceStatus,
}

impl OccurrenceView {
    fn new(item: &ScheduledItem, interval: ResolvedInterval, now: DateTime<Utc>) -> Self {
        let status = if interval.contains(now) {
            OccurrenceStatus::InProgress
        } else if interval.start >= now {
            OccurrenceStatus::Upcoming
        } else {
            OccurrenceStatus::Expired
        };

        Self {
            item_id: interval.item_id,
            kind: item.kind,
            title: item.title.clone(),
            start: interval.start,
            end: interval.end,
            duration_aware: interval.duration_aware,
            status,
        }
    }

    /// ## Summary
    /// Returns whether this row is in progress at `now`.
    #[must_use]
    pub fn is_in_progress_at(&self, now: DateTime<Utc>) -> bool {
        self.duration_aware && self.end.is_some_and(|end| self.start <= now && now < end)
    }

    fn sort_key(&self) -> (DateTime<Utc>, ItemKind, &str) {
        (self.start, self.kind, &self.item_id)
    }
}

/// Result of merging a set of items over a window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeOutcome {
    /// Rows ordered by start, then kind, then item id.
    pub views: Vec<OccurrenceView>,
    /// One classification per item, in input order.
    pub statuses: Vec<ItemStatus>,
    pub diagnostics: Vec<Diagnostic>,
}

impl MergeOutcome {
    /// ## Summary
    /// Returns the earliest row in progress at `now`.
    #[must_use]
    pub fn current(&self, now: DateTime<Utc>) -> Option<&OccurrenceView> {
        self.views.iter().find(|view| view.is_in_progress_at(now))
    }

    /// ## Summary
    /// Returns the earliest row starting strictly after `now`.
    #[must_use]
    pub fn next(&self, now: DateTime<Utc>) -> Option<&OccurrenceView> {
        self.views.iter().find(|view| view.start > now)
    }

    /// ## Summary
    /// Returns the row a countdown widget shows: the current row, else the next one.
    #[must_use]
    pub fn countdown(&self, now: DateTime<Utc>) -> Option<&OccurrenceView> {
        self.current(now).or_else(|| self.next(now))
    }

    /// ## Summary
    /// Groups rows by the calendar day of their start in `zone`.
    #[must_use]
    pub fn by_day(&self, zone: Tz) -> BTreeMap<NaiveDate, Vec<&OccurrenceView>> {
        let mut days: BTreeMap<NaiveDate, Vec<&OccurrenceView>> = BTreeMap::new();
        for view in &self.views {
            days.entry(utc_to_local(view.start, zone).date())
                .or_default()
                .push(view);
        }
        days
    }

    /// ## Summary
    /// Returns the classification of the item with this kind and id.
    #[must_use]
    pub fn status_of(&self, kind: ItemKind, item_id: &str) -> Option<&ItemStatus> {
        self.statuses
            .iter()
            .find(|status| status.kind == kind && status.item_id == item_id)
    }
}

/// Accumulates rows from many items over one window.
#[derive(Debug)]
pub struct SourceMerger {
    window: OccurrenceWindow,
    now: DateTime<Utc>,
    views: Vec<OccurrenceView>,
}

impl SourceMerger {
    #[must_use]
    pub fn new(window: OccurrenceWindow, now: DateTime<Utc>) -> Self {
        Self {
            window,
            now,
            views: Vec::new(),
        }
    }

    /// ## Summary
    /// Expands one item over the window and adds its rows.
    ///
    /// Rows whose resolved start falls outside the window are dropped. An
    /// expansion cut short by the instance limit is reported as
    /// `TruncatedExpansion`.
    pub fn push(
        &mut self,
        item: &ScheduledItem,
        rule: &CompiledRule,
        intervals: &IntervalResolver,
        diagnostics: &mut Diagnostics,
    ) {
        let expansion = rule.expand(&self.window);
        let before = self.views.len();

        if expansion.truncated {
            diagnostics.report(
                Some(ItemRef::of(item)),
                Degradation::TruncatedExpansion {
                    max_instances: rule.max_instances(),
                    last_included: expansion
                        .occurrences
                        .last()
                        .map(|occurrence| rule.instant_of(*occurrence)),
                },
            );
        }

        for occurrence in expansion.occurrences {
            let interval = intervals.resolve(occurrence, diagnostics);
            if self.window.contains(interval.start) {
                self.views.push(OccurrenceView::new(item, interval, self.now));
            }
        }

        tracing::trace!(
            item_id = %item.id,
            kind = %item.kind,
            rows = self.views.len() - before,
            truncated = expansion.truncated,
            "Merged item occurrences"
        );
    }

    /// ## Summary
    /// Orders and deduplicates the collected rows.
    #[must_use]
    pub fn finish(mut self, statuses: Vec<ItemStatus>, diagnostics: Diagnostics) -> MergeOutcome {
        self.views
            .sort_by(|left, right| left.sort_key().cmp(&right.sort_key()));
        self.views
            .dedup_by(|right, left| left.sort_key() == right.sort_key());

        tracing::debug!(
            rows = self.views.len(),
            items = statuses.len(),
            diagnostics = diagnostics.as_slice().len(),
            "Merged timeline"
        );

        MergeOutcome {
            views: self.views,
            statuses,
            diagnostics: diagnostics.into_vec(),
        }
    }
}

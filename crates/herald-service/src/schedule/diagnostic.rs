//! Per-item degradations reported alongside evaluation results.

use chrono::{DateTime, Utc};
use herald_core::item::ScheduledItem;
use herald_core::types::ItemKind;
use serde::Serialize;

/// Identity of an item within one call: its kind and id together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemRef<'a> {
    pub kind: ItemKind,
    pub id: &'a str,
}

impl<'a> ItemRef<'a> {
    #[must_use]
    pub const fn new(kind: ItemKind, id: &'a str) -> Self {
        Self { kind, id }
    }

    #[must_use]
    pub fn of(item: &'a ScheduledItem) -> Self {
        Self::new(item.kind, &item.id)
    }
}

/// A non-fatal problem with one item (or with the call itself).
///
/// The affected item degrades as described on each variant; evaluation of
/// the remaining items continues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "code", rename_all = "camelCase")]
pub enum Degradation {
    /// The recurrence rule could not be parsed. The item is `NoOccurrence`.
    #[error("Invalid recurrence rule: {reason}")]
    InvalidRule { reason: String },

    /// The end time of day is not `HH:MM`. The item is not duration-aware.
    #[error("Invalid end time {value:?}")]
    InvalidEndTime { value: String },

    /// The caller's window has `from >= to`. The result is empty.
    #[error("Empty window {from} .. {to}")]
    EmptyWindow {
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },

    /// The resolved end precedes the start. The occurrence is not duration-aware.
    #[error("End {end} precedes start {start}")]
    AmbiguousInterval {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// Expansion stopped at the instance limit. Occurrences after
    /// `lastIncluded` are missing from the result.
    #[error("Expansion stopped after {max_instances} days, last included {last_included:?}")]
    #[serde(rename_all = "camelCase")]
    TruncatedExpansion {
        max_instances: u16,
        last_included: Option<DateTime<Utc>>,
    },
}

impl Degradation {
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidRule { .. } => "invalidRule",
            Self::InvalidEndTime { .. } => "invalidEndTime",
            Self::EmptyWindow { .. } => "emptyWindow",
            Self::AmbiguousInterval { .. } => "ambiguousInterval",
            Self::TruncatedExpansion { .. } => "truncatedExpansion",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    /// `None` for call-level problems such as an empty window.
    pub item_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ItemKind>,
    pub degradation: Degradation,
}

impl Diagnostic {
    /// The item this diagnostic is about, if any.
    #[must_use]
    pub fn item(&self) -> Option<ItemRef<'_>> {
        self.item_id
            .as_deref()
            .zip(self.kind)
            .map(|(id, kind)| ItemRef::new(kind, id))
    }
}

/// Diagnostics collected during one evaluation call.
///
/// Each kind of degradation is reported once per item, however many of the
/// item's occurrences hit it.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// ## Summary
    /// Records a degradation and logs it at `warn`.
    pub fn report(&mut self, item: Option<ItemRef<'_>>, degradation: Degradation) {
        let seen = self.entries.iter().any(|entry| {
            entry.item() == item && entry.degradation.code() == degradation.code()
        });
        if seen {
            return;
        }

        tracing::warn!(
            item_id = item.map_or("-", |item| item.id),
            kind = item.map_or("-", |item| item.kind.as_str()),
            code = degradation.code(),
            "{degradation}"
        );
        self.entries.push(Diagnostic {
            item_id: item.map(|item| item.id.to_string()),
            kind: item.map(|item| item.kind),
            degradation,
        });
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.entries
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

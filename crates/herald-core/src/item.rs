//! The scheduled item record supplied by producers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ApprovalStatus, ItemKind, RecurrenceRule};

/// A scheduled announcement, service or script.
///
/// Owned and mutated by the persistence collaborator; the engine only reads it.
/// Legacy field names (`rruleString`, `endTime`, `status`) are accepted on input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledItem {
    pub id: String,
    pub kind: ItemKind,
    #[serde(default)]
    pub title: String,
    #[serde(alias = "rruleString")]
    pub rule: RecurrenceRule,
    /// Optional `HH:MM` end time, applied to each occurrence's day.
    #[serde(default, alias = "endTime", skip_serializing_if = "Option::is_none")]
    pub end_time_of_day: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, alias = "status")]
    pub approval_status: ApprovalStatus,
    /// Set while a restored item waits for re-approval.
    #[serde(default)]
    pub restore_requested: bool,
}

impl ScheduledItem {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        kind: ItemKind,
        rule: impl Into<RecurrenceRule>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            title: String::new(),
            rule: rule.into(),
            end_time_of_day: None,
            created_at,
            approval_status: ApprovalStatus::Approved,
            restore_requested: false,
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn with_end_time(mut self, end_time: impl Into<String>) -> Self {
        self.end_time_of_day = Some(end_time.into());
        self
    }

    #[must_use]
    pub fn with_status(mut self, status: ApprovalStatus) -> Self {
        self.approval_status = status;
        self
    }

    #[must_use]
    pub fn is_rejected(&self) -> bool {
        self.approval_status == ApprovalStatus::Rejected
    }
}

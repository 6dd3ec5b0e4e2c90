//! Dashboard tab assignment.

use herald_core::item::ScheduledItem;
use herald_core::types::ApprovalStatus;
use serde::Serialize;

use super::status::OccurrenceStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StatusTab {
    Open,
    Expired,
    Rejected,
}

impl StatusTab {
    /// ## Summary
    /// Returns the tab an item is listed under, if any.
    ///
    /// Rejected items always go to `Rejected`; approved items go to `Open`
    /// while active and to `Expired` otherwise. Pending items are listed on
    /// the approvals screen instead.
    #[must_use]
    pub fn for_item(item: &ScheduledItem, status: OccurrenceStatus) -> Option<Self> {
        match item.approval_status {
            ApprovalStatus::Rejected => Some(Self::Rejected),
            ApprovalStatus::Approved if status.is_active() => Some(Self::Open),
            ApprovalStatus::Approved => Some(Self::Expired),
            ApprovalStatus::Pending => None,
        }
    }
}

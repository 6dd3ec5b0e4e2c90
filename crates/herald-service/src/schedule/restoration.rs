//! Approval handling when an edit brings an inactive item back to life.

use herald_core::item::ScheduledItem;
use herald_core::types::{ActorRole, ApprovalStatus};
use serde::Serialize;

/// Outcome of the restoration policy for one edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RestorationDecision {
    /// Rejected items cannot be restored; the edit must not be applied.
    Blocked,
    /// Restored by an administrator: approved, restore flag cleared.
    AutoApproved,
    /// Restored by someone else: pending, flagged as a restore request.
    PendingReapproval,
    /// The edit changed the approval status by hand; the restore flag is cleared.
    ClearRestoreFlag,
    Unchanged,
}

/// Activity of an item before and after an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityChange {
    pub was_active: bool,
    pub becomes_active: bool,
}

impl ActivityChange {
    #[must_use]
    pub const fn is_restoration(self) -> bool {
        !self.was_active && self.becomes_active
    }
}

/// ## Summary
/// Applies the restoration policy to an edit of `current` into `updated`.
#[must_use]
pub fn decide_restoration(
    current: &ScheduledItem,
    updated: &ScheduledItem,
    actor: ActorRole,
    activity: ActivityChange,
) -> RestorationDecision {
    let decision = if activity.is_restoration() {
        if current.is_rejected() {
            RestorationDecision::Blocked
        } else if actor == ActorRole::Admin {
            RestorationDecision::AutoApproved
        } else {
            RestorationDecision::PendingReapproval
        }
    } else if updated.approval_status != current.approval_status {
        RestorationDecision::ClearRestoreFlag
    } else {
        RestorationDecision::Unchanged
    };

    tracing::debug!(item_id = %current.id, ?actor, ?decision, "Decided restoration");
    decision
}

impl RestorationDecision {
    /// ## Summary
    /// Returns the item to store, or `None` when the edit is blocked.
    #[must_use]
    pub fn apply(self, mut updated: ScheduledItem) -> Option<ScheduledItem> {
        match self {
            Self::Blocked => return None,
            Self::AutoApproved => {
                updated.approval_status = ApprovalStatus::Approved;
                updated.restore_requested = false;
            }
            Self::PendingReapproval => {
                updated.approval_status = ApprovalStatus::Pending;
                updated.restore_requested = true;
            }
            Self::ClearRestoreFlag => updated.restore_requested = false,
            Self::Unchanged => {}
        }
        Some(updated)
    }
}

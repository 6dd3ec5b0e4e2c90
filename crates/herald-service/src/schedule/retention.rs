//! Cleanup eligibility of expired one-off items.

use chrono::{DateTime, TimeDelta, Utc};
use herald_rfc::rfc::ical::expand::CompiledRule;
use serde::Serialize;

use super::status::OccurrenceStatus;

/// Why an item is or is not eligible for cleanup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RetentionReason {
    Eligible,
    /// The rule expands to more than one occurrence.
    Recurring,
    NotExpired,
    /// No past occurrence could be found.
    UnknownLastOccurrence,
    WithinGracePeriod,
    /// The rule could not be parsed.
    InvalidRule,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetentionDecision {
    pub item_id: String,
    pub eligible: bool,
    pub reason: RetentionReason,
}

impl RetentionDecision {
    #[must_use]
    pub fn new(item_id: impl Into<String>, reason: RetentionReason) -> Self {
        Self {
            item_id: item_id.into(),
            eligible: reason == RetentionReason::Eligible,
            reason,
        }
    }
}

/// How many occurrences a rule has over its whole life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleExtent {
    /// Every candidate date is excluded.
    Empty,
    Single,
    Recurring,
}

impl RuleExtent {
    #[must_use]
    pub fn of(rule: &CompiledRule) -> Self {
        match rule.count_up_to(2) {
            0 => Self::Empty,
            1 => Self::Single,
            _ => Self::Recurring,
        }
    }
}

/// What the evaluator needs to know about an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionFacts {
    pub extent: RuleExtent,
    pub status: OccurrenceStatus,
    pub last_occurrence_end: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy)]
pub struct RetentionEvaluator {
    grace_period: TimeDelta,
}

impl RetentionEvaluator {
    #[must_use]
    pub const fn new(grace_period: TimeDelta) -> Self {
        Self { grace_period }
    }

    #[must_use]
    pub const fn grace_period(&self) -> TimeDelta {
        self.grace_period
    }

    /// ## Summary
    /// Decides whether an item may be cleaned up at `now`.
    ///
    /// Only expired one-off items whose last occurrence ended at least one
    /// grace period ago are eligible. Anything undetermined is not eligible;
    /// a rule without any occurrence has no known last occurrence.
    #[must_use]
    pub fn evaluate(
        &self,
        item_id: &str,
        facts: RetentionFacts,
        now: DateTime<Utc>,
    ) -> RetentionDecision {
        let reason = if facts.extent == RuleExtent::Empty {
            RetentionReason::UnknownLastOccurrence
        } else if facts.extent == RuleExtent::Recurring {
            RetentionReason::Recurring
        } else if facts.status != OccurrenceStatus::Expired {
            RetentionReason::NotExpired
        } else {
            match facts.last_occurrence_end {
                None => RetentionReason::UnknownLastOccurrence,
                Some(last_end) if now - last_end >= self.grace_period => RetentionReason::Eligible,
                Some(_) => RetentionReason::WithinGracePeriod,
            }
        };

        tracing::debug!(item_id, ?reason, "Evaluated retention");
        RetentionDecision::new(item_id, reason)
    }
}

//! Cleanup and restoration flows as the surrounding jobs drive them.

use herald_test::component::schedule::restoration::RestorationDecision;
use herald_test::component::schedule::retention::RetentionReason;
use herald_test::component::schedule::tab::StatusTab;
use herald_test::component::types::{ActorRole, ApprovalStatus};
use herald_test::items_from_json;

use super::helpers::{WEDNESDAYS_AT_SEVEN, announcement, engine, service, utc};

const EXPORTED_ITEMS: &str = r#"[
    {
        "id": "retreat",
        "kind": "announcement",
        "title": "Retreat",
        "rruleString": "DTSTART:20240105T080000Z",
        "endTime": "18:00",
        "createdAt": "2023-12-01T10:00:00Z",
        "status": "approved"
    },
    {
        "id": "youth",
        "kind": "announcement",
        "title": "Youth night",
        "rruleString": "DTSTART:20240103T190000Z\nRRULE:FREQ=WEEKLY;BYDAY=WE",
        "endTime": "21:00",
        "createdAt": "2023-12-01T10:00:00Z",
        "status": "approved"
    },
    {
        "id": "series",
        "kind": "service",
        "title": "Lent series",
        "rule": "DTSTART:20240110T190000Z\nRRULE:FREQ=WEEKLY;COUNT=2",
        "createdAt": "2023-12-01T10:00:00Z",
        "approvalStatus": "approved"
    },
    {
        "id": "prayer",
        "kind": "script",
        "title": "Morning prayer",
        "rruleString": "DTSTART:20240105T080000",
        "createdAt": "2023-12-01T10:00:00Z"
    }
]"#;

/// ## Summary
/// The cleanup job only receives expired one-off items past the grace period.
#[test_log::test]
fn cleanup_job_receives_only_expired_one_offs() {
    let items = items_from_json(EXPORTED_ITEMS).expect("valid export");
    let engine = engine();

    let early = engine.cleanup_candidates(&items, utc(2024, 1, 20, 0, 0));
    assert!(early.is_empty());

    let later = engine.cleanup_candidates(&items, utc(2024, 2, 10, 0, 0));
    let ids: Vec<&str> = later.iter().map(|decision| decision.item_id.as_str()).collect();
    assert_eq!(ids, vec!["retreat", "prayer"]);
    assert!(later.iter().all(|decision| decision.reason == RetentionReason::Eligible));

    // an exhausted series is still recurring
    assert_eq!(
        engine.evaluate_retention(&items[2], utc(2025, 1, 1, 0, 0)).reason,
        RetentionReason::Recurring
    );
}

/// ## Summary
/// Moving an expired item to a future date sends it back for approval,
/// unless an administrator did it.
#[test_log::test]
fn restoring_an_expired_item() {
    let engine = engine();
    let now = utc(2024, 3, 1, 12, 0);
    let expired = announcement("retreat", "DTSTART:20240105T080000Z").with_end_time("18:00");
    assert_eq!(engine.tab_for(&expired, now), Some(StatusTab::Expired));

    let mut moved = expired.clone();
    moved.rule = "DTSTART:20240405T080000Z".into();

    let decision = engine.evaluate_restoration(&expired, &moved, ActorRole::Editor, now);
    assert_eq!(decision, RestorationDecision::PendingReapproval);
    let stored = decision.apply(moved.clone()).expect("edit applies");
    assert_eq!(stored.approval_status, ApprovalStatus::Pending);
    assert!(stored.restore_requested);
    assert_eq!(engine.tab_for(&stored, now), None);

    // the administrator approves the restored item by hand
    let approved = stored.clone().with_status(ApprovalStatus::Approved);
    let decision = engine.evaluate_restoration(&stored, &approved, ActorRole::Admin, now);
    assert_eq!(decision, RestorationDecision::ClearRestoreFlag);
    let stored = decision.apply(approved).expect("edit applies");
    assert!(!stored.restore_requested);
    assert_eq!(engine.tab_for(&stored, now), Some(StatusTab::Open));

    let by_admin = engine.evaluate_restoration(&expired, &moved, ActorRole::Admin, now);
    assert_eq!(by_admin, RestorationDecision::AutoApproved);
}

/// ## Summary
/// Rejected items stay rejected even when their date moves forward.
#[test_log::test]
fn rejected_items_cannot_be_restored() {
    let engine = engine();
    let now = utc(2024, 3, 1, 12, 0);
    let rejected = service("old", "DTSTART:20240105T080000Z").with_status(ApprovalStatus::Rejected);
    assert_eq!(engine.tab_for(&rejected, now), Some(StatusTab::Rejected));

    let mut moved = rejected.clone();
    moved.rule = WEDNESDAYS_AT_SEVEN.into();

    let decision = engine.evaluate_restoration(&rejected, &moved, ActorRole::Admin, now);
    assert_eq!(decision, RestorationDecision::Blocked);
    assert_eq!(decision.apply(moved), None);
}

/// ## Summary
/// Editing an active item leaves its approval alone.
#[test_log::test]
fn editing_an_active_item() {
    let engine = engine();
    let now = utc(2024, 3, 1, 12, 0);
    let active = announcement("youth", WEDNESDAYS_AT_SEVEN);
    let renamed = active.clone().with_title("Youth night (new room)");

    assert_eq!(
        engine.evaluate_restoration(&active, &renamed, ActorRole::Leader, now),
        RestorationDecision::Unchanged
    );
}

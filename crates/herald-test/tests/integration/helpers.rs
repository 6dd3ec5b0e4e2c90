#![allow(clippy::expect_used, dead_code)]
//! Test helpers for integration tests.
//!
//! Provides utilities for:
//! - Building instants and scheduled items
//! - Constructing engines with fixed configuration

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;

use herald_test::component::engine::OccurrenceEngine;
use herald_test::component::item::ScheduledItem;
use herald_test::component::types::ItemKind;
use herald_test::component::window::OccurrenceWindow;

/// Every Wednesday at 19:00, starting 2024-01-03.
pub const WEDNESDAYS_AT_SEVEN: &str = "DTSTART:20240103T190000Z\nRRULE:FREQ=WEEKLY;BYDAY=WE";

/// Every Wednesday without a time of day.
pub const WEDNESDAYS_ALL_DAY: &str = "DTSTART:20240103T000000Z\nRRULE:FREQ=WEEKLY;BYDAY=WE";

pub fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, 0)
        .single()
        .expect("valid instant")
}

pub fn window(from: DateTime<Utc>, to: DateTime<Utc>) -> OccurrenceWindow {
    OccurrenceWindow::new(from, to)
}

/// Engine in UTC with a one-year horizon and a 30-day grace period.
pub fn engine() -> OccurrenceEngine {
    engine_in(Tz::UTC)
}

pub fn engine_in(zone: Tz) -> OccurrenceEngine {
    OccurrenceEngine::new(zone, TimeDelta::days(365), TimeDelta::days(30))
}

pub fn announcement(id: &str, rule: &str) -> ScheduledItem {
    item(id, ItemKind::Announcement, rule)
}

pub fn service(id: &str, rule: &str) -> ScheduledItem {
    item(id, ItemKind::Service, rule)
}

pub fn item(id: &str, kind: ItemKind, rule: &str) -> ScheduledItem {
    ScheduledItem::new(id, kind, rule, utc(2024, 1, 1, 0, 0)).with_title(format!("Title {id}"))
}

/// Instants every `step` from `from` (inclusive) to `to` (exclusive).
pub fn sweep(from: DateTime<Utc>, to: DateTime<Utc>, step: TimeDelta) -> Vec<DateTime<Utc>> {
    std::iter::successors(Some(from), |at| Some(*at + step))
        .take_while(|at| *at < to)
        .collect()
}

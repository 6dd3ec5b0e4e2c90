//! Home dashboard timeline, calendar grouping and ticker behavior.

use chrono::NaiveDate;
use chrono_tz::Tz;
use herald_test::component::schedule::status::OccurrenceStatus;
use herald_test::component::schedule::ticker::TickerScope;

use super::helpers::{WEDNESDAYS_AT_SEVEN, announcement, engine, engine_in, service, utc, window};

/// ## Summary
/// The countdown shows the running item, then switches to the next one.
#[test_log::test]
fn countdown_follows_current_then_next() {
    let items = [
        announcement("youth", WEDNESDAYS_AT_SEVEN).with_end_time("21:00"),
        service("sunday", "DTSTART:20240107T100000Z\nRRULE:FREQ=WEEKLY;BYDAY=SU").with_end_time("12:00"),
    ];
    let engine = engine();

    let during = utc(2024, 1, 10, 20, 0);
    let outcome = engine.upcoming_timeline(&items, during);
    let shown = outcome.countdown(during).expect("something to show");
    assert_eq!(shown.item_id, "youth");
    assert_eq!(shown.status, OccurrenceStatus::InProgress);

    let after = utc(2024, 1, 10, 21, 0);
    let outcome = engine.upcoming_timeline(&items, after);
    let shown = outcome.countdown(after).expect("something to show");
    assert_eq!(shown.item_id, "sunday");
    assert_eq!(shown.start, utc(2024, 1, 14, 10, 0));
}

/// ## Summary
/// Floating times keep their wall clock across a DST change in the engine zone.
#[test_log::test]
fn floating_rule_keeps_wall_clock_across_dst() {
    let items = [announcement("vespers", "DTSTART:20240301T190000Z\nRRULE:FREQ=DAILY")];
    let engine = engine_in(Tz::America__New_York);

    let outcome = engine.merge(
        &items,
        window(utc(2024, 3, 9, 1, 0), utc(2024, 3, 12, 0, 0)),
        utc(2024, 3, 9, 1, 0),
    );
    let starts: Vec<_> = outcome.views.iter().map(|view| view.start).collect();
    assert_eq!(
        starts,
        vec![
            utc(2024, 3, 10, 0, 0),
            utc(2024, 3, 10, 23, 0),
            utc(2024, 3, 11, 23, 0),
        ]
    );
}

/// ## Summary
/// "Today" is the engine zone's calendar day, not the UTC day.
#[test_log::test]
fn today_follows_engine_zone() {
    // 21:00-23:30 in Sao Paulo is 00:00-02:30 UTC on the next day
    let item = announcement("late", "DTSTART:20240103T210000Z\nRRULE:FREQ=DAILY").with_end_time("23:30");
    let engine = engine_in(Tz::America__Sao_Paulo);

    let now = utc(2024, 1, 11, 1, 0);
    let evaluation = engine.classify(&item, now);
    assert_eq!(evaluation.status.status, OccurrenceStatus::InProgress);
    assert_eq!(
        evaluation.status.current.map(|interval| interval.start),
        Some(utc(2024, 1, 11, 0, 0))
    );
}

/// ## Summary
/// Calendar grouping puts late-evening rows on their local day.
#[test_log::test]
fn month_calendar_groups_by_local_day() {
    let items = [announcement("late", "DTSTART:20240103T210000Z\nRRULE:FREQ=WEEKLY;COUNT=2")];
    let engine = engine_in(Tz::America__Sao_Paulo);

    let outcome = engine.merge(
        &items,
        window(utc(2024, 1, 1, 3, 0), utc(2024, 2, 1, 3, 0)),
        utc(2024, 1, 1, 3, 0),
    );
    let days: Vec<NaiveDate> = outcome.by_day(engine.zone()).keys().copied().collect();
    assert_eq!(
        days,
        vec![
            NaiveDate::from_ymd_opt(2024, 1, 3).expect("valid date"),
            NaiveDate::from_ymd_opt(2024, 1, 10).expect("valid date"),
        ]
    );
}

/// ## Summary
/// The ticker lists each title once per scope.
#[test_log::test]
fn ticker_titles_per_scope() {
    let items = [
        announcement("youth", WEDNESDAYS_AT_SEVEN).with_title("Youth night"),
        announcement("youth-2", "DTSTART:20240104T190000Z\nRRULE:FREQ=WEEKLY").with_title("Youth night"),
        service("easter", "DTSTART:20240331T100000Z").with_title("Easter service"),
        service("untitled", "DTSTART:20240110T100000Z").with_title("  "),
    ];
    let engine = engine();
    let now = utc(2024, 1, 10, 12, 0);

    let week = engine.ticker_titles(&items, TickerScope::Week, now);
    assert_eq!(week.titles, vec!["Youth night".to_string()]);

    let month = engine.ticker_titles(&items, TickerScope::Month, now);
    assert_eq!(month.titles, vec!["Youth night".to_string()]);

    let year = engine.ticker_titles(&items, TickerScope::Year, now);
    assert_eq!(
        year.titles,
        vec!["Youth night".to_string(), "Easter service".to_string()]
    );
    assert!(year.diagnostics.is_empty());
}

/// ## Summary
/// An hourly rule shows one row per day across the whole horizon.
#[test_log::test]
fn hourly_rule_covers_the_whole_horizon() {
    let items = [announcement("bells", "DTSTART:20240101T090000Z\nRRULE:FREQ=HOURLY")];
    let now = utc(2024, 1, 10, 12, 0);

    let outcome = engine().upcoming_timeline(&items, now);

    // 2024-01-10 through 2025-01-09
    assert_eq!(outcome.views.len(), 366);
    assert_eq!(outcome.views[0].start, utc(2024, 1, 10, 9, 0));
    assert_eq!(
        outcome.views.last().map(|view| view.start),
        Some(utc(2025, 1, 9, 9, 0))
    );
    assert!(outcome.diagnostics.is_empty());
}

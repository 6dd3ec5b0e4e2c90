use chrono::{DateTime, FixedOffset, Utc};
use chrono_tz::Tz;

pub struct ExpansionCase {
    pub name: &'static str,
    pub rule: &'static str,
    /// Zone for values without a TZID.
    pub zone: Tz,
    pub from: &'static str,
    pub to: &'static str,
    pub expected: Option<&'static [&'static str]>,
    pub expected_len: Option<usize>,
}

#[expect(clippy::too_many_lines)]
pub fn expansion_cases() -> Vec<ExpansionCase> {
    vec![
        ExpansionCase {
            name: "weekly_wednesday",
            rule: "DTSTART:20240103T190000Z\nRRULE:FREQ=WEEKLY;BYDAY=WE",
            zone: Tz::UTC,
            from: "2024-01-01T00:00:00Z",
            to: "2024-01-25T00:00:00Z",
            expected: Some(&[
                "2024-01-03T19:00:00Z",
                "2024-01-10T19:00:00Z",
                "2024-01-17T19:00:00Z",
                "2024-01-24T19:00:00Z",
            ]),
            expected_len: None,
        },
        ExpansionCase {
            name: "floating_z_in_sao_paulo",
            rule: "DTSTART:20240103T190000Z\nRRULE:FREQ=WEEKLY;BYDAY=WE;COUNT=2",
            zone: Tz::America__Sao_Paulo,
            from: "2024-01-01T00:00:00Z",
            to: "2024-02-01T00:00:00Z",
            expected: Some(&["2024-01-03T22:00:00Z", "2024-01-10T22:00:00Z"]),
            expected_len: None,
        },
        ExpansionCase {
            name: "tzid_keeps_wall_clock_across_dst",
            rule: "DTSTART;TZID=America/New_York:20210313T090000\nRRULE:FREQ=DAILY;COUNT=3",
            zone: Tz::UTC,
            from: "2021-03-01T00:00:00Z",
            to: "2021-04-01T00:00:00Z",
            expected: Some(&[
                "2021-03-13T14:00:00Z",
                "2021-03-14T13:00:00Z",
                "2021-03-15T13:00:00Z",
            ]),
            expected_len: None,
        },
        ExpansionCase {
            name: "dst_gap_shifts_forward",
            rule: "DTSTART;TZID=America/New_York:20210313T023000\nRRULE:FREQ=DAILY;COUNT=3",
            zone: Tz::UTC,
            from: "2021-03-01T00:00:00Z",
            to: "2021-04-01T00:00:00Z",
            expected: Some(&[
                "2021-03-13T07:30:00Z",
                "2021-03-14T07:30:00Z",
                "2021-03-15T06:30:00Z",
            ]),
            expected_len: None,
        },
        ExpansionCase {
            name: "dst_fold_uses_first_instant",
            rule: "DTSTART;TZID=America/New_York:20211106T013000\nRRULE:FREQ=DAILY;COUNT=3",
            zone: Tz::UTC,
            from: "2021-11-01T00:00:00Z",
            to: "2021-12-01T00:00:00Z",
            expected: Some(&[
                "2021-11-06T05:30:00Z",
                "2021-11-07T05:30:00Z",
                "2021-11-08T06:30:00Z",
            ]),
            expected_len: None,
        },
        ExpansionCase {
            name: "rdate_and_exdate",
            rule: "DTSTART:20240101T090000Z\nRRULE:FREQ=DAILY;COUNT=3\nEXDATE:20240102T090000Z\nRDATE:20240110T090000Z",
            zone: Tz::UTC,
            from: "2024-01-01T00:00:00Z",
            to: "2024-02-01T00:00:00Z",
            expected: Some(&[
                "2024-01-01T09:00:00Z",
                "2024-01-03T09:00:00Z",
                "2024-01-10T09:00:00Z",
            ]),
            expected_len: None,
        },
        ExpansionCase {
            name: "nothing_before_dtstart",
            rule: "DTSTART:20240110T100000Z\nRRULE:FREQ=DAILY",
            zone: Tz::UTC,
            from: "2024-01-01T00:00:00Z",
            to: "2024-01-12T00:00:00Z",
            expected: Some(&["2024-01-10T10:00:00Z", "2024-01-11T10:00:00Z"]),
            expected_len: None,
        },
        ExpansionCase {
            name: "one_off_without_rrule",
            rule: "DTSTART:20240315T180000Z",
            zone: Tz::UTC,
            from: "2024-01-01T00:00:00Z",
            to: "2024-12-31T00:00:00Z",
            expected: Some(&["2024-03-15T18:00:00Z"]),
            expected_len: None,
        },
        ExpansionCase {
            name: "date_only_dtstart",
            rule: "DTSTART:20240101\nRRULE:FREQ=DAILY;COUNT=2",
            zone: Tz::UTC,
            from: "2024-01-01T00:00:00Z",
            to: "2024-02-01T00:00:00Z",
            expected: Some(&["2024-01-01T00:00:00Z", "2024-01-02T00:00:00Z"]),
            expected_len: None,
        },
        ExpansionCase {
            name: "date_only_until_covers_whole_day",
            rule: "DTSTART:20240101T190000Z\nRRULE:FREQ=DAILY;UNTIL=20240103",
            zone: Tz::UTC,
            from: "2024-01-01T00:00:00Z",
            to: "2024-02-01T00:00:00Z",
            expected: Some(&[
                "2024-01-01T19:00:00Z",
                "2024-01-02T19:00:00Z",
                "2024-01-03T19:00:00Z",
            ]),
            expected_len: None,
        },
        ExpansionCase {
            name: "zoned_rule_with_utc_until",
            rule: "DTSTART;TZID=America/Sao_Paulo:20240101T190000\nRRULE:FREQ=DAILY;UNTIL=20240103T220000Z",
            zone: Tz::UTC,
            from: "2024-01-01T00:00:00Z",
            to: "2024-02-01T00:00:00Z",
            expected: Some(&[
                "2024-01-01T22:00:00Z",
                "2024-01-02T22:00:00Z",
                "2024-01-03T22:00:00Z",
            ]),
            expected_len: None,
        },
        ExpansionCase {
            name: "bare_freq_line",
            rule: "DTSTART:20240101T090000Z\nFREQ=DAILY;COUNT=2",
            zone: Tz::UTC,
            from: "2024-01-01T00:00:00Z",
            to: "2024-02-01T00:00:00Z",
            expected: Some(&["2024-01-01T09:00:00Z", "2024-01-02T09:00:00Z"]),
            expected_len: None,
        },
        ExpansionCase {
            name: "window_end_is_exclusive",
            rule: "DTSTART:20240101T090000Z\nRRULE:FREQ=DAILY",
            zone: Tz::UTC,
            from: "2024-01-01T09:00:00Z",
            to: "2024-01-03T09:00:00Z",
            expected: Some(&["2024-01-01T09:00:00Z", "2024-01-02T09:00:00Z"]),
            expected_len: None,
        },
        ExpansionCase {
            name: "windows_zone_name",
            rule: "DTSTART;TZID=E. South America Standard Time:20240103T190000\nRRULE:FREQ=WEEKLY;COUNT=2",
            zone: Tz::UTC,
            from: "2024-01-01T00:00:00Z",
            to: "2024-02-01T00:00:00Z",
            expected: Some(&["2024-01-03T22:00:00Z", "2024-01-10T22:00:00Z"]),
            expected_len: None,
        },
        ExpansionCase {
            name: "count_exhausted_before_window",
            rule: "DTSTART:20240101T090000Z\nRRULE:FREQ=WEEKLY;COUNT=4",
            zone: Tz::UTC,
            from: "2024-06-01T00:00:00Z",
            to: "2024-07-01T00:00:00Z",
            expected: None,
            expected_len: Some(0),
        },
        ExpansionCase {
            name: "monthly_over_a_year",
            rule: "DTSTART:20240101T090000Z\nRRULE:FREQ=MONTHLY;BYMONTHDAY=15",
            zone: Tz::UTC,
            from: "2024-01-01T00:00:00Z",
            to: "2025-01-01T00:00:00Z",
            expected: None,
            expected_len: Some(12),
        },
    ]
}

/// Window bounds of a case as instants.
pub fn case_window(case: &ExpansionCase) -> (DateTime<Utc>, DateTime<Utc>) {
    (
        parse_rfc3339(case.from).with_timezone(&Utc),
        parse_rfc3339(case.to).with_timezone(&Utc),
    )
}

pub fn assert_case(case: &ExpansionCase, actual: &[DateTime<Utc>]) {
    let actual_timestamps: Vec<i64> = actual.iter().map(DateTime::timestamp).collect();

    if let Some(expected) = case.expected {
        let expected_timestamps: Vec<i64> = expected
            .iter()
            .map(|value| parse_rfc3339(value).timestamp())
            .collect();
        assert_eq!(
            actual_timestamps, expected_timestamps,
            "Case {} did not match",
            case.name
        );
    }

    if let Some(expected_len) = case.expected_len {
        assert_eq!(
            actual.len(),
            expected_len,
            "Case {} expected {} occurrences",
            case.name,
            expected_len
        );
    }
}

fn parse_rfc3339(value: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(value)
        .unwrap_or_else(|err| panic!("Failed to parse rfc3339 value {value}: {err}"))
}

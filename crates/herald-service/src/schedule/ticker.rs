//! Calendar scopes for the scrolling title ticker.

use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveTime, TimeDelta, Utc};
use chrono_tz::Tz;
use herald_core::window::OccurrenceWindow;
use herald_rfc::rfc::ical::expand::{local_to_utc, utc_to_local};
use serde::{Deserialize, Serialize};

use super::diagnostic::Diagnostic;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TickerScope {
    /// Monday 00:00 through the following Monday.
    Week,
    Month,
    Year,
}

impl TickerScope {
    /// ## Summary
    /// Returns the calendar period containing `now` in `zone`.
    #[must_use]
    pub fn window(self, now: DateTime<Utc>, zone: Tz) -> OccurrenceWindow {
        let today = utc_to_local(now, zone).date();

        let (first, next) = match self {
            Self::Week => {
                let monday = today - TimeDelta::days(i64::from(today.weekday().num_days_from_monday()));
                (Some(monday), Some(monday + TimeDelta::days(7)))
            }
            Self::Month => {
                let first = today.with_day(1);
                (first, first.and_then(|first| first.checked_add_months(Months::new(1))))
            }
            Self::Year => {
                let first = NaiveDate::from_ymd_opt(today.year(), 1, 1);
                (first, first.and_then(|first| first.checked_add_months(Months::new(12))))
            }
        };

        let midnight = |date: NaiveDate| local_to_utc(date.and_time(NaiveTime::MIN), zone);
        let from = first.map_or(now, midnight);
        let to = next.map_or(from, midnight);
        OccurrenceWindow::new(from, to)
    }
}

/// Titles shown by the ticker for one scope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickerTitles {
    /// Distinct non-empty titles in input order.
    pub titles: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
}

//! Half-open time windows.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// A half-open `[from, to)` range of instants.
///
/// Windows with `from >= to` are representable; they contain nothing and
/// callers report them as empty instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OccurrenceWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl OccurrenceWindow {
    #[must_use]
    pub const fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self { from, to }
    }

    /// Window that also contains its `to` instant, i.e. `[from, to]`.
    #[must_use]
    pub fn through(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self {
            from,
            to: to
                .checked_add_signed(TimeDelta::nanoseconds(1))
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    /// `[from, from + span)`, ending at the last representable instant when
    /// the sum overflows.
    #[must_use]
    pub fn starting_at(from: DateTime<Utc>, span: TimeDelta) -> Self {
        Self {
            from,
            to: from
                .checked_add_signed(span)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.from >= self.to
    }

    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.from <= instant && instant < self.to
    }
}

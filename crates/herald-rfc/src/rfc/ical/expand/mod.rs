//! Recurrence expansion for stored recurrence rules.
//!
//! This module turns rule text into wall-clock occurrences according to
//! RFC 5545 recurrence rules (RRULE), and maps wall-clock times onto instants.

mod normalize;
mod recurrence;
mod timezone;

pub use recurrence::{CompiledRule, Expansion, ExpansionError, ExpansionOptions, expand_rrule};
pub use timezone::{ConversionError, TimeZoneResolver, local_day, local_to_utc, utc_to_local};

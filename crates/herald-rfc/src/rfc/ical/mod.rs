//! iCalendar value parsing and recurrence expansion.

pub mod core;
pub mod expand;

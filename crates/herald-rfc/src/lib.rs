//! RFC 5545 recurrence handling for the herald occurrence engine.
//!
//! Normalizes stored rule text, expands it with the `rrule` crate and maps
//! wall-clock occurrences onto instants with `chrono-tz`.

pub mod error;
pub mod rfc;

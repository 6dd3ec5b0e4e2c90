//! Shared value types, configuration and errors for the herald occurrence engine.

pub mod config;
pub mod constants;
pub mod error;
pub mod item;
pub mod types;
pub mod window;

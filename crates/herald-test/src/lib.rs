//! Herald occurrence engine - integration test support.
//!
//! This crate re-exports the workspace crates so integration tests can use
//! `herald_test::` paths.

pub mod component {
    pub use herald_core::{config, constants, item, types, window};
    pub use herald_service::{engine, schedule};

    pub mod error {
        pub use herald_core::error::{CoreError, CoreResult};
        pub use herald_service::error::{ServiceError, ServiceResult};
    }
}

pub use herald_rfc as rfc;

/// Loads scheduled items from a JSON array, as the producer exports them.
///
/// ## Errors
/// Returns an error if the text is not a JSON array of items.
pub fn items_from_json(text: &str) -> anyhow::Result<Vec<herald_core::item::ScheduledItem>> {
    Ok(serde_json::from_str(text)?)
}

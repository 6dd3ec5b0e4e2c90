//! The occurrence pipeline: interval resolution, classification, merging
//! and the policies built on top of them.

pub mod diagnostic;
pub mod interval;
pub mod merge;
pub mod restoration;
pub mod retention;
pub mod status;
pub mod tab;
pub mod ticker;

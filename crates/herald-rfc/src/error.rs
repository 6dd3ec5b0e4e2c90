use thiserror::Error;

use crate::rfc::ical::expand::{ConversionError, ExpansionError};

/// RFC parsing and expansion errors
#[derive(Error, Debug)]
pub enum RfcError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error(transparent)]
    ExpansionError(#[from] ExpansionError),

    #[error(transparent)]
    ConversionError(#[from] ConversionError),
}

pub type RfcResult<T> = std::result::Result<T, RfcError>;

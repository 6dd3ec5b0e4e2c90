use thiserror::Error;

/// Service layer errors - combines all error types
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    RfcError(#[from] herald_rfc::error::RfcError),

    #[error(transparent)]
    CoreError(#[from] herald_core::error::CoreError),

    #[error(transparent)]
    ExpansionError(#[from] herald_rfc::rfc::ical::expand::ExpansionError),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

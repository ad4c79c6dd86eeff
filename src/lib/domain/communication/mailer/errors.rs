//! Transport errors

use lettre::{address::AddressError, error::Error};
use thiserror::Error;
use tracing::debug;

/// Transport errors
#[derive(Debug, Error)]
pub enum TransportError {
    /// An error occurred while sending the email
    #[error("An error occurred while sending the email")]
    SendError,

    /// Invalid email address
    #[error("Invalid email address")]
    InvalidEmail,

    /// Unknown error
    #[error(transparent)]
    UnknownError(anyhow::Error),
}

impl From<anyhow::Error> for TransportError {
    fn from(err: anyhow::Error) -> Self {
        TransportError::UnknownError(err)
    }
}

impl From<AddressError> for TransportError {
    fn from(err: AddressError) -> Self {
        debug!("AddressError -> TransportError: {err}");

        TransportError::InvalidEmail
    }
}

impl From<Error> for TransportError {
    fn from(err: Error) -> Self {
        TransportError::UnknownError(err.into())
    }
}

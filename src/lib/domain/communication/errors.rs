//! Error types for composing and dispatching emails

use std::{io, path::PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::domain::communication::{emails::Charset, mailer::errors::TransportError};

/// A required argument or field is missing
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PreconditionError {
    /// A required field was never set
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    /// A required field was set to a blank value
    #[error("required field `{0}` is blank")]
    BlankField(&'static str),
}

/// Errors that can occur when rendering a template
#[derive(Debug, Error)]
pub enum TemplateRenderError {
    /// No template is registered under that identifier
    #[error("template \"{0}\" not found")]
    TemplateNotFound(String),

    /// Unknown error
    #[error(transparent)]
    UnknownError(#[from] anyhow::Error),
}

/// Errors that can occur while assembling a message
#[derive(Debug, Error)]
pub enum MessageAssemblyError {
    /// An inline picture could not be read
    #[error("could not read inline picture {}", path.display())]
    InlinePicture {
        /// Path of the picture
        path: PathBuf,

        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Text could not be represented in the message charset
    #[error("{field} cannot be encoded as {charset}")]
    Encoding {
        /// Message charset
        charset: Charset,

        /// The offending field
        field: &'static str,
    },
}

/// Errors returned by the email service
#[derive(Debug, Error)]
pub enum SendEmailError {
    /// A precondition was violated before anything was attempted
    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    /// The template could not be rendered
    #[error("cannot send email: {0}")]
    CannotSendEmail(#[source] TemplateRenderError),

    /// The message could not be assembled
    #[error(transparent)]
    MessageAssembly(#[from] MessageAssemblyError),

    /// The transport failed to deliver the message
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl From<TemplateRenderError> for SendEmailError {
    fn from(err: TemplateRenderError) -> Self {
        debug!("TemplateRenderError -> SendEmailError");

        SendEmailError::CannotSendEmail(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_error_is_wrapped_as_cannot_send_email() {
        let err = SendEmailError::from(TemplateRenderError::TemplateNotFound(
            "welcome".to_string(),
        ));

        assert!(matches!(
            err,
            SendEmailError::CannotSendEmail(TemplateRenderError::TemplateNotFound(ref id)) if id == "welcome"
        ));
        assert_eq!(
            err.to_string(),
            "cannot send email: template \"welcome\" not found"
        );
    }

    #[test]
    fn test_precondition_error_message() {
        assert_eq!(
            PreconditionError::MissingField("from").to_string(),
            "missing required field `from`"
        );
    }
}

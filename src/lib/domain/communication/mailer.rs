//! Outbound mail transport

pub mod errors;
pub mod message;

use async_trait::async_trait;

#[cfg(test)]
use mockall::mock;

use crate::domain::communication::mailer::{errors::TransportError, message::BuiltMessage};

/// Delivers fully built messages
#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    /// Send a message
    ///
    /// # Arguments
    /// * `message` - The [`BuiltMessage`] to deliver.
    ///
    /// # Returns
    /// A [`Result`] indicating success or failure. Failures are not retried.
    async fn send(&self, message: &BuiltMessage) -> Result<(), TransportError>;
}

#[cfg(test)]
mock! {
    pub Mailer {}

    #[async_trait]
    impl Mailer for Mailer {
        async fn send(&self, message: &BuiltMessage) -> Result<(), TransportError>;
    }
}

//! SMTP mailer implementation

use anyhow::Result;
use async_trait::async_trait;
use clap::Parser;
use lettre::{
    transport::smtp::{
        self,
        authentication::Credentials,
        client::{Tls, TlsParameters},
        response::Response,
    },
    SmtpTransport, Transport,
};
use tracing::{debug, error};

use crate::{
    domain::communication::{
        mailer::{errors::TransportError, message::BuiltMessage},
        Mailer,
    },
    infrastructure::email::mime::to_lettre_message,
};

/// SMTP configuration
#[derive(Clone, Default, Debug, Parser)]
pub struct SMTPConfig {
    /// The SMTP host
    #[clap(long = "smtp-host", env = "SMTP_HOST")]
    pub host: String,

    /// The SMTP port
    #[clap(long = "smtp-port", env = "SMTP_PORT", default_value = "587")]
    pub port: u16,

    /// The SMTP username
    #[clap(long = "smtp-user", env = "SMTP_USER")]
    pub username: Option<String>,

    /// The SMTP password
    #[clap(long = "smtp-password", env = "SMTP_PASSWORD")]
    pub password: Option<String>,

    /// Verify the TLS certificate
    #[clap(
        long = "smtp-verify-tls",
        env = "SMTP_VERIFY_TLS",
        default_value = "true",
        action = clap::ArgAction::Set
    )]
    pub verify_tls: bool,

    /// Enable STARTTLS (TLS upgrade on connection)
    #[clap(
        long = "smtp-starttls",
        env = "SMTP_STARTTLS",
        default_value = "true",
        action = clap::ArgAction::Set
    )]
    pub starttls: bool,
}

/// SMTP mailer
#[derive(Debug, Default, Clone)]
pub struct SMTPMailer {
    config: SMTPConfig,
}

impl SMTPMailer {
    /// Create a new SMTP mailer
    pub fn new(config: SMTPConfig) -> Self {
        Self { config }
    }

    /// Create the SMTP transport described by the configuration
    pub fn mailer(&self) -> Result<SmtpTransport> {
        let relay = if self.config.starttls {
            SmtpTransport::starttls_relay(&self.config.host)?
        } else {
            SmtpTransport::relay(&self.config.host)?
        };

        let relay = relay.port(self.config.port).tls(Tls::Opportunistic(
            TlsParameters::builder(self.config.host.to_string())
                .dangerous_accept_invalid_certs(!self.config.verify_tls)
                .build()?,
        ));

        let relay = match (&self.config.username, &self.config.password) {
            (Some(username), Some(password)) => {
                relay.credentials(Credentials::new(username.clone(), password.clone()))
            }
            _ => relay,
        };

        Ok(relay.build())
    }
}

#[async_trait]
impl Mailer for SMTPMailer {
    async fn send(&self, message: &BuiltMessage) -> Result<(), TransportError> {
        let email = to_lettre_message(message)?;

        debug!(
            "Sending message to {}:{}",
            self.config.host, self.config.port
        );

        delivery_result(self.mailer()?.send(&email))
    }
}

fn delivery_result(result: Result<Response, smtp::Error>) -> Result<(), TransportError> {
    match result {
        Ok(response) if response.is_positive() => Ok(()),
        Ok(response) => {
            error!("SMTP server rejected the message: {:?}", response.code());

            Err(TransportError::SendError)
        }
        Err(e) => Err(TransportError::UnknownError(e.into())),
    }
}

//! Email composition and dispatch

pub mod attachments;
pub mod email_addresses;
pub mod emails;
pub mod errors;
pub mod mailer;
pub mod message_builder;
pub mod service;
pub mod templates;

pub use attachments::{Attachment, ImageType, InlinePicture};
pub use email_addresses::{Address, EmailAddress, EmailAddressError};
pub use emails::{BodyFormat, Charset, Email};
pub use mailer::{
    message::{BodyPart, BuiltMessage, MessageBody, TextPart},
    Mailer,
};
pub use message_builder::{ContentIdGenerator, MessageBuilder, UuidContentIds};
pub use service::{EmailService, EmailServiceImpl};
pub use templates::{TemplateRenderer, TemplateVariables};

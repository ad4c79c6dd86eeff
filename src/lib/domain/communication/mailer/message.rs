//! Built email message

use chrono::{DateTime, Utc};
use mime::Mime;

use crate::domain::communication::{
    email_addresses::Address,
    emails::{BodyFormat, Charset},
};

/// The text of a message
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextPart {
    /// The text content
    pub content: String,

    /// Plain text or HTML
    pub format: BodyFormat,
}

/// One part of a multipart message
#[derive(Clone, Debug, PartialEq)]
pub enum BodyPart {
    /// The message text
    Text(TextPart),

    /// A file attached to the message
    Attachment {
        /// File name
        name: String,

        /// Media type
        media_type: Mime,

        /// Payload
        data: Vec<u8>,
    },

    /// An image referenced from the text through its content id
    Inline {
        /// Content id, including the enclosing angle brackets
        content_id: String,

        /// Media type
        media_type: Mime,

        /// Payload
        data: Vec<u8>,
    },
}

/// Message body
#[derive(Clone, Debug, PartialEq)]
pub enum MessageBody {
    /// Text only
    Single(TextPart),

    /// Text followed by attachments and inline parts
    Multipart(Vec<BodyPart>),
}

/// A fully assembled message, ready for a [`Mailer`](super::Mailer)
#[derive(Clone, Debug, PartialEq)]
pub struct BuiltMessage {
    /// Charset of the text parts
    pub charset: Charset,

    /// The sender
    pub from: Address,

    /// The reply-to address
    pub reply_to: Option<Address>,

    /// The `To` recipients
    pub to: Vec<Address>,

    /// The `Cc` recipients
    pub cc: Vec<Address>,

    /// The `Bcc` recipients
    pub bcc: Vec<Address>,

    /// The subject
    pub subject: String,

    /// The `Date` of the message
    pub sent_at: Option<DateTime<Utc>>,

    /// The locale of the message
    pub locale: Option<String>,

    /// The body
    pub body: MessageBody,
}

impl BuiltMessage {
    /// The text part of the message
    pub fn text(&self) -> Option<&TextPart> {
        match &self.body {
            MessageBody::Single(text) => Some(text),
            MessageBody::Multipart(parts) => parts.iter().find_map(|part| match part {
                BodyPart::Text(text) => Some(text),
                _ => None,
            }),
        }
    }

    /// All parts of the message; a single-part message has exactly one
    pub fn parts(&self) -> Vec<BodyPart> {
        match &self.body {
            MessageBody::Single(text) => vec![BodyPart::Text(text.clone())],
            MessageBody::Multipart(parts) => parts.clone(),
        }
    }

    /// Content ids of the inline parts, in order
    pub fn content_ids(&self) -> Vec<&str> {
        match &self.body {
            MessageBody::Single(_) => Vec::new(),
            MessageBody::Multipart(parts) => parts
                .iter()
                .filter_map(|part| match part {
                    BodyPart::Inline { content_id, .. } => Some(content_id.as_str()),
                    _ => None,
                })
                .collect(),
        }
    }

    /// Every envelope recipient: `To`, then `Cc`, then `Bcc`
    pub fn recipients(&self) -> impl Iterator<Item = &Address> {
        self.to.iter().chain(self.cc.iter()).chain(self.bcc.iter())
    }
}

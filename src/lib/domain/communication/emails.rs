//! Email model

use std::fmt;

use chrono::{DateTime, Utc};

use crate::domain::communication::{
    attachments::Attachment, email_addresses::Address, errors::PreconditionError,
};

/// Character set used to encode the text of a message
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Charset {
    /// UTF-8
    #[default]
    Utf8,

    /// 7-bit US-ASCII
    UsAscii,

    /// ISO-8859-1 (Latin-1)
    Iso8859_1,
}

impl Charset {
    /// The charset name as used in a `Content-Type` parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::UsAscii => "us-ascii",
            Self::Iso8859_1 => "iso-8859-1",
        }
    }

    /// Encodes `text` in this charset, or `None` if it contains a character the
    /// charset cannot represent.
    pub fn encode(&self, text: &str) -> Option<Vec<u8>> {
        match self {
            Self::Utf8 => Some(text.as_bytes().to_vec()),
            Self::UsAscii => text.is_ascii().then(|| text.as_bytes().to_vec()),
            Self::Iso8859_1 => text
                .chars()
                .map(|c| u8::try_from(u32::from(c)).ok())
                .collect(),
        }
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the body is plain text or HTML
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BodyFormat {
    /// `text/plain`
    #[default]
    Plain,

    /// `text/html`
    Html,
}

/// One email to be sent
///
/// Everything but the sent timestamp is fixed at construction; use
/// [`Email::builder`] to create one.
#[derive(Clone, Debug, PartialEq)]
pub struct Email {
    from: Address,
    reply_to: Option<Address>,
    to: Vec<Address>,
    cc: Vec<Address>,
    bcc: Vec<Address>,
    subject: String,
    body: String,
    body_format: BodyFormat,
    attachments: Vec<Attachment>,
    encoding: Charset,
    locale: Option<String>,
    sent_at: Option<DateTime<Utc>>,
}

impl Email {
    /// Creates a new [`EmailBuilder`]
    pub fn builder() -> EmailBuilder {
        EmailBuilder::default()
    }

    /// The sender
    pub fn from(&self) -> &Address {
        &self.from
    }

    /// The reply-to address
    pub fn reply_to(&self) -> Option<&Address> {
        self.reply_to.as_ref()
    }

    /// The `To` recipients
    pub fn to(&self) -> &[Address] {
        &self.to
    }

    /// The `Cc` recipients
    pub fn cc(&self) -> &[Address] {
        &self.cc
    }

    /// The `Bcc` recipients
    pub fn bcc(&self) -> &[Address] {
        &self.bcc
    }

    /// The subject
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// The body, used when no template is rendered
    pub fn body(&self) -> &str {
        &self.body
    }

    /// The body format
    pub fn body_format(&self) -> BodyFormat {
        self.body_format
    }

    /// Attachments, in the order they will appear in the message
    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// The character set of the message
    pub fn encoding(&self) -> Charset {
        self.encoding
    }

    /// The locale of the message
    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    /// When the email was sent, if it was
    pub fn sent_at(&self) -> Option<DateTime<Utc>> {
        self.sent_at
    }

    pub(crate) fn mark_sent(&mut self, at: DateTime<Utc>) {
        self.sent_at = Some(at);
    }
}

/// Builder for [`Email`]
#[derive(Debug, Default)]
pub struct EmailBuilder {
    from: Option<Address>,
    reply_to: Option<Address>,
    to: Vec<Address>,
    cc: Vec<Address>,
    bcc: Vec<Address>,
    subject: Option<String>,
    body: Option<String>,
    body_format: BodyFormat,
    attachments: Vec<Attachment>,
    encoding: Option<Charset>,
    locale: Option<String>,
}

fn push_unique(addresses: &mut Vec<Address>, address: Address) {
    if !addresses.contains(&address) {
        addresses.push(address);
    }
}

impl EmailBuilder {
    /// Sets the sender
    pub fn from(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }

    /// Sets the reply-to address
    pub fn reply_to(mut self, reply_to: Address) -> Self {
        self.reply_to = Some(reply_to);
        self
    }

    /// Adds a `To` recipient; duplicates are ignored
    pub fn to(mut self, to: Address) -> Self {
        push_unique(&mut self.to, to);
        self
    }

    /// Adds a `Cc` recipient; duplicates are ignored
    pub fn cc(mut self, cc: Address) -> Self {
        push_unique(&mut self.cc, cc);
        self
    }

    /// Adds a `Bcc` recipient; duplicates are ignored
    pub fn bcc(mut self, bcc: Address) -> Self {
        push_unique(&mut self.bcc, bcc);
        self
    }

    /// Sets the subject
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Sets a plain text body
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self.body_format = BodyFormat::Plain;
        self
    }

    /// Sets an HTML body
    pub fn html_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self.body_format = BodyFormat::Html;
        self
    }

    /// Sets the body format without touching the body
    pub fn body_format(mut self, format: BodyFormat) -> Self {
        self.body_format = format;
        self
    }

    /// Appends an attachment
    pub fn attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Sets the character set
    pub fn encoding(mut self, encoding: Charset) -> Self {
        self.encoding = Some(encoding);
        self
    }

    /// Sets the locale (a language tag such as `it-IT`)
    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Builds the email
    ///
    /// # Errors
    /// [`PreconditionError::MissingField`] if no sender was set.
    pub fn build(self) -> Result<Email, PreconditionError> {
        let from = self.from.ok_or(PreconditionError::MissingField("from"))?;

        Ok(Email {
            from,
            reply_to: self.reply_to,
            to: self.to,
            cc: self.cc,
            bcc: self.bcc,
            subject: self.subject.unwrap_or_default(),
            body: self.body.unwrap_or_default(),
            body_format: self.body_format,
            attachments: self.attachments,
            encoding: self.encoding.unwrap_or_default(),
            locale: self.locale,
            sent_at: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn test_build_without_from_fails() {
        let result = Email::builder()
            .to(Address::parse("to@example.com").unwrap())
            .subject("Hi")
            .build();

        assert_eq!(result, Err(PreconditionError::MissingField("from")));
    }

    #[test]
    fn test_build_applies_defaults() -> TestResult {
        let email = Email::builder()
            .from(Address::parse("from@example.com")?)
            .build()?;

        assert_eq!(email.subject(), "");
        assert_eq!(email.body(), "");
        assert_eq!(email.encoding(), Charset::Utf8);
        assert_eq!(email.body_format(), BodyFormat::Plain);
        assert!(email.to().is_empty());
        assert!(email.cc().is_empty());
        assert!(email.bcc().is_empty());
        assert!(email.reply_to().is_none());
        assert!(email.locale().is_none());
        assert!(email.sent_at().is_none());

        Ok(())
    }

    #[test]
    fn test_duplicate_recipients_are_ignored() -> TestResult {
        let email = Email::builder()
            .from(Address::parse("from@example.com")?)
            .to(Address::parse("a@example.com")?)
            .to(Address::parse("b@example.com")?)
            .to(Address::parse("a@example.com")?)
            .cc(Address::parse("c@example.com")?)
            .cc(Address::parse("c@example.com")?)
            .build()?;

        assert_eq!(email.to().len(), 2);
        assert_eq!(email.cc().len(), 1);

        Ok(())
    }

    #[test]
    fn test_html_body_sets_format() -> TestResult {
        let email = Email::builder()
            .from(Address::parse("from@example.com")?)
            .html_body("<p>Ciao</p>")
            .locale("it-IT")
            .build()?;

        assert_eq!(email.body_format(), BodyFormat::Html);
        assert_eq!(email.locale(), Some("it-IT"));

        Ok(())
    }

    #[test]
    fn test_charset_encode() {
        assert_eq!(Charset::UsAscii.encode("abc"), Some(b"abc".to_vec()));
        assert_eq!(Charset::UsAscii.encode("caffè"), None);
        assert_eq!(
            Charset::Iso8859_1.encode("caffè"),
            Some(vec![b'c', b'a', b'f', b'f', 0xe8])
        );
        assert_eq!(Charset::Iso8859_1.encode("€"), None);
        assert_eq!(Charset::Utf8.encode("€"), Some("€".as_bytes().to_vec()));
    }
}

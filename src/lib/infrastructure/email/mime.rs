//! Conversion of built messages into MIME messages

use std::time::SystemTime;

use anyhow::anyhow;
use lettre::{
    message::{header::ContentType, Attachment, Mailbox, MultiPart, SinglePart},
    Message,
};

use crate::domain::communication::{
    email_addresses::Address,
    emails::{BodyFormat, Charset},
    mailer::{
        errors::TransportError,
        message::{BodyPart, BuiltMessage, MessageBody, TextPart},
    },
    message_builder::bare_content_id,
};

fn mailbox(address: &Address) -> Result<Mailbox, TransportError> {
    Ok(Mailbox::new(
        address.name().map(str::to_string),
        address.email().as_str().parse()?,
    ))
}

fn content_type(raw: &str) -> Result<ContentType, TransportError> {
    ContentType::parse(raw)
        .map_err(|err| TransportError::from(anyhow!("invalid content type {raw}: {err}")))
}

fn text_part(charset: Charset, text: &TextPart) -> Result<SinglePart, TransportError> {
    let essence = match text.format {
        BodyFormat::Plain => "text/plain",
        BodyFormat::Html => "text/html",
    };

    let encoded = charset
        .encode(&text.content)
        .ok_or_else(|| anyhow!("body cannot be encoded as {charset}"))?;

    Ok(SinglePart::builder()
        .header(content_type(&format!("{essence}; charset={charset}"))?)
        .body(encoded))
}

/// Converts a [`BuiltMessage`] into a [`lettre::Message`]
///
/// Inline pictures are grouped with the text in a `multipart/related` part;
/// attachments follow it inside a `multipart/mixed` part.
pub fn to_lettre_message(message: &BuiltMessage) -> Result<Message, TransportError> {
    let mut builder = Message::builder()
        .from(mailbox(&message.from)?)
        .subject(message.subject.clone());

    if let Some(reply_to) = &message.reply_to {
        builder = builder.reply_to(mailbox(reply_to)?);
    }

    for address in &message.to {
        builder = builder.to(mailbox(address)?);
    }

    for address in &message.cc {
        builder = builder.cc(mailbox(address)?);
    }

    for address in &message.bcc {
        builder = builder.bcc(mailbox(address)?);
    }

    if let Some(sent_at) = message.sent_at {
        builder = builder.date(SystemTime::from(sent_at));
    }

    let parts = match &message.body {
        MessageBody::Single(text) => {
            return Ok(builder.singlepart(text_part(message.charset, text)?)?);
        }
        MessageBody::Multipart(parts) => parts,
    };

    let mut text = None;
    let mut inline = Vec::new();
    let mut attachments = Vec::new();

    for part in parts {
        match part {
            BodyPart::Text(body) => text = Some(text_part(message.charset, body)?),
            BodyPart::Inline {
                content_id,
                media_type,
                data,
            } => inline.push(
                Attachment::new_inline(bare_content_id(content_id).to_string())
                    .body(data.clone(), content_type(media_type.as_ref())?),
            ),
            BodyPart::Attachment {
                name,
                media_type,
                data,
            } => attachments.push(
                Attachment::new(name.clone())
                    .body(data.clone(), content_type(media_type.as_ref())?),
            ),
        }
    }

    let text = text.ok_or_else(|| anyhow!("message has no text part"))?;

    let content = if inline.is_empty() {
        MultiPart::mixed().singlepart(text)
    } else {
        let related = inline
            .into_iter()
            .fold(MultiPart::related().singlepart(text), MultiPart::singlepart);

        MultiPart::mixed().multipart(related)
    };

    let mixed = attachments.into_iter().fold(content, MultiPart::singlepart);

    Ok(builder.multipart(mixed)?)
}

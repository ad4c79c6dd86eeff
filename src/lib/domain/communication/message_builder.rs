//! Turns an [`Email`] into a [`BuiltMessage`]

mod content_id;

use std::{fmt, sync::Arc};

use tracing::{debug, error};

use crate::domain::communication::{
    attachments::InlinePicture,
    emails::{BodyFormat, Charset, Email},
    errors::MessageAssemblyError,
    mailer::message::{BodyPart, BuiltMessage, MessageBody, TextPart},
};

pub use content_id::{
    bare_content_id, substitute_content_ids, ContentIdGenerator, UuidContentIds,
};

/// Assembles messages from emails
pub struct MessageBuilder<G = UuidContentIds>
where
    G: ContentIdGenerator,
{
    content_ids: Arc<G>,
}

impl MessageBuilder<UuidContentIds> {
    /// Creates a builder generating `<uuid@localhost>` content ids
    pub fn new() -> Self {
        Self::with_content_ids(UuidContentIds::default())
    }
}

impl Default for MessageBuilder<UuidContentIds> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G> Clone for MessageBuilder<G>
where
    G: ContentIdGenerator,
{
    fn clone(&self) -> Self {
        Self {
            content_ids: Arc::clone(&self.content_ids),
        }
    }
}

impl<G> fmt::Debug for MessageBuilder<G>
where
    G: ContentIdGenerator,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageBuilder")
            .field("content_ids", &"ContentIdGenerator")
            .finish()
    }
}

fn ensure_encodable(
    charset: Charset,
    field: &'static str,
    text: &str,
) -> Result<(), MessageAssemblyError> {
    match charset.encode(text) {
        Some(_) => Ok(()),
        None => {
            error!("{field} cannot be encoded as {charset}");
            Err(MessageAssemblyError::Encoding { charset, field })
        }
    }
}

impl<G> MessageBuilder<G>
where
    G: ContentIdGenerator,
{
    /// Creates a builder using `content_ids` to name inline parts
    pub fn with_content_ids(content_ids: G) -> Self {
        Self {
            content_ids: Arc::new(content_ids),
        }
    }

    /// Builds a message
    ///
    /// # Arguments
    /// * `email` - The email to convert.
    /// * `rendered_body` - Replaces the email's body when present.
    /// * `inline_pictures` - Images to embed. Each picture's template name is
    ///   replaced in the body with `cid:<content id>`, and the body becomes HTML.
    ///
    /// # Returns
    /// The [`BuiltMessage`]: the text is always its first part, followed by
    /// the attachments and then the inline pictures, in the order supplied.
    ///
    /// # Errors
    /// [`MessageAssemblyError`] if a picture cannot be read or the text cannot
    /// be encoded in the email's charset. Nothing is returned in that case.
    pub fn build(
        &self,
        email: &Email,
        rendered_body: Option<&str>,
        inline_pictures: &[InlinePicture],
    ) -> Result<BuiltMessage, MessageAssemblyError> {
        let charset = email.encoding();
        let mut body = rendered_body.unwrap_or(email.body()).to_string();
        let mut format = email.body_format();

        let mut parts: Vec<BodyPart> = email
            .attachments()
            .iter()
            .map(|attachment| BodyPart::Attachment {
                name: attachment.name().to_string(),
                media_type: attachment.media_type().clone(),
                data: attachment.data().to_vec(),
            })
            .collect();

        if !inline_pictures.is_empty() {
            let mut substitutions = Vec::with_capacity(inline_pictures.len());

            for picture in inline_pictures {
                let content_id = format!("<{}>", bare_content_id(&self.content_ids.generate()));

                let data = std::fs::read(picture.file()).map_err(|source| {
                    error!("Error while reading inline picture {}", picture.file().display());

                    MessageAssemblyError::InlinePicture {
                        path: picture.file().to_path_buf(),
                        source,
                    }
                })?;

                debug!(
                    "Inline picture {} -> {}",
                    picture.template_name(),
                    content_id
                );

                parts.push(BodyPart::Inline {
                    content_id: content_id.clone(),
                    media_type: picture.image_type().media_type(),
                    data,
                });
                substitutions.push((picture.template_name(), content_id));
            }

            body = substitute_content_ids(&body, &substitutions);
            format = BodyFormat::Html;
        }

        ensure_encodable(charset, "subject", email.subject())?;
        ensure_encodable(charset, "body", &body)?;

        let text = TextPart {
            content: body,
            format,
        };

        let body = if parts.is_empty() {
            MessageBody::Single(text)
        } else {
            parts.insert(0, BodyPart::Text(text));
            MessageBody::Multipart(parts)
        };

        Ok(BuiltMessage {
            charset,
            from: email.from().clone(),
            reply_to: email.reply_to().cloned(),
            to: email.to().to_vec(),
            cc: email.cc().to_vec(),
            bcc: email.bcc().to_vec(),
            subject: email.subject().to_string(),
            sent_at: email.sent_at(),
            locale: email.locale().map(str::to_string),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use testresult::TestResult;

    use crate::domain::communication::{
        attachments::{Attachment, ImageType},
        email_addresses::Address,
    };

    use super::*;

    const IMAGE_NAME: &str = "100_percent_free.jpg";

    fn image_path() -> String {
        format!("{}/fixtures/images/{IMAGE_NAME}", env!("CARGO_MANIFEST_DIR"))
    }

    fn fixed_builder() -> MessageBuilder<impl ContentIdGenerator> {
        MessageBuilder::with_content_ids(|| "<fixed-id@test>".to_string())
    }

    fn simple_email() -> Email {
        Email::builder()
            .from(Address::parse("Mr. Cinninger <cinninger@reallydomain.com>").unwrap())
            .reply_to(Address::parse("tito@tito.com").unwrap())
            .to(Address::parse("Pomponius Attǐcus <titus@de-rome.it>").unwrap())
            .cc(Address::parse("tito.cc@de-rome.it").unwrap())
            .bcc(Address::parse("tito.bcc@de-rome.it").unwrap())
            .subject("Laelius de amicitia")
            .body("Firmamentum autem stabilitatis constantiaeque eius fides est.")
            .locale("it-IT")
            .build()
            .unwrap()
    }

    fn picture() -> InlinePicture {
        InlinePicture::builder()
            .file(image_path())
            .image_type(ImageType::Jpg)
            .template_name(IMAGE_NAME)
            .build()
            .unwrap()
    }

    #[test]
    fn test_build_simple_email() -> TestResult {
        let email = simple_email();

        let message = MessageBuilder::new().build(&email, None, &[])?;

        assert_eq!(&message.from, email.from());
        assert_eq!(message.reply_to.as_ref(), email.reply_to());
        assert_eq!(message.to, email.to());
        assert_eq!(message.cc, email.cc());
        assert_eq!(message.bcc, email.bcc());
        assert_eq!(message.subject, email.subject());
        assert_eq!(message.charset, Charset::Utf8);
        assert_eq!(message.locale.as_deref(), Some("it-IT"));
        assert_eq!(message.sent_at, None);
        assert_eq!(
            message.body,
            MessageBody::Single(TextPart {
                content: email.body().to_string(),
                format: BodyFormat::Plain,
            })
        );

        Ok(())
    }

    #[test]
    fn test_every_recipient_appears_once() -> TestResult {
        let email = Email::builder()
            .from(Address::parse("from@example.com")?)
            .to(Address::parse("a@example.com")?)
            .to(Address::parse("b@example.com")?)
            .to(Address::parse("c@example.com")?)
            .cc(Address::parse("d@example.com")?)
            .cc(Address::parse("e@example.com")?)
            .bcc(Address::parse("f@example.com")?)
            .build()?;

        let message = MessageBuilder::new().build(&email, None, &[])?;

        assert_eq!(message.to.len(), 3);
        assert_eq!(message.cc.len(), 2);
        assert_eq!(message.bcc.len(), 1);
        for address in email.to() {
            assert_eq!(message.to.iter().filter(|a| *a == address).count(), 1);
        }
        assert_eq!(message.recipients().count(), 6);

        Ok(())
    }

    #[test]
    fn test_empty_recipient_sets_are_skipped() -> TestResult {
        let email = Email::builder()
            .from(Address::parse("from@example.com")?)
            .to(Address::parse("to@example.com")?)
            .build()?;

        let message = MessageBuilder::new().build(&email, None, &[])?;

        assert!(message.cc.is_empty());
        assert!(message.bcc.is_empty());
        assert!(message.reply_to.is_none());

        Ok(())
    }

    #[test]
    fn test_rendered_body_overrides_email_body() -> TestResult {
        let email = simple_email();

        let message = MessageBuilder::new().build(&email, Some("Ciao Tito"), &[])?;

        assert_eq!(message.text().map(|t| t.content.as_str()), Some("Ciao Tito"));

        Ok(())
    }

    #[test]
    fn test_attachments_follow_the_text_in_order() -> TestResult {
        let email = Email::builder()
            .from(Address::parse("from@example.com")?)
            .body("See attached")
            .attachment(Attachment::builder().name("a.pdf").data(vec![1]).build()?)
            .attachment(Attachment::builder().name("b.png").data(vec![2]).build()?)
            .attachment(Attachment::builder().name("c.bin").data(vec![3]).build()?)
            .build()?;

        let message = MessageBuilder::new().build(&email, None, &[])?;
        let parts = message.parts();

        assert_eq!(parts.len(), 4);
        assert!(matches!(&parts[0], BodyPart::Text(text) if text.content == "See attached"));

        for (part, attachment) in parts[1..].iter().zip(email.attachments()) {
            match part {
                BodyPart::Attachment {
                    name,
                    media_type,
                    data,
                } => {
                    assert_eq!(name, attachment.name());
                    assert_eq!(media_type, attachment.media_type());
                    assert_eq!(data.as_slice(), attachment.data());
                }
                other => panic!("expected an attachment, got {other:?}"),
            }
        }

        Ok(())
    }

    #[test]
    fn test_inline_picture_is_substituted_with_its_content_id() -> TestResult {
        let email = simple_email();
        let rendered = "<img src=\"100_percent_free.jpg\" />";

        let message = MessageBuilder::new().build(&email, Some(rendered), &[picture()])?;

        let content_ids = message.content_ids();
        assert_eq!(content_ids.len(), 1);
        let id = bare_content_id(content_ids[0]);

        let text = message.text().ok_or("no text part")?;
        assert_eq!(text.content, format!("<img src=\"cid:{id}\" />"));
        assert_eq!(text.format, BodyFormat::Html);
        assert!(!text.content.contains(IMAGE_NAME));

        let parts = message.parts();
        assert!(matches!(&parts[0], BodyPart::Text(_)));
        assert!(matches!(
            &parts[1],
            BodyPart::Inline { media_type, data, .. }
                if media_type.essence_str() == "image/jpeg" && !data.is_empty()
        ));

        Ok(())
    }

    #[test]
    fn test_inline_pictures_come_after_attachments() -> TestResult {
        let email = Email::builder()
            .from(Address::parse("from@example.com")?)
            .attachment(Attachment::builder().name("a.pdf").data(vec![1]).build()?)
            .build()?;

        let message = fixed_builder().build(
            &email,
            Some("<img src=\"100_percent_free.jpg\">"),
            &[picture()],
        )?;
        let parts = message.parts();

        assert_eq!(parts.len(), 3);
        assert!(matches!(&parts[0], BodyPart::Text(_)));
        assert!(matches!(&parts[1], BodyPart::Attachment { name, .. } if name == "a.pdf"));
        assert!(matches!(
            &parts[2],
            BodyPart::Inline { content_id, .. } if content_id == "<fixed-id@test>"
        ));

        Ok(())
    }

    #[test]
    fn test_unmatched_template_name_is_ignored() -> TestResult {
        let email = simple_email();

        let message =
            fixed_builder().build(&email, Some("<p>no image here</p>"), &[picture()])?;

        assert_eq!(
            message.text().map(|t| t.content.as_str()),
            Some("<p>no image here</p>")
        );
        assert_eq!(message.content_ids(), vec!["<fixed-id@test>"]);

        Ok(())
    }

    #[test]
    fn test_missing_inline_picture_fails() -> TestResult {
        let email = simple_email();
        let missing = InlinePicture::builder()
            .file("/definitely/not/here.png")
            .template_name("here.png")
            .build()?;

        let result =
            MessageBuilder::new().build(&email, Some("<img src=\"here.png\">"), &[missing]);

        assert!(matches!(
            result,
            Err(MessageAssemblyError::InlinePicture { ref path, .. })
                if path.to_str() == Some("/definitely/not/here.png")
        ));

        Ok(())
    }

    #[test]
    fn test_body_not_encodable_in_charset_fails() -> TestResult {
        let email = Email::builder()
            .from(Address::parse("from@example.com")?)
            .subject("Caffè")
            .encoding(Charset::UsAscii)
            .build()?;

        let result = MessageBuilder::new().build(&email, None, &[]);

        assert!(matches!(
            result,
            Err(MessageAssemblyError::Encoding {
                charset: Charset::UsAscii,
                field: "subject"
            })
        ));

        Ok(())
    }

    #[test]
    fn test_sent_at_is_copied_when_present() -> TestResult {
        let mut email = simple_email();
        let now = Utc::now();
        email.mark_sent(now);

        let message = MessageBuilder::new().build(&email, None, &[])?;

        assert_eq!(message.sent_at, Some(now));

        Ok(())
    }

    #[test]
    fn test_build_is_deterministic_with_fixed_content_ids() -> TestResult {
        let email = simple_email();
        let builder = fixed_builder();
        let rendered = "<img src=\"100_percent_free.jpg\" />";

        let first = builder.build(&email, Some(rendered), &[picture()])?;
        let second = builder.build(&email, Some(rendered), &[picture()])?;

        assert_eq!(first, second);

        Ok(())
    }
}

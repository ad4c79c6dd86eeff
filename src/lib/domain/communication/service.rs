//! Email dispatch service

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, error, info};

use crate::domain::communication::{
    attachments::InlinePicture,
    emails::Email,
    errors::{PreconditionError, SendEmailError},
    mailer::{message::BuiltMessage, Mailer},
    message_builder::{ContentIdGenerator, MessageBuilder, UuidContentIds},
    templates::{TemplateRenderer, TemplateVariables},
};

/// Email dispatch service
#[async_trait]
pub trait EmailService: Send + Sync + 'static {
    /// Sends an email as it is.
    ///
    /// # Arguments
    /// * `email` - The [`Email`] to send. Its sent timestamp is set once the
    ///   message has been built.
    ///
    /// # Returns
    /// - [`Ok`] with the [`BuiltMessage`] handed to the transport.
    /// - [`Err`] containing a [`SendEmailError`] if the message could not be
    ///   built or delivered.
    async fn send(&self, email: &mut Email) -> Result<BuiltMessage, SendEmailError>;

    /// Sends an email whose body is rendered from a template.
    ///
    /// # Arguments
    /// * `email` - The [`Email`] to send. Its body is replaced by the rendered template.
    /// * `template_id` - The template to render; must not be blank.
    /// * `variables` - The template variables.
    ///
    /// The rendered body keeps the email's [`BodyFormat`](super::BodyFormat):
    /// set [`BodyFormat::Html`](super::BodyFormat::Html) on the email to send
    /// an HTML template as `text/html`.
    async fn send_template(
        &self,
        email: &mut Email,
        template_id: &str,
        variables: &TemplateVariables,
    ) -> Result<BuiltMessage, SendEmailError>;

    /// Sends an email rendered from a template, embedding inline pictures.
    ///
    /// Every occurrence of a picture's template name in the rendered body is
    /// replaced with a `cid:` reference to the embedded image.
    async fn send_template_with_inline_pictures(
        &self,
        email: &mut Email,
        template_id: &str,
        variables: &TemplateVariables,
        inline_pictures: &[InlinePicture],
    ) -> Result<BuiltMessage, SendEmailError>;
}

/// Email service implementation
#[derive(Debug)]
pub struct EmailServiceImpl<M, R, G = UuidContentIds>
where
    M: Mailer,
    R: TemplateRenderer,
    G: ContentIdGenerator,
{
    mailer: Arc<M>,
    templates: Arc<R>,
    messages: MessageBuilder<G>,
}

impl<M, R, G> Clone for EmailServiceImpl<M, R, G>
where
    M: Mailer,
    R: TemplateRenderer,
    G: ContentIdGenerator,
{
    fn clone(&self) -> Self {
        Self {
            mailer: Arc::clone(&self.mailer),
            templates: Arc::clone(&self.templates),
            messages: self.messages.clone(),
        }
    }
}

impl<M, R> EmailServiceImpl<M, R>
where
    M: Mailer,
    R: TemplateRenderer,
{
    /// Creates a new email service.
    pub fn new(mailer: Arc<M>, templates: Arc<R>) -> Self {
        Self::with_message_builder(mailer, templates, MessageBuilder::new())
    }
}

impl<M, R, G> EmailServiceImpl<M, R, G>
where
    M: Mailer,
    R: TemplateRenderer,
    G: ContentIdGenerator,
{
    /// Creates a new email service assembling messages with `messages`.
    pub fn with_message_builder(
        mailer: Arc<M>,
        templates: Arc<R>,
        messages: MessageBuilder<G>,
    ) -> Self {
        Self {
            mailer,
            templates,
            messages,
        }
    }

    fn render(
        &self,
        template_id: &str,
        variables: &TemplateVariables,
    ) -> Result<String, SendEmailError> {
        if template_id.trim().is_empty() {
            return Err(PreconditionError::BlankField("template_id").into());
        }

        debug!("Rendering template {template_id}");

        self.templates.render(template_id, variables).map_err(|err| {
            error!("Error while rendering template {template_id}: {err}");
            SendEmailError::from(err)
        })
    }

    async fn dispatch(
        &self,
        email: &mut Email,
        rendered_body: Option<&str>,
        inline_pictures: &[InlinePicture],
    ) -> Result<BuiltMessage, SendEmailError> {
        let mut message = self
            .messages
            .build(email, rendered_body, inline_pictures)
            .map_err(|err| {
                error!("Error while converting Email to a message: {err}");
                err
            })?;

        let sent_at = Utc::now();
        email.mark_sent(sent_at);
        message.sent_at = Some(sent_at);

        self.mailer.send(&message).await.map_err(|err| {
            error!("Error while sending email to {:?}: {err}", message.to);
            err
        })?;

        info!(
            "Sent \"{}\" to {} recipient(s)",
            message.subject,
            message.recipients().count()
        );

        Ok(message)
    }
}

#[async_trait]
impl<M, R, G> EmailService for EmailServiceImpl<M, R, G>
where
    M: Mailer,
    R: TemplateRenderer,
    G: ContentIdGenerator,
{
    async fn send(&self, email: &mut Email) -> Result<BuiltMessage, SendEmailError> {
        self.dispatch(email, None, &[]).await
    }

    async fn send_template(
        &self,
        email: &mut Email,
        template_id: &str,
        variables: &TemplateVariables,
    ) -> Result<BuiltMessage, SendEmailError> {
        let body = self.render(template_id, variables)?;

        self.dispatch(email, Some(&body), &[]).await
    }

    async fn send_template_with_inline_pictures(
        &self,
        email: &mut Email,
        template_id: &str,
        variables: &TemplateVariables,
        inline_pictures: &[InlinePicture],
    ) -> Result<BuiltMessage, SendEmailError> {
        let body = self.render(template_id, variables)?;

        self.dispatch(email, Some(&body), inline_pictures).await
    }
}

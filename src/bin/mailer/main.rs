#![warn(
    missing_debug_implementations,
    rust_2018_idioms,
    missing_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::missing_crate_level_docs
)]

//! Command line mailer: composes one email and sends it over SMTP

use std::{path::PathBuf, sync::Arc};

use anyhow::{anyhow, Result};
use clap::Parser;
use mail_dispatch::{
    domain::communication::{
        Address, Attachment, BodyFormat, Email, EmailService, EmailServiceImpl, InlinePicture,
        MessageBuilder, TemplateVariables, UuidContentIds,
    },
    infrastructure::{
        email::smtp::{SMTPConfig, SMTPMailer},
        templates::handlebars::HandlebarsRenderer,
    },
};
use tracing::info;

/// Command-line arguments / environment variables
#[derive(Debug, Parser)]
pub struct Args {
    /// The SMTP configuration
    #[clap(flatten)]
    pub smtp: SMTPConfig,

    /// The sender
    #[clap(long, env = "SMTP_SENDER")]
    pub from: String,

    /// The reply-to address
    #[clap(long)]
    pub reply_to: Option<String>,

    /// `To` recipients
    #[clap(long, required = true)]
    pub to: Vec<String>,

    /// `Cc` recipients
    #[clap(long)]
    pub cc: Vec<String>,

    /// `Bcc` recipients
    #[clap(long)]
    pub bcc: Vec<String>,

    /// The subject
    #[clap(long, default_value = "")]
    pub subject: String,

    /// The body, ignored when a template is used
    #[clap(long, default_value = "")]
    pub body: String,

    /// Send the body as HTML
    #[clap(long)]
    pub html: bool,

    /// Directory of `*.hbs` templates
    #[clap(long, env = "MAIL_TEMPLATES_DIR")]
    pub templates_dir: Option<PathBuf>,

    /// Template to render the body from
    #[clap(long, requires = "templates_dir")]
    pub template: Option<String>,

    /// Template variable, as `key=value`
    #[clap(long = "var", value_parser = parse_key_value::<String>)]
    pub variables: Vec<(String, String)>,

    /// File to attach
    #[clap(long = "attach")]
    pub attachments: Vec<PathBuf>,

    /// Inline picture, as `template-name=path`
    #[clap(long = "inline", value_parser = parse_key_value::<PathBuf>, requires = "template")]
    pub inline_pictures: Vec<(String, PathBuf)>,

    /// Inline CSS rules of rendered templates
    #[clap(long)]
    pub inline_css: bool,
}

fn parse_key_value<T>(raw: &str) -> Result<(String, T)>
where
    T: From<String>,
{
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("expected key=value, got \"{raw}\""))?;

    Ok((key.to_string(), T::from(value.to_string())))
}

#[mutants::skip]
#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Not loading .env: {}", e);
    }

    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let from = Address::parse(&args.from)?;
    let content_ids = UuidContentIds::new(from.email().domain());

    let mut email = Email::builder()
        .from(from)
        .subject(args.subject)
        .body(args.body)
        .body_format(if args.html {
            BodyFormat::Html
        } else {
            BodyFormat::Plain
        });

    if let Some(reply_to) = &args.reply_to {
        email = email.reply_to(Address::parse(reply_to)?);
    }
    for to in &args.to {
        email = email.to(Address::parse(to)?);
    }
    for cc in &args.cc {
        email = email.cc(Address::parse(cc)?);
    }
    for bcc in &args.bcc {
        email = email.bcc(Address::parse(bcc)?);
    }
    for path in &args.attachments {
        email = email.attachment(Attachment::from_file(path)?);
    }

    let mut email = email.build()?;

    let templates = match &args.templates_dir {
        Some(dir) => HandlebarsRenderer::from_directory(dir)?,
        None => HandlebarsRenderer::new(),
    }
    .with_css_inlining(args.inline_css);

    let service = EmailServiceImpl::with_message_builder(
        Arc::new(SMTPMailer::new(args.smtp)),
        Arc::new(templates),
        MessageBuilder::with_content_ids(content_ids),
    );

    let message = match &args.template {
        None => service.send(&mut email).await?,
        Some(template) => {
            let variables: TemplateVariables = args
                .variables
                .into_iter()
                .map(|(key, value)| (key, serde_json::Value::String(value)))
                .collect();

            let pictures = args
                .inline_pictures
                .iter()
                .map(|(name, path)| {
                    InlinePicture::builder()
                        .file(path)
                        .template_name(name)
                        .build()
                })
                .collect::<Result<Vec<_>, _>>()?;

            service
                .send_template_with_inline_pictures(&mut email, template, &variables, &pictures)
                .await?
        }
    };

    info!(
        "Sent \"{}\" at {}",
        message.subject,
        email.sent_at().map(|at| at.to_rfc3339()).unwrap_or_default()
    );

    Ok(())
}

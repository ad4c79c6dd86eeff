//! Email attachments

mod inline_picture;

use std::path::Path;

use anyhow::{Context, Result};
use mime::Mime;

use crate::domain::communication::errors::PreconditionError;

pub use inline_picture::{ImageType, InlinePicture, InlinePictureBuilder};

/// Guesses the media type from the extension of `name`, falling back to
/// `application/octet-stream`.
pub fn media_type_for(name: impl AsRef<Path>) -> Mime {
    mime_guess::from_path(name).first_or_octet_stream()
}

/// A named binary payload attached to an email
#[derive(Clone, Debug, PartialEq)]
pub struct Attachment {
    name: String,
    data: Vec<u8>,
    media_type: Mime,
}

impl Attachment {
    /// Creates a new [`AttachmentBuilder`]
    pub fn builder() -> AttachmentBuilder {
        AttachmentBuilder::default()
    }

    /// Reads `path` and attaches it under its file name
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("invalid attachment file name: {}", path.display()))?;

        let data = std::fs::read(path)
            .with_context(|| format!("could not read attachment {}", path.display()))?;

        Ok(Self::builder().name(name).data(data).build()?)
    }

    /// The file name shown to the recipient
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The payload
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The media type, derived from the name
    pub fn media_type(&self) -> &Mime {
        &self.media_type
    }
}

/// Builder for [`Attachment`]
#[derive(Debug, Default)]
pub struct AttachmentBuilder {
    name: Option<String>,
    data: Option<Vec<u8>>,
}

impl AttachmentBuilder {
    /// Sets the file name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the payload
    pub fn data(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Builds the attachment
    ///
    /// # Errors
    /// [`PreconditionError`] if the name or the data is missing, or the name is blank.
    pub fn build(self) -> Result<Attachment, PreconditionError> {
        let name = self.name.ok_or(PreconditionError::MissingField("name"))?;
        let data = self.data.ok_or(PreconditionError::MissingField("data"))?;

        if name.trim().is_empty() {
            return Err(PreconditionError::BlankField("name"));
        }

        let media_type = media_type_for(&name);

        Ok(Attachment {
            name,
            data,
            media_type,
        })
    }
}

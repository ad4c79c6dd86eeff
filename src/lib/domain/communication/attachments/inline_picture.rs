//! Inline pictures referenced from an HTML body

use std::path::{Path, PathBuf};

use mime::Mime;

use crate::domain::communication::errors::PreconditionError;

/// Supported inline image formats
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageType {
    /// JPEG
    Jpg,
    /// PNG
    Png,
    /// GIF
    Gif,
    /// Windows bitmap
    Bmp,
    /// SVG
    Svg,
}

impl ImageType {
    /// Infers the image type from a file extension
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let extension = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();

        match extension.as_str() {
            "jpg" | "jpeg" => Some(Self::Jpg),
            "png" => Some(Self::Png),
            "gif" => Some(Self::Gif),
            "bmp" => Some(Self::Bmp),
            "svg" => Some(Self::Svg),
            _ => None,
        }
    }

    /// The media type of the image
    pub fn media_type(&self) -> Mime {
        match self {
            Self::Jpg => mime::IMAGE_JPEG,
            Self::Png => mime::IMAGE_PNG,
            Self::Gif => mime::IMAGE_GIF,
            Self::Bmp => mime::IMAGE_BMP,
            Self::Svg => mime::IMAGE_SVG,
        }
    }
}

/// An image embedded in the body and referenced through a content id
///
/// `template_name` is the literal text that appears in the rendered body
/// wherever the image is used (usually its file name). It gets replaced by
/// `cid:<content-id>` when the message is built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlinePicture {
    image_type: ImageType,
    file: PathBuf,
    template_name: String,
}

impl InlinePicture {
    /// Creates a new [`InlinePictureBuilder`]
    pub fn builder() -> InlinePictureBuilder {
        InlinePictureBuilder::default()
    }

    /// The image format
    pub fn image_type(&self) -> ImageType {
        self.image_type
    }

    /// The image file, read when the message is built
    pub fn file(&self) -> &Path {
        &self.file
    }

    /// The placeholder used in the template
    pub fn template_name(&self) -> &str {
        &self.template_name
    }
}

/// Builder for [`InlinePicture`]
#[derive(Debug, Default)]
pub struct InlinePictureBuilder {
    image_type: Option<ImageType>,
    file: Option<PathBuf>,
    template_name: Option<String>,
}

impl InlinePictureBuilder {
    /// Sets the image format. Inferred from the file extension when not set.
    pub fn image_type(mut self, image_type: ImageType) -> Self {
        self.image_type = Some(image_type);
        self
    }

    /// Sets the image file
    pub fn file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Sets the placeholder used in the template
    pub fn template_name(mut self, template_name: impl Into<String>) -> Self {
        self.template_name = Some(template_name.into());
        self
    }

    /// Builds the inline picture. The file is not read here.
    pub fn build(self) -> Result<InlinePicture, PreconditionError> {
        let file = self.file.ok_or(PreconditionError::MissingField("file"))?;
        let template_name = self
            .template_name
            .ok_or(PreconditionError::MissingField("template_name"))?;

        if template_name.trim().is_empty() {
            return Err(PreconditionError::BlankField("template_name"));
        }

        let image_type = self
            .image_type
            .or_else(|| ImageType::from_path(&file))
            .ok_or(PreconditionError::MissingField("image_type"))?;

        Ok(InlinePicture {
            image_type,
            file,
            template_name,
        })
    }
}

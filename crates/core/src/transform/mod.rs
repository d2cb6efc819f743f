//! Image decode, bounds check and re-encode.
//!
//! [`probe`] reads only what it needs to learn format and dimensions.
//! [`TransformStage`] fully decodes, clamps to the width/height ceilings
//! (aspect ratio preserved) and re-encodes in the source format. Both are
//! pure: one input, one output, no partial results on error.

use std::io::Cursor;

use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader, imageops::FilterType};
use thiserror::Error;

/// Image ceilings in pixels. `None` means unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImageLimits {
    /// Maximum width.
    pub max_width: Option<u32>,
    /// Maximum height.
    pub max_height: Option<u32>,
}

impl ImageLimits {
    /// Create limits.
    #[must_use]
    pub const fn new(max_width: Option<u32>, max_height: Option<u32>) -> Self {
        Self {
            max_width,
            max_height,
        }
    }

    /// Apply request-supplied overrides, each dimension independently.
    ///
    /// An override replaces the configured value only when it parses as a
    /// positive integer; anything else silently keeps the configured value.
    #[must_use]
    pub fn with_overrides(self, width: Option<&str>, height: Option<&str>) -> Self {
        Self {
            max_width: merge_limit(self.max_width, width),
            max_height: merge_limit(self.max_height, height),
        }
    }

    /// Whether `width` x `height` fits inside the ceilings.
    #[must_use]
    pub fn fits(&self, width: u32, height: u32) -> bool {
        self.max_width.is_none_or(|max| width <= max)
            && self.max_height.is_none_or(|max| height <= max)
    }
}

/// `effective = override if override is a valid positive integer else configured`.
#[must_use]
pub fn merge_limit(configured: Option<u32>, override_value: Option<&str>) -> Option<u32> {
    override_value
        .and_then(|raw| raw.trim().parse::<u32>().ok())
        .filter(|value| *value > 0)
        .or(configured)
}

/// Format and dimensions of an encoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageProbe {
    /// Detected container format.
    pub format: ImageFormat,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl ImageProbe {
    /// Canonical extension for the format.
    #[must_use]
    pub fn extension(&self) -> &'static str {
        format_extension(self.format)
    }

    /// MIME type for the format.
    #[must_use]
    pub fn content_type(&self) -> &'static str {
        self.format.to_mime_type()
    }

    /// Whether a declared MIME type names this format.
    ///
    /// `None` when the declared type is not an image format at all
    /// (`application/octet-stream` and the like carry no claim to check).
    #[must_use]
    pub fn matches_content_type(&self, declared: &str) -> Option<bool> {
        let essence = declared.split(';').next().unwrap_or_default().trim();
        let essence = essence.to_ascii_lowercase();
        let essence = if essence == "image/jpg" { "image/jpeg" } else { essence.as_str() };
        ImageFormat::from_mime_type(essence).map(|format| format == self.format)
    }
}

/// Output of [`TransformStage::apply`].
#[derive(Debug, Clone)]
pub struct TransformedImage {
    /// Re-encoded bytes.
    pub bytes: Vec<u8>,
    /// Output format.
    pub format: ImageFormat,
    /// Output width.
    pub width: u32,
    /// Output height.
    pub height: u32,
}

impl TransformedImage {
    /// Canonical extension for the output format.
    #[must_use]
    pub fn extension(&self) -> &'static str {
        format_extension(self.format)
    }
}

/// Image transform errors.
#[derive(Debug, Error)]
pub enum TransformError {
    /// Content is not in a recognised image format.
    #[error("unsupported image format")]
    UnsupportedFormat,

    /// Decoding or encoding failed.
    #[error("image decode failed: {0}")]
    Image(#[from] image::ImageError),

    /// Reading the buffer failed.
    #[error("image read failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Detect format and dimensions without decoding pixel data.
///
/// # Errors
///
/// Returns an error if the format is unknown or the header is corrupt.
pub fn probe(bytes: &[u8]) -> Result<ImageProbe, TransformError> {
    let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
    let format = reader.format().ok_or(TransformError::UnsupportedFormat)?;
    let (width, height) = reader.into_dimensions()?;
    Ok(ImageProbe {
        format,
        width,
        height,
    })
}

/// Decode → clamp → re-encode.
#[derive(Debug, Clone, Copy)]
pub struct TransformStage {
    limits: ImageLimits,
}

impl TransformStage {
    /// Create a stage bounded by `limits`.
    #[must_use]
    pub const fn new(limits: ImageLimits) -> Self {
        Self { limits }
    }

    /// Run the stage.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be decoded or re-encoded.
    pub fn apply(&self, bytes: &[u8]) -> Result<TransformedImage, TransformError> {
        let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
        let format = reader.format().ok_or(TransformError::UnsupportedFormat)?;
        let image = reader.decode()?;
        let image = self.clamp(image);
        let (width, height) = image.dimensions();

        let mut out = Cursor::new(Vec::new());
        image.write_to(&mut out, format)?;

        Ok(TransformedImage {
            bytes: out.into_inner(),
            format,
            width,
            height,
        })
    }

    fn clamp(&self, image: DynamicImage) -> DynamicImage {
        let (width, height) = image.dimensions();
        if self.limits.fits(width, height) {
            return image;
        }
        let max_width = self.limits.max_width.unwrap_or(width);
        let max_height = self.limits.max_height.unwrap_or(height);
        image.resize(max_width, max_height, FilterType::Lanczos3)
    }
}

/// MIME type for a file extension, `application/octet-stream` when unknown.
#[must_use]
pub fn content_type_for_extension(extension: &str) -> &'static str {
    ImageFormat::from_extension(extension).map_or("application/octet-stream", |f| f.to_mime_type())
}

fn format_extension(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Jpeg => "jpg",
        other => other.extensions_str().first().copied().unwrap_or("bin"),
    }
}

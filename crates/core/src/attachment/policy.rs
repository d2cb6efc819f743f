//! Per-surface upload limits.

use mediahub_shared::SurfaceSettings;

use super::error::AttachmentError;
use crate::transform::{ImageLimits, ImageProbe};

/// Limits and key layout for one upload surface.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    limit_size: u64,
    limit_type: Vec<String>,
    save_path: String,
    limits: ImageLimits,
}

impl UploadPolicy {
    /// Build a policy from surface settings.
    #[must_use]
    pub fn from_settings(settings: &SurfaceSettings) -> Self {
        Self {
            limit_size: settings.limit_size,
            limit_type: settings
                .limit_type
                .iter()
                .map(|ext| normalize_extension(ext))
                .collect(),
            save_path: settings.save_path.trim_matches('/').to_string(),
            limits: ImageLimits::new(settings.limit_image_width, settings.limit_image_height),
        }
    }

    /// Configured image ceilings.
    #[must_use]
    pub const fn limits(&self) -> ImageLimits {
        self.limits
    }

    /// Reject payloads over the size ceiling.
    ///
    /// # Errors
    ///
    /// Returns [`AttachmentError::FileTooLarge`].
    pub fn check_size(&self, size: u64) -> Result<(), AttachmentError> {
        if size > self.limit_size {
            return Err(AttachmentError::file_too_large(size, self.limit_size));
        }
        Ok(())
    }

    /// Reject extensions outside the allow-list. `jpg` and `jpeg` are interchangeable.
    ///
    /// # Errors
    ///
    /// Returns [`AttachmentError::ExtensionNotAllowed`].
    pub fn check_extension(&self, extension: &str) -> Result<(), AttachmentError> {
        let extension = normalize_extension(extension);
        let allowed = self.limit_type.iter().any(|allowed| {
            allowed == &extension || (is_jpeg(allowed) && is_jpeg(&extension))
        });
        if allowed {
            Ok(())
        } else {
            Err(AttachmentError::ExtensionNotAllowed(extension))
        }
    }

    /// Reject images over the dimension ceilings.
    ///
    /// # Errors
    ///
    /// Returns [`AttachmentError::ImageTooLarge`].
    pub fn check_dimensions(&self, probe: &ImageProbe) -> Result<(), AttachmentError> {
        if self.limits.fits(probe.width, probe.height) {
            Ok(())
        } else {
            Err(AttachmentError::ImageTooLarge {
                width: probe.width,
                height: probe.height,
            })
        }
    }

    /// Content-addressed key: `{save_path}/{hash[0..2]}/{hash}.{ext}`.
    #[must_use]
    pub fn object_key(&self, hash: &str, extension: &str) -> String {
        let shard = hash.get(..2).unwrap_or(hash);
        if self.save_path.is_empty() {
            format!("{shard}/{hash}.{extension}")
        } else {
            format!("{}/{shard}/{hash}.{extension}", self.save_path)
        }
    }
}

/// Extension of a client-supplied file name, lowercased.
#[must_use]
pub fn extension_from_name(name: &str) -> Option<String> {
    let file = name.rsplit(['/', '\\']).next().unwrap_or(name);
    file.rsplit_once('.')
        .map(|(_, ext)| normalize_extension(ext))
        .filter(|ext| !ext.is_empty())
}

fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_ascii_lowercase()
}

fn is_jpeg(ext: &str) -> bool {
    ext == "jpg" || ext == "jpeg"
}

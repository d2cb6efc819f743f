//! `<mime-marker>,<base64>` payload decoding.

use base64::{Engine as _, engine::general_purpose::STANDARD};

use super::error::AttachmentError;

/// A decoded data payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPayload {
    /// MIME type named by the marker, if any (`data:image/png;base64` → `image/png`).
    pub mime: Option<String>,
    /// Decoded bytes.
    pub bytes: Vec<u8>,
}

impl DataPayload {
    /// Split on `,` and decode the second part.
    ///
    /// # Errors
    ///
    /// Returns [`AttachmentError::MalformedPayload`] unless the input has
    /// exactly two comma-separated parts, and [`AttachmentError::Decode`]
    /// if the second part is not valid base64.
    pub fn parse(file: &str) -> Result<Self, AttachmentError> {
        let parts: Vec<&str> = file.split(',').collect();
        let [marker, data] = parts.as_slice() else {
            return Err(AttachmentError::MalformedPayload);
        };

        let bytes = STANDARD
            .decode(data.trim())
            .map_err(|e| AttachmentError::decode(format!("invalid base64: {e}")))?;

        Ok(Self {
            mime: mime_from_marker(marker),
            bytes,
        })
    }
}

fn mime_from_marker(marker: &str) -> Option<String> {
    let marker = marker.trim();
    let marker = marker.strip_prefix("data:").unwrap_or(marker);
    let mime = marker.split(';').next().unwrap_or_default().trim();
    (!mime.is_empty() && mime.contains('/')).then(|| mime.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_data_url() {
        let payload = DataPayload::parse("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(payload.bytes, b"hello");
        assert_eq!(payload.mime.as_deref(), Some("image/png"));
    }

    #[test]
    fn test_parse_marker_mime_is_lowercased() {
        let payload = DataPayload::parse("data:IMAGE/JPEG;base64,aGVsbG8=").unwrap();
        assert_eq!(payload.mime.as_deref(), Some("image/jpeg"));
    }

    #[test]
    fn test_parse_without_comma_is_malformed() {
        assert!(matches!(
            DataPayload::parse("aGVsbG8="),
            Err(AttachmentError::MalformedPayload)
        ));
    }

    #[test]
    fn test_parse_with_extra_comma_is_malformed() {
        assert!(matches!(
            DataPayload::parse("data:image/png;base64,aGVs,bG8="),
            Err(AttachmentError::MalformedPayload)
        ));
    }

    #[test]
    fn test_parse_bad_base64_is_decode_error() {
        assert!(matches!(
            DataPayload::parse("data:image/png;base64,@@@"),
            Err(AttachmentError::Decode(_))
        ));
    }

    #[test]
    fn test_bare_marker_has_no_mime() {
        let payload = DataPayload::parse(",aGVsbG8=").unwrap();
        assert_eq!(payload.mime, None);
    }
}

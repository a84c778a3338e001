//! Screenshot attachments.
//!
//! Images are stored inline on the record as `data:` URLs so a record is
//! self-contained and can be rendered without a separate fetch. Candidates
//! are checked for size before type, and both checks run before any
//! encoding happens.

use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Rejection message for oversized images.
pub const TOO_LARGE_MESSAGE: &str = "Image size should be less than 5MB";

/// Rejection message for non-image files.
pub const NOT_AN_IMAGE_MESSAGE: &str = "Please upload an image file";

/// An accepted image, encoded as a data URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    data_url: String,
}

impl ImageAttachment {
    /// Accept raw image bytes with a declared content type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UploadRejected`] if `bytes` exceeds `max_bytes` or
    /// `content_type` is not an `image/*` type.
    pub fn from_bytes(bytes: &[u8], content_type: &str, max_bytes: u64) -> Result<Self> {
        check_candidate(bytes.len() as u64, content_type, max_bytes)?;
        Ok(Self::encode(bytes, content_type))
    }

    /// Read and accept an image file, deriving its content type from the
    /// file extension.
    ///
    /// The size limit is checked against the file metadata before the file
    /// is read.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UploadRejected`] for oversized or non-image files,
    /// or an I/O error if the file cannot be read.
    pub fn from_path(path: impl AsRef<Path>, max_bytes: u64) -> Result<Self> {
        let path = path.as_ref();
        let size = std::fs::metadata(path)?.len();
        let content_type = content_type_for(path);
        check_candidate(size, content_type, max_bytes)?;

        let bytes = std::fs::read(path)?;
        debug!("Accepted {} image of {} bytes", content_type, bytes.len());
        Self::from_bytes(&bytes, content_type, max_bytes)
    }

    /// Wrap an already-encoded data URL, checking that it is one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UploadRejected`] if the string is not a base64
    /// `data:image/...` URL.
    pub fn from_data_url(data_url: impl Into<String>) -> Result<Self> {
        let attachment = Self {
            data_url: data_url.into(),
        };
        let is_image = attachment
            .content_type()
            .is_some_and(|ct| ct.starts_with("image/"));
        if !is_image {
            return Err(Error::upload_rejected(NOT_AN_IMAGE_MESSAGE));
        }
        attachment.decode()?;
        Ok(attachment)
    }

    fn encode(bytes: &[u8], content_type: &str) -> Self {
        Self {
            data_url: format!("data:{content_type};base64,{}", BASE64.encode(bytes)),
        }
    }

    /// Consume the attachment, returning the data URL.
    #[must_use]
    pub fn into_data_url(self) -> String {
        self.data_url
    }

    /// The content type named in the data URL.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.data_url
            .strip_prefix("data:")?
            .split_once(";base64,")
            .map(|(content_type, _)| content_type)
    }

    /// Decode the image bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UploadRejected`] if the payload is not valid base64.
    pub fn decode(&self) -> Result<Vec<u8>> {
        let payload = self
            .data_url
            .split_once(";base64,")
            .map(|(_, payload)| payload)
            .ok_or_else(|| Error::upload_rejected("image is not base64 encoded"))?;
        BASE64
            .decode(payload)
            .map_err(|e| Error::upload_rejected(format!("image payload is corrupt: {e}")))
    }

    /// Suggested file extension for the decoded image.
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self.content_type() {
            Some("image/jpeg") => "jpg",
            Some("image/gif") => "gif",
            Some("image/webp") => "webp",
            Some("image/bmp") => "bmp",
            Some("image/svg+xml") => "svg",
            Some("image/x-icon") => "ico",
            Some("image/avif") => "avif",
            Some("image/tiff") => "tiff",
            _ => "png",
        }
    }
}

fn check_candidate(size: u64, content_type: &str, max_bytes: u64) -> Result<()> {
    if size > max_bytes {
        warn!("Rejected image of {} bytes (limit {})", size, max_bytes);
        return Err(Error::upload_rejected(TOO_LARGE_MESSAGE));
    }
    if !content_type.starts_with("image/") {
        warn!("Rejected upload with content type {}", content_type);
        return Err(Error::upload_rejected(NOT_AN_IMAGE_MESSAGE));
    }
    Ok(())
}

/// Content type implied by a file's extension.
#[must_use]
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("avif") => "image/avif",
        Some("tif" | "tiff") => "image/tiff",
        Some("txt" | "log" | "md") => "text/plain",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

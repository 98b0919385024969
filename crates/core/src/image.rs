//! Base64 image payloads and data URLs.
//!
//! Uploaded and generated images travel through the system as standard,
//! padded base64 text. The data URL label is always `image/jpeg`, whatever
//! the original upload format was.

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;

use crate::error::ImageError;

/// MIME type declared in every data URL.
pub const DATA_URL_MIME: &str = "image/jpeg";

/// Upload extensions accepted by the image pages.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// A base64-encoded image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImagePayload(String);

impl ImagePayload {
    /// Encode raw image bytes.
    pub fn encode(bytes: &[u8]) -> Self {
        Self(BASE64.encode(bytes))
    }

    /// Wrap base64 text received from a provider. The text is checked lazily
    /// by [`ImagePayload::decode`].
    pub fn from_base64(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Decode back to raw bytes.
    pub fn decode(&self) -> Result<Vec<u8>, ImageError> {
        BASE64
            .decode(self.0.as_bytes())
            .map_err(|e| ImageError::InvalidPayload(e.to_string()))
    }

    pub fn as_base64(&self) -> &str {
        &self.0
    }

    /// `data:image/jpeg;base64,<payload>`
    pub fn data_url(&self) -> String {
        format!("data:{DATA_URL_MIME};base64,{}", self.0)
    }

    /// Short content reference (`sha256:<hex>`) used in place of the full
    /// payload in shipped log records.
    pub fn reference(&self) -> String {
        let digest = Sha256::digest(self.0.as_bytes());
        format!("sha256:{}", hex::encode(digest))
    }
}

/// Reject uploads whose extension is not png/jpg/jpeg.
pub fn check_upload_extension(path: &Path) -> Result<(), ImageError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    if SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
        Ok(())
    } else {
        Err(ImageError::UnsupportedFormat(path.display().to_string()))
    }
}

//! Transferable image encoding.

use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

/// Media types accepted for answer-sheet uploads.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaType {
    /// `image/png`
    #[serde(rename = "image/png")]
    Png,
    /// `image/jpeg`
    #[serde(rename = "image/jpeg")]
    Jpeg,
    /// `image/webp`
    #[serde(rename = "image/webp")]
    Webp,
}

impl MediaType {
    /// All accepted media types.
    pub const ALL: [Self; 3] = [Self::Png, Self::Jpeg, Self::Webp];

    /// MIME string sent alongside the payload.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Webp => "image/webp",
        }
    }

    /// Maps a file extension (case-insensitive, without the dot).
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unsupported media type '{s}' (expected PNG, JPEG or WEBP)"))
    }
}

/// A base64 payload together with its media type.
///
/// The payload never carries a `data:` URI prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    data: String,
    media_type: MediaType,
}

impl EncodedImage {
    /// Encodes raw image bytes.
    #[must_use]
    pub fn from_bytes(bytes: &[u8], media_type: MediaType) -> Self {
        Self {
            data: STANDARD.encode(bytes),
            media_type,
        }
    }

    /// Parses a `data:<mime>;base64,<payload>` URL, stripping the prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is malformed, not base64, declares an
    /// unsupported media type, or the payload is not valid base64.
    pub fn from_data_url(url: &str) -> anyhow::Result<Self> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| anyhow::anyhow!("not a data URL"))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| anyhow::anyhow!("data URL has no payload"))?;
        let mime = header
            .strip_suffix(";base64")
            .ok_or_else(|| anyhow::anyhow!("data URL is not base64-encoded"))?;
        let media_type = mime.parse::<MediaType>().map_err(anyhow::Error::msg)?;

        STANDARD
            .decode(payload)
            .map_err(|e| anyhow::anyhow!("invalid base64 payload: {e}"))?;

        Ok(Self {
            data: payload.to_string(),
            media_type,
        })
    }

    /// Base64 payload.
    #[must_use]
    pub fn data(&self) -> &str {
        &self.data
    }

    /// Declared media type.
    #[must_use]
    pub const fn media_type(&self) -> MediaType {
        self.media_type
    }

    /// Decodes the payload back to raw bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is not valid base64.
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(&self.data)
    }
}

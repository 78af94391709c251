//! Inline image source for `data:` URLs.

use anyhow::{Context, Result};
use omr_eval_core::{EncodedImage, ImageSource};
use tracing::debug;

/// Answer-sheet image given as a `data:<mime>;base64,<payload>` URL.
///
/// The URL is decoded once when selected; encoding hands back the payload
/// without its prefix.
#[derive(Debug)]
pub struct DataUrlImageSource {
    name: String,
    image: EncodedImage,
}

impl DataUrlImageSource {
    /// Selects an inline image.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is malformed, not base64, or declares a
    /// media type other than PNG, JPEG or WEBP.
    pub fn parse(url: &str) -> Result<Self> {
        let image = EncodedImage::from_data_url(url.trim()).context("Invalid image data URL")?;
        let name = format!("inline {}", image.media_type());
        debug!("Selected {name} ({} base64 chars)", image.data().len());
        Ok(Self { name, image })
    }

    /// Whether `input` looks like a data URL rather than a path.
    #[must_use]
    pub fn is_data_url(input: &str) -> bool {
        input.trim_start().starts_with("data:")
    }
}

impl ImageSource for DataUrlImageSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn encode(&self) -> Result<EncodedImage> {
        Ok(self.image.clone())
    }
}

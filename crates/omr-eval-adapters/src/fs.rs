//! Filesystem adapter for loading answer-sheet images.

use anyhow::{Context, Result};
use image::ImageFormat;
use omr_eval_core::{EncodedImage, ImageSource, MediaType};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Answer-sheet image on disk.
#[derive(Debug)]
pub struct FsImageSource {
    path: PathBuf,
    name: String,
}

impl FsImageSource {
    /// Creates a source for the given file. Nothing is read until
    /// [`ImageSource::encode`] is called.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.to_string_lossy().into_owned();
        Self { path, name }
    }

    /// Selects an image the way an upload control would: the file must exist
    /// and must not carry a non-PNG/JPEG/WEBP image extension.
    ///
    /// # Errors
    ///
    /// Returns an error for a missing file or an unsupported image type.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.is_file() {
            anyhow::bail!("Image not found: {}", path.display());
        }
        if !is_supported_image(&path) && ImageFormat::from_path(&path).is_ok() {
            anyhow::bail!(
                "Unsupported image type: {} (expected PNG, JPEG or WEBP)",
                path.display()
            );
        }
        Ok(Self::new(path))
    }

    /// Path of the image file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Pixel dimensions, for previews.
    ///
    /// # Errors
    ///
    /// Returns an error if the header cannot be read.
    pub fn dimensions(&self) -> Result<(u32, u32)> {
        image::image_dimensions(&self.path)
            .with_context(|| format!("Failed to read image header: {}", self.path.display()))
    }
}

impl ImageSource for FsImageSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn encode(&self) -> Result<EncodedImage> {
        let bytes = std::fs::read(&self.path)
            .with_context(|| format!("Failed to read image: {}", self.path.display()))?;
        let media_type = detect_media_type(&self.path, &bytes)?;
        debug!(
            "Encoding {} ({media_type}, {} bytes)",
            self.path.display(),
            bytes.len()
        );
        Ok(EncodedImage::from_bytes(&bytes, media_type))
    }
}

/// Whether the path has an accepted image extension.
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    media_type_from_path(path).is_some()
}

fn media_type_from_path(path: &Path) -> Option<MediaType> {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(MediaType::from_extension)
}

/// Determines the media type from the extension, falling back to the
/// file contents when the extension is missing or not an image type.
fn detect_media_type(path: &Path, bytes: &[u8]) -> Result<MediaType> {
    if let Some(media_type) = media_type_from_path(path) {
        return Ok(media_type);
    }

    let known_image_ext = ImageFormat::from_path(path).is_ok();
    if known_image_ext {
        anyhow::bail!(
            "Unsupported image type: {} (expected PNG, JPEG or WEBP)",
            path.display()
        );
    }

    match image::guess_format(bytes) {
        Ok(ImageFormat::Png) => Ok(MediaType::Png),
        Ok(ImageFormat::Jpeg) => Ok(MediaType::Jpeg),
        Ok(ImageFormat::WebP) => Ok(MediaType::Webp),
        Ok(other) => anyhow::bail!(
            "Unsupported image type {} for {} (expected PNG, JPEG or WEBP)",
            other.to_mime_type(),
            path.display()
        ),
        Err(_) => anyhow::bail!("Not a recognised image: {}", path.display()),
    }
}

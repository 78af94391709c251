//! Image source port for reading the selected answer sheet.

use crate::domain::EncodedImage;

/// Port for a user-selected answer-sheet image.
pub trait ImageSource: Send + Sync {
    /// Human-readable location of the image, used in logs and reports.
    fn name(&self) -> &str;

    /// Reads and encodes the image.
    ///
    /// # Errors
    ///
    /// Returns an error if the image cannot be read or has an unsupported
    /// media type.
    fn encode(&self) -> anyhow::Result<EncodedImage>;
}

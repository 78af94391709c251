//! Error types for evaluation and session handling.

use thiserror::Error;

/// Message shown to the user for every failed evaluation.
pub const EVALUATION_FAILED_MESSAGE: &str = "Failed to evaluate the OMR sheet. The AI model might be unable to process the image. Please try again with a clearer image.";

/// Message shown when submit is attempted without both inputs.
pub const MISSING_INPUT_MESSAGE: &str =
    "Please upload an OMR sheet image and provide an answer key.";

/// Failure of a single evaluation.
///
/// Variants exist for logging; users always see
/// [`EVALUATION_FAILED_MESSAGE`].
#[derive(Debug, Error)]
pub enum EvaluationError {
    /// The image could not be read or encoded.
    #[error("failed to read image: {0:#}")]
    Image(anyhow::Error),

    /// The external call failed or returned no usable text.
    #[error("transport failure: {0:#}")]
    Transport(anyhow::Error),

    /// The response text was not JSON of the expected shape.
    #[error("The AI model returned an invalid data format.")]
    InvalidFormat {
        /// What was wrong with the response.
        reason: String,
    },

    /// Strict validation found the result internally inconsistent.
    #[error("inconsistent evaluation result: {}", .issues.join("; "))]
    Inconsistent {
        /// Each violated expectation.
        issues: Vec<String>,
    },
}

impl EvaluationError {
    /// Wraps a transport-level error.
    pub fn transport(err: impl Into<anyhow::Error>) -> Self {
        Self::Transport(err.into())
    }

    /// Builds a format error with the given reason.
    pub fn invalid_format(reason: impl Into<String>) -> Self {
        Self::InvalidFormat {
            reason: reason.into(),
        }
    }

    /// Text presented to the user.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        EVALUATION_FAILED_MESSAGE
    }
}

/// Rejected session actions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Image or answer key missing.
    #[error("{}", MISSING_INPUT_MESSAGE)]
    MissingInput,

    /// An evaluation is already in flight.
    #[error("an evaluation is already in progress")]
    AlreadyEvaluating,
}

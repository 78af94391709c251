//! Evaluator port for the external multimodal model.

use async_trait::async_trait;

use crate::domain::{AnswerKey, EncodedImage, EvaluationResult};
use crate::error::EvaluationError;

/// Port for scoring an encoded answer sheet against a key.
///
/// Implementations make at most one external call per invocation and never
/// retry.
#[async_trait]
pub trait Evaluator: Send + Sync {
    /// Identifier of the backing model, for logs and reports.
    fn model(&self) -> &str;

    /// Evaluates one answer sheet.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluationError::Transport`] if the call fails and
    /// [`EvaluationError::InvalidFormat`] if the response has the wrong shape.
    async fn evaluate(
        &self,
        image: &EncodedImage,
        answer_key: &AnswerKey,
    ) -> Result<EvaluationResult, EvaluationError>;
}

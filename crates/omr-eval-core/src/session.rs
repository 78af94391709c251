//! Presentation-layer session state machine.
//!
//! A session holds the two form inputs and the evaluation phase. At most one
//! evaluation is in flight at a time, and editing an input always clears the
//! previous result or error.

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::domain::{AnswerKey, EvaluationResult};
use crate::error::{EvaluationError, SessionError};
use crate::ports::{Evaluator, ImageSource, ProgressEvent, ProgressSink};

/// Observable session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Image or answer key missing.
    Idle,
    /// Both inputs present, nothing submitted since the last edit.
    Ready,
    /// A request is in flight.
    Evaluating,
    /// The last evaluation produced a result.
    Succeeded(EvaluationResult),
    /// The last evaluation failed; holds the user-facing message.
    Failed(String),
}

impl SessionState {
    /// Short label for status lines.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Ready => "ready",
            Self::Evaluating => "evaluating",
            Self::Succeeded(_) => "succeeded",
            Self::Failed(_) => "failed",
        }
    }
}

/// Ticket for an in-flight evaluation, handed out by [`Session::begin`].
pub struct Submission {
    image: Arc<dyn ImageSource>,
    answer_key: AnswerKey,
    revision: u64,
}

impl Submission {
    /// Name of the submitted image.
    #[must_use]
    pub fn image_name(&self) -> &str {
        self.image.name()
    }

    /// Encodes the image and runs the evaluator once.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluationError::Image`] if the image cannot be encoded, or
    /// whatever the evaluator returns.
    pub async fn run(&self, evaluator: &dyn Evaluator) -> Result<EvaluationResult, EvaluationError> {
        let encoded = self.image.encode().map_err(EvaluationError::Image)?;
        debug!(
            image = self.image.name(),
            media_type = %encoded.media_type(),
            bytes = encoded.data().len(),
            "image encoded"
        );
        evaluator.evaluate(&encoded, &self.answer_key).await
    }
}

/// What [`Session::complete`] did with an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The outcome became the session state.
    Applied,
    /// The inputs changed while the request was in flight; outcome dropped.
    Discarded,
}

/// One form instance: inputs plus evaluation phase.
pub struct Session {
    image: Option<Arc<dyn ImageSource>>,
    answer_key: AnswerKey,
    state: SessionState,
    revision: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Creates an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self {
            image: None,
            answer_key: AnswerKey::default(),
            state: SessionState::Idle,
            revision: 0,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    /// Name of the selected image, if any.
    #[must_use]
    pub fn image_name(&self) -> Option<&str> {
        self.image.as_deref().map(ImageSource::name)
    }

    /// Current answer key text.
    #[must_use]
    pub const fn answer_key(&self) -> &AnswerKey {
        &self.answer_key
    }

    /// Whether both inputs are present.
    #[must_use]
    pub fn has_inputs(&self) -> bool {
        self.image.is_some() && self.answer_key.is_present()
    }

    /// Whether the submit action is enabled.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.has_inputs() && self.state != SessionState::Evaluating
    }

    /// Selects a new image, replacing any previous one.
    pub fn select_image(&mut self, image: Arc<dyn ImageSource>) {
        debug!(image = image.name(), "image selected");
        self.image = Some(image);
        self.inputs_changed();
    }

    /// Replaces the answer key text.
    pub fn set_answer_key(&mut self, answer_key: AnswerKey) {
        self.answer_key = answer_key;
        self.inputs_changed();
    }

    fn inputs_changed(&mut self) {
        self.revision += 1;
        if self.state != SessionState::Evaluating {
            self.state = self.resting_state();
        }
    }

    fn resting_state(&self) -> SessionState {
        if self.has_inputs() {
            SessionState::Ready
        } else {
            SessionState::Idle
        }
    }

    /// Moves to [`SessionState::Evaluating`] and returns the ticket to run.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::AlreadyEvaluating`] while a request is in
    /// flight and [`SessionError::MissingInput`] without both inputs. The
    /// state is left untouched in both cases.
    pub fn begin(&mut self) -> Result<Submission, SessionError> {
        if self.state == SessionState::Evaluating {
            return Err(SessionError::AlreadyEvaluating);
        }
        let image = match &self.image {
            Some(image) if self.answer_key.is_present() => Arc::clone(image),
            _ => return Err(SessionError::MissingInput),
        };

        self.state = SessionState::Evaluating;
        Ok(Submission {
            image,
            answer_key: self.answer_key.clone(),
            revision: self.revision,
        })
    }

    /// Applies the outcome of a submission.
    pub fn complete(
        &mut self,
        submission: Submission,
        outcome: Result<EvaluationResult, EvaluationError>,
    ) -> Completion {
        if submission.revision != self.revision {
            debug!(
                image = submission.image_name(),
                "inputs changed during evaluation, discarding outcome"
            );
            self.state = self.resting_state();
            return Completion::Discarded;
        }

        self.state = match outcome {
            Ok(result) => {
                info!(
                    image = submission.image_name(),
                    total = result.total_score,
                    "evaluation succeeded"
                );
                SessionState::Succeeded(result)
            }
            Err(err) => {
                match &err {
                    EvaluationError::Image(e) => error!("image read failed: {e:#}"),
                    EvaluationError::Transport(e) => error!("transport failure: {e:#}"),
                    EvaluationError::InvalidFormat { reason } => {
                        error!(%reason, "invalid response format");
                    }
                    EvaluationError::Inconsistent { issues } => {
                        error!(?issues, "inconsistent evaluation result");
                    }
                }
                SessionState::Failed(err.user_message().to_string())
            }
        };
        Completion::Applied
    }

    /// Runs one full evaluation: begin, encode, call, complete.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] if the submission cannot start; evaluation
    /// failures end up in [`SessionState::Failed`] instead.
    pub async fn submit(
        &mut self,
        evaluator: &dyn Evaluator,
        progress: &dyn ProgressSink,
    ) -> Result<&SessionState, SessionError> {
        let submission = self.begin()?;
        progress.on_event(ProgressEvent::Started {
            image: submission.image_name().to_string(),
            model: evaluator.model().to_string(),
        });

        let outcome = submission.run(evaluator).await;

        let event = match self.complete(submission, outcome) {
            Completion::Discarded => ProgressEvent::Discarded,
            Completion::Applied => match &self.state {
                SessionState::Succeeded(result) => ProgressEvent::Completed {
                    result: result.clone(),
                },
                SessionState::Failed(message) => ProgressEvent::Failed {
                    message: message.clone(),
                },
                _ => ProgressEvent::Discarded,
            },
        };
        progress.on_event(event);

        Ok(&self.state)
    }
}

//! Mock implementations of core port traits.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use omr_eval_core::domain::{AnswerKey, EncodedImage, EvaluationResult, MediaType};
use omr_eval_core::error::EvaluationError;
use omr_eval_core::ports::{Evaluator, ImageSource, ProgressEvent, ProgressSink, ResultOutput};
use omr_eval_core::report::EvaluationReport;

/// What a [`MockEvaluator`] answers with.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Return this result.
    Succeed(EvaluationResult),
    /// Fail as if the service were unreachable.
    TransportFailure,
    /// Fail as if the response had the wrong shape.
    InvalidFormat,
}

/// Mock implementation of `Evaluator` for testing.
///
/// Returns a fixed outcome and records every call.
pub struct MockEvaluator {
    behavior: MockBehavior,
    calls: Arc<Mutex<Vec<(EncodedImage, AnswerKey)>>>,
}

impl MockEvaluator {
    /// Creates a mock that always returns `result`.
    #[must_use]
    pub fn succeeding(result: EvaluationResult) -> Self {
        Self::with_behavior(MockBehavior::Succeed(result))
    }

    /// Creates a mock that always fails with a transport error.
    #[must_use]
    pub fn unreachable() -> Self {
        Self::with_behavior(MockBehavior::TransportFailure)
    }

    /// Creates a mock that always fails with a format error.
    #[must_use]
    pub fn malformed() -> Self {
        Self::with_behavior(MockBehavior::InvalidFormat)
    }

    /// Creates a mock with the given behavior.
    #[must_use]
    pub fn with_behavior(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns the number of evaluations performed.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns the inputs of the most recent call.
    #[must_use]
    pub fn last_call(&self) -> Option<(EncodedImage, AnswerKey)> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }
}

#[async_trait]
impl Evaluator for MockEvaluator {
    fn model(&self) -> &str {
        "mock-model"
    }

    async fn evaluate(
        &self,
        image: &EncodedImage,
        answer_key: &AnswerKey,
    ) -> Result<EvaluationResult, EvaluationError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((image.clone(), answer_key.clone()));

        match &self.behavior {
            MockBehavior::Succeed(result) => Ok(result.clone()),
            MockBehavior::TransportFailure => Err(EvaluationError::transport(anyhow::anyhow!(
                "service unreachable"
            ))),
            MockBehavior::InvalidFormat => {
                Err(EvaluationError::invalid_format("totalScore is missing"))
            }
        }
    }
}

/// Mock implementation of `ImageSource` for testing.
///
/// Serves in-memory bytes and counts reads.
pub struct MockImageSource {
    name: String,
    bytes: Option<Vec<u8>>,
    media_type: MediaType,
    read_count: Arc<Mutex<usize>>,
}

impl MockImageSource {
    /// Creates a source serving `bytes` as `media_type`.
    #[must_use]
    pub fn new(name: impl Into<String>, bytes: Vec<u8>, media_type: MediaType) -> Self {
        Self {
            name: name.into(),
            bytes: Some(bytes),
            media_type,
            read_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Creates a source whose reads always fail.
    #[must_use]
    pub fn unreadable(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bytes: None,
            media_type: MediaType::Png,
            read_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Returns the number of times the image was encoded.
    #[must_use]
    pub fn read_count(&self) -> usize {
        *self
            .read_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl ImageSource for MockImageSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn encode(&self) -> anyhow::Result<EncodedImage> {
        if let Ok(mut c) = self.read_count.lock() {
            *c += 1;
        }
        let bytes = self
            .bytes
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("Failed to read image: {}", self.name))?;
        Ok(EncodedImage::from_bytes(bytes, self.media_type))
    }
}

/// Mock implementation of `ResultOutput` for testing.
///
/// Captures reports for later assertions.
pub struct MockResultOutput {
    reports: Arc<Mutex<Vec<EvaluationReport>>>,
    flush_count: Arc<Mutex<usize>>,
}

impl MockResultOutput {
    /// Creates a new mock output.
    #[must_use]
    pub fn new() -> Self {
        Self {
            reports: Arc::new(Mutex::new(Vec::new())),
            flush_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Returns all captured reports.
    #[must_use]
    pub fn reports(&self) -> Vec<EvaluationReport> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of times `flush()` was called.
    #[must_use]
    pub fn flush_count(&self) -> usize {
        *self
            .flush_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MockResultOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultOutput for MockResultOutput {
    fn write(&self, report: &EvaluationReport) -> anyhow::Result<()> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(report.clone());
        Ok(())
    }

    fn flush(&self) -> anyhow::Result<()> {
        if let Ok(mut c) = self.flush_count.lock() {
            *c += 1;
        }
        Ok(())
    }
}

/// Mock implementation of `ProgressSink` for testing.
///
/// Captures events for later assertions.
pub struct MockProgressSink {
    events: Arc<Mutex<Vec<ProgressEvent>>>,
}

impl MockProgressSink {
    /// Creates a new mock progress sink.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns all captured events.
    #[must_use]
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of `Started` events.
    #[must_use]
    pub fn started_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, ProgressEvent::Started { .. }))
            .count()
    }

    /// Returns the user message of the last `Failed` event, if any.
    #[must_use]
    pub fn failure_message(&self) -> Option<String> {
        self.events().iter().rev().find_map(|e| match e {
            ProgressEvent::Failed { message } => Some(message.clone()),
            _ => None,
        })
    }

    /// Returns whether a `Completed` event was received.
    #[must_use]
    pub fn has_completed(&self) -> bool {
        self.events()
            .iter()
            .any(|e| matches!(e, ProgressEvent::Completed { .. }))
    }
}

impl Default for MockProgressSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for MockProgressSink {
    fn on_event(&self, event: ProgressEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

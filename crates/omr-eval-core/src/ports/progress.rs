//! Progress reporting port for UI integration.

use crate::domain::EvaluationResult;

/// Events emitted while a session evaluates a sheet.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// The request was submitted and is in flight.
    Started {
        /// Image being evaluated.
        image: String,
        /// Model handling the request.
        model: String,
    },
    /// The evaluation produced a result.
    Completed {
        /// The accepted result.
        result: EvaluationResult,
    },
    /// The evaluation failed.
    Failed {
        /// Message shown to the user.
        message: String,
    },
    /// The outcome arrived after the inputs changed and was dropped.
    Discarded,
}

/// Port for receiving progress events.
pub trait ProgressSink: Send + Sync {
    /// Called when a progress event occurs.
    fn on_event(&self, event: ProgressEvent);
}

/// Sink that ignores every event.
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_event(&self, _event: ProgressEvent) {}
}

//! OMR Eval Core - Domain logic for answer-sheet evaluation
//!
//! This crate contains the domain types, the request builder and response
//! validation for the external model, the port traits, and the session
//! state machine that drives the user interface.

pub mod domain;
pub mod error;
pub mod ports;
pub mod report;
pub mod request;
pub mod response;
pub mod session;

pub use domain::{AnswerKey, EncodedImage, EvaluationResult, MediaType, SubjectScores};
pub use error::{EvaluationError, SessionError, EVALUATION_FAILED_MESSAGE, MISSING_INPUT_MESSAGE};
pub use ports::{Evaluator, ImageSource, NoProgress, ProgressEvent, ProgressSink, ResultOutput};
pub use report::{EvaluationReport, ScoreSummary};
pub use request::EvaluationRequest;
pub use response::{parse_evaluation, Validation};
pub use session::{Completion, Session, SessionState, Submission};

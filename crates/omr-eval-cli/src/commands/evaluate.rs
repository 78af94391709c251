//! Evaluate command - score one answer sheet.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use omr_eval_adapters::{DataUrlImageSource, FsImageSource, GeminiEvaluator};
use omr_eval_core::{
    EvaluationReport, Evaluator, ImageSource, ResultOutput, Session, SessionError, SessionState,
    MISSING_INPUT_MESSAGE,
};
use tracing::{debug, info};

use super::args::{KeyArgs, ModelArgs, OutputArgs};
use super::ExitCode;
use crate::config::AppConfig;

/// Arguments for a single evaluation.
#[derive(Args, Clone, Debug, Default)]
pub struct EvaluateArgs {
    /// Answer-sheet image (PNG, JPEG or WEBP), as a path or a data: URL
    #[arg(value_name = "IMAGE")]
    pub image: Option<PathBuf>,

    #[command(flatten)]
    pub keys: KeyArgs,

    #[command(flatten)]
    pub model: ModelArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

impl EvaluateArgs {
    /// Apply configuration file values, respecting CLI precedence.
    ///
    /// Layering priority (lowest to highest):
    /// 1. Hardcoded defaults
    /// 2. Config file values (XDG, then project-local)
    /// 3. CLI arguments and environment (already set on self)
    #[must_use]
    pub fn with_config(self, config: &AppConfig) -> Self {
        Self {
            image: self.image,
            keys: self.keys.with_config(config),
            model: self.model.with_config(config),
            output: self.output.with_config(config),
        }
    }
}

/// Run the evaluate command.
///
/// Expects `args` to have been processed through `with_config()` first.
///
/// # Errors
///
/// Fails on missing credentials, an image that cannot be selected, an
/// unreadable key file, or output that cannot be written. A failed
/// evaluation is not an error; it yields [`ExitCode::EvaluationFailed`].
pub async fn run(args: &EvaluateArgs) -> Result<ExitCode> {
    let evaluator = GeminiEvaluator::new(args.model.gemini_config()?)?;
    info!("Evaluating with model {}", evaluator.model());

    let mut session = Session::new();
    if let Some(ref path) = args.image {
        session.select_image(open_image(path)?);
    }
    session.set_answer_key(args.keys.resolve()?);

    let options = args.output.options();
    let spinner = options.spinner();

    let state = match session.submit(&evaluator, &spinner).await {
        Ok(state) => state.clone(),
        Err(SessionError::MissingInput) => {
            eprintln!("error: {MISSING_INPUT_MESSAGE}");
            return Ok(ExitCode::Error);
        }
        Err(e) => return Err(e.into()),
    };

    match state {
        SessionState::Succeeded(_) => {
            write_report(&session, evaluator.model(), options.result_output().as_ref())?;
            Ok(ExitCode::Success)
        }
        SessionState::Failed(message) => {
            eprintln!("Evaluation Failed: {message}");
            Ok(ExitCode::EvaluationFailed)
        }
        other => anyhow::bail!("Evaluation did not finish (state: {})", other.label()),
    }
}

/// Selects an image given on the command line, either a file or an inline
/// `data:` URL.
///
/// # Errors
///
/// Returns an error if the file is missing, the URL is malformed, or the
/// image type is not accepted.
pub fn open_image(input: &Path) -> Result<Arc<dyn ImageSource>> {
    match input.to_str() {
        Some(url) if DataUrlImageSource::is_data_url(url) => {
            Ok(Arc::new(DataUrlImageSource::parse(url)?))
        }
        _ => Ok(Arc::new(FsImageSource::open(input)?)),
    }
}

/// Report for a session whose last evaluation succeeded.
pub fn report_for(session: &Session, model: &str) -> Option<EvaluationReport> {
    match session.state() {
        SessionState::Succeeded(result) => Some(EvaluationReport {
            image: session.image_name().unwrap_or_default().to_string(),
            model: model.to_string(),
            timestamp: iso_timestamp(),
            result: result.clone(),
        }),
        _ => None,
    }
}

/// Writes the succeeded session's report through `output`.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_report(session: &Session, model: &str, output: &dyn ResultOutput) -> Result<bool> {
    let Some(report) = report_for(session, model) else {
        return Ok(false);
    };
    output.write(&report)?;
    output.flush()?;
    Ok(true)
}

/// Generate ISO 8601 UTC timestamp (RFC 3339 format).
fn iso_timestamp() -> String {
    match time::OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339) {
        Ok(ts) => ts,
        Err(e) => {
            debug!("Timestamp format failed: {e}");
            String::from("1970-01-01T00:00:00Z")
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use omr_eval_core::{AnswerKey, MediaType, NoProgress, EVALUATION_FAILED_MESSAGE};
    use omr_eval_test_support::{
        MockEvaluator, MockImageSource, MockProgressSink, MockResultOutput, ResultBuilder,
    };

    #[tokio::test]
    async fn test_report_only_after_success() {
        let evaluator = MockEvaluator::succeeding(ResultBuilder::uniform(5).build());
        let mut session = Session::new();
        assert!(report_for(&session, "mock-model").is_none());

        session.select_image(Arc::new(MockImageSource::new(
            "sheet.png",
            vec![1, 2, 3],
            MediaType::Png,
        )));
        session.set_answer_key(AnswerKey::sample());
        session.submit(&evaluator, &NoProgress).await.unwrap();

        let report = report_for(&session, "mock-model").unwrap();
        assert_eq!(report.image, "sheet.png");
        assert_eq!(report.model, "mock-model");
        assert_eq!(report.result.total_score, 25);
        assert!(report.timestamp.ends_with('Z'));
    }

    #[tokio::test]
    async fn test_write_report_skips_failed_session() {
        let evaluator = MockEvaluator::unreachable();
        let output = MockResultOutput::new();
        let mut session = Session::new();
        session.select_image(Arc::new(MockImageSource::new(
            "sheet.png",
            vec![1],
            MediaType::Png,
        )));
        session.set_answer_key(AnswerKey::new("1:A"));
        session.submit(&evaluator, &NoProgress).await.unwrap();

        assert!(!write_report(&session, "mock-model", &output).unwrap());
        assert!(output.reports().is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_image_fails_without_calling_model() {
        let evaluator = MockEvaluator::succeeding(ResultBuilder::uniform(5).build());
        let progress = MockProgressSink::new();
        let output = MockResultOutput::new();
        let image = Arc::new(MockImageSource::unreadable("gone.png"));
        let mut session = Session::new();
        session.select_image(image.clone());
        session.set_answer_key(AnswerKey::sample());

        let state = session.submit(&evaluator, &progress).await.unwrap();

        assert_eq!(
            state,
            &SessionState::Failed(EVALUATION_FAILED_MESSAGE.to_string())
        );
        assert_eq!(image.read_count(), 1);
        assert_eq!(evaluator.call_count(), 0);
        assert_eq!(progress.started_count(), 1);
        assert_eq!(
            progress.failure_message().as_deref(),
            Some(EVALUATION_FAILED_MESSAGE)
        );
        assert!(!write_report(&session, "mock-model", &output).unwrap());
        assert_eq!(output.flush_count(), 0);
    }

    #[test]
    fn test_open_image_accepts_path_or_data_url() {
        let inline = open_image(Path::new("data:image/png;base64,AAEC")).unwrap();
        assert_eq!(inline.name(), "inline image/png");
        assert_eq!(inline.encode().unwrap().data(), "AAEC");

        let err = open_image(Path::new("data:image/png,AAEC")).err().unwrap();
        assert!(format!("{err:#}").contains("Invalid image data URL"));

        let err = open_image(Path::new("/nonexistent/sheet.png")).err().unwrap();
        assert!(err.to_string().contains("Image not found"));
    }

    #[test]
    fn test_iso_timestamp_format() {
        let ts = iso_timestamp();
        assert!(ts.contains('T'));
        assert!(ts.len() >= 20);
    }
}

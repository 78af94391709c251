//! Output formatting for CLI.

mod json;
mod progress;
mod summary;

use std::io::IsTerminal;

use clap::ValueEnum;
use omr_eval_core::ResultOutput;

pub use json::JsonOutput;
pub use progress::Spinner;
pub use summary::TextOutput;

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Summary card and subject chart
    #[default]
    Text,
    /// The report as a JSON object
    Json,
}

impl OutputFormat {
    /// Parses a config file value.
    pub fn from_config(value: &str) -> Option<Self> {
        match value {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Rendering options resolved from CLI and config.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    /// Result format.
    pub format: OutputFormat,
    /// Pretty-print JSON.
    pub pretty: bool,
    /// Include detected answers in text output.
    pub answers: bool,
    /// Suppress the spinner.
    pub quiet: bool,
    /// Force the spinner even when stderr is not a terminal.
    pub progress: bool,
}

impl OutputOptions {
    /// Stdout adapter for the chosen format.
    #[must_use]
    pub fn result_output(&self) -> Box<dyn ResultOutput> {
        match self.format {
            OutputFormat::Text => Box::new(TextOutput::stdout(self.answers)),
            OutputFormat::Json => Box::new(JsonOutput::stdout(self.pretty)),
        }
    }

    /// Spinner on stderr, drawn only when wanted and visible.
    #[must_use]
    pub fn spinner(&self) -> Spinner {
        let show = self.progress || std::io::stderr().is_terminal();
        Spinner::new(self.quiet, show)
    }
}

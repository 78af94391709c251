//! Argument groups shared by several commands.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use omr_eval_adapters::gemini::{API_KEY_ENV, DEFAULT_ENDPOINT, DEFAULT_MODEL};
use omr_eval_adapters::GeminiConfig;
use omr_eval_core::{AnswerKey, Validation};
use tracing::debug;

use crate::config::AppConfig;
use crate::output::{OutputFormat, OutputOptions};

/// Where the answer key comes from.
#[derive(Args, Clone, Debug, Default)]
pub struct KeyArgs {
    /// Answer key text, e.g. "1:A,2:B,3:C"
    #[arg(long, value_name = "KEY", conflicts_with_all = ["key_file", "sample_key"])]
    pub key: Option<String>,

    /// Read the answer key from a file
    #[arg(long, value_name = "FILE", conflicts_with = "sample_key")]
    pub key_file: Option<PathBuf>,

    /// Use the built-in sample key (1:A, 2:B, ... cycling A-D)
    #[arg(long)]
    pub sample_key: bool,
}

impl KeyArgs {
    /// Falls back to the configured key file when no source was given.
    pub fn with_config(mut self, config: &AppConfig) -> Self {
        if self.key.is_none() && self.key_file.is_none() && !self.sample_key {
            self.key_file.clone_from(&config.evaluation.key_file);
        }
        self
    }

    /// Resolves the key text. No source yields an empty key.
    ///
    /// # Errors
    ///
    /// Fails if the key file cannot be read.
    pub fn resolve(&self) -> Result<AnswerKey> {
        if let Some(ref key) = self.key {
            return Ok(AnswerKey::new(key.clone()));
        }
        if let Some(ref path) = self.key_file {
            return read_key_file(path);
        }
        if self.sample_key {
            return Ok(AnswerKey::sample());
        }
        Ok(AnswerKey::default())
    }
}

/// Reads an answer key file, trimming the trailing newline.
///
/// # Errors
///
/// Fails if the file cannot be read.
pub fn read_key_file(path: &std::path::Path) -> Result<AnswerKey> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read answer key: {}", path.display()))?;
    debug!("Loaded answer key from {}", path.display());
    Ok(AnswerKey::new(text.trim_end()))
}

/// Model connection settings.
#[derive(Args, Clone, Debug, Default)]
pub struct ModelArgs {
    /// API key for the model service
    #[arg(long, env = "API_KEY", hide_env_values = true, value_name = "KEY")]
    pub api_key: Option<String>,

    /// Model identifier [default: gemini-2.5-flash]
    #[arg(long, value_name = "MODEL")]
    pub model: Option<String>,

    /// API base URL
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Reject results whose scores and answers do not add up
    #[arg(long)]
    pub strict: bool,
}

impl ModelArgs {
    /// Apply configuration file values, respecting CLI precedence.
    pub fn with_config(mut self, config: &AppConfig) -> Self {
        self.api_key = self.api_key.or_else(|| config.model.api_key.clone());
        self.model = self.model.or_else(|| config.model.name.clone());
        self.endpoint = self.endpoint.or_else(|| config.model.endpoint.clone());
        if !self.strict {
            self.strict = config.evaluation.strict.unwrap_or(false);
        }
        self
    }

    /// Builds the Gemini settings.
    ///
    /// # Errors
    ///
    /// Fails when no API key is available from any source.
    pub fn gemini_config(&self) -> Result<GeminiConfig> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("{API_KEY_ENV} environment variable not set"))?;

        let validation = if self.strict {
            Validation::Strict
        } else {
            Validation::Permissive
        };

        Ok(GeminiConfig::new(api_key)
            .with_model(self.model.as_deref().unwrap_or(DEFAULT_MODEL))
            .with_endpoint(self.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT))
            .with_validation(validation))
    }
}

/// How results are shown.
#[derive(Args, Clone, Debug, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct OutputArgs {
    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Pretty-print JSON output (only affects --format json)
    #[arg(long)]
    pub pretty: bool,

    /// Also print the detected answers
    #[arg(long)]
    pub answers: bool,

    /// Show the spinner even when stderr is not a terminal
    #[arg(long)]
    pub progress: bool,

    /// Suppress the spinner
    #[arg(short, long)]
    pub quiet: bool,
}

impl OutputArgs {
    /// Apply configuration file values, respecting CLI precedence.
    ///
    /// Boolean flags can only be switched on from the CLI; config fills in
    /// when the flag was not passed.
    pub fn with_config(mut self, config: &AppConfig) -> Self {
        if self.format.is_none() {
            self.format = config
                .output
                .format
                .as_deref()
                .and_then(OutputFormat::from_config);
        }
        if !self.pretty {
            self.pretty = config.output.pretty.unwrap_or(false);
        }
        if !self.answers {
            self.answers = config.output.answers.unwrap_or(false);
        }
        if !self.progress {
            self.progress = config.output.progress.unwrap_or(false);
        }
        self
    }

    /// Resolved rendering options.
    #[must_use]
    pub fn options(&self) -> OutputOptions {
        OutputOptions {
            format: self.format.unwrap_or_default(),
            pretty: self.pretty,
            answers: self.answers,
            quiet: self.quiet,
            progress: self.progress,
        }
    }
}

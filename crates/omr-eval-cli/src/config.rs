//! Configuration file support for omr-eval.
//!
//! Supports TOML configuration from:
//! - XDG config: `~/.config/omr-eval/config.toml` (lowest priority)
//! - Project-local: `.omr-eval.toml` (searched up directory tree)
//! - CLI flags and environment (highest priority, applied separately)

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

/// Top-level configuration structure.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// External model settings.
    pub model: ModelConfig,
    /// Evaluation settings.
    pub evaluation: EvaluationConfig,
    /// Output formatting settings.
    pub output: OutputConfig,
}

/// External model configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Model identifier.
    pub name: Option<String>,
    /// API base URL.
    pub endpoint: Option<String>,
    /// API key, used when neither `--api-key` nor `API_KEY` is set.
    pub api_key: Option<String>,
}

/// Evaluation configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Reject inconsistent results.
    pub strict: Option<bool>,
    /// Default answer key file.
    pub key_file: Option<PathBuf>,
}

/// Output formatting configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format: "text" or "json".
    pub format: Option<String>,
    /// Pretty-print JSON output.
    pub pretty: Option<bool>,
    /// Print the detected answers.
    pub answers: Option<bool>,
    /// Show the progress spinner.
    pub progress: Option<bool>,
}

impl AppConfig {
    /// Load configuration from XDG and project-local files.
    ///
    /// Priority (lowest to highest):
    /// 1. XDG config: `~/.config/omr-eval/config.toml`
    /// 2. Project-local: `.omr-eval.toml` (searched up from cwd)
    ///
    /// Missing files are silently ignored. Invalid values are logged as warnings
    /// and dropped.
    pub fn load() -> Self {
        let mut config = Self::default();

        if let Some(xdg_path) = xdg_config_path() {
            if xdg_path.exists() {
                info!("Loading XDG config: {}", xdg_path.display());
                if let Some(xdg_config) = load_file(&xdg_path) {
                    config = xdg_config;
                }
            } else {
                debug!("XDG config not found: {}", xdg_path.display());
            }
        }

        if let Some(project_path) = find_project_config() {
            info!("Loading project config: {}", project_path.display());
            if let Some(project_config) = load_file(&project_path) {
                config.merge(project_config);
            }
        }

        if let Err(e) = config.validate() {
            eprintln!("warning: {e}");
            config.drop_invalid();
        }

        config
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<(), String> {
        if let Some(ref f) = self.output.format {
            if f != "text" && f != "json" {
                return Err(format!(
                    "output.format must be 'text' or 'json', got '{f}'"
                ));
            }
        }

        if let Some(ref endpoint) = self.model.endpoint {
            if !is_http_url(endpoint) {
                return Err(format!(
                    "model.endpoint must be an http(s) URL, got '{endpoint}'"
                ));
            }
        }

        if let Some(ref name) = self.model.name {
            if name.trim().is_empty() {
                return Err("model.name must not be empty".to_string());
            }
        }

        Ok(())
    }

    /// Reset values that fail validation so defaults apply.
    fn drop_invalid(&mut self) {
        if self
            .output
            .format
            .as_deref()
            .is_some_and(|f| f != "text" && f != "json")
        {
            self.output.format = None;
        }
        if self.model.endpoint.as_deref().is_some_and(|e| !is_http_url(e)) {
            self.model.endpoint = None;
        }
        if self.model.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            self.model.name = None;
        }
    }

    /// Merge another config into this one.
    /// Values from `other` override values in `self` when present.
    fn merge(&mut self, other: Self) {
        // Model
        self.model.name = other.model.name.or_else(|| self.model.name.take());
        self.model.endpoint = other.model.endpoint.or_else(|| self.model.endpoint.take());
        self.model.api_key = other.model.api_key.or_else(|| self.model.api_key.take());

        // Evaluation
        self.evaluation.strict = other.evaluation.strict.or(self.evaluation.strict);
        self.evaluation.key_file = other
            .evaluation
            .key_file
            .or_else(|| self.evaluation.key_file.take());

        // Output
        self.output.format = other.output.format.or_else(|| self.output.format.take());
        self.output.pretty = other.output.pretty.or(self.output.pretty);
        self.output.answers = other.output.answers.or(self.output.answers);
        self.output.progress = other.output.progress.or(self.output.progress);
    }
}

fn is_http_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Get the XDG config file path.
fn xdg_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("omr-eval").join("config.toml"))
}

/// Find project-local config by searching up from current directory.
fn find_project_config() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    find_config_in_parents(&cwd)
}

/// Search for `.omr-eval.toml` in the given directory and its parents.
fn find_config_in_parents(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);

    while let Some(dir) = current {
        let config_path = dir.join(".omr-eval.toml");
        if config_path.exists() {
            return Some(config_path);
        }
        current = dir.parent();
    }

    None
}

/// Load and parse a TOML config file.
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("Failed to read config file {}: {}", path.display(), e);
            return None;
        }
    };

    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!("Failed to parse config file {}: {}", path.display(), e);
            None
        }
    }
}

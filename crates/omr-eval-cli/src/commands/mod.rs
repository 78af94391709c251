//! CLI command definitions and handlers.

pub mod args;
pub mod evaluate;
pub mod interactive;
pub mod prompt;

use clap::{Parser, Subcommand};

/// OMR Eval - Score multiple-choice answer sheets with a multimodal model
#[derive(Parser)]
#[command(name = "omr-eval")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Shared evaluate arguments (image, key, model, output).
    #[command(flatten)]
    pub evaluate: evaluate::EvaluateArgs,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Evaluate one answer sheet against an answer key
    Evaluate(evaluate::EvaluateArgs),
    /// Fill in the form line by line and evaluate repeatedly
    Interactive(interactive::InteractiveArgs),
    /// Print the instruction sent to the model
    Prompt(prompt::PromptArgs),
}

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// The sheet was scored.
    Success = 0,
    /// The evaluation ran and failed.
    EvaluationFailed = 1,
    /// Bad input, configuration or credentials.
    Error = 2,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        Self::from(code as u8)
    }
}

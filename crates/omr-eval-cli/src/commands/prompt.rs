//! Prompt command - show what would be sent to the model.

use anyhow::Result;
use clap::Args;
use omr_eval_core::request::{instruction, response_schema};

use super::args::KeyArgs;
use crate::config::AppConfig;

/// Arguments for the prompt command
#[derive(Args, Clone, Debug, Default)]
pub struct PromptArgs {
    #[command(flatten)]
    pub keys: KeyArgs,

    /// Print the response schema instead of the instruction
    #[arg(long)]
    pub schema: bool,
}

impl PromptArgs {
    /// Apply configuration file values, respecting CLI precedence.
    #[must_use]
    pub fn with_config(self, config: &AppConfig) -> Self {
        Self {
            keys: self.keys.with_config(config),
            schema: self.schema,
        }
    }
}

/// Run the prompt command.
///
/// # Errors
///
/// Fails if the key cannot be read or none was given.
pub fn run(args: &PromptArgs) -> Result<()> {
    println!("{}", render(args)?);
    Ok(())
}

fn render(args: &PromptArgs) -> Result<String> {
    if args.schema {
        return Ok(serde_json::to_string_pretty(&response_schema())?);
    }

    let key = args.keys.resolve()?;
    if !key.is_present() {
        anyhow::bail!("No answer key given. Use --key, --key-file or --sample-key.");
    }
    Ok(instruction(&key))
}

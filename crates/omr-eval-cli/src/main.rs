//! OMR Eval CLI - Score multiple-choice answer sheets with a multimodal model.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;

use commands::{Cli, Commands, ExitCode};
use config::AppConfig;

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = AppConfig::load();

    let exit_code = match cli.command {
        Some(Commands::Evaluate(args)) => {
            finish(commands::evaluate::run(&args.with_config(&config)).await)
        }
        Some(Commands::Interactive(args)) => finish(
            commands::interactive::run(&args.with_config(&config))
                .await
                .map(|()| ExitCode::Success),
        ),
        Some(Commands::Prompt(args)) => finish(
            commands::prompt::run(&args.with_config(&config)).map(|()| ExitCode::Success),
        ),
        // Default behavior: evaluate with flattened args
        None => finish(commands::evaluate::run(&cli.evaluate.with_config(&config)).await),
    };

    exit_code.into()
}

fn finish(result: anyhow::Result<ExitCode>) -> ExitCode {
    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::Error
        }
    }
}

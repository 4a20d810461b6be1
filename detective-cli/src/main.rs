use anyhow::Result;
use clap::Parser;
use detective_core::{DetectiveConfig, console};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Cli::parse();
    let config = DetectiveConfig::from_env();

    if let Err(error) = init_tracing(args.verbose || config.verbose) {
        console::error(&format!("{error:#}"));
        return ExitCode::FAILURE;
    }
    debug!(?config, "configuration loaded");

    let outcome = match args.command {
        Command::Analyze(analyze) => commands::analyze::run(analyze, &config).await,
        Command::Why(why) => commands::why::run(why),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            console::error(&format!("{error:#}"));
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) -> Result<()> {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!(error))
}

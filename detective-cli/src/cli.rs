use crate::commands;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "module-detective",
    about = "find out what is really inside node_modules",
    version,
    color = clap::ColorChoice::Auto
)]
pub struct Cli {
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyse the installed tree and write a report
    Analyze(commands::analyze::AnalyzeArgs),
    /// Show where and why a package is installed
    Why(commands::why::WhyArgs),
}

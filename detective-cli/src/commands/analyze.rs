use anyhow::Result;
use clap::Args;
use detective_core::suggestions::Suggestion;
use detective_core::{DetectiveConfig, Project, console, operations};
use std::env;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Project directory (defaults to the current directory)
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// Where report.json is written (defaults to <path>/report)
    #[arg(long = "output-dir")]
    pub output_dir: Option<PathBuf>,

    /// Only analyse packages matching this pattern (supports `*`)
    #[arg(long = "find")]
    pub find: Vec<String>,

    /// Actions printed per suggestion
    #[arg(long, default_value_t = 20)]
    pub depth: usize,

    /// Print suggestions without writing the report
    #[arg(long = "no-write")]
    pub no_write: bool,
}

pub async fn run(args: AnalyzeArgs, config: &DetectiveConfig) -> Result<()> {
    console::header("analyze", env!("CARGO_PKG_VERSION"));

    let start = match args.path {
        Some(path) => path,
        None => env::current_dir()?,
    };
    let project = Project::discover(&start)?;

    console::step(&format!("Analysing {}", project.label()));
    if config.offline {
        console::warn("offline, latest versions will not be looked up");
    }

    let options = operations::AnalyzeOptions { find: args.find };
    let report = operations::analyze(config, &project, options).await?;
    console::step_with_count("Packages analysed", report.dependencies.len());

    for suggestion in &report.suggestions {
        print_suggestion(suggestion, args.depth);
    }

    if args.no_write {
        return Ok(());
    }

    let output_dir = args
        .output_dir
        .unwrap_or_else(|| project.root.join("report"));
    let path = operations::write_report(&report, &output_dir)?;
    console::succeed(&format!("Report written to {}", path.display()));

    Ok(())
}

fn print_suggestion(suggestion: &Suggestion, depth: usize) {
    println!();
    println!("{}", console::bold(&suggestion.name));
    println!("{}", suggestion.message);

    for action in suggestion.actions.iter().take(depth) {
        println!("  - {}", action.message);
    }

    let hidden = suggestion.actions.len().saturating_sub(depth);
    if hidden > 0 {
        println!("{}", console::dim(&format!("  ... and {} more", hidden)));
    }
}

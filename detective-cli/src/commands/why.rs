use anyhow::Result;
use clap::Args;
use detective_core::{Project, console, operations};
use std::env;

#[derive(Args, Debug)]
pub struct WhyArgs {
    /// Package names or patterns (supports `*`)
    #[arg(required = true)]
    pub packages: Vec<String>,

    /// Output JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: WhyArgs) -> Result<()> {
    if !args.json {
        console::header("why", env!("CARGO_PKG_VERSION"));
    }

    let cwd = env::current_dir()?;
    let project = Project::discover(&cwd)?;
    let result = operations::why(&project, &args.packages)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if result.matches.is_empty() {
        console::info(&format!(
            "No installs found for '{}'.",
            args.packages.join("', '")
        ));
        return Ok(());
    }

    for (idx, matched) in result.matches.iter().enumerate() {
        if idx > 0 {
            println!();
        }

        let link = if matched.is_link { " (linked)" } else { "" };
        println!("{}@{}{}", matched.name, matched.version, link);
        println!("  {}", console::dim(&matched.location));
        println!("  {}", matched.breadcrumb);

        for dependent in &matched.dependents {
            let label = if dependent.is_empty() { "root" } else { dependent };
            println!("    <- {}", label);
        }
    }

    Ok(())
}

use crate::disk::SizeScanner;
use crate::graph::loader;
use crate::registry::{LatestVersionResolver, NpmOutdated};
use crate::report::{self, Report, ReportOptions};
use crate::{DetectiveConfig, DetectiveError, Project, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

pub const REPORT_FILE: &str = "report.json";

#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    /// Package name patterns (`*` wildcards); empty analyses everything.
    pub find: Vec<String>,
}

pub async fn analyze(
    config: &DetectiveConfig,
    project: &Project,
    options: AnalyzeOptions,
) -> Result<Report> {
    let graph = Arc::new(loader::load(project)?);
    info!(
        project = %project.label(),
        packages = graph.package_count(),
        "loaded installed tree"
    );

    let scanner = Arc::new(SizeScanner::new(config.scan_concurrency)?);
    let report_options = ReportOptions {
        find: options.find,
        artifact_dirs: config.artifact_dirs.clone(),
    };

    if config.offline {
        debug!("offline, skipping the registry query");
        return report::generate::<NpmOutdated>(graph, scanner, None, report_options).await;
    }

    let resolver = LatestVersionResolver::new(NpmOutdated::new(config.npm_command.clone()))
        .with_npmrc(project.root.join(".npmrc"));

    report::generate(graph, scanner, Some(&resolver), report_options).await
}

/// Writes `report.json` into `output_dir`, creating it when needed.
pub fn write_report(report: &Report, output_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(output_dir).map_err(|source| DetectiveError::WriteFile {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let path = output_dir.join(REPORT_FILE);
    let data =
        serde_json::to_string_pretty(report).map_err(|error| DetectiveError::SerializeJson {
            path: path.clone(),
            reason: error.to_string(),
        })?;

    fs::write(&path, data).map_err(|source| DetectiveError::WriteFile {
        path: path.clone(),
        source,
    })?;

    Ok(path)
}

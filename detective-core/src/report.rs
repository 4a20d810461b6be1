//! Final assembly: sizes, latest versions and suggestion passes folded
//! into one self-contained [`Report`].

use crate::disk::{ScanJob, SizeScanner};
use crate::graph::{Breadcrumb, DependencyGraph, NodeId};
use crate::project::Manifest;
use crate::registry::{LatestVersionMap, LatestVersionResolver, RegistryQuery};
use crate::suggestions::{self, AnalysisContext, Suggestion};
use crate::{DetectiveError, Result};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyView {
    pub breadcrumb: Breadcrumb,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub funding: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    pub location: String,
    pub name: String,
    pub version: String,
    pub size: u64,
    pub is_link: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub latest_packages: LatestVersionMap,
    pub root_manifest: Manifest,
    pub dependencies: Vec<(String, DependencyView)>,
    pub suggestions: Vec<Suggestion>,
}

impl Report {
    pub fn suggestion(&self, id: &str) -> Option<&Suggestion> {
        self.suggestions.iter().find(|suggestion| suggestion.id == id)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    pub find: Vec<String>,
    pub artifact_dirs: Vec<String>,
}

/// Own footprint of every node, indexed by node id. The root and linked
/// installs count as zero.
pub fn node_sizes(graph: &DependencyGraph, scanner: &SizeScanner) -> Vec<u64> {
    let measured: Vec<NodeId> = graph
        .packages()
        .filter(|id| !graph.node(*id).is_link)
        .collect();
    let jobs: Vec<ScanJob> = measured
        .iter()
        .map(|id| ScanJob::package(&graph.node(*id).path))
        .collect();

    let started = Instant::now();
    let results = scanner.size_all(&jobs);
    debug!(
        packages = jobs.len(),
        workers = scanner.workers(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "measured package sizes"
    );

    let mut sizes = vec![0u64; graph.package_count() + 1];
    for (id, bytes) in measured.iter().zip(results) {
        sizes[id.index()] = bytes;
    }
    sizes
}

/// Runs every pass over already collected inputs.
pub fn assemble(
    graph: &DependencyGraph,
    sizes: &[u64],
    latest: LatestVersionMap,
    scanner: &SizeScanner,
    options: &ReportOptions,
) -> Report {
    let selection = graph.select(&options.find);
    let ctx = AnalysisContext::new(
        graph,
        selection,
        sizes,
        &latest,
        scanner,
        &options.artifact_dirs,
    );

    let dependencies = ctx
        .nodes()
        .map(|(id, node)| {
            let view = DependencyView {
                breadcrumb: ctx.breadcrumb(id).clone(),
                funding: node.manifest.funding_url(),
                homepage: node.manifest.homepage.clone(),
                location: node.location.clone(),
                name: node.name.clone(),
                version: node.version.clone(),
                size: ctx.size(id),
                is_link: node.is_link,
            };
            (node.location.clone(), view)
        })
        .collect();

    let suggestions = suggestions::run_all(&ctx);

    Report {
        latest_packages: latest,
        root_manifest: graph.root().manifest.clone(),
        dependencies,
        suggestions,
    }
}

/// Sizes are scanned on the worker pool while the registry is queried.
/// Without a resolver every freshness result is unknown.
pub async fn generate<Q: RegistryQuery>(
    graph: Arc<DependencyGraph>,
    scanner: Arc<SizeScanner>,
    resolver: Option<&LatestVersionResolver<Q>>,
    options: ReportOptions,
) -> Result<Report> {
    let scan = {
        let graph = Arc::clone(&graph);
        let scanner = Arc::clone(&scanner);
        tokio::task::spawn_blocking(move || node_sizes(&graph, &scanner))
    };

    let latest = match resolver {
        Some(resolver) => resolver.resolve(&graph.registry_names()).await,
        None => LatestVersionMap::new(),
    };

    let sizes = scan.await.map_err(|error| DetectiveError::Task {
        reason: error.to_string(),
    })?;

    tokio::task::spawn_blocking(move || assemble(&graph, &sizes, latest, &scanner, &options))
        .await
        .map_err(|error| DetectiveError::Task {
            reason: error.to_string(),
        })
}

use crate::graph::{Breadcrumb, DependencyGraph, loader, matches_pattern};
use crate::{Project, Result};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct WhyResult {
    pub matches: Vec<WhyMatch>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WhyMatch {
    pub name: String,
    pub version: String,
    pub location: String,
    pub breadcrumb: Breadcrumb,
    /// Locations of the installs requiring this one; `""` is the project.
    pub dependents: Vec<String>,
    pub is_link: bool,
}

pub fn why(project: &Project, patterns: &[String]) -> Result<WhyResult> {
    let graph = loader::load(project)?;
    Ok(lineage(&graph, patterns))
}

fn lineage(graph: &DependencyGraph, patterns: &[String]) -> WhyResult {
    let mut matches: Vec<WhyMatch> = graph
        .packages()
        .filter(|id| {
            let name = &graph.node(*id).name;
            patterns.iter().any(|pattern| matches_pattern(name, pattern))
        })
        .map(|id| {
            let node = graph.node(id);
            WhyMatch {
                name: node.name.clone(),
                version: node.version.clone(),
                location: node.location.clone(),
                breadcrumb: graph.breadcrumb(id),
                dependents: node
                    .edges_in()
                    .iter()
                    .map(|parent| graph.node(*parent).location.clone())
                    .collect(),
                is_link: node.is_link,
            }
        })
        .collect();

    matches.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.location.cmp(&b.location)));

    WhyResult { matches }
}

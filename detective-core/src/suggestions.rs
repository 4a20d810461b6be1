//! Analysis passes that turn the graph into actionable findings.
//!
//! Every pass reads an [`AnalysisContext`] and returns one [`Suggestion`].
//! Passes share nothing mutable, so their order only matters for the order
//! of the report.

use crate::disk::SizeScanner;
use crate::graph::{Breadcrumb, DependencyGraph, NodeId, PackageNode};
use crate::registry::LatestVersionMap;
use serde::Serialize;

mod extra_artifacts;
mod nested_freshness;
mod not_absorbed;
mod pinned_versions;
mod top_level_freshness;

pub use extra_artifacts::packages_with_extra_artifacts;
pub use nested_freshness::nested_dependency_freshness;
pub use not_absorbed::not_being_absorbed_by_top_level;
pub use pinned_versions::packages_with_pinned_versions;
pub use top_level_freshness::top_level_deps_freshness;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionMeta {
    pub name: String,
    pub directory: String,
    pub breadcrumb: Breadcrumb,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Action {
    pub message: String,
    pub meta: ActionMeta,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub id: String,
    pub name: String,
    pub message: String,
    pub actions: Vec<Action>,
}

impl Suggestion {
    pub fn new(
        id: &str,
        name: &str,
        message: impl Into<String>,
        actions: Vec<Action>,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            message: message.into(),
            actions,
        }
    }
}

/// Bytes across every sized action.
pub fn total_size(actions: &[Action]) -> u64 {
    actions.iter().filter_map(|action| action.meta.size).sum()
}

/// Largest first; actions without a size go last, ties keep their order.
pub fn sort_by_size(actions: &mut [Action]) {
    actions.sort_by(|a, b| b.meta.size.cmp(&a.meta.size));
}

/// Everything a pass may read.
pub struct AnalysisContext<'a> {
    pub graph: &'a DependencyGraph,
    pub latest: &'a LatestVersionMap,
    pub scanner: &'a SizeScanner,
    pub artifact_dirs: &'a [String],
    selection: Vec<NodeId>,
    selected: Vec<bool>,
    breadcrumbs: Vec<Breadcrumb>,
    sizes: &'a [u64],
}

impl<'a> AnalysisContext<'a> {
    /// `sizes` holds every node's own footprint, indexed by node id.
    pub fn new(
        graph: &'a DependencyGraph,
        selection: Vec<NodeId>,
        sizes: &'a [u64],
        latest: &'a LatestVersionMap,
        scanner: &'a SizeScanner,
        artifact_dirs: &'a [String],
    ) -> Self {
        let breadcrumbs = graph.breadcrumbs();
        let mut selected = vec![false; breadcrumbs.len()];
        for id in &selection {
            selected[id.index()] = true;
        }

        Self {
            graph,
            latest,
            scanner,
            artifact_dirs,
            selection,
            selected,
            breadcrumbs,
            sizes,
        }
    }

    /// Nodes under analysis, in enumeration order.
    pub fn selection(&self) -> &[NodeId] {
        &self.selection
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &'a PackageNode)> + '_ {
        let graph = self.graph;
        self.selection.iter().map(move |id| (*id, graph.node(*id)))
    }

    /// Whether a package filter left some installs out.
    pub fn is_filtered(&self) -> bool {
        self.selection.len() < self.graph.package_count()
    }

    pub fn is_selected(&self, id: NodeId) -> bool {
        self.selected.get(id.index()).copied().unwrap_or(false)
    }

    pub fn breadcrumb(&self, id: NodeId) -> &Breadcrumb {
        &self.breadcrumbs[id.index()]
    }

    pub fn size(&self, id: NodeId) -> u64 {
        self.sizes.get(id.index()).copied().unwrap_or(0)
    }

    pub fn latest(&self, name: &str) -> Option<&'a str> {
        self.latest.get(name).map(String::as_str)
    }
}

/// All passes in report order.
pub fn run_all(ctx: &AnalysisContext<'_>) -> Vec<Suggestion> {
    vec![
        packages_with_pinned_versions(ctx),
        packages_with_extra_artifacts(ctx),
        not_being_absorbed_by_top_level(ctx),
        nested_dependency_freshness(ctx),
        top_level_deps_freshness(ctx),
    ]
}


#[cfg(test)]
mod tests {
    use super::*;

    fn action(name: &str, size: Option<u64>) -> Action {
        Action {
            message: name.to_string(),
            meta: ActionMeta {
                name: name.to_string(),
                directory: String::new(),
                breadcrumb: Breadcrumb::default(),
                size,
            },
        }
    }

    #[test]
    fn sorts_largest_first_and_keeps_ties_stable() {
        let mut actions = vec![
            action("small", Some(1)),
            action("none", None),
            action("big-a", Some(10)),
            action("big-b", Some(10)),
        ];
        sort_by_size(&mut actions);

        let names: Vec<_> = actions.iter().map(|a| a.meta.name.as_str()).collect();
        assert_eq!(names, ["big-a", "big-b", "small", "none"]);
        assert_eq!(total_size(&actions), 21);
    }

    #[test]
    fn meta_omits_missing_size() {
        let json = serde_json::to_value(action("x", None)).unwrap();
        assert!(json["meta"].get("size").is_none());
        assert_eq!(json["meta"]["breadcrumb"], "");
    }
}

//! In-memory model of an installed dependency tree.
//!
//! Nodes live in an arena owned by [`DependencyGraph`]; edges are
//! [`NodeId`] indices into it, so cyclic installs need no shared ownership
//! and the graph stays read-only once built.

use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

mod breadcrumb;
pub mod loader;
mod types;

pub use types::{BREADCRUMB_DELIMITER, Breadcrumb, NodeId, PackageNode};

#[derive(Debug, Clone)]
pub struct DependencyGraph {
    nodes: Vec<PackageNode>,
    by_location: BTreeMap<String, NodeId>,
}

impl DependencyGraph {
    pub fn root_id(&self) -> NodeId {
        NodeId(0)
    }

    pub fn root(&self) -> &PackageNode {
        &self.nodes[0]
    }

    pub fn node(&self, id: NodeId) -> &PackageNode {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&PackageNode> {
        self.nodes.get(id.0)
    }

    pub fn by_location(&self, location: &str) -> Option<NodeId> {
        self.by_location.get(location).copied()
    }

    /// The install at `node_modules/<name>`, if any.
    pub fn top_level(&self, name: &str) -> Option<NodeId> {
        self.by_location(&format!("node_modules/{name}"))
    }

    /// Every install except the root, in enumeration order.
    pub fn packages(&self) -> impl Iterator<Item = NodeId> + '_ {
        (1..self.nodes.len()).map(NodeId)
    }

    pub fn package_count(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    pub fn breadcrumb(&self, id: NodeId) -> Breadcrumb {
        breadcrumb::resolve(self, id)
    }

    /// Breadcrumbs for every node, indexed by [`NodeId::index`].
    pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
        (0..self.nodes.len())
            .map(|index| self.breadcrumb(NodeId(index)))
            .collect()
    }

    /// Distinct names worth asking the registry about.
    pub fn registry_names(&self) -> BTreeSet<String> {
        self.packages()
            .map(|id| self.node(id))
            .filter(|node| node.is_registry_package())
            .map(|node| node.name.clone())
            .collect()
    }

    /// Packages whose name matches any pattern; all of them when
    /// `patterns` is empty.
    pub fn select(&self, patterns: &[String]) -> Vec<NodeId> {
        self.packages()
            .filter(|id| {
                patterns.is_empty()
                    || patterns
                        .iter()
                        .any(|pattern| matches_pattern(&self.node(*id).name, pattern))
            })
            .collect()
    }
}

/// Assembles a [`DependencyGraph`]. The root is always [`NodeId`] 0.
#[derive(Debug)]
pub struct GraphBuilder {
    nodes: Vec<PackageNode>,
    by_location: BTreeMap<String, NodeId>,
}

impl GraphBuilder {
    pub fn new(root: PackageNode) -> Self {
        let mut by_location = BTreeMap::new();
        by_location.insert(root.location.clone(), NodeId(0));

        Self {
            nodes: vec![root],
            by_location,
        }
    }

    pub fn root_id(&self) -> NodeId {
        NodeId(0)
    }

    /// Adds a node. A location already present keeps its first node.
    pub fn add(&mut self, node: PackageNode) -> NodeId {
        if let Some(existing) = self.by_location.get(&node.location) {
            warn!(location = %node.location, "duplicate install location ignored");
            return *existing;
        }

        let id = NodeId(self.nodes.len());
        self.by_location.insert(node.location.clone(), id);
        self.nodes.push(node);
        id
    }

    pub fn by_location(&self, location: &str) -> Option<NodeId> {
        self.by_location.get(location).copied()
    }

    pub fn node(&self, id: NodeId) -> &PackageNode {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Records that `from` resolves its dependency `name` to `to`.
    pub fn link(&mut self, from: NodeId, name: &str, to: NodeId) {
        self.nodes[from.0].edges_out.insert(name.to_string(), to);

        let edges_in = &mut self.nodes[to.0].edges_in;
        if !edges_in.contains(&from) {
            edges_in.push(from);
        }
    }

    pub fn build(self) -> DependencyGraph {
        DependencyGraph {
            nodes: self.nodes,
            by_location: self.by_location,
        }
    }
}

/// `*` wildcard match over package names, e.g. `@types/*` or `*-loader`.
pub fn matches_pattern(name: &str, pattern: &str) -> bool {
    let mut segments = pattern.split('*');
    let head = segments.next().unwrap_or_default();
    let Some(mut rest) = name.strip_prefix(head) else {
        return false;
    };

    let segments: Vec<&str> = segments.collect();
    let Some((tail, middle)) = segments.split_last() else {
        return rest.is_empty();
    };

    for segment in middle {
        match rest.find(segment) {
            Some(at) => rest = &rest[at + segment.len()..],
            None => return false,
        }
    }

    rest.ends_with(tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(location: &str, name: &str, version: &str) -> PackageNode {
        PackageNode::new(
            location,
            name,
            version,
            format!("/project/{location}"),
        )
    }

    fn fixture() -> DependencyGraph {
        let mut builder = GraphBuilder::new(node("", "app", "0.0.0"));
        let root = builder.root_id();
        let react = builder.add(node("node_modules/react", "react", "18.2.0"));
        let types = builder.add(node("node_modules/@types/react", "@types/react", "18.0.0"));
        let nested = builder.add(node(
            "node_modules/react/node_modules/loose-envify",
            "loose-envify",
            "1.4.0",
        ));
        let linked = builder.add(
            node("node_modules/local-lib", "local-lib", "0.1.0").linked_to("/project/packages/lib"),
        );
        builder.link(root, "react", react);
        builder.link(root, "@types/react", types);
        builder.link(react, "loose-envify", nested);
        builder.link(root, "local-lib", linked);
        builder.build()
    }

    #[test]
    fn enumerates_packages_without_root() {
        let graph = fixture();
        let names: Vec<_> = graph.packages().map(|id| graph.node(id).name.as_str()).collect();

        assert_eq!(names, ["react", "@types/react", "loose-envify", "local-lib"]);
        assert_eq!(graph.package_count(), 4);
        assert_eq!(graph.root().location, "");
    }

    #[test]
    fn finds_top_level_installs() {
        let graph = fixture();
        let react = graph.top_level("react").unwrap();

        assert!(graph.node(react).is_top_level());
        assert!(graph.top_level("loose-envify").is_none());
        assert!(graph.top_level("@types/react").is_some());
    }

    #[test]
    fn registry_names_skip_links() {
        let graph = fixture();
        let names: Vec<_> = graph.registry_names().into_iter().collect();

        assert_eq!(names, ["@types/react", "loose-envify", "react"]);
    }

    #[test]
    fn duplicate_location_keeps_first_node() {
        let mut builder = GraphBuilder::new(node("", "app", "0.0.0"));
        let first = builder.add(node("node_modules/a", "a", "1.0.0"));
        let second = builder.add(node("node_modules/a", "a", "2.0.0"));

        assert_eq!(first, second);
        assert_eq!(builder.node(first).version, "1.0.0");
        assert_eq!(builder.len(), 2);
    }

    #[test]
    fn link_records_both_directions_once() {
        let mut builder = GraphBuilder::new(node("", "app", "0.0.0"));
        let root = builder.root_id();
        let a = builder.add(node("node_modules/a", "a", "1.0.0"));
        builder.link(root, "a", a);
        builder.link(root, "a", a);
        let graph = builder.build();

        assert_eq!(graph.node(a).edges_in(), [root]);
        assert_eq!(graph.root().edges_out().get("a"), Some(&a));
    }

    #[test]
    fn select_filters_by_pattern() {
        let graph = fixture();
        let selected: Vec<_> = graph
            .select(&["@types/*".to_string(), "loose-envify".to_string()])
            .into_iter()
            .map(|id| graph.node(id).name.clone())
            .collect();

        assert_eq!(selected, ["@types/react", "loose-envify"]);
        assert_eq!(graph.select(&[]).len(), 4);
    }

    #[test]
    fn wildcard_matching_supports_star() {
        assert!(matches_pattern("@types/react", "@types/*"));
        assert!(matches_pattern("left-pad", "*pad"));
        assert!(matches_pattern("left-pad", "left*"));
        assert!(!matches_pattern("react", "@types/*"));
        assert!(matches_pattern("react", "react"));
        assert!(!matches_pattern("react-dom", "react"));
        assert!(matches_pattern("babel-plugin-foo-loader", "babel-*-loader"));
        assert!(matches_pattern("anything", "*"));
        assert!(!matches_pattern("ab", "ab*b"));
    }
}

use crate::project::Manifest;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Index of a node in its [`DependencyGraph`](super::DependencyGraph).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// One package install location.
#[derive(Clone, Debug)]
pub struct PackageNode {
    pub location: String,
    pub name: String,
    pub version: String,
    pub path: PathBuf,
    pub realpath: PathBuf,
    pub is_link: bool,
    pub manifest: Manifest,
    pub(crate) edges_in: Vec<NodeId>,
    pub(crate) edges_out: BTreeMap<String, NodeId>,
}

impl PackageNode {
    pub fn new(
        location: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
        path: impl Into<PathBuf>,
    ) -> Self {
        let path = path.into();
        Self {
            location: location.into(),
            name: name.into(),
            version: version.into(),
            realpath: path.clone(),
            path,
            is_link: false,
            manifest: Manifest::default(),
            edges_in: Vec::new(),
            edges_out: BTreeMap::new(),
        }
    }

    pub fn with_manifest(mut self, manifest: Manifest) -> Self {
        self.manifest = manifest;
        self
    }

    pub fn linked_to(mut self, realpath: impl Into<PathBuf>) -> Self {
        self.is_link = true;
        self.realpath = realpath.into();
        self
    }

    /// Dependents of this install, first one is the representative parent.
    pub fn edges_in(&self) -> &[NodeId] {
        &self.edges_in
    }

    pub fn edges_out(&self) -> &BTreeMap<String, NodeId> {
        &self.edges_out
    }

    pub fn dependency_ranges(&self) -> &BTreeMap<String, String> {
        &self.manifest.dependencies
    }

    pub fn is_top_level(&self) -> bool {
        self.location
            .strip_prefix("node_modules/")
            .is_some_and(|rest| rest == self.name)
    }

    /// Whether the registry can be asked about this package. Linked installs
    /// and packages living outside any `node_modules` are workspace or
    /// private code.
    pub fn is_registry_package(&self) -> bool {
        !self.is_link
            && self
                .realpath
                .components()
                .any(|component| component.as_os_str() == "node_modules")
    }
}

/// Names from the root's direct dependency down to a node.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Breadcrumb(Vec<String>);

pub const BREADCRUMB_DELIMITER: &str = "#";

impl Breadcrumb {
    pub fn new(names: Vec<String>) -> Self {
        Self(names)
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn key(&self) -> String {
        self.0.join(BREADCRUMB_DELIMITER)
    }
}

impl fmt::Display for Breadcrumb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

impl Serialize for Breadcrumb {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.key())
    }
}

//! Builds a [`DependencyGraph`] from the `node_modules` tree on disk.

use super::{DependencyGraph, GraphBuilder, NodeId, PackageNode};
use crate::project::Manifest;
use crate::{DetectiveError, Project, Result};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

pub fn load(project: &Project) -> Result<DependencyGraph> {
    let root = PackageNode::new(
        "",
        project.label(),
        project.manifest.version.clone().unwrap_or_default(),
        &project.root,
    )
    .with_manifest(project.manifest.clone());

    let mut builder = GraphBuilder::new(root);

    let node_modules = project.node_modules();
    if node_modules.is_dir() {
        collect(&mut builder, &node_modules, "node_modules")?;
    } else {
        debug!(path = %node_modules.display(), "no node_modules directory");
    }

    link_edges(&mut builder);

    Ok(builder.build())
}

fn collect(builder: &mut GraphBuilder, dir: &Path, prefix: &str) -> Result<()> {
    for (rel_name, path) in package_dirs(dir)? {
        let location = format!("{prefix}/{rel_name}");

        let Some(node) = read_package(&path, &rel_name, &location) else {
            continue;
        };

        let is_link = node.is_link;
        builder.add(node);

        if is_link {
            continue;
        }

        let nested = path.join("node_modules");
        if nested.is_dir()
            && let Err(error) = collect(builder, &nested, &format!("{location}/node_modules"))
        {
            debug!(path = %nested.display(), %error, "skipping nested node_modules");
        }
    }

    Ok(())
}

/// Candidate package directories in `dir`, sorted, with `@scope/` folders
/// expanded.
fn package_dirs(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut found = Vec::new();

    for (name, path) in sorted_entries(dir)? {
        if name.starts_with('.') {
            continue;
        }

        if name.starts_with('@') && path.is_dir() {
            match sorted_entries(&path) {
                Ok(scoped) => {
                    for (child, child_path) in scoped {
                        if !child.starts_with('.') {
                            found.push((format!("{name}/{child}"), child_path));
                        }
                    }
                }
                Err(error) => debug!(path = %path.display(), %error, "cannot read scope"),
            }
            continue;
        }

        found.push((name, path));
    }

    Ok(found)
}

fn sorted_entries(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let entries = fs::read_dir(dir).map_err(|source| DetectiveError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut out: Vec<(String, PathBuf)> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| (entry.file_name().to_string_lossy().into_owned(), entry.path()))
        .collect();
    out.sort();

    Ok(out)
}

fn read_package(path: &Path, rel_name: &str, location: &str) -> Option<PackageNode> {
    let is_link = fs::symlink_metadata(path)
        .map(|metadata| metadata.file_type().is_symlink())
        .unwrap_or(false);

    let manifest_path = path.join("package.json");
    if !manifest_path.is_file() {
        trace!(path = %path.display(), "not a package");
        return None;
    }

    let manifest = match Manifest::read(&manifest_path) {
        Ok(manifest) => manifest,
        Err(error) => {
            debug!(%location, %error, "skipping package with unreadable manifest");
            return None;
        }
    };

    let name = manifest
        .name
        .clone()
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| rel_name.to_string());
    let version = manifest.version.clone().unwrap_or_default();
    let realpath = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());

    let mut node = PackageNode::new(location, name, version, path).with_manifest(manifest);
    node.realpath = realpath.clone();
    if is_link {
        node = node.linked_to(realpath);
    }

    Some(node)
}

fn link_edges(builder: &mut GraphBuilder) {
    let mut edges: Vec<(NodeId, String, NodeId)> = Vec::new();

    for index in 0..builder.len() {
        let from = NodeId(index);
        let node = builder.node(from);

        for name in declared_names(node, from == builder.root_id()) {
            match resolve_dependency(builder, &node.location, &name) {
                Some(to) => edges.push((from, name, to)),
                None => trace!(from = %node.location, dependency = %name, "unresolved dependency"),
            }
        }
    }

    for (from, name, to) in edges {
        builder.link(from, &name, to);
    }
}

fn declared_names(node: &PackageNode, is_root: bool) -> BTreeSet<String> {
    let manifest = &node.manifest;
    let mut names: BTreeSet<String> = manifest
        .dependencies
        .keys()
        .chain(manifest.optional_dependencies.keys())
        .chain(manifest.peer_dependencies.keys())
        .cloned()
        .collect();

    if is_root {
        names.extend(manifest.dev_dependencies.keys().cloned());
    }

    names
}

/// Node's lookup rule: the closest `node_modules/<name>` from `location`
/// up to the project root.
fn resolve_dependency(builder: &GraphBuilder, location: &str, name: &str) -> Option<NodeId> {
    let mut base = location.to_string();

    loop {
        let candidate = if base.is_empty() {
            format!("node_modules/{name}")
        } else {
            format!("{base}/node_modules/{name}")
        };

        if let Some(id) = builder.by_location(&candidate) {
            return Some(id);
        }

        if base.is_empty() {
            return None;
        }

        base = parent_location(&base);
    }
}

fn parent_location(location: &str) -> String {
    match location.rfind("/node_modules/") {
        Some(idx) => location[..idx].to_string(),
        None => String::new(),
    }
}

use super::{Action, ActionMeta, AnalysisContext, Suggestion, sort_by_size, total_size};
use crate::console::format_bytes;
use crate::disk::{Exclude, ScanJob};
use crate::graph::NodeId;
use std::collections::BTreeSet;

/// Packages that ship folders like `docs/` or `tests/` which are never
/// needed at runtime. The size reported is the package measured without
/// that folder.
pub fn packages_with_extra_artifacts(ctx: &AnalysisContext<'_>) -> Suggestion {
    let mut found: Vec<(NodeId, &str)> = Vec::new();
    let mut jobs = Vec::new();

    for (id, node) in ctx.nodes() {
        if node.is_link {
            continue;
        }

        for artifact in ctx.artifact_dirs {
            let artifact_path = node.path.join(artifact);
            if artifact_path.is_dir() {
                found.push((id, artifact.as_str()));
                jobs.push(ScanJob::new(&node.path, Exclude::path(artifact_path)));
            }
        }
    }

    let sizes = ctx.scanner.size_all(&jobs);

    let mut actions: Vec<Action> = found
        .into_iter()
        .zip(sizes)
        .map(|((id, artifact), size)| {
            let node = ctx.graph.node(id);
            let breadcrumb = ctx.breadcrumb(id).clone();

            Action {
                message: format!(
                    "\"{}\" ({}) has a \"{}\" folder which is not necessary for production usage {}.",
                    node.name,
                    breadcrumb,
                    artifact,
                    format_bytes(size)
                ),
                meta: ActionMeta {
                    name: node.name.clone(),
                    directory: node.location.clone(),
                    breadcrumb,
                    size: Some(size),
                },
            }
        })
        .collect();

    sort_by_size(&mut actions);

    let packages: BTreeSet<&str> = actions.iter().map(|a| a.meta.name.as_str()).collect();
    let total = total_size(&actions);
    let message = format!(
        "There are currently {} packages with artifacts that are superfluous and are not necessary for production usage. {}",
        packages.len(),
        format_bytes(total)
    );

    Suggestion::new(
        "packagesWithExtraArtifacts",
        "Packages with extra artifacts",
        message,
        actions,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disk::SizeScanner;
    use crate::registry::LatestVersionMap;
    use crate::suggestions::fixtures::Fixture;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn flags_docs_and_tests_with_size_without_the_folder() {
        let dir = TempDir::new().unwrap();
        let mut fx = Fixture::new(dir.path(), &[], &[]);
        let a = fx.add("node_modules/a", "a", "1.0.0", &[]);
        fx.add("node_modules/clean", "clean", "1.0.0", &[]);
        let pkg = dir.path().join("node_modules/a");
        fs::write(pkg.join("index.js"), vec![b'x'; 100]).unwrap();
        fs::create_dir_all(pkg.join("docs")).unwrap();
        fs::write(pkg.join("docs/guide.md"), vec![b'x'; 40]).unwrap();
        fs::create_dir_all(pkg.join("tests")).unwrap();
        fs::write(pkg.join("tests/a.test.js"), vec![b'x'; 10]).unwrap();
        let graph = fx.builder.build();

        let sizes = vec![0u64; 3];
        let latest = LatestVersionMap::new();
        let scanner = SizeScanner::new(2).unwrap();
        let artifacts = vec!["docs".to_string(), "tests".to_string()];
        let ctx = AnalysisContext::new(&graph, graph.select(&[]), &sizes, &latest, &scanner, &artifacts);

        let suggestion = packages_with_extra_artifacts(&ctx);

        assert_eq!(suggestion.actions.len(), 2);
        // without tests/: 100 + 40, without docs/: 100 + 10
        assert_eq!(suggestion.actions[0].meta.size, Some(140));
        assert!(suggestion.actions[0].message.contains("\"tests\" folder"));
        assert_eq!(suggestion.actions[1].meta.size, Some(110));
        assert!(suggestion.actions.iter().all(|a| a.meta.name == "a"));
        assert_eq!(ctx.breadcrumb(a).key(), "a");
        assert!(suggestion.message.starts_with("There are currently 1 packages"));
    }

    #[test]
    fn links_are_not_inspected() {
        let dir = TempDir::new().unwrap();
        let mut fx = Fixture::new(dir.path(), &[], &[]);
        let local = dir.path().join("packages/local");
        fs::create_dir_all(local.join("docs")).unwrap();
        let node = crate::graph::PackageNode::new("node_modules/local", "local", "0.1.0", &local)
            .linked_to(&local);
        fx.builder.add(node);
        let graph = fx.builder.build();

        let sizes = vec![0u64; 2];
        let latest = LatestVersionMap::new();
        let scanner = SizeScanner::new(1).unwrap();
        let artifacts = vec!["docs".to_string()];
        let ctx = AnalysisContext::new(&graph, graph.select(&[]), &sizes, &latest, &scanner, &artifacts);

        assert!(packages_with_extra_artifacts(&ctx).actions.is_empty());
    }
}

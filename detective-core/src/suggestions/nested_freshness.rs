use super::{Action, ActionMeta, AnalysisContext, Suggestion};
use crate::freshness::{FreshnessBuckets, classify};
use crate::graph::NodeId;

/// How many installed packages, at any depth, lag behind the registry.
pub fn nested_dependency_freshness(ctx: &AnalysisContext<'_>) -> Suggestion {
    let mut buckets: FreshnessBuckets<NodeId> = FreshnessBuckets::default();
    let mut total = 0usize;

    for (id, node) in ctx.nodes() {
        if !node.is_registry_package() {
            continue;
        }

        total += 1;
        buckets.push(classify(&node.version, ctx.latest(&node.name)), id);
    }

    let message = format!(
        "Out of the total {} sub packages currently installed; {}",
        total,
        buckets.summary(total)
    );

    let actions = buckets
        .into_ordered()
        .map(|(delta, id)| {
            let node = ctx.graph.node(id);
            let breadcrumb = ctx.breadcrumb(id).clone();
            let latest = ctx.latest(&node.name).unwrap_or_default();

            Action {
                message: format!(
                    "\"{}@{}\" is required at \"{}\", the latest is {}. This is a {} version out of date.",
                    node.name, node.version, breadcrumb, latest, delta
                ),
                meta: ActionMeta {
                    name: node.name.clone(),
                    directory: node.location.clone(),
                    breadcrumb,
                    size: None,
                },
            }
        })
        .collect();

    Suggestion::new(
        "nestedDependencyFreshness",
        "Nested Dependency Freshness",
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
    use tempfile::TempDir;

    fn latest(pairs: &[(&str, &str)]) -> LatestVersionMap {
        pairs
            .iter()
            .map(|(name, version)| (name.to_string(), version.to_string()))
            .collect()
    }

    #[test]
    fn buckets_major_before_minor_before_patch() {
        let dir = TempDir::new().unwrap();
        let mut fx = Fixture::new(dir.path(), &[], &[]);
        fx.add("node_modules/patchy", "patchy", "1.0.0", &[]);
        fx.add("node_modules/d", "d", "1.0.0", &[]);
        fx.add("node_modules/minor", "minor", "1.0.0", &[]);
        fx.add("node_modules/current", "current", "1.0.0", &[]);
        fx.add("node_modules/private", "private", "1.0.0", &[]);
        let graph = fx.builder.build();

        let latest = latest(&[
            ("patchy", "1.0.1"),
            ("d", "2.0.0"),
            ("minor", "1.1.0"),
            ("current", "1.0.0"),
        ]);
        let sizes = vec![0u64; 6];
        let scanner = SizeScanner::new(1).unwrap();
        let ctx = AnalysisContext::new(&graph, graph.select(&[]), &sizes, &latest, &scanner, &[]);

        let suggestion = nested_dependency_freshness(&ctx);
        let names: Vec<_> = suggestion.actions.iter().map(|a| a.meta.name.as_str()).collect();

        assert_eq!(names, ["d", "minor", "patchy"]);
        assert!(suggestion.actions[0].message.contains("the latest is 2.0.0. This is a major version"));
        assert!(suggestion.message.starts_with("Out of the total 5 sub packages"));
        assert!(suggestion.message.contains("1 major versions out of date (20.00%)"));
    }

    #[test]
    fn links_are_not_classified() {
        let dir = TempDir::new().unwrap();
        let mut fx = Fixture::new(dir.path(), &[], &[]);
        let node = crate::graph::PackageNode::new(
            "node_modules/ws-lib",
            "ws-lib",
            "0.0.1",
            dir.path().join("packages/ws-lib"),
        )
        .linked_to(dir.path().join("packages/ws-lib"));
        fx.builder.add(node);
        let graph = fx.builder.build();

        let latest = latest(&[("ws-lib", "9.0.0")]);
        let sizes = vec![0u64; 2];
        let scanner = SizeScanner::new(1).unwrap();
        let ctx = AnalysisContext::new(&graph, graph.select(&[]), &sizes, &latest, &scanner, &[]);

        let suggestion = nested_dependency_freshness(&ctx);
        assert!(suggestion.actions.is_empty());
        assert!(suggestion.message.starts_with("Out of the total 0 sub packages"));
    }
}

use super::{Action, ActionMeta, AnalysisContext, Suggestion, sort_by_size};
use crate::console::format_bytes;
use tracing::{debug, error};

/// Tilde ranges never widen to the version hoisted at the top level, so
/// every `~` dependency keeps its own nested copy around.
pub fn packages_with_pinned_versions(ctx: &AnalysisContext<'_>) -> Suggestion {
    let mut actions = Vec::new();

    for (id, node) in ctx.nodes() {
        for (dependency, range) in node.dependency_ranges() {
            if !range.trim_start().starts_with('~') {
                continue;
            }

            let size = match node.edges_out().get(dependency) {
                Some(target) => Some(ctx.size(*target)),
                None if node.manifest.optional_dependencies.contains_key(dependency) => {
                    debug!(dependent = %node.location, %dependency, "optional dependency not installed");
                    None
                }
                None => {
                    error!(
                        target: "graph",
                        dependent = %node.location,
                        %dependency,
                        "declared dependency is missing from the installed tree"
                    );
                    None
                }
            };

            let breadcrumb = ctx.breadcrumb(id).clone();
            let cost = size
                .map(|bytes| format!(" This keeps an additional {} on disk.", format_bytes(bytes)))
                .unwrap_or_default();

            actions.push(Action {
                message: format!(
                    "\"{}\" ({}) has a pinned version for \"{}@{}\". This will never resolve at the top level.{}",
                    node.name, breadcrumb, dependency, range, cost
                ),
                meta: ActionMeta {
                    name: dependency.clone(),
                    directory: node.location.clone(),
                    breadcrumb,
                    size,
                },
            });
        }
    }

    sort_by_size(&mut actions);

    Suggestion::new(
        "packagesWithPinnedVersions",
        "Dependencies with pinned versions",
        format!(
            "There are currently {} dependencies being pinned. This will result in not having dependencies being hoisted.",
            actions.len()
        ),
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

    #[test]
    fn flags_tilde_dependency_with_nested_copy_size() {
        let dir = TempDir::new().unwrap();
        let mut fx = Fixture::new(dir.path(), &[("a", "^1.0.0")], &[]);
        let root = fx.root();
        let a = fx.add("node_modules/a", "a", "1.0.0", &[("b", "~1.2.0"), ("c", "^1.0.0")]);
        let b = fx.add("node_modules/a/node_modules/b", "b", "1.2.3", &[]);
        let c = fx.add("node_modules/c", "c", "1.0.0", &[]);
        fx.link(root, a);
        fx.link(a, b);
        fx.link(a, c);
        let graph = fx.builder.build();

        let mut sizes = vec![0u64; 4];
        sizes[b.index()] = 2048;
        let latest = LatestVersionMap::new();
        let scanner = SizeScanner::new(1).unwrap();
        let ctx = AnalysisContext::new(&graph, graph.select(&[]), &sizes, &latest, &scanner, &[]);

        let suggestion = packages_with_pinned_versions(&ctx);

        assert_eq!(suggestion.id, "packagesWithPinnedVersions");
        assert_eq!(suggestion.actions.len(), 1);
        let action = &suggestion.actions[0];
        assert_eq!(action.meta.name, "b");
        assert_eq!(action.meta.size, Some(2048));
        assert_eq!(action.meta.breadcrumb.key(), "a");
        assert_eq!(action.meta.directory, "node_modules/a");
        assert!(action.message.contains("\"b@~1.2.0\""));
    }

    #[test]
    fn unresolved_pin_is_still_reported_without_size() {
        let dir = TempDir::new().unwrap();
        let mut fx = Fixture::new(dir.path(), &[], &[]);
        fx.add("node_modules/a", "a", "1.0.0", &[("ghost", "~0.1.0")]);
        let graph = fx.builder.build();

        let sizes = vec![0u64; 2];
        let latest = LatestVersionMap::new();
        let scanner = SizeScanner::new(1).unwrap();
        let ctx = AnalysisContext::new(&graph, graph.select(&[]), &sizes, &latest, &scanner, &[]);

        let suggestion = packages_with_pinned_versions(&ctx);
        assert_eq!(suggestion.actions.len(), 1);
        assert_eq!(suggestion.actions[0].meta.size, None);
    }

    #[test]
    fn largest_pin_first() {
        let dir = TempDir::new().unwrap();
        let mut fx = Fixture::new(dir.path(), &[], &[]);
        let a = fx.add("node_modules/a", "a", "1.0.0", &[("small", "~1.0.0")]);
        let b = fx.add("node_modules/b", "b", "1.0.0", &[("large", "~1.0.0")]);
        let small = fx.add("node_modules/small", "small", "1.0.0", &[]);
        let large = fx.add("node_modules/large", "large", "1.0.0", &[]);
        fx.link(a, small);
        fx.link(b, large);
        let graph = fx.builder.build();

        let mut sizes = vec![0u64; 5];
        sizes[small.index()] = 10;
        sizes[large.index()] = 1000;
        let latest = LatestVersionMap::new();
        let scanner = SizeScanner::new(1).unwrap();
        let ctx = AnalysisContext::new(&graph, graph.select(&[]), &sizes, &latest, &scanner, &[]);

        let names: Vec<_> = packages_with_pinned_versions(&ctx)
            .actions
            .into_iter()
            .map(|action| action.meta.name)
            .collect();
        assert_eq!(names, ["large", "small"]);
    }
}

use super::{Action, ActionMeta, AnalysisContext, Suggestion};
use crate::freshness::{FreshnessBuckets, classify};
use crate::graph::NodeId;
use tracing::warn;

/// Freshness of the dependencies the project declares itself, judged by
/// the version installed at the top level. Under a package filter the
/// population is the declared dependencies whose install is selected.
pub fn top_level_deps_freshness(ctx: &AnalysisContext<'_>) -> Suggestion {
    let declared = ctx.graph.root().manifest.direct_dependencies();
    let mut total = 0usize;
    let mut buckets: FreshnessBuckets<(String, NodeId)> = FreshnessBuckets::default();

    for name in declared.keys() {
        let Some(id) = ctx.graph.top_level(name) else {
            warn!(dependency = %name, "declared dependency is not installed at the top level");
            if !ctx.is_filtered() {
                total += 1;
            }
            continue;
        };

        if !ctx.is_selected(id) {
            continue;
        }

        total += 1;

        let node = ctx.graph.node(id);
        if !node.is_registry_package() {
            continue;
        }

        buckets.push(classify(&node.version, ctx.latest(name)), (name.clone(), id));
    }

    let message = format!(
        "Out of the total {} explicit dependencies defined in the package.json; {}",
        total,
        buckets.summary(total)
    );

    let actions = buckets
        .into_ordered()
        .map(|(delta, (name, id))| {
            let node = ctx.graph.node(id);
            let latest = ctx.latest(&name).unwrap_or_default();

            Action {
                message: format!(
                    "\"{}@{}\" is required as a direct dependency, the latest is {}. This is a {} version out of date.",
                    name, node.version, latest, delta
                ),
                meta: ActionMeta {
                    directory: format!("node_modules/{name}"),
                    name,
                    breadcrumb: ctx.breadcrumb(id).clone(),
                    size: None,
                },
            }
        })
        .collect();

    Suggestion::new(
        "topLevelDepsFreshness",
        "Top Level Dependency Freshness",
        message,
        actions,
    )
}

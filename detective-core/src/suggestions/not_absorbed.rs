use super::{Action, ActionMeta, AnalysisContext, Suggestion, sort_by_size, total_size};
use crate::console::format_bytes;

/// Nested installs whose version differs from the top-level install of the
/// same name: duplicates hoisting could not collapse.
pub fn not_being_absorbed_by_top_level(ctx: &AnalysisContext<'_>) -> Suggestion {
    let mut actions = Vec::new();

    for (id, node) in ctx.nodes() {
        if node.is_top_level() {
            continue;
        }

        // nothing to absorb into when the name only exists nested
        let Some(top_id) = ctx.graph.top_level(&node.name) else {
            continue;
        };

        if top_id == id {
            continue;
        }

        let top = ctx.graph.node(top_id);
        if top.version == node.version {
            continue;
        }

        let breadcrumb = ctx.breadcrumb(id).clone();
        let size = ctx.size(id);

        actions.push(Action {
            message: format!(
                "\"{}\" ({}) not absorbed because top level dep is \"{}\" and this is \"{}\". This takes up an additional {}.",
                node.name,
                breadcrumb,
                top.version,
                node.version,
                format_bytes(size)
            ),
            meta: ActionMeta {
                name: node.name.clone(),
                directory: node.location.clone(),
                breadcrumb,
                size: Some(size),
            },
        });
    }

    sort_by_size(&mut actions);

    let total = total_size(&actions);
    let message = format!(
        "There are currently {} duplicate packages being installed on disk because they are not being absorbed into the top level semver range. This equates to a total of {}",
        actions.len(),
        format_bytes(total)
    );

    Suggestion::new(
        "notBeingAbsorbedByTopLevel",
        "Dependencies not being absorbed",
        message,
        actions,
    )
}

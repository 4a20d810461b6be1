use super::{Breadcrumb, DependencyGraph, NodeId};

/// Walks from `id` towards the root through the first dependent of every
/// node. Stops at the root, at a node nobody depends on, or when a name
/// would repeat.
pub fn resolve(graph: &DependencyGraph, id: NodeId) -> Breadcrumb {
    let mut names: Vec<String> = Vec::new();
    let mut current = id;

    loop {
        if current == graph.root_id() {
            break;
        }

        let node = graph.node(current);

        if names.iter().any(|name| name == &node.name) {
            break;
        }

        names.push(node.name.clone());

        match node.edges_in().first() {
            Some(parent) => current = *parent,
            None => break,
        }
    }

    names.reverse();
    Breadcrumb::new(names)
}

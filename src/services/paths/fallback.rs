use serde::Serialize;

use crate::models::{FileNode, NodeKind};

use super::lookup::find_node_with;
use super::normalize::PathNormalizer;

/// Nearest prefix of `path` that still resolves, dropping one trailing
/// segment at a time. Ends at `/`, which always resolves.
pub fn closest_existing_ancestor(tree: &FileNode, path: &str, normalizer: &PathNormalizer) -> String {
    let normalized = normalizer.normalize(path);
    let segments: Vec<&str> = normalized.split('/').filter(|s| !s.is_empty()).collect();

    for len in (1..segments.len()).rev() {
        let prefix = format!("/{}", segments[..len].join("/"));
        if find_node_with(tree, &prefix, normalizer).is_some() {
            tracing::debug!("Closest existing ancestor of {} is {}", normalized, prefix);
            return prefix;
        }
    }
    "/".to_string()
}

/// Outcome of resolving a requested path against the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    pub requested: String,
    pub normalized: String,
    /// Normalized path the explorer settles on.
    pub target: String,
    /// Path of the node found at `target`, as stored in the tree.
    pub node_path: Option<String>,
    pub kind: Option<NodeKind>,
    /// True when the requested path missed and `target` is an ancestor.
    pub redirected: bool,
}

/// Exact lookup first, then the closest surviving ancestor. The target is
/// always the normalized path of the node found, not the requested spelling.
pub fn resolve_path(tree: &FileNode, requested: &str, normalizer: &PathNormalizer) -> Resolution {
    let normalized = normalizer.normalize(requested);
    if let Some(node) = find_node_with(tree, requested, normalizer) {
        return Resolution {
            requested: requested.to_string(),
            target: normalizer.normalize(&node.path),
            normalized,
            node_path: Some(node.path.clone()),
            kind: Some(node.kind),
            redirected: false,
        };
    }

    tracing::warn!("Path not found: {}, falling back to closest ancestor", normalized);
    let ancestor = closest_existing_ancestor(tree, &normalized, normalizer);
    let node = find_node_with(tree, &ancestor, normalizer);
    let target = node.map_or(ancestor, |n| normalizer.normalize(&n.path));
    Resolution {
        requested: requested.to_string(),
        normalized,
        node_path: node.map(|n| n.path.clone()),
        kind: node.map(|n| n.kind),
        target,
        redirected: true,
    }
}

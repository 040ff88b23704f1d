//! Path handling for the explorer: normalization, lookup against the tree,
//! and the closest-ancestor fallback used when a lookup misses.

pub mod fallback;
pub mod lookup;
pub mod normalize;

pub use fallback::{closest_existing_ancestor, resolve_path, Resolution};
pub use lookup::{find_node_by_path, find_node_with};
pub use normalize::{normalize, PathNormalizer};

/// Slash-rooted parent of `path`. Top-level entries and the root map to `/`.
pub fn parent_path(path: &str) -> String {
    let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
    if parts.len() <= 1 {
        return "/".to_string();
    }
    format!("/{}", parts[..parts.len() - 1].join("/"))
}

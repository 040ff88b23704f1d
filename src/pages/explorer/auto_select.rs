use crate::core::config::ExplorerConfig;
use crate::models::FileNode;
use crate::services::paths::{find_node_with, PathNormalizer};

/// The child a folder opens into, or `None` when auto-select is off or the
/// folder is empty.
///
/// Priority: an index document (`readme.md` by default, any case), then the
/// first markdown file, then the first child of any kind.
pub fn choose_child<'a>(folder: &'a FileNode, config: &ExplorerConfig) -> Option<&'a FileNode> {
    if !config.auto_select_enabled() || !folder.is_folder() {
        return None;
    }
    let children = folder.children();

    config
        .index_documents
        .iter()
        .find_map(|index| {
            children
                .iter()
                .find(|c| c.is_file() && c.name.eq_ignore_ascii_case(index))
        })
        .or_else(|| children.iter().find(|c| c.is_markdown()))
        .or_else(|| children.first())
}

/// Normalized path auto-select moves to from `current_path`.
///
/// Single step only: a chosen folder is returned as is and gets its own turn
/// on the next settle. `None` when the current node is not a folder, nothing
/// is chosen, or the choice normalizes back to `current_path`.
pub fn auto_select_target(
    tree: &FileNode,
    current_path: &str,
    config: &ExplorerConfig,
    normalizer: &PathNormalizer,
) -> Option<String> {
    let node = find_node_with(tree, current_path, normalizer)?;
    let child = choose_child(node, config)?;
    let target = normalizer.normalize(&child.path);
    if target == normalizer.normalize(current_path) {
        return None;
    }
    tracing::debug!("Auto-selecting {} in {}", target, current_path);
    Some(target)
}

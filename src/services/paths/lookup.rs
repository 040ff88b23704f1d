use crate::models::FileNode;

use super::normalize::PathNormalizer;

/// Finds the node addressed by `path` with the default reserved documents.
pub fn find_node_by_path<'a>(tree: &'a FileNode, path: &str) -> Option<&'a FileNode> {
    find_node_with(tree, path, &PathNormalizer::default())
}

/// Resolves `path` to a node of `tree`. The first strategy that matches wins:
///
/// 1. empty path or `/`: the root
/// 2. a reserved root document (`README.md`, `/changelog.md`, ...): the root
///    child with that name or path
/// 3. the normalized path equals the root's own path: the root
/// 4. depth-first, in child order: a node whose path, normalized path, or
///    bare name equals the normalized target
/// 5. case-insensitive descent by name, one segment per level
///
/// Returns `None` when nothing matches; callers pick their own fallback.
pub fn find_node_with<'a>(
    tree: &'a FileNode,
    path: &str,
    normalizer: &PathNormalizer,
) -> Option<&'a FileNode> {
    if path.is_empty() || path == "/" {
        return Some(tree);
    }

    if normalizer.is_reserved_root_name(path) {
        if let Some(node) = find_root_document(tree, path) {
            return Some(node);
        }
    }

    let target = normalizer.normalize(path);
    if tree.path == target {
        return Some(tree);
    }

    if let Some(node) = find_by_exact_path(tree, &target, normalizer) {
        return Some(node);
    }

    descend_by_segments(tree, &target)
}

fn find_root_document<'a>(tree: &'a FileNode, path: &str) -> Option<&'a FileNode> {
    let bare = path.strip_prefix('/').unwrap_or(path);
    tree.children().iter().find(|child| {
        child.name == bare
            || child.path == bare
            || child.path.strip_prefix('/') == Some(bare)
    })
}

fn find_by_exact_path<'a>(
    tree: &'a FileNode,
    target: &str,
    normalizer: &PathNormalizer,
) -> Option<&'a FileNode> {
    tree.iter().find(|node| {
        node.path == target || node.name == target || normalizer.normalize(&node.path) == target
    })
}

fn descend_by_segments<'a>(tree: &'a FileNode, target: &str) -> Option<&'a FileNode> {
    let mut current = tree;
    for segment in target.split('/').filter(|s| !s.is_empty()) {
        if current.is_file() {
            return None;
        }
        let wanted = segment.to_lowercase();
        current = current
            .children()
            .iter()
            .find(|child| child.name.to_lowercase() == wanted)?;
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Same shape the docs server produces: root-relative paths without a
    /// leading slash.
    fn server_tree() -> FileNode {
        FileNode::folder(
            "root",
            "/",
            vec![
                FileNode::file("README.md", "README.md"),
                FileNode::file("changelog.md", "changelog.md"),
                FileNode::folder(
                    "docs",
                    "docs",
                    vec![
                        FileNode::folder(
                            "api",
                            "docs/api",
                            vec![FileNode::file("overview.md", "docs/api/overview.md")],
                        ),
                        FileNode::file("Getting Started.md", "docs/Getting Started.md"),
                        FileNode::file("notes.txt", "docs/notes.txt"),
                    ],
                ),
            ],
        )
    }

    fn path_of(node: Option<&FileNode>) -> Option<&str> {
        node.map(|n| n.path.as_str())
    }

    #[test]
    fn empty_and_root_resolve_to_root() {
        let tree = server_tree();
        assert_eq!(path_of(find_node_by_path(&tree, "")), Some("/"));
        assert_eq!(path_of(find_node_by_path(&tree, "/")), Some("/"));
        assert_eq!(path_of(find_node_by_path(&tree, "/?x=1")), Some("/"));
    }

    #[test]
    fn reserved_documents_resolve_at_root() {
        let tree = server_tree();
        assert_eq!(path_of(find_node_by_path(&tree, "README.md")), Some("README.md"));
        assert_eq!(path_of(find_node_by_path(&tree, "/README.md")), Some("README.md"));
        assert_eq!(
            path_of(find_node_by_path(&tree, "/changelog.md")),
            Some("changelog.md")
        );
    }

    #[test]
    fn exact_paths_with_and_without_extension() {
        let tree = server_tree();
        for input in [
            "docs/api/overview.md",
            "/docs/api/overview.md",
            "/docs/api/overview",
            "/docs/api/overview/",
            "/docs/api/overview.md#section",
        ] {
            assert_eq!(
                path_of(find_node_by_path(&tree, input)),
                Some("docs/api/overview.md"),
                "{input}"
            );
        }
        assert_eq!(path_of(find_node_by_path(&tree, "/docs/api")), Some("docs/api"));
        assert_eq!(
            path_of(find_node_by_path(&tree, "/docs/notes.txt")),
            Some("docs/notes.txt")
        );
    }

    #[test]
    fn every_node_path_resolves_to_itself() {
        let tree = server_tree();
        for node in tree.iter() {
            assert_eq!(
                path_of(find_node_by_path(&tree, &node.path)),
                Some(node.path.as_str())
            );
        }

        let flat = FileNode::from_flat_map([
            ("/a/b/c.md", "c"),
            ("/a/d.txt", "d"),
            ("/e.md", "e"),
        ]);
        for node in flat.iter() {
            assert_eq!(
                path_of(find_node_by_path(&flat, &node.path)),
                Some(node.path.as_str())
            );
        }
    }

    #[test]
    fn case_insensitive_segment_fallback() {
        let tree = server_tree();
        assert_eq!(path_of(find_node_by_path(&tree, "/DOCS/API")), Some("docs/api"));
        assert_eq!(
            path_of(find_node_by_path(&tree, "/Docs/NOTES.TXT")),
            Some("docs/notes.txt")
        );
    }

    #[test]
    fn cannot_descend_into_a_file() {
        let tree = server_tree();
        assert!(find_node_by_path(&tree, "/docs/notes.txt/deeper").is_none());
    }

    #[test]
    fn misses_return_none() {
        let tree = server_tree();
        assert!(find_node_by_path(&tree, "/docs/missing").is_none());
        assert!(find_node_by_path(&tree, "/nope/overview").is_none());
    }

    #[test]
    fn first_match_in_child_order_wins() {
        let tree = FileNode::folder(
            "root",
            "/",
            vec![
                FileNode::folder("guide", "guide", vec![]),
                FileNode::file("guide.md", "guide.md"),
            ],
        );
        assert_eq!(path_of(find_node_by_path(&tree, "/guide.md")), Some("guide"));
    }

    #[test]
    fn reserved_names_follow_the_normalizer() {
        let tree = FileNode::folder(
            "root",
            "/",
            vec![FileNode::file("LICENSE.md", "LICENSE.md")],
        );
        let normalizer = PathNormalizer::new(["LICENSE"]);
        assert_eq!(
            path_of(find_node_with(&tree, "/LICENSE.md", &normalizer)),
            Some("LICENSE.md")
        );
    }
}

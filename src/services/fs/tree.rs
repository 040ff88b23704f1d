use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::errors::{Error, Result};
use crate::models::FileNode;

use super::{blocking, iso_timestamp};

/// Where the explorer's tree comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeSource {
    /// Walk a directory of documents.
    Directory { root: PathBuf, include_hidden: bool },
    /// Read a previously exported `folder-structure.json`.
    StaticJson(PathBuf),
}

impl TreeSource {
    pub fn directory(root: impl Into<PathBuf>) -> Self {
        TreeSource::Directory {
            root: root.into(),
            include_hidden: false,
        }
    }

    pub fn load(&self) -> Result<FileNode> {
        match self {
            TreeSource::Directory {
                root,
                include_hidden,
            } => build_tree(root, *include_hidden),
            TreeSource::StaticJson(path) => read_tree_json(path),
        }
    }
}

/// Loads `source` on the blocking pool.
pub async fn load_tree(source: TreeSource) -> Result<FileNode> {
    blocking(move || source.load()).await
}

/// Builds the tree for `root`.
///
/// The root node is `{name: "root", path: "/"}`. Every other node's path is
/// relative to `root` and slash separated (`docs/api/overview.md`), matching
/// the JSON the docs server has always returned. Children are ordered by
/// case-insensitive name. Hidden entries (leading `.`) are skipped unless
/// `include_hidden` is set; entries whose metadata cannot be read are logged
/// and skipped.
pub fn build_tree(root: &Path, include_hidden: bool) -> Result<FileNode> {
    if !root.is_dir() {
        return Err(Error::NotADirectory(root.to_path_buf()));
    }
    let children = read_children(root, "", include_hidden)?;
    let tree = FileNode::folder("root", "/", children);
    tracing::debug!("Built tree for {} with {} nodes", root.display(), tree.count());
    Ok(tree)
}

fn read_children(dir: &Path, relative: &str, include_hidden: bool) -> Result<Vec<FileNode>> {
    let mut entries: Vec<(String, PathBuf)> = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = os_str_to_string(entry.file_name());
        if !include_hidden && name.starts_with('.') {
            continue;
        }
        entries.push((name, entry.path()));
    }
    entries.sort_by(|a, b| a.0.to_lowercase().cmp(&b.0.to_lowercase()));

    let mut nodes = Vec::with_capacity(entries.len());
    for (name, path) in entries {
        let md = match fs::metadata(&path) {
            Ok(md) => md,
            Err(e) => {
                tracing::warn!("Skipping {}: {}", path.display(), e);
                continue;
            }
        };
        let rel = if relative.is_empty() {
            name.clone()
        } else {
            format!("{relative}/{name}")
        };
        let modified = md.modified().ok().map(iso_timestamp);

        let node = if md.is_dir() {
            let children = read_children(&path, &rel, include_hidden)?;
            FileNode::folder(name, rel, children)
        } else {
            FileNode::file(name, rel)
        };
        nodes.push(node.with_stats(modified, Some(md.len())));
    }
    Ok(nodes)
}

pub fn read_tree_json(path: &Path) -> Result<FileNode> {
    let raw = fs::read_to_string(path)?;
    parse_tree_json(&raw)
}

/// Parses a tree document. The top-level node must be a folder.
pub fn parse_tree_json(raw: &str) -> Result<FileNode> {
    let tree: FileNode = serde_json::from_str(raw)?;
    if !tree.is_folder() {
        return Err(Error::InvalidTree(format!(
            "root '{}' is a file, expected a folder",
            tree.path
        )));
    }
    Ok(tree)
}

pub fn write_tree_json(tree: &FileNode, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(tree)?)?;
    Ok(())
}

fn os_str_to_string(s: impl AsRef<OsStr>) -> String {
    s.as_ref().to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn docs_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("docs/api")).unwrap();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::write(root.join("README.md"), "# Home").unwrap();
        fs::write(root.join("changelog.md"), "## 1.0").unwrap();
        fs::write(root.join("docs/api/overview.md"), "# API").unwrap();
        fs::write(root.join("docs/Beta.md"), "beta").unwrap();
        fs::write(root.join("docs/alpha.md"), "alpha").unwrap();
        dir
    }

    #[test]
    fn builds_relative_slash_paths_in_name_order() -> Result<()> {
        let dir = docs_dir();
        let tree = build_tree(dir.path(), false)?;

        assert_eq!(tree.name, "root");
        assert_eq!(tree.path, "/");
        let top: Vec<&str> = tree.children().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(top, vec!["changelog.md", "docs", "README.md"]);

        let docs = &tree.children()[1];
        let paths: Vec<&str> = docs.children().iter().map(|c| c.path.as_str()).collect();
        assert_eq!(paths, vec!["docs/alpha.md", "docs/api", "docs/Beta.md"]);
        assert_eq!(docs.children()[1].children()[0].path, "docs/api/overview.md");

        let readme = &tree.children()[2];
        assert_eq!(readme.size, Some(6));
        assert!(readme.last_modified.as_deref().is_some_and(|t| t.ends_with('Z')));
        Ok(())
    }

    #[test]
    fn hidden_entries_are_opt_in() -> Result<()> {
        let dir = docs_dir();
        let hidden = build_tree(dir.path(), true)?;
        assert!(hidden.children().iter().any(|c| c.name == ".git"));
        let plain = build_tree(dir.path(), false)?;
        assert!(!plain.children().iter().any(|c| c.name == ".git"));
        Ok(())
    }

    #[test]
    fn missing_root_is_not_a_directory() {
        let dir = TempDir::new().unwrap();
        let err = build_tree(&dir.path().join("nope"), false).unwrap_err();
        assert!(matches!(err, Error::NotADirectory(_)));
    }

    #[test]
    fn json_round_trip_through_disk() -> Result<()> {
        let dir = docs_dir();
        let tree = build_tree(dir.path(), false)?;
        let out = dir.path().join("out/folder-structure.json");
        write_tree_json(&tree, &out)?;
        assert_eq!(TreeSource::StaticJson(out).load()?, tree);
        Ok(())
    }

    #[test]
    fn file_root_is_rejected() {
        let err = parse_tree_json(r#"{"name":"a.md","path":"a.md","type":"file"}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidTree(_)));
        assert!(matches!(parse_tree_json("not json"), Err(Error::Json(_))));
    }
}

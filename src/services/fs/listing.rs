use std::fs;
use std::path::Path;

use walkdir::{DirEntry, WalkDir};

use crate::core::errors::{Error, Result};
use crate::models::is_markdown_file;

use super::blocking;

/// Root-relative, slash-separated paths of every markdown document under
/// `root`, in the same order the tree lists them.
pub fn list_markdown_files(root: &Path, include_hidden: bool) -> Result<Vec<String>> {
    if !root.is_dir() {
        return Err(Error::NotADirectory(root.to_path_buf()));
    }

    let walker = WalkDir::new(root)
        .min_depth(1)
        .sort_by(|a, b| {
            a.file_name()
                .to_string_lossy()
                .to_lowercase()
                .cmp(&b.file_name().to_string_lossy().to_lowercase())
        })
        .into_iter()
        .filter_entry(|entry| include_hidden || entry.depth() == 0 || !is_hidden(entry));

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        if !is_markdown_file(&entry.file_name().to_string_lossy()) {
            continue;
        }
        if let Some(rel) = relative_slash_path(root, entry.path()) {
            files.push(rel);
        }
    }
    Ok(files)
}

pub async fn list_markdown_files_async(root: &Path, include_hidden: bool) -> Result<Vec<String>> {
    let root = root.to_path_buf();
    blocking(move || list_markdown_files(&root, include_hidden)).await
}

/// File names of the `.md` documents directly inside `root`.
pub fn list_root_markdown(root: &Path) -> Result<Vec<String>> {
    let mut names: Vec<String> = fs::read_dir(root)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".md"))
        .collect();
    names.sort_by_key(|name| name.to_lowercase());
    Ok(names)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}

/// `path` relative to `root`, joined with `/` regardless of platform.
pub fn relative_slash_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::json;

use crate::core::errors::Result;

use super::content::safe_join;
use super::listing::list_markdown_files;
use super::tree::{build_tree, write_tree_json};

pub const FOLDER_STRUCTURE_FILE: &str = "folder-structure.json";
pub const MARKDOWN_LIST_FILE: &str = "md-files.json";
pub const CONTENT_DIR: &str = "content";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSummary {
    pub output_dir: PathBuf,
    pub nodes: usize,
    pub documents: usize,
}

/// Writes a static copy of `root` that needs no server:
///
/// - `folder-structure.json`: the tree, as served by `/api/folder-structure`
/// - `md-files.json`: root-relative paths of every markdown document
/// - `content/<path>`: each document verbatim
/// - `content/<path>.json`: `{"content": ...}` for each document
pub fn export_static(root: &Path, out: &Path, include_hidden: bool) -> Result<ExportSummary> {
    fs::create_dir_all(out)?;

    let tree = build_tree(root, include_hidden)?;
    write_tree_json(&tree, &out.join(FOLDER_STRUCTURE_FILE))?;
    tracing::info!("Exported folder structure ({} nodes)", tree.count());

    let documents = list_markdown_files(root, include_hidden)?;
    fs::write(
        out.join(MARKDOWN_LIST_FILE),
        serde_json::to_string_pretty(&documents)?,
    )?;
    tracing::info!("Exported list of {} markdown files", documents.len());

    let content_dir = out.join(CONTENT_DIR);
    for rel in &documents {
        let content = fs::read_to_string(safe_join(root, rel)?)?;
        let target = safe_join(&content_dir, rel)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, &content)?;

        let mut json_path = target.into_os_string();
        json_path.push(".json");
        fs::write(
            PathBuf::from(json_path),
            serde_json::to_string_pretty(&json!({ "content": content }))?,
        )?;
        tracing::debug!("Exported content: {}", rel);
    }

    Ok(ExportSummary {
        output_dir: out.to_path_buf(),
        nodes: tree.count(),
        documents: documents.len(),
    })
}

use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::core::errors::{Error, Result};
use crate::models::is_markdown_file;

/// Supplies document text for tree nodes that carry no inline content.
pub trait ContentFetcher: Send + Sync {
    fn fetch(&self, path: &str) -> impl Future<Output = Result<String>> + Send;
}

/// Joins a slash- or backslash-separated tree path onto `root`.
///
/// `.` and empty segments are dropped; any `..` segment is rejected so the
/// result never leaves `root`.
pub fn safe_join(root: &Path, path: &str) -> Result<PathBuf> {
    let mut joined = root.to_path_buf();
    let mut depth = 0usize;
    for segment in path.split(['/', '\\']) {
        match segment {
            "" | "." => continue,
            ".." => return Err(Error::PathEscapesRoot(path.to_string())),
            s if s.contains(':') => return Err(Error::PathEscapesRoot(path.to_string())),
            s => {
                joined.push(s);
                depth += 1;
            }
        }
    }
    if depth == 0 {
        return Err(Error::NotFound(path.to_string()));
    }
    Ok(joined)
}

/// Reads documents from a docs directory.
///
/// A path is tried as given, then with `.md` appended when it lacks a
/// markdown extension, then as a bare file name at the root.
#[derive(Debug, Clone)]
pub struct FsContentFetcher {
    root: PathBuf,
}

impl FsContentFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn candidates(&self, path: &str) -> Result<Vec<PathBuf>> {
        let primary = safe_join(&self.root, path)?;
        let mut candidates = vec![primary.clone()];

        let name = primary
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !is_markdown_file(&name) {
            let mut with_ext = primary.clone().into_os_string();
            with_ext.push(".md");
            candidates.push(PathBuf::from(with_ext));
        }
        if let Some(file_name) = primary.file_name() {
            let at_root = self.root.join(file_name);
            if !candidates.contains(&at_root) {
                candidates.push(at_root);
            }
        }
        Ok(candidates)
    }

    /// Raw bytes of a file under the root, without fallbacks.
    pub async fn read_bytes(&self, path: &str) -> Result<Vec<u8>> {
        let full = safe_join(&self.root, path)?;
        match tokio::fs::read(&full).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::NotFound(path.to_string())),
            Err(e) => Err(e.into()),
        }
    }
}

impl ContentFetcher for FsContentFetcher {
    async fn fetch(&self, path: &str) -> Result<String> {
        let mut last_error = None;
        for candidate in self.candidates(path)? {
            match tokio::fs::read_to_string(&candidate).await {
                Ok(text) => {
                    tracing::debug!("Fetched {} from {}", path, candidate.display());
                    return Ok(text);
                }
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => {
                    tracing::debug!("Cannot read {}: {}", candidate.display(), e);
                    last_error = Some(e);
                }
            }
        }
        match last_error {
            Some(e) => Err(e.into()),
            None => Err(Error::NotFound(path.to_string())),
        }
    }
}

#[derive(Deserialize)]
struct ExportedContent {
    #[serde(default)]
    content: String,
}

/// Reads documents from a static export (`content/<path>.json`).
#[derive(Debug, Clone)]
pub struct ExportContentFetcher {
    content_dir: PathBuf,
}

impl ExportContentFetcher {
    /// `export_dir` is the directory the export was written to.
    pub fn new(export_dir: impl AsRef<Path>) -> Self {
        Self {
            content_dir: export_dir.as_ref().join("content"),
        }
    }
}

impl ContentFetcher for ExportContentFetcher {
    async fn fetch(&self, path: &str) -> Result<String> {
        let target = safe_join(&self.content_dir, path)?;
        let mut json_path = target.into_os_string();
        json_path.push(".json");

        let raw = match tokio::fs::read_to_string(PathBuf::from(json_path)).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::NotFound(path.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        let doc: ExportedContent = serde_json::from_str(&raw)?;
        Ok(doc.content)
    }
}

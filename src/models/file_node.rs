use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Extensions treated as markdown. `mdx` is included because the docs server
/// lists `.mdx` files alongside `.md`.
pub const MARKDOWN_EXTENSIONS: [&str; 5] = ["md", "markdown", "mdown", "mkd", "mdx"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Folder,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::File => "file",
            NodeKind::Folder => "folder",
        }
    }
}

/// One entry of the documentation tree.
///
/// Files and folders share this record; `kind` is the discriminant. Folders
/// always carry a (possibly empty) child list, files never do. On the wire the
/// field names follow the tree JSON served by `/api/folder-structure`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawNode")]
pub struct FileNode {
    pub name: String,
    pub path: String,
    pub kind: NodeKind,
    pub children: Vec<FileNode>,
    pub content: Option<String>,
    pub last_modified: Option<String>,
    pub size: Option<u64>,
    pub metadata: Option<Map<String, Value>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawNode {
    name: String,
    path: String,
    #[serde(rename = "type")]
    kind: NodeKind,
    #[serde(default)]
    children: Option<Vec<FileNode>>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    last_modified: Option<String>,
    #[serde(default)]
    size: Option<u64>,
    #[serde(default)]
    metadata: Option<Map<String, Value>>,
}

impl From<RawNode> for FileNode {
    fn from(raw: RawNode) -> Self {
        let children = match raw.kind {
            NodeKind::Folder => raw.children.unwrap_or_default(),
            NodeKind::File => Vec::new(),
        };
        let content = match raw.kind {
            NodeKind::File => raw.content,
            NodeKind::Folder => None,
        };
        FileNode {
            name: raw.name,
            path: raw.path,
            kind: raw.kind,
            children,
            content,
            last_modified: raw.last_modified,
            size: raw.size,
            metadata: raw.metadata,
        }
    }
}

impl Serialize for FileNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("FileNode", 8)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("path", &self.path)?;
        state.serialize_field("type", &self.kind)?;
        match &self.last_modified {
            Some(v) => state.serialize_field("lastModified", v)?,
            None => state.skip_field("lastModified")?,
        }
        match self.size {
            Some(v) => state.serialize_field("size", &v)?,
            None => state.skip_field("size")?,
        }
        match &self.content {
            Some(v) => state.serialize_field("content", v)?,
            None => state.skip_field("content")?,
        }
        match &self.metadata {
            Some(v) => state.serialize_field("metadata", v)?,
            None => state.skip_field("metadata")?,
        }
        if self.is_folder() {
            state.serialize_field("children", &self.children)?;
        } else {
            state.skip_field("children")?;
        }
        state.end()
    }
}

impl FileNode {
    pub fn folder(name: impl Into<String>, path: impl Into<String>, children: Vec<FileNode>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind: NodeKind::Folder,
            children,
            content: None,
            last_modified: None,
            size: None,
            metadata: None,
        }
    }

    pub fn file(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind: NodeKind::File,
            children: Vec::new(),
            content: None,
            last_modified: None,
            size: None,
            metadata: None,
        }
    }

    /// The conventional empty root used when no tree could be loaded.
    pub fn empty_root() -> Self {
        Self::folder("root", "/", Vec::new())
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_stats(mut self, last_modified: Option<String>, size: Option<u64>) -> Self {
        self.last_modified = last_modified;
        self.size = size;
        self
    }

    pub fn is_folder(&self) -> bool {
        self.kind == NodeKind::Folder
    }

    pub fn is_file(&self) -> bool {
        self.kind == NodeKind::File
    }

    pub fn is_markdown(&self) -> bool {
        self.is_file() && is_markdown_file(&self.name)
    }

    pub fn children(&self) -> &[FileNode] {
        &self.children
    }

    /// Depth-first pre-order walk, starting with `self`.
    pub fn iter(&self) -> Iter<'_> {
        Iter { stack: vec![self] }
    }

    /// Paths of every file below (and including) this node, in tree order.
    pub fn all_file_paths(&self) -> Vec<String> {
        self.iter()
            .filter(|n| n.is_file())
            .map(|n| n.path.clone())
            .collect()
    }

    pub fn count(&self) -> usize {
        self.iter().count()
    }

    /// Builds a tree from `path -> content` pairs.
    ///
    /// Paths are sorted first so parents exist before their children;
    /// intermediate folders are created on demand and every leaf becomes a
    /// file carrying its content inline. Node paths are slash-rooted
    /// (`/guide/intro.md`) under a root named `root` at `/`.
    pub fn from_flat_map<I, K, V>(files: I) -> FileNode
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut entries: Vec<(String, String)> = files
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        let mut root = FileNode::empty_root();
        for (file_path, content) in entries {
            let parts: Vec<&str> = file_path.split('/').filter(|p| !p.is_empty()).collect();
            if parts.is_empty() {
                continue;
            }
            insert_flat(&mut root, &parts, "", content);
        }
        root
    }
}

fn insert_flat(node: &mut FileNode, parts: &[&str], prefix: &str, content: String) {
    let Some((first, rest)) = parts.split_first() else {
        return;
    };
    let path = format!("{prefix}/{first}");
    let existing = node.children.iter().position(|c| c.path == path);

    if rest.is_empty() {
        if existing.is_none() {
            node.children
                .push(FileNode::file(*first, path).with_content(content));
        }
        return;
    }

    let index = match existing {
        Some(index) => index,
        None => {
            node.children
                .push(FileNode::folder(*first, path.clone(), Vec::new()));
            node.children.len() - 1
        }
    };
    let child = &mut node.children[index];
    if child.is_file() {
        tracing::warn!("Cannot nest entries under file '{}'", child.path);
        return;
    }
    insert_flat(child, rest, &path, content);
}

pub struct Iter<'a> {
    stack: Vec<&'a FileNode>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a FileNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Lower-cased extension of `name`, if it has one. Dotfiles such as `.md`
/// have no extension.
pub fn file_extension(name: &str) -> Option<String> {
    match name.rfind('.') {
        Some(dot) if dot > 0 && dot + 1 < name.len() => Some(name[dot + 1..].to_ascii_lowercase()),
        _ => None,
    }
}

pub fn is_markdown_file(name: &str) -> bool {
    file_extension(name)
        .map(|ext| MARKDOWN_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

pub mod file_node;

pub use file_node::{file_extension, is_markdown_file, FileNode, NodeKind, MARKDOWN_EXTENSIONS};

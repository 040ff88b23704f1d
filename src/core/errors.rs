use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("watch error: {0}")]
    Watch(#[from] notify::Error),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("path escapes the served root: {0}")]
    PathEscapesRoot(String),
    #[error("root '{}' is not a directory", .0.display())]
    NotADirectory(PathBuf),
    #[error("invalid tree: {0}")]
    InvalidTree(String),
    #[error("other error: {0}")]
    Other(String),
}

impl Error {
    /// True for failures that mean "nothing there" rather than "something broke".
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::NotFound(_) => true,
            Error::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

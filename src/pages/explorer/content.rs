use crate::core::errors::Result;
use crate::models::FileNode;

pub const LOAD_FAILED_MESSAGE: &str = "Failed to load file content";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ContentState {
    /// Nothing to show: a folder, a miss, or no selection.
    #[default]
    Idle,
    Loading {
        path: String,
    },
    Ready {
        path: String,
        text: String,
    },
    Failed {
        path: String,
        message: String,
    },
}

/// A fetch the loader is waiting on. Hand it back to `complete` together
/// with the fetch result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRequest {
    pub path: String,
    pub ticket: u64,
}

/// Tracks the text shown for the current node.
///
/// Every change of selection issues a new ticket, so a fetch that finishes
/// after the user has moved on is dropped instead of overwriting the newer
/// content. There is no timeout: a fetch that never completes leaves the
/// loader in `Loading`.
#[derive(Debug, Default)]
pub struct ContentLoader {
    state: ContentState,
    ticket: u64,
}

impl ContentLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ContentState {
        &self.state
    }

    pub fn text(&self) -> Option<&str> {
        match &self.state {
            ContentState::Ready { text, .. } => Some(text),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, ContentState::Loading { .. })
    }

    /// Points the loader at `node`. Returns a request when the node is a file
    /// whose text has to be fetched; inline content is used directly.
    pub fn resolve(&mut self, node: Option<&FileNode>) -> Option<ContentRequest> {
        let file = match node {
            Some(n) if n.is_file() => n,
            _ => {
                self.reset(ContentState::Idle);
                return None;
            }
        };

        if let Some(text) = &file.content {
            self.reset(ContentState::Ready {
                path: file.path.clone(),
                text: text.clone(),
            });
            return None;
        }

        match &self.state {
            ContentState::Loading { path } | ContentState::Ready { path, .. }
                if *path == file.path =>
            {
                return None;
            }
            _ => {}
        }

        self.reset(ContentState::Loading {
            path: file.path.clone(),
        });
        Some(ContentRequest {
            path: file.path.clone(),
            ticket: self.ticket,
        })
    }

    /// Commits a fetch result if `request` is still the outstanding one.
    /// Returns false when the result was stale and discarded.
    pub fn complete(&mut self, request: &ContentRequest, result: Result<String>) -> bool {
        let current = matches!(
            &self.state,
            ContentState::Loading { path } if *path == request.path
        );
        if request.ticket != self.ticket || !current {
            tracing::debug!("Discarding stale content for {}", request.path);
            return false;
        }

        self.state = match result {
            Ok(text) => ContentState::Ready {
                path: request.path.clone(),
                text,
            },
            Err(e) => {
                tracing::warn!("Failed to load {}: {}", request.path, e);
                ContentState::Failed {
                    path: request.path.clone(),
                    message: format!("{LOAD_FAILED_MESSAGE}: {e}"),
                }
            }
        };
        true
    }

    fn reset(&mut self, state: ContentState) {
        self.ticket = self.ticket.wrapping_add(1);
        self.state = state;
    }
}

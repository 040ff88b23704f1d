use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebounceEventResult, Debouncer};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::core::errors::Result;

use super::state::AppState;

/// Debounced recursive watch over the docs root.
pub struct FileWatcher {
    // Dropping the debouncer stops the watch.
    _debouncer: Debouncer<notify::RecommendedWatcher>,
}

impl FileWatcher {
    pub fn new(root: &Path, tx: mpsc::Sender<Vec<PathBuf>>, timeout: Duration) -> Result<Self> {
        let mut debouncer = new_debouncer(timeout, move |res: DebounceEventResult| match res {
            Ok(events) => {
                let paths: Vec<PathBuf> = events.into_iter().map(|e| e.path).collect();
                // notify calls back on its own thread.
                if let Err(e) = tx.blocking_send(paths) {
                    tracing::warn!("Failed to send watcher events: {}", e);
                }
            }
            Err(e) => {
                tracing::warn!("Watcher error: {:?}", e);
            }
        })?;

        debouncer.watcher().watch(root, RecursiveMode::Recursive)?;

        Ok(Self {
            _debouncer: debouncer,
        })
    }
}

/// Watches the docs root and reloads the tree after each burst of changes.
///
/// The returned watcher must be kept alive for as long as reloads are wanted.
pub fn spawn_reloader(state: Arc<AppState>) -> Result<(FileWatcher, JoinHandle<()>)> {
    let (tx, mut rx) = mpsc::channel::<Vec<PathBuf>>(16);
    let watcher = FileWatcher::new(&state.server.docs_root, tx, state.server.reload_debounce)?;
    tracing::info!("Watching {} for changes", state.server.docs_root.display());

    let handle = tokio::spawn(async move {
        while let Some(paths) = rx.recv().await {
            let relevant = paths
                .iter()
                .any(|p| state.server.include_hidden || !is_hidden(&state.server.docs_root, p));
            if !relevant {
                continue;
            }
            tracing::debug!("{} paths changed", paths.len());
            match state.reload().await {
                Ok(count) => tracing::info!("Reloaded tree ({} nodes)", count),
                Err(e) => tracing::warn!("Tree reload failed, keeping previous tree: {}", e),
            }
        }
    });
    Ok((watcher, handle))
}

fn is_hidden(root: &Path, path: &Path) -> bool {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .any(|c| c.as_os_str().to_string_lossy().starts_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_paths_are_ignored() {
        let root = Path::new("/srv/.docs");
        assert!(!is_hidden(root, Path::new("/srv/.docs/guide/intro.md")));
        assert!(is_hidden(root, Path::new("/srv/.docs/.git/index")));
        assert!(is_hidden(root, Path::new("/srv/.docs/guide/.draft.md")));
    }
}

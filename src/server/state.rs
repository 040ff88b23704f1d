use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::core::config::{ExplorerConfig, ServerConfig};
use crate::core::errors::Result;
use crate::core::theme::{Theme, ThemeStore};
use crate::models::FileNode;
use crate::services::fs::content::FsContentFetcher;
use crate::services::fs::tree::load_tree;
use crate::services::markdown::MarkdownRenderer;
use crate::services::syntax::SyntaxService;

/// Shared by every request handler.
///
/// The tree is swapped whole on reload; handlers clone the `Arc` and work on a
/// snapshot, so a reload never changes a tree under a running request.
pub struct AppState {
    pub server: ServerConfig,
    pub explorer: ExplorerConfig,
    pub fetcher: FsContentFetcher,
    pub renderer: MarkdownRenderer,
    pub syntax: SyntaxService,
    tree: RwLock<Arc<FileNode>>,
    tree_error: RwLock<Option<String>>,
    theme: Mutex<ThemeStore>,
}

impl AppState {
    /// Loads the tree for `server`. A tree that fails to load is not fatal:
    /// the explorer starts empty and shows the error.
    pub async fn load(server: ServerConfig, explorer: ExplorerConfig) -> Self {
        let (tree, error) = match load_tree(server.tree_source()).await {
            Ok(tree) => {
                tracing::info!("Loaded {} nodes from {:?}", tree.count(), server.tree_source());
                (tree, None)
            }
            Err(e) => {
                tracing::error!("Failed to load file tree: {}", e);
                (FileNode::empty_root(), Some(e.to_string()))
            }
        };
        let theme = ThemeStore::open(server.theme_file.clone());
        let mut state = Self::with_tree(server, explorer, tree);
        state.theme = Mutex::new(theme);
        state.tree_error = RwLock::new(error);
        state
    }

    /// State over a tree that is already built. The theme is kept in memory.
    pub fn with_tree(server: ServerConfig, explorer: ExplorerConfig, tree: FileNode) -> Self {
        Self {
            fetcher: FsContentFetcher::new(server.docs_root.clone()),
            renderer: MarkdownRenderer::new(),
            syntax: SyntaxService::new(),
            tree: RwLock::new(Arc::new(tree)),
            tree_error: RwLock::new(None),
            theme: Mutex::new(ThemeStore::in_memory()),
            server,
            explorer,
        }
    }

    pub async fn tree(&self) -> Arc<FileNode> {
        self.tree.read().await.clone()
    }

    pub async fn tree_error(&self) -> Option<String> {
        self.tree_error.read().await.clone()
    }

    /// Rebuilds the tree from its source and swaps it in. On failure the
    /// previous tree stays and the error is returned.
    pub async fn reload(&self) -> Result<usize> {
        let tree = load_tree(self.server.tree_source()).await?;
        let count = tree.count();
        *self.tree.write().await = Arc::new(tree);
        *self.tree_error.write().await = None;
        tracing::debug!("Tree reloaded with {} nodes", count);
        Ok(count)
    }

    pub async fn theme(&self) -> Theme {
        self.theme.lock().await.current()
    }

    pub async fn set_theme(&self, theme: Theme) -> Result<()> {
        self.theme.lock().await.set(theme)
    }

    pub async fn toggle_theme(&self) -> Result<Theme> {
        self.theme.lock().await.toggle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn missing_root_starts_empty_with_error() {
        let tmp = TempDir::new().unwrap();
        let server = ServerConfig {
            docs_root: tmp.path().join("missing"),
            ..ServerConfig::default()
        };
        let state = AppState::load(server, ExplorerConfig::default()).await;
        assert!(state.tree().await.children().is_empty());
        assert!(state.tree_error().await.is_some());
    }

    #[tokio::test]
    async fn reload_picks_up_new_files() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.md"), "# A").unwrap();
        let server = ServerConfig {
            docs_root: tmp.path().to_path_buf(),
            ..ServerConfig::default()
        };
        let state = AppState::load(server, ExplorerConfig::default()).await;
        let before = state.tree().await;
        assert_eq!(before.children().len(), 1);

        fs::write(tmp.path().join("b.md"), "# B").unwrap();
        assert_eq!(state.reload().await.unwrap(), 3);
        assert_eq!(state.tree().await.children().len(), 2);
        // Snapshots taken before the reload are untouched.
        assert_eq!(before.children().len(), 1);
    }

    #[tokio::test]
    async fn failed_reload_keeps_previous_tree() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("docs");
        fs::create_dir(&root).unwrap();
        fs::write(root.join("a.md"), "# A").unwrap();
        let server = ServerConfig {
            docs_root: root.clone(),
            ..ServerConfig::default()
        };
        let state = AppState::load(server, ExplorerConfig::default()).await;
        fs::remove_dir_all(&root).unwrap();

        assert!(state.reload().await.is_err());
        assert_eq!(state.tree().await.children().len(), 1);
    }

    #[tokio::test]
    async fn theme_toggles_in_memory() {
        let state = AppState::with_tree(
            ServerConfig::default(),
            ExplorerConfig::default(),
            FileNode::empty_root(),
        );
        let first = state.theme().await;
        let toggled = state.toggle_theme().await.unwrap();
        assert_eq!(toggled, first.toggled());
        state.set_theme(Theme::Dark).await.unwrap();
        assert_eq!(state.theme().await, Theme::Dark);
    }
}

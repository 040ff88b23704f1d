//! The explorer: a tree, a location in it, and the text shown for that
//! location.
//!
//! `Explorer` owns one navigation state and one content loader over a shared,
//! read-only tree. Every event runs to completion through the navigation
//! reducer, then the content loader is pointed at whatever node the reducer
//! settled on. Fetching is the only asynchronous step and goes through a
//! `ContentFetcher`.

pub mod auto_select;
pub mod breadcrumbs;
pub mod content;
pub mod navigation;
pub mod view;

use std::sync::Arc;

use crate::core::config::ExplorerConfig;
use crate::core::errors::Result;
use crate::models::{is_markdown_file, FileNode};
use crate::services::fs::content::ContentFetcher;
use crate::services::paths::{find_node_with, PathNormalizer};
use crate::services::search::search_nodes;

pub use auto_select::{auto_select_target, choose_child};
pub use breadcrumbs::{generate_breadcrumbs, Breadcrumb};
pub use content::{ContentLoader, ContentRequest, ContentState};
pub use navigation::{NavEvent, NavigationState, Transition};

pub struct Explorer {
    tree: Arc<FileNode>,
    config: ExplorerConfig,
    normalizer: PathNormalizer,
    navigation: NavigationState,
    content: ContentLoader,
    pending: Option<ContentRequest>,
    search_query: String,
    tree_error: Option<String>,
}

impl Explorer {
    /// Mounts at the configured initial route. The returned transition is the
    /// correction, if any, the address bar needs.
    pub fn mount(tree: Arc<FileNode>, config: ExplorerConfig) -> (Self, Transition) {
        let normalizer = config.normalizer();
        let (navigation, transition) = NavigationState::mount(&tree, &config);
        let mut explorer = Self {
            tree,
            config,
            normalizer,
            navigation,
            content: ContentLoader::new(),
            pending: None,
            search_query: String::new(),
            tree_error: None,
        };
        explorer.refresh_content();
        (explorer, transition)
    }

    /// Mounts over an empty tree after the tree source failed. The message is
    /// shown as a notice; navigation still works and settles at the root.
    pub fn with_error(config: ExplorerConfig, message: impl Into<String>) -> (Self, Transition) {
        let (mut explorer, transition) = Self::mount(Arc::new(FileNode::empty_root()), config);
        explorer.tree_error = Some(message.into());
        (explorer, transition)
    }

    /// Resumes from a navigation state kept by the client.
    pub fn restore(tree: Arc<FileNode>, config: ExplorerConfig, navigation: NavigationState) -> Self {
        let mut explorer = Self {
            normalizer: config.normalizer(),
            tree,
            config,
            navigation,
            content: ContentLoader::new(),
            pending: None,
            search_query: String::new(),
            tree_error: None,
        };
        explorer.refresh_content();
        explorer
    }

    pub fn dispatch(&mut self, event: NavEvent) -> Transition {
        tracing::debug!("Explorer event {:?} at {}", event, self.navigation.current_path());
        let transition = self.navigation.apply(&self.tree, &self.config, event);
        self.refresh_content();
        transition
    }

    /// Opens `node` as if it was clicked in the tree.
    pub fn open(&mut self, node: &FileNode) -> Transition {
        self.dispatch(NavEvent::Navigate(node.path.clone()))
    }

    pub fn navigate(&mut self, path: impl Into<String>) -> Transition {
        self.dispatch(NavEvent::Navigate(path.into()))
    }

    pub fn breadcrumb(&mut self, path: impl Into<String>) -> Transition {
        self.dispatch(NavEvent::Breadcrumb(path.into()))
    }

    pub fn back(&mut self) -> Transition {
        self.dispatch(NavEvent::Back)
    }

    pub fn forward(&mut self) -> Transition {
        self.dispatch(NavEvent::Forward)
    }

    /// Swaps in a rebuilt tree and re-resolves the current location against it.
    pub fn replace_tree(&mut self, tree: Arc<FileNode>) -> Transition {
        self.tree = tree;
        self.tree_error = None;
        let current = self.navigation.current_path().to_string();
        self.dispatch(NavEvent::External(current))
    }

    pub fn tree(&self) -> &FileNode {
        &self.tree
    }

    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    pub fn normalizer(&self) -> &PathNormalizer {
        &self.normalizer
    }

    pub fn navigation(&self) -> &NavigationState {
        &self.navigation
    }

    pub fn current_path(&self) -> &str {
        self.navigation.current_path()
    }

    pub fn current_node(&self) -> Option<&FileNode> {
        self.navigation.current_node(&self.tree, &self.normalizer)
    }

    /// Address-bar form of a normalized path. Markdown documents get `.md`
    /// back so shared links read like file paths.
    pub fn location(&self, path: &str) -> String {
        let last = path.rsplit('/').next().unwrap_or_default();
        match find_node_with(&self.tree, path, &self.normalizer) {
            Some(node) if node.is_markdown() && !is_markdown_file(last) => format!("{path}.md"),
            _ => path.to_string(),
        }
    }

    pub fn tree_error(&self) -> Option<&str> {
        self.tree_error.as_deref()
    }

    pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
        generate_breadcrumbs(self.current_path(), &self.config.root_path)
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    /// True while the sidebar shows search results instead of the tree.
    pub fn is_searching(&self) -> bool {
        self.config.enable_search && !self.search_query.trim().is_empty()
    }

    pub fn search_results(&self) -> Vec<&FileNode> {
        if !self.config.enable_search {
            return Vec::new();
        }
        search_nodes(&self.tree, &self.search_query)
    }

    pub fn content(&self) -> &ContentState {
        self.content.state()
    }

    /// The fetch the current node is waiting on, if any.
    pub fn pending_request(&self) -> Option<&ContentRequest> {
        self.pending.as_ref()
    }

    pub fn complete_content(&mut self, request: &ContentRequest, result: Result<String>) -> bool {
        if self.pending.as_ref() == Some(request) {
            self.pending = None;
        }
        self.content.complete(request, result)
    }

    /// Fetches the pending request, if any, and commits the result.
    pub async fn load_content<F: ContentFetcher>(&mut self, fetcher: &F) -> bool {
        let Some(request) = self.pending.take() else {
            return false;
        };
        let result = fetcher.fetch(&request.path).await;
        self.content.complete(&request, result)
    }

    fn refresh_content(&mut self) {
        let node = self.navigation.current_node(&self.tree, &self.normalizer);
        if let Some(request) = self.content.resolve(node) {
            self.pending = Some(request);
        } else if !self.content.is_loading() {
            self.pending = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::Error;

    struct MapFetcher;

    impl ContentFetcher for MapFetcher {
        async fn fetch(&self, path: &str) -> Result<String> {
            match path {
                "docs/guide.md" => Ok("# Guide".to_string()),
                other => Err(Error::NotFound(other.to_string())),
            }
        }
    }

    fn server_tree() -> Arc<FileNode> {
        Arc::new(FileNode::folder(
            "root",
            "/",
            vec![FileNode::folder(
                "docs",
                "docs",
                vec![
                    FileNode::file("broken.md", "docs/broken.md"),
                    FileNode::file("guide.md", "docs/guide.md"),
                ],
            )],
        ))
    }

    #[tokio::test]
    async fn mount_fetches_selected_document() {
        let config = ExplorerConfig::default()
            .with_auto_select(false)
            .with_initial_route("/docs/guide.md");
        let (mut explorer, transition) = Explorer::mount(server_tree(), config);
        assert_eq!(transition, Transition::None);
        assert!(explorer.pending_request().is_some());

        assert!(explorer.load_content(&MapFetcher).await);
        assert_eq!(
            explorer.content(),
            &ContentState::Ready {
                path: "docs/guide.md".into(),
                text: "# Guide".into()
            }
        );
        assert!(!explorer.load_content(&MapFetcher).await);
    }

    #[tokio::test]
    async fn fetch_failure_leaves_navigation_alone() {
        let config = ExplorerConfig::default().with_initial_route("/docs/broken.md");
        let (mut explorer, _) = Explorer::mount(server_tree(), config);
        explorer.load_content(&MapFetcher).await;
        assert!(matches!(explorer.content(), ContentState::Failed { .. }));
        assert_eq!(explorer.current_path(), "/docs/broken");
        assert_eq!(explorer.navigation().history(), ["/docs/broken"]);
    }

    #[test]
    fn navigating_away_discards_the_late_fetch() {
        let config = ExplorerConfig::default()
            .with_auto_select(false)
            .with_initial_route("/docs/guide.md");
        let (mut explorer, _) = Explorer::mount(server_tree(), config);
        let stale = explorer.pending_request().cloned().unwrap();

        explorer.navigate("/docs");
        assert!(explorer.pending_request().is_none());
        assert!(!explorer.complete_content(&stale, Ok("# Guide".into())));
        assert_eq!(explorer.content(), &ContentState::Idle);
    }

    #[test]
    fn tree_error_mounts_empty_explorer() {
        let (explorer, transition) = Explorer::with_error(
            ExplorerConfig::default().with_initial_route("/docs/guide"),
            "Failed to load file tree",
        );
        assert_eq!(transition, Transition::Replace("/".into()));
        assert_eq!(explorer.tree_error(), Some("Failed to load file tree"));
        assert!(explorer.tree().children().is_empty());
    }

    #[test]
    fn search_respects_config() {
        let tree = server_tree();
        let (mut explorer, _) = Explorer::mount(tree.clone(), ExplorerConfig::default());
        explorer.set_search_query("guide");
        assert!(explorer.is_searching());
        assert_eq!(explorer.search_results().len(), 1);

        let config = ExplorerConfig {
            enable_search: false,
            ..ExplorerConfig::default()
        };
        let (mut explorer, _) = Explorer::mount(tree, config);
        explorer.set_search_query("guide");
        assert!(!explorer.is_searching());
        assert!(explorer.search_results().is_empty());
    }

    #[test]
    fn breadcrumbs_follow_current_path() {
        let config = ExplorerConfig::default().with_auto_select(false);
        let (mut explorer, _) = Explorer::mount(server_tree(), config);
        explorer.navigate("docs/guide.md");
        let names: Vec<String> = explorer.breadcrumbs().into_iter().map(|b| b.name).collect();
        assert_eq!(names, vec!["Home", "docs", "guide"]);
        assert_eq!(explorer.location("/docs/guide"), "/docs/guide.md");
        assert_eq!(explorer.location("/docs"), "/docs");

        explorer.breadcrumb("/docs");
        assert_eq!(explorer.current_path(), "/docs");
    }

    #[test]
    fn reloaded_tree_falls_back_when_document_disappears() {
        let config = ExplorerConfig::default()
            .with_auto_select(false)
            .with_initial_route("/docs/guide.md");
        let (mut explorer, _) = Explorer::mount(server_tree(), config);
        let shrunk = Arc::new(FileNode::folder(
            "root",
            "/",
            vec![FileNode::folder("docs", "docs", vec![])],
        ));
        assert_eq!(explorer.replace_tree(shrunk), Transition::Replace("/docs".into()));
    }
}

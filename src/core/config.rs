use std::path::PathBuf;
use std::time::Duration;

use crate::services::fs::tree::TreeSource;
use crate::services::paths::PathNormalizer;

/// Root documents addressed by exact file name rather than by extension-less path.
pub const DEFAULT_RESERVED_DOCUMENTS: [&str; 2] = ["README", "changelog"];
/// Documents auto-select prefers when a folder is opened.
pub const DEFAULT_INDEX_DOCUMENTS: [&str; 1] = ["readme.md"];
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3011;
pub const DEFAULT_RELOAD_DEBOUNCE: Duration = Duration::from_millis(250);
/// Browser origins of the development front end.
pub const DEFAULT_CORS_ORIGINS: [&str; 2] = ["http://localhost:3004", "http://127.0.0.1:3004"];

/// Behaviour of a single explorer instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplorerConfig {
    /// Path the breadcrumbs label "Home".
    pub root_path: String,
    /// Where the explorer lands on mount. Falls back to `root_path`.
    pub initial_route: Option<String>,
    /// Show folders as folders instead of redirecting into a child document.
    pub disable_auto_select: bool,
    /// Stems (e.g. `README`) of root documents that keep their extension when
    /// normalized and are matched by exact name at the tree root.
    pub reserved_documents: Vec<String>,
    /// File names auto-select picks first, compared case-insensitively.
    pub index_documents: Vec<String>,
    pub enable_search: bool,
    pub show_breadcrumbs: bool,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            root_path: "/".to_string(),
            initial_route: None,
            disable_auto_select: false,
            reserved_documents: DEFAULT_RESERVED_DOCUMENTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            index_documents: DEFAULT_INDEX_DOCUMENTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            enable_search: true,
            show_breadcrumbs: true,
        }
    }
}

impl ExplorerConfig {
    pub fn normalizer(&self) -> PathNormalizer {
        PathNormalizer::new(self.reserved_documents.iter().cloned())
    }

    pub fn initial_path(&self) -> &str {
        self.initial_route.as_deref().unwrap_or(&self.root_path)
    }

    pub fn auto_select_enabled(&self) -> bool {
        !self.disable_auto_select
    }

    pub fn with_auto_select(mut self, enabled: bool) -> Self {
        self.disable_auto_select = !enabled;
        self
    }

    pub fn with_initial_route(mut self, route: impl Into<String>) -> Self {
        self.initial_route = Some(route.into());
        self
    }
}

/// Settings for the HTTP server that exposes a docs directory.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub docs_root: PathBuf,
    /// Serve this exported tree instead of walking `docs_root`. Documents are
    /// still read from `docs_root`.
    pub tree_json: Option<PathBuf>,
    pub host: String,
    pub port: u16,
    /// Rebuild the tree when files under `docs_root` change.
    pub watch: bool,
    pub reload_debounce: Duration,
    pub include_hidden: bool,
    /// Settings file holding the persisted theme. In-memory only when unset.
    pub theme_file: Option<PathBuf>,
    /// Origins allowed to call the API from a browser, with credentials.
    pub cors_origins: Vec<String>,
    pub service_name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            docs_root: PathBuf::from("."),
            tree_json: None,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            watch: true,
            reload_debounce: DEFAULT_RELOAD_DEBOUNCE,
            include_hidden: false,
            theme_file: None,
            cors_origins: DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect(),
            service_name: env!("CARGO_PKG_NAME").to_string(),
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn tree_source(&self) -> TreeSource {
        match &self.tree_json {
            Some(path) => TreeSource::StaticJson(path.clone()),
            None => TreeSource::Directory {
                root: self.docs_root.clone(),
                include_hidden: self.include_hidden,
            },
        }
    }
}

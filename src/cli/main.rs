use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use mdex::core::config::{ExplorerConfig, ServerConfig, DEFAULT_HOST, DEFAULT_PORT};
use mdex::core::telemetry::logging::{init_logging_with, DEFAULT_FILTER, VERBOSE_FILTER};
use mdex::services::fs::export::export_static;
use mdex::services::fs::tree::{load_tree, TreeSource};
use mdex::services::paths::resolve_path;
use mdex::services::search::{search, SearchRequest, DEFAULT_SEARCH_LIMIT};

#[derive(Parser)]
#[command(name = "mdex")]
#[command(about = "Browse a directory of markdown documents", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the explorer and its JSON API over HTTP
    Serve(ServeArgs),

    /// Write a static export (tree, document list, document contents)
    Export(ExportArgs),

    /// Print the tree as JSON
    Tree(SourceArgs),

    /// Show where a path lands in the tree
    Resolve(ResolveArgs),

    /// Search node names and paths
    Search(SearchArgs),
}

#[derive(Args)]
struct SourceArgs {
    /// Documentation root
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Read the tree from an exported folder-structure.json instead of walking --root
    #[arg(long)]
    tree_json: Option<PathBuf>,

    /// Include dot-files and dot-directories
    #[arg(long)]
    include_hidden: bool,
}

impl SourceArgs {
    fn tree_source(&self) -> TreeSource {
        match &self.tree_json {
            Some(path) => TreeSource::StaticJson(path.clone()),
            None => TreeSource::Directory {
                root: self.root.clone(),
                include_hidden: self.include_hidden,
            },
        }
    }
}

#[derive(Args)]
struct ExplorerArgs {
    /// Show folders instead of redirecting into their index document
    #[arg(long)]
    no_auto_select: bool,

    /// Root document addressed by exact name (repeatable, replaces the defaults)
    #[arg(long = "reserved-doc")]
    reserved_docs: Vec<String>,

    /// File auto-select prefers inside a folder (repeatable, replaces the defaults)
    #[arg(long = "index-doc")]
    index_docs: Vec<String>,

    /// Hide the search box and disable /api/search
    #[arg(long)]
    no_search: bool,
}

impl ExplorerArgs {
    fn config(&self) -> ExplorerConfig {
        let mut config = ExplorerConfig::default().with_auto_select(!self.no_auto_select);
        if !self.reserved_docs.is_empty() {
            config.reserved_documents = self.reserved_docs.clone();
        }
        if !self.index_docs.is_empty() {
            config.index_documents = self.index_docs.clone();
        }
        config.enable_search = !self.no_search;
        config
    }
}

#[derive(Args)]
struct ServeArgs {
    #[command(flatten)]
    source: SourceArgs,

    #[command(flatten)]
    explorer: ExplorerArgs,

    #[arg(long, default_value = DEFAULT_HOST)]
    host: String,

    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Do not reload the tree when files change
    #[arg(long)]
    no_watch: bool,

    /// Debounce for file-change reloads (ms)
    #[arg(long, default_value_t = 250)]
    debounce_ms: u64,

    /// JSON settings file the theme choice is kept in
    #[arg(long)]
    theme_file: Option<PathBuf>,

    /// Browser origin allowed to call the API (repeatable, replaces the defaults)
    #[arg(long = "cors-origin")]
    cors_origins: Vec<String>,
}

#[derive(Args)]
struct ExportArgs {
    /// Documentation root
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Output directory
    #[arg(long, short)]
    out: PathBuf,

    #[arg(long)]
    include_hidden: bool,
}

#[derive(Args)]
struct ResolveArgs {
    #[command(flatten)]
    source: SourceArgs,

    #[command(flatten)]
    explorer: ExplorerArgs,

    path: String,
}

#[derive(Args)]
struct SearchArgs {
    #[command(flatten)]
    source: SourceArgs,

    query: String,

    #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT)]
    limit: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging_with(if cli.verbose { VERBOSE_FILTER } else { DEFAULT_FILTER });

    match cli.command {
        Commands::Serve(args) => {
            let server = ServerConfig {
                docs_root: args.source.root.clone(),
                tree_json: args.source.tree_json.clone(),
                host: args.host,
                port: args.port,
                watch: !args.no_watch,
                reload_debounce: std::time::Duration::from_millis(args.debounce_ms),
                include_hidden: args.source.include_hidden,
                theme_file: args.theme_file,
                ..ServerConfig::default()
            };
            let server = if args.cors_origins.is_empty() {
                server
            } else {
                ServerConfig {
                    cors_origins: args.cors_origins,
                    ..server
                }
            };
            mdex::server::serve(server, args.explorer.config())
                .await
                .context("server failed")?;
        }
        Commands::Export(args) => {
            let summary = tokio::task::spawn_blocking(move || {
                export_static(&args.root, &args.out, args.include_hidden)
            })
            .await??;
            tracing::info!(
                "Exported {} documents ({} nodes) to {}",
                summary.documents,
                summary.nodes,
                summary.output_dir.display()
            );
        }
        Commands::Tree(source) => {
            let tree = load_tree(source.tree_source())
                .await
                .context("failed to load tree")?;
            println!("{}", serde_json::to_string_pretty(&tree)?);
        }
        Commands::Resolve(args) => {
            let tree = load_tree(args.source.tree_source())
                .await
                .context("failed to load tree")?;
            let normalizer = args.explorer.config().normalizer();
            let resolution = resolve_path(&tree, &args.path, &normalizer);
            println!("{}", serde_json::to_string_pretty(&resolution)?);
        }
        Commands::Search(args) => {
            let tree = load_tree(args.source.tree_source())
                .await
                .context("failed to load tree")?;
            let hits = search(&tree, &SearchRequest::new(args.query).with_limit(args.limit));
            println!("{}", serde_json::to_string_pretty(&hits)?);
        }
    }

    Ok(())
}

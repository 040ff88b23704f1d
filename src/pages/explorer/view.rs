//! Server-side HTML for the explorer page.
//!
//! The page is plain HTML with no script: tree entries and breadcrumbs are
//! links back into the explorer, folders collapse with `<details>`, search is
//! a GET form and the theme toggle a POST form.

use serde_json::{Map, Value};

use crate::core::theme::Theme;
use crate::models::{file_extension, is_markdown_file, FileNode};
use crate::services::markdown::{escape_html, MarkdownRenderer};
use crate::services::syntax::SyntaxService;

use super::content::ContentState;
use super::Explorer;

pub const STYLESHEET_HREF: &str = "/assets/explorer.css";
pub const THEME_TOGGLE_ACTION: &str = "/theme/toggle";

pub struct PageContext<'a> {
    pub title: &'a str,
    pub theme: Theme,
    pub renderer: &'a MarkdownRenderer,
    pub syntax: &'a SyntaxService,
}

pub fn render_page(explorer: &Explorer, ctx: &PageContext<'_>) -> String {
    let location = explorer.location(explorer.current_path());
    let mut html = String::with_capacity(8 * 1024);
    html.push_str("<!DOCTYPE html>\n");
    html.push_str(&format!(
        "<html lang=\"en\" data-theme=\"{}\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{}</title>\n<link rel=\"stylesheet\" href=\"{}\">\n</head>\n<body>\n",
        ctx.theme.as_str(),
        escape_html(&page_title(explorer, ctx.title)),
        STYLESHEET_HREF,
    ));
    html.push_str("<div class=\"markdown-explorer\">\n");

    html.push_str("<aside class=\"sidebar\">\n");
    html.push_str(&render_toolbar(explorer, ctx.theme, &location));
    if explorer.config().enable_search {
        html.push_str(&render_search_form(explorer.search_query()));
    }
    if explorer.is_searching() {
        html.push_str(&render_search_results(explorer));
    } else {
        html.push_str("<nav class=\"file-tree\">\n");
        html.push_str(&render_tree(explorer.tree(), explorer));
        html.push_str("</nav>\n");
    }
    html.push_str("</aside>\n");

    html.push_str("<main class=\"main-content\">\n");
    if let Some(error) = explorer.tree_error() {
        html.push_str(&format!(
            "<div class=\"tree-error\" role=\"alert\"><strong>Could not load the file tree.</strong> {}</div>\n",
            escape_html(error)
        ));
    }
    if explorer.config().show_breadcrumbs {
        html.push_str(&render_breadcrumbs(explorer));
    }
    html.push_str("<div class=\"content-area\">\n");
    html.push_str(&render_content(explorer, ctx));
    html.push_str("</div>\n</main>\n</div>\n</body>\n</html>\n");
    html
}

fn page_title(explorer: &Explorer, title: &str) -> String {
    match explorer.current_node() {
        Some(node) if node.path != "/" => format!("{} - {}", node.name, title),
        _ => title.to_string(),
    }
}

fn render_toolbar(explorer: &Explorer, theme: Theme, location: &str) -> String {
    let label = if theme.is_dark() { "Light mode" } else { "Dark mode" };
    format!(
        "<header class=\"sidebar-header\">\n<a class=\"home\" href=\"{home}\">Docs</a>\n\
         <form method=\"post\" action=\"{action}\" class=\"theme-toggle\">\
         <input type=\"hidden\" name=\"back\" value=\"{back}\">\
         <button type=\"submit\">{label}</button></form>\n</header>\n",
        home = href(&explorer.config().root_path),
        action = THEME_TOGGLE_ACTION,
        back = escape_html(&href(location)),
    )
}

fn render_search_form(query: &str) -> String {
    format!(
        "<form class=\"search\" method=\"get\">\
         <input type=\"search\" name=\"q\" placeholder=\"Search files...\" value=\"{}\">\
         </form>\n",
        escape_html(query)
    )
}

fn render_search_results(explorer: &Explorer) -> String {
    let results = explorer.search_results();
    if results.is_empty() {
        return format!(
            "<p class=\"no-results\">No files match \"{}\".</p>\n",
            escape_html(explorer.search_query().trim())
        );
    }
    let mut html = String::from("<ul class=\"search-results\">\n");
    for node in results {
        html.push_str(&format!(
            "<li><a href=\"{}\">{} {}</a><span class=\"result-path\">{}</span></li>\n",
            href(&node.path),
            file_icon(node),
            escape_html(&node.name),
            escape_html(&node.path),
        ));
    }
    html.push_str("</ul>\n");
    html
}

fn render_tree(root: &FileNode, explorer: &Explorer) -> String {
    let current = explorer.current_node().map(|n| n.path.as_str());
    let mut html = String::from("<ul class=\"tree\">\n");
    for child in root.children() {
        render_tree_node(child, current, &mut html);
    }
    html.push_str("</ul>\n");
    html
}

fn render_tree_node(node: &FileNode, current: Option<&str>, html: &mut String) {
    let active = current == Some(node.path.as_str());
    let class = if active { " class=\"active\"" } else { "" };
    let link = format!(
        "<a href=\"{}\"{}>{} {}</a>",
        href(&node.path),
        class,
        file_icon(node),
        escape_html(&node.name)
    );

    if node.is_file() {
        html.push_str(&format!("<li class=\"file\">{link}</li>\n"));
        return;
    }

    let open = active || current.is_some_and(|c| is_ancestor(&node.path, c));
    html.push_str(&format!(
        "<li class=\"folder\"><details{}><summary>{}</summary>\n<ul>\n",
        if open { " open" } else { "" },
        link
    ));
    for child in node.children() {
        render_tree_node(child, current, html);
    }
    html.push_str("</ul>\n</details></li>\n");
}

fn is_ancestor(folder: &str, path: &str) -> bool {
    let folder = folder.trim_matches('/');
    let path = path.trim_start_matches('/');
    !folder.is_empty() && path.len() > folder.len() && path.starts_with(folder)
        && path.as_bytes()[folder.len()] == b'/'
}

fn render_breadcrumbs(explorer: &Explorer) -> String {
    let crumbs = explorer.breadcrumbs();
    let last = crumbs.len().saturating_sub(1);
    let mut html = String::from("<nav class=\"breadcrumbs\" aria-label=\"Breadcrumb\"><ol>");
    for (i, crumb) in crumbs.iter().enumerate() {
        if i == last {
            html.push_str(&format!(
                "<li aria-current=\"page\">{}</li>",
                escape_html(&crumb.name)
            ));
        } else {
            html.push_str(&format!(
                "<li><a href=\"{}\">{}</a></li>",
                href(&crumb.path),
                escape_html(&crumb.name)
            ));
        }
    }
    html.push_str("</ol></nav>\n");
    html
}

fn render_content(explorer: &Explorer, ctx: &PageContext<'_>) -> String {
    let Some(node) = explorer.current_node() else {
        return empty_state(
            "Path not found",
            "The requested path could not be found in the file tree.",
        );
    };
    if node.is_folder() {
        return render_folder(node);
    }

    let text = match explorer.content() {
        ContentState::Loading { .. } => {
            return empty_state("Loading...", "Please wait while the file content is loaded.")
        }
        ContentState::Failed { message, .. } => return empty_state("Error", message),
        ContentState::Ready { text, .. } => Some(text.as_str()),
        ContentState::Idle => None,
    };

    if is_markdown_file(&node.name) {
        render_document(node, text, ctx)
    } else {
        render_file_preview(node, text, ctx)
    }
}

fn render_document(node: &FileNode, text: Option<&str>, ctx: &PageContext<'_>) -> String {
    let Some(text) = text.filter(|t| !t.trim().is_empty()) else {
        return empty_state(
            "No content available",
            "This file appears to be empty or could not be loaded.",
        );
    };
    let rendered = ctx.renderer.render_document(text);
    let mut meta = node.metadata.clone().unwrap_or_default();
    for (key, value) in rendered.front_matter {
        meta.entry(key).or_insert(value);
    }

    let mut html = String::from("<article class=\"markdown-viewer\">\n");
    html.push_str(&front_matter_header(&meta));
    html.push_str(&rendered.html);
    html.push_str("</article>\n");
    html
}

fn front_matter_header(meta: &Map<String, Value>) -> String {
    if meta.is_empty() {
        return String::new();
    }
    let mut html = String::from("<header class=\"frontmatter\">\n");
    if let Some(title) = meta.get("title").and_then(Value::as_str) {
        html.push_str(&format!("<h1 class=\"frontmatter-title\">{}</h1>\n", escape_html(title)));
    }
    if let Some(description) = meta.get("description").and_then(Value::as_str) {
        html.push_str(&format!(
            "<p class=\"frontmatter-description\">{}</p>\n",
            escape_html(description)
        ));
    }
    if let Some(date) = meta.get("date").and_then(Value::as_str) {
        html.push_str(&format!("<span class=\"frontmatter-date\">{}</span>\n", escape_html(date)));
    }
    if let Some(tags) = meta.get("tags").and_then(Value::as_array) {
        html.push_str("<div class=\"frontmatter-tags\">");
        for tag in tags.iter().filter_map(Value::as_str) {
            html.push_str(&format!("<span class=\"tag\">#{}</span>", escape_html(tag)));
        }
        html.push_str("</div>\n");
    }
    html.push_str("</header>\n");
    html
}

fn render_file_preview(node: &FileNode, text: Option<&str>, ctx: &PageContext<'_>) -> String {
    let mut html = format!(
        "<div class=\"file-viewer\">\n<h3>File: {}</h3>\n",
        escape_html(&node.name)
    );
    if let Some(size) = node.size {
        html.push_str(&format!("<p class=\"file-size\">{}</p>\n", format_file_size(size)));
    }
    match text {
        Some(text) if !text.is_empty() => {
            let ext = file_extension(&node.name);
            html.push_str(&ctx.syntax.highlight_html(text, ext.as_deref(), ctx.theme));
        }
        _ => html.push_str("<p>This file type is not supported for preview.</p>\n"),
    }
    html.push_str("</div>\n");
    html
}

fn render_folder(folder: &FileNode) -> String {
    let mut html = format!(
        "<div class=\"folder-view\">\n<h2>{} {}</h2>\n",
        file_icon(folder),
        escape_html(&folder.name)
    );
    if folder.children().is_empty() {
        html.push_str("<p>This folder is empty.</p>\n</div>\n");
        return html;
    }
    html.push_str("<div class=\"file-grid\">\n");
    for child in folder.children() {
        let kind = if child.is_folder() {
            String::new()
        } else {
            let ext = file_extension(&child.name).unwrap_or_default().to_uppercase();
            format!("<span class=\"file-card-type\">{}</span>", escape_html(&ext))
        };
        html.push_str(&format!(
            "<a class=\"file-card {}\" href=\"{}\"><span class=\"file-card-icon\">{}</span>\
             <span class=\"file-card-name\">{}</span>{}</a>\n",
            child.kind.as_str(),
            href(&child.path),
            file_icon(child),
            escape_html(&child.name),
            kind
        ));
    }
    html.push_str("</div>\n</div>\n");
    html
}

fn empty_state(title: &str, message: &str) -> String {
    format!(
        "<div class=\"empty-state\"><h3>{}</h3><p>{}</p></div>\n",
        escape_html(title),
        escape_html(message)
    )
}

pub fn file_icon(node: &FileNode) -> &'static str {
    if node.is_folder() {
        return "📁";
    }
    match file_extension(&node.name).as_deref() {
        Some("md" | "markdown" | "mdown" | "mkd" | "mdx") => "📝",
        Some("json") => "📋",
        Some("js" | "jsx") => "📜",
        Some("ts" | "tsx") => "📘",
        Some("css") => "🎨",
        Some("html") => "🌐",
        Some("png" | "jpg" | "jpeg" | "gif" | "svg") => "🖼️",
        Some("pdf") => "📕",
        Some("zip" | "tar" | "gz") => "📦",
        _ => "📄",
    }
}

/// Human-readable size in binary units, at most two decimals:
/// `0 Bytes`, `512 Bytes`, `1.5 KB`, `2 MB`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    let formatted = format!("{value:.2}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[unit])
}

/// Explorer URL for a tree path, slash-rooted and percent-encoded.
/// Segments are encoded one by one so the separators survive.
pub fn href(path: &str) -> String {
    let segments: Vec<_> = path
        .trim_start_matches('/')
        .split('/')
        .map(urlencoding::encode)
        .collect();
    format!("/{}", segments.join("/"))
}

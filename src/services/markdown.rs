use comrak::{markdown_to_html, Options};
use serde_json::{Map, Value};

/// Renders GitHub-flavoured markdown to HTML.
///
/// Raw HTML in documents is escaped. Headings get `id` anchors so fragment
/// links (`intro.md#install`) land on the right section.
#[derive(Debug, Clone)]
pub struct MarkdownRenderer {
    options: Options,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// A rendered document and the front matter found above it.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedDocument {
    pub html: String,
    pub front_matter: Map<String, Value>,
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        let mut options = Options::default();
        options.extension.strikethrough = true;
        options.extension.table = true;
        options.extension.autolink = true;
        options.extension.tasklist = true;
        options.extension.footnotes = true;
        options.extension.header_ids = Some(String::new());
        options.extension.front_matter_delimiter = Some("---".to_string());
        options.render.unsafe_ = false;
        Self { options }
    }

    pub fn render(&self, markdown: &str) -> String {
        markdown_to_html(markdown, &self.options)
    }

    pub fn render_document(&self, markdown: &str) -> RenderedDocument {
        RenderedDocument {
            html: self.render(markdown),
            front_matter: front_matter(markdown),
        }
    }
}

/// Flat `key: value` pairs from a leading `---` block.
///
/// Only the subset documents actually use is understood: scalars, quoted
/// strings, and inline lists (`tags: [a, b]`). Anything else is kept as a
/// plain string.
pub fn front_matter(markdown: &str) -> Map<String, Value> {
    let mut map = Map::new();
    let mut lines = markdown.lines();
    if lines.next().map(str::trim_end) != Some("---") {
        return map;
    }

    let mut closed = false;
    let mut block = Vec::new();
    for line in lines {
        if line.trim_end() == "---" {
            closed = true;
            break;
        }
        block.push(line);
    }
    if !closed {
        return map;
    }

    for line in block {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() || key.starts_with('#') {
            continue;
        }
        map.insert(key.to_string(), scalar(value.trim()));
    }
    map
}

fn scalar(raw: &str) -> Value {
    if let Some(inner) = raw.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
        return Value::Array(
            inner
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| Value::String(unquote(s).to_string()))
                .collect(),
        );
    }
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => match raw.parse::<i64>() {
            Ok(n) => Value::from(n),
            Err(_) => Value::String(unquote(raw).to_string()),
        },
    }
}

fn unquote(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .or_else(|| s.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')))
        .unwrap_or(s)
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

use std::sync::Arc;

use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use crate::core::theme::Theme;
use crate::services::markdown::escape_html;

const LIGHT_THEME: &str = "InspiredGitHub";
const DARK_THEME: &str = "base16-ocean.dark";

/// Highlights non-markdown files shown in the preview pane.
#[derive(Clone)]
pub struct SyntaxService {
    pub syntax_set: Arc<SyntaxSet>,
    pub theme_set: Arc<ThemeSet>,
}

impl Default for SyntaxService {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntaxService {
    pub fn new() -> Self {
        Self {
            syntax_set: Arc::new(SyntaxSet::load_defaults_newlines()),
            theme_set: Arc::new(ThemeSet::load_defaults()),
        }
    }

    /// Standalone `<pre>` block for `text`. Unknown extensions render as
    /// plain text; if highlighting fails the text is escaped instead.
    pub fn highlight_html(&self, text: &str, extension: Option<&str>, theme: Theme) -> String {
        let syntax = extension
            .and_then(|ext| self.syntax_set.find_syntax_by_extension(ext))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let theme_name = if theme.is_dark() { DARK_THEME } else { LIGHT_THEME };
        let Some(highlight_theme) = self
            .theme_set
            .themes
            .get(theme_name)
            .or_else(|| self.theme_set.themes.values().next())
        else {
            return plain_block(text);
        };

        match highlighted_html_for_string(text, &self.syntax_set, syntax, highlight_theme) {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!("Highlighting failed, showing plain text: {}", e);
                plain_block(text)
            }
        }
    }
}

fn plain_block(text: &str) -> String {
    format!("<pre class=\"plain\"><code>{}</code></pre>", escape_html(text))
}

use std::borrow::Cow;

use mime_guess::Mime;
use rust_embed::RustEmbed;

/// Static files compiled into the binary.
#[derive(RustEmbed)]
#[folder = "assets/"]
pub struct Assets;

impl Assets {
    /// Bytes and content type of the embedded file at `path`.
    pub fn load(path: &str) -> Option<(Cow<'static, [u8]>, Mime)> {
        let file = Self::get(path.trim_start_matches('/'))?;
        Some((file.data, content_type(path)))
    }

    pub fn list(prefix: &str) -> Vec<String> {
        Self::iter()
            .filter(|p| p.starts_with(prefix))
            .map(|p| p.to_string())
            .collect()
    }
}

/// Guessed from the extension; unknown types are served as octet streams.
pub fn content_type(path: &str) -> Mime {
    mime_guess::from_path(path).first_or_octet_stream()
}

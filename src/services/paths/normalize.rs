//! Canonical string form of explorer paths.
//!
//! Every location the explorer sees (URL path, tree node path, breadcrumb
//! target) is reduced to one shape before lookup:
//!
//! - a single leading `/`, no trailing `/` (except the root itself)
//! - no `?query` or `#fragment` suffix
//! - backslashes turned into forward slashes
//! - no markdown-family extension on the last segment, unless the segment is
//!   a reserved document such as `README.md`, which is addressed by its full
//!   file name
//!
//! Normalization is pure string work and idempotent.

use crate::core::config::DEFAULT_RESERVED_DOCUMENTS;
use crate::models::MARKDOWN_EXTENSIONS;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathNormalizer {
    reserved: Vec<String>,
}

impl Default for PathNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_RESERVED_DOCUMENTS)
    }
}

impl PathNormalizer {
    /// `reserved` holds document stems (`README`, `changelog`), matched
    /// case-insensitively.
    pub fn new<I, S>(reserved: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            reserved: reserved.into_iter().map(Into::into).collect(),
        }
    }

    pub fn reserved(&self) -> &[String] {
        &self.reserved
    }

    fn is_reserved_stem(&self, stem: &str) -> bool {
        self.reserved.iter().any(|r| r.eq_ignore_ascii_case(stem))
    }

    /// True when `file_name` is a reserved document with a markdown extension.
    pub fn is_reserved_document(&self, file_name: &str) -> bool {
        markdown_stem(file_name)
            .map(|stem| self.is_reserved_stem(stem))
            .unwrap_or(false)
    }

    /// Exact spellings looked up directly among the root's children:
    /// `README.md` and `/README.md` for every reserved stem.
    pub fn reserved_root_names(&self) -> Vec<String> {
        self.reserved
            .iter()
            .flat_map(|stem| [format!("{stem}.md"), format!("/{stem}.md")])
            .collect()
    }

    pub fn is_reserved_root_name(&self, path: &str) -> bool {
        self.reserved.iter().any(|stem| {
            let bare = path.strip_prefix('/').unwrap_or(path);
            bare.strip_suffix(".md") == Some(stem.as_str())
        })
    }

    pub fn normalize(&self, path: &str) -> String {
        let path = path.replace('\\', "/");
        let end = path.find(['?', '#']).unwrap_or(path.len());
        let body = path[..end].trim_matches('/');
        if body.is_empty() {
            return "/".to_string();
        }

        let mut out = format!("/{body}");
        loop {
            let segment_start = out.rfind('/').map(|i| i + 1).unwrap_or(0);
            let stem_len = match markdown_stem(&out[segment_start..]) {
                Some(stem) if !self.is_reserved_stem(stem) => stem.len(),
                _ => break,
            };
            out.truncate(segment_start + stem_len);
        }
        out
    }
}

/// Normalizes with the default reserved documents.
pub fn normalize(path: &str) -> String {
    PathNormalizer::default().normalize(path)
}

/// The part of `segment` before a markdown-family extension.
fn markdown_stem(segment: &str) -> Option<&str> {
    let dot = segment.rfind('.')?;
    if dot == 0 {
        return None;
    }
    let ext = &segment[dot + 1..];
    MARKDOWN_EXTENSIONS
        .iter()
        .any(|m| m.eq_ignore_ascii_case(ext))
        .then(|| &segment[..dot])
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use proptest::test_runner::TestCaseError;

    #[test]
    fn empty_and_slashes_map_to_root() {
        assert_eq!(normalize(""), "/");
        assert_eq!(normalize("/"), "/");
        assert_eq!(normalize("///"), "/");
        assert_eq!(normalize("?tab=1"), "/");
        assert_eq!(normalize("#top"), "/");
    }

    #[test]
    fn adds_leading_and_strips_trailing_slash() {
        assert_eq!(normalize("guide"), "/guide");
        assert_eq!(normalize("guide/"), "/guide");
        assert_eq!(normalize("//guide//"), "/guide");
        assert_eq!(normalize("guide\\setup"), "/guide/setup");
    }

    #[test]
    fn strips_query_and_fragment() {
        assert_eq!(normalize("/guide/intro?x=1"), "/guide/intro");
        assert_eq!(normalize("/guide/intro.md#install"), "/guide/intro");
        assert_eq!(normalize("/guide/?x=1#y"), "/guide");
    }

    #[test]
    fn strips_markdown_extensions() {
        assert_eq!(normalize("/guide/intro.md"), "/guide/intro");
        assert_eq!(normalize("/guide/intro.MARKDOWN"), "/guide/intro");
        assert_eq!(normalize("/guide/intro.md.md"), "/guide/intro");
        assert_eq!(normalize("/guide/diagram.png"), "/guide/diagram.png");
        assert_eq!(normalize("/guide/.md"), "/guide/.md");
    }

    #[test]
    fn reserved_documents_keep_their_extension() {
        assert_eq!(normalize("README.md"), "/README.md");
        assert_eq!(normalize("/readme.md"), "/readme.md");
        assert_eq!(normalize("changelog.md"), "/changelog.md");
        assert_eq!(normalize("/guide/README.md"), "/guide/README.md");
        assert_eq!(normalize("/README.md.md"), "/README.md");
    }

    #[test]
    fn reserved_list_is_configurable() {
        let normalizer = PathNormalizer::new(["LICENSE"]);
        assert_eq!(normalizer.normalize("/LICENSE.md"), "/LICENSE.md");
        assert_eq!(normalizer.normalize("/README.md"), "/README");
        assert_eq!(normalizer.reserved_root_names(), vec!["LICENSE.md", "/LICENSE.md"]);
        assert!(normalizer.is_reserved_root_name("/LICENSE.md"));
        assert!(!normalizer.is_reserved_root_name("/license.md"));
    }

    fn assert_canonical(input: &str, normalizer: &PathNormalizer) -> Result<(), TestCaseError> {
        let once = normalizer.normalize(input);
        prop_assert_eq!(&normalizer.normalize(&once), &once, "not idempotent for {:?}", input);
        prop_assert!(once.starts_with('/'), "{:?} -> {:?}", input, once);
        prop_assert!(once == "/" || !once.ends_with('/'), "{:?} -> {:?}", input, once);
        prop_assert!(!once.contains(['?', '#', '\\']), "{:?} -> {:?}", input, once);
        Ok(())
    }

    fn segment() -> impl Strategy<Value = String> {
        prop_oneof![
            "[a-zA-Z0-9 _ü-]{1,8}",
            "[a-zA-Z0-9.]{0,6}\\.(md|MD|markdown|Mdx|mdown|mkd|png)?",
            Just("README.md".to_string()),
            Just("changelog.MD.md".to_string()),
            Just(".".to_string()),
            Just(String::new()),
        ]
    }

    fn raw_path() -> impl Strategy<Value = String> {
        (
            "[/\\\\]{0,2}",
            prop::collection::vec(segment(), 0..6),
            "[/\\\\]{0,3}",
            "([?#][a-z=#?/.]{0,8})?",
        )
            .prop_map(|(lead, segments, trail, tail)| {
                format!("{lead}{}{trail}{tail}", segments.join("/"))
            })
    }

    proptest! {
        #[test]
        fn normalized_paths_are_canonical(input in raw_path()) {
            assert_canonical(&input, &PathNormalizer::default())?;
            assert_canonical(&input, &PathNormalizer::new(["LICENSE", "notes"]))?;
        }

        #[test]
        fn arbitrary_text_normalizes_canonically(input in "\\PC{0,40}") {
            assert_canonical(&input, &PathNormalizer::default())?;
        }
    }
}

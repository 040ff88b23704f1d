use serde::{Deserialize, Serialize};

use crate::models::{FileNode, NodeKind};

pub const DEFAULT_SEARCH_LIMIT: usize = 50;
const SNIPPET_CHARS: usize = 120;

/// Which field of a node matched the query. Checked in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchField {
    Name,
    Path,
    Content,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchRequest {
    #[serde(alias = "q", default)]
    pub query: String,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    DEFAULT_SEARCH_LIMIT
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            limit: DEFAULT_SEARCH_LIMIT,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub name: String,
    pub path: String,
    pub kind: NodeKind,
    pub matched: MatchField,
    /// The first content line containing the query, for content matches.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

/// Case-insensitive substring scan over every node's name, path and inline
/// content, in depth-first pre-order. Each node appears at most once and the
/// results are unranked. A blank query matches nothing.
pub fn search_nodes<'a>(tree: &'a FileNode, query: &str) -> Vec<&'a FileNode> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    tree.iter()
        .filter(|node| match_field(node, &needle).is_some())
        .collect()
}

/// Runs `search_nodes` and shapes the first `limit` results for the API.
pub fn search(tree: &FileNode, request: &SearchRequest) -> Vec<SearchHit> {
    let needle = request.query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let hits: Vec<SearchHit> = tree
        .iter()
        .filter_map(|node| {
            let matched = match_field(node, &needle)?;
            let snippet = match matched {
                MatchField::Content => node.content.as_deref().and_then(|c| snippet(c, &needle)),
                _ => None,
            };
            Some(SearchHit {
                name: node.name.clone(),
                path: node.path.clone(),
                kind: node.kind,
                matched,
                snippet,
            })
        })
        .take(request.limit)
        .collect();

    tracing::debug!("Search '{}' returned {} hits", request.query, hits.len());
    hits
}

fn match_field(node: &FileNode, needle: &str) -> Option<MatchField> {
    if node.name.to_lowercase().contains(needle) {
        Some(MatchField::Name)
    } else if node.path.to_lowercase().contains(needle) {
        Some(MatchField::Path)
    } else if node
        .content
        .as_deref()
        .is_some_and(|c| c.to_lowercase().contains(needle))
    {
        Some(MatchField::Content)
    } else {
        None
    }
}

fn snippet(content: &str, needle: &str) -> Option<String> {
    let line = content
        .lines()
        .find(|line| line.to_lowercase().contains(needle))?
        .trim();
    if line.chars().count() <= SNIPPET_CHARS {
        return Some(line.to_string());
    }
    let mut short: String = line.chars().take(SNIPPET_CHARS).collect();
    short.push('…');
    Some(short)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> FileNode {
        FileNode::from_flat_map([
            ("/api/auth.md", "# Auth\nTokens expire after an hour."),
            ("/api/errors.md", "# Errors\nAll failures return JSON."),
            ("/guide/intro.md", "Welcome. See the API docs for tokens."),
        ])
    }

    fn paths(nodes: Vec<&FileNode>) -> Vec<&str> {
        nodes.into_iter().map(|n| n.path.as_str()).collect()
    }

    #[test]
    fn blank_query_matches_nothing() {
        let tree = tree();
        assert!(search_nodes(&tree, "").is_empty());
        assert!(search_nodes(&tree, "   ").is_empty());
        assert!(search(&tree, &SearchRequest::new("\t")).is_empty());
    }

    #[test]
    fn matches_name_path_and_content_in_preorder() {
        let tree = tree();
        assert_eq!(
            paths(search_nodes(&tree, "api")),
            vec!["/api", "/api/auth.md", "/api/errors.md", "/guide/intro.md"]
        );
        assert_eq!(
            paths(search_nodes(&tree, "  TOKENS ")),
            vec!["/api/auth.md", "/guide/intro.md"]
        );
    }

    #[test]
    fn node_listed_once_even_if_every_field_matches() {
        let tree = FileNode::from_flat_map([("/auth/auth.md", "auth")]);
        assert_eq!(paths(search_nodes(&tree, "auth")), vec!["/auth", "/auth/auth.md"]);
    }

    #[test]
    fn hits_report_field_and_snippet() {
        let tree = tree();
        let hits = search(&tree, &SearchRequest::new("json"));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].path, "/api/errors.md");
        assert_eq!(hits[0].matched, MatchField::Content);
        assert_eq!(hits[0].snippet.as_deref(), Some("All failures return JSON."));

        let hits = search(&tree, &SearchRequest::new("errors"));
        assert_eq!(hits[0].matched, MatchField::Name);
        assert!(hits[0].snippet.is_none());
    }

    #[test]
    fn limit_applies_after_scan() {
        let tree = tree();
        let hits = search(&tree, &SearchRequest::new("api").with_limit(2));
        let paths: Vec<&str> = hits.iter().map(|h| h.path.as_str()).collect();
        assert_eq!(paths, vec!["/api", "/api/auth.md"]);
    }
}

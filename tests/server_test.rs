use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use axum::body::to_bytes;
use axum::extract::{Form, Path as UrlPath, Query, State};
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use mdex::pages::explorer::{NavEvent, Transition};
use mdex::server::routes::{self, NavigateRequest, PageParams, ResolveParams, ToggleForm};
use mdex::server::AppState;
use mdex::services::search::SearchRequest;
use mdex::{ExplorerConfig, ServerConfig};
use serde_json::Value;
use tempfile::{tempdir, TempDir};

fn write(root: &Path, rel: &str, text: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

async fn fixture() -> (TempDir, Arc<AppState>) {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(root, "README.md", "# Project\n");
    write(root, "guide/readme.md", "# Guide home\n");
    write(
        root,
        "guide/intro.md",
        "---\ntitle: Introduction\ntags: [start, basics]\n---\n# Intro\n\nWelcome.\n",
    );
    write(root, "notes/todo.md", "- [ ] write docs\n");
    write(root, "notes/config.json", "{\"a\": 1}\n");

    let server = ServerConfig {
        docs_root: root.to_path_buf(),
        watch: false,
        ..ServerConfig::default()
    };
    let state = AppState::load(server, ExplorerConfig::default()).await;
    (dir, Arc::new(state))
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn page(state: &Arc<AppState>, uri: &str) -> Response {
    let uri: Uri = uri.parse().unwrap();
    let q = uri
        .query()
        .and_then(|q| q.strip_prefix("q="))
        .map(|q| q.to_string());
    routes::explorer_page(
        State(state.clone()),
        Method::GET,
        uri,
        HeaderMap::new(),
        Query(PageParams { q }),
    )
    .await
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

#[tokio::test]
async fn health_reports_service() {
    let (_dir, state) = fixture().await;
    let Json(body) = routes::health(State(state)).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "mdex");
    assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn folder_structure_is_sorted_tree() -> Result<()> {
    let (_dir, state) = fixture().await;
    let Json(tree) = routes::folder_structure(State(state)).await.unwrap();
    let value = serde_json::to_value(&tree)?;
    assert_eq!(value["path"], "/");
    let names: Vec<&str> = value["children"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["guide", "notes", "README.md"]);
    assert_eq!(value["children"][0]["type"], "folder");
    Ok(())
}

#[tokio::test]
async fn document_content_and_errors() {
    let (_dir, state) = fixture().await;

    let Json(doc) = routes::doc_content(State(state.clone()), UrlPath("guide/intro".into()))
        .await
        .unwrap();
    assert!(doc.content.contains("# Intro"));

    let missing = routes::doc_content(State(state.clone()), UrlPath("guide/nope.md".into()))
        .await
        .unwrap_err();
    assert_eq!(missing.status, StatusCode::NOT_FOUND);

    let escape = routes::doc_content(State(state.clone()), UrlPath("../secret.md".into()))
        .await
        .unwrap_err();
    assert_eq!(escape.status, StatusCode::BAD_REQUEST);

    let response = missing.into_response();
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert!(body["error"].as_str().unwrap().contains("nope"));
}

#[tokio::test]
async fn lists_documents() {
    let (_dir, state) = fixture().await;
    let Json(all) = routes::list_docs(State(state.clone())).await.unwrap();
    assert_eq!(
        all,
        vec!["guide/intro.md", "guide/readme.md", "notes/todo.md", "README.md"]
    );

    let Json(top) = routes::list_files(State(state.clone())).await.unwrap();
    assert_eq!(top, vec!["README.md"]);

    let nested = routes::file_content(State(state), UrlPath("guide/intro.md".into()))
        .await
        .unwrap_err();
    assert_eq!(nested.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn resolve_falls_back_to_ancestor() {
    let (_dir, state) = fixture().await;
    let Json(hit) = routes::resolve(
        State(state.clone()),
        Query(ResolveParams {
            path: "/guide/intro.md".into(),
        }),
    )
    .await;
    assert_eq!(hit.target, "/guide/intro");
    assert!(!hit.redirected);

    let Json(miss) = routes::resolve(
        State(state),
        Query(ResolveParams {
            path: "/guide/deleted/page".into(),
        }),
    )
    .await;
    assert_eq!(miss.target, "/guide");
    assert!(miss.redirected);
}

#[tokio::test]
async fn search_matches_names() {
    let (_dir, state) = fixture().await;
    let Json(hits) = routes::search_tree(State(state), Query(SearchRequest::new("todo")))
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].path, "notes/todo.md");
}

#[tokio::test]
async fn renders_markdown_with_front_matter() {
    let (_dir, state) = fixture().await;
    let Json(doc) = routes::render_document(State(state.clone()), UrlPath("guide/intro".into()))
        .await
        .unwrap();
    assert_eq!(doc.path, "guide/intro.md");
    assert!(doc.html.contains("Welcome."));
    assert_eq!(doc.front_matter["title"], "Introduction");

    let not_markdown =
        routes::render_document(State(state), UrlPath("notes/config.json".into()))
            .await
            .unwrap_err();
    assert_eq!(not_markdown.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn raw_files_keep_their_type() {
    let (_dir, state) = fixture().await;
    let response = routes::raw_file(State(state), UrlPath("notes/config.json".into()))
        .await
        .unwrap();
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/json"
    );
    assert_eq!(body_text(response).await, "{\"a\": 1}\n");
}

#[tokio::test]
async fn navigate_runs_the_reducer() {
    let (_dir, state) = fixture().await;
    let Json(first) = routes::navigate(
        State(state.clone()),
        Json(NavigateRequest {
            state: None,
            event: NavEvent::Navigate("notes/todo.md".into()),
        }),
    )
    .await;
    assert_eq!(first.transition, Transition::Push("/notes/todo".into()));
    assert_eq!(first.location, "/notes/todo.md");
    assert_eq!(first.state.history(), ["/README.md", "/notes/todo"]);

    let Json(back) = routes::navigate(
        State(state),
        Json(NavigateRequest {
            state: Some(first.state),
            event: NavEvent::Back,
        }),
    )
    .await;
    assert_eq!(back.transition, Transition::Replace("/README.md".into()));
    assert!(back.state.can_go_forward());
}

#[tokio::test]
async fn explorer_redirects_folders_to_their_index() {
    let (_dir, state) = fixture().await;

    let root = page(&state, "/").await;
    assert_eq!(root.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&root), "/README.md");

    let guide = page(&state, "/guide").await;
    assert_eq!(guide.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&guide), "/guide/readme.md");

    let gone = page(&state, "/guide/removed.md?q=x").await;
    assert_eq!(gone.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&gone), "/guide/readme.md?q=x");
}

#[tokio::test]
async fn explorer_renders_document_page() {
    let (_dir, state) = fixture().await;
    let response = page(&state, "/guide/intro.md").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Welcome."));
    assert!(html.contains("Introduction"));
    assert!(html.contains("/assets/explorer.css"));

    let searching = body_text(page(&state, "/guide/intro.md?q=todo").await).await;
    assert!(searching.contains("notes/todo.md"));
}

#[tokio::test]
async fn theme_form_toggles_and_returns() {
    let (_dir, state) = fixture().await;
    let before = state.theme().await;

    let redirect = routes::toggle_theme_form(
        State(state.clone()),
        Form(ToggleForm {
            back: "/guide/intro.md".into(),
        }),
    )
    .await
    .unwrap()
    .into_response();
    assert_eq!(redirect.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&redirect), "/guide/intro.md");
    assert_eq!(state.theme().await, before.toggled());

    let offsite = routes::toggle_theme_form(
        State(state),
        Form(ToggleForm {
            back: "//evil.example".into(),
        }),
    )
    .await
    .unwrap()
    .into_response();
    assert_eq!(location(&offsite), "/");
}

//! HTTP surface: the JSON API under `/api`, raw documents, embedded assets,
//! and the server-rendered explorer for every other GET.

use std::sync::Arc;

use axum::extract::{Form, Path, Query, State};
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode, Uri};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::core::errors::Error;
use crate::core::theme::Theme;
use crate::models::FileNode;
use crate::pages::explorer::view::{href, render_page, PageContext};
use crate::pages::explorer::{Explorer, NavEvent, NavigationState, Transition};
use crate::services::fs::content::ContentFetcher;
use crate::services::fs::iso_timestamp;
use crate::services::fs::listing::{list_markdown_files_async, list_root_markdown};
use crate::services::fs::blocking;
use crate::services::paths::{find_node_with, resolve_path, Resolution};
use crate::services::search::{search, SearchHit, SearchRequest};
use crate::ui::assets::content_type;
use crate::ui::Assets;

use super::state::AppState;

pub type SharedState = Arc<AppState>;

pub fn router(state: SharedState) -> Router {
    let cors = cors_layer(&state.server.cors_origins);
    Router::new()
        .route("/api/health", get(health))
        .route("/api/folder-structure", get(folder_structure))
        .route("/api/docs", get(list_docs))
        .route("/api/docs/*path", get(doc_content))
        .route("/api/files", get(list_files))
        .route("/api/files/:filename", get(file_content))
        .route("/api/search", get(search_tree))
        .route("/api/resolve", get(resolve))
        .route("/api/render/*path", get(render_document))
        .route("/api/navigate", post(navigate))
        .route("/api/theme", get(theme))
        .route("/api/theme/toggle", post(toggle_theme_api))
        .route("/raw/*path", get(raw_file))
        .route("/assets/*path", get(asset))
        .route("/theme/toggle", post(toggle_theme_form))
        .fallback(explorer_page)
        .layer(cors)
        .with_state(state)
}

/// Credentialed CORS for the configured origins. Origins that are not valid
/// header values are skipped with a warning.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}

/// JSON error body with a status code.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let status = match &error {
            e if e.is_not_found() => StatusCode::NOT_FOUND,
            Error::PathEscapesRoot(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!("Request failed: {}", error);
        }
        Self::new(status, error.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

pub async fn health(State(state): State<SharedState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": state.server.service_name,
        "timestamp": iso_timestamp(std::time::SystemTime::now()),
    }))
}

pub async fn folder_structure(State(state): State<SharedState>) -> ApiResult<Json<FileNode>> {
    if let Some(error) = state.tree_error().await {
        return Err(ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, error));
    }
    Ok(Json(FileNode::clone(&*state.tree().await)))
}

pub async fn list_docs(State(state): State<SharedState>) -> ApiResult<Json<Vec<String>>> {
    let files =
        list_markdown_files_async(&state.server.docs_root, state.server.include_hidden).await?;
    Ok(Json(files))
}

#[derive(Debug, Serialize)]
pub struct DocumentContent {
    pub content: String,
}

pub async fn doc_content(
    State(state): State<SharedState>,
    Path(path): Path<String>,
) -> ApiResult<Json<DocumentContent>> {
    let content = state.fetcher.fetch(&path).await?;
    Ok(Json(DocumentContent { content }))
}

pub async fn list_files(State(state): State<SharedState>) -> ApiResult<Json<Vec<String>>> {
    let root = state.server.docs_root.clone();
    let files = blocking(move || list_root_markdown(&root)).await?;
    Ok(Json(files))
}

pub async fn file_content(
    State(state): State<SharedState>,
    Path(filename): Path<String>,
) -> ApiResult<Json<DocumentContent>> {
    if filename.contains('/') || filename.contains('\\') {
        return Err(ApiError::new(StatusCode::BAD_REQUEST, "expected a file name"));
    }
    let content = state.fetcher.fetch(&filename).await?;
    Ok(Json(DocumentContent { content }))
}

pub async fn search_tree(
    State(state): State<SharedState>,
    Query(request): Query<SearchRequest>,
) -> ApiResult<Json<Vec<SearchHit>>> {
    if !state.explorer.enable_search {
        return Err(ApiError::new(StatusCode::NOT_FOUND, "search is disabled"));
    }
    let tree = state.tree().await;
    Ok(Json(search(&tree, &request)))
}

#[derive(Debug, Deserialize)]
pub struct ResolveParams {
    #[serde(default)]
    pub path: String,
}

pub async fn resolve(
    State(state): State<SharedState>,
    Query(params): Query<ResolveParams>,
) -> Json<Resolution> {
    let tree = state.tree().await;
    Json(resolve_path(&tree, &params.path, &state.explorer.normalizer()))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedPayload {
    pub path: String,
    pub html: String,
    pub front_matter: Map<String, Value>,
}

pub async fn render_document(
    State(state): State<SharedState>,
    Path(path): Path<String>,
) -> ApiResult<Json<RenderedPayload>> {
    let tree = state.tree().await;
    let node = find_node_with(&tree, &path, &state.explorer.normalizer())
        .filter(|node| node.is_file())
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, format!("no document at {path}")))?;
    if !node.is_markdown() {
        return Err(ApiError::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("{} is not a markdown document", node.path),
        ));
    }
    let text = match &node.content {
        Some(text) => text.clone(),
        None => state.fetcher.fetch(&node.path).await?,
    };
    let rendered = state.renderer.render_document(&text);
    Ok(Json(RenderedPayload {
        path: node.path.clone(),
        html: rendered.html,
        front_matter: rendered.front_matter,
    }))
}

#[derive(Debug, Deserialize)]
pub struct NavigateRequest {
    #[serde(default)]
    pub state: Option<NavigationState>,
    pub event: NavEvent,
}

#[derive(Debug, Serialize)]
pub struct NavigateResponse {
    pub state: NavigationState,
    pub transition: Transition,
    /// Address-bar form of the current path.
    pub location: String,
    pub node: Option<FileNode>,
}

/// Runs one navigation event through the reducer. The client owns the state
/// and sends it back with every event; without one the explorer mounts fresh.
pub async fn navigate(
    State(state): State<SharedState>,
    Json(request): Json<NavigateRequest>,
) -> Json<NavigateResponse> {
    let tree = state.tree().await;
    let config = state.explorer.clone();
    let (mut explorer, mounted) = match request.state {
        Some(navigation) => (Explorer::restore(tree, config, navigation), Transition::None),
        None => Explorer::mount(tree, config),
    };
    let transition = match explorer.dispatch(request.event) {
        Transition::None => mounted,
        other => other,
    };
    let node = explorer.current_node().map(summary);
    Json(NavigateResponse {
        location: explorer.location(explorer.current_path()),
        state: explorer.navigation().clone(),
        transition,
        node,
    })
}

/// A node without its children or inline content.
fn summary(node: &FileNode) -> FileNode {
    FileNode {
        children: Vec::new(),
        content: None,
        ..node.clone()
    }
}

#[derive(Debug, Serialize)]
pub struct ThemePayload {
    pub theme: Theme,
}

pub async fn theme(State(state): State<SharedState>) -> Json<ThemePayload> {
    Json(ThemePayload {
        theme: state.theme().await,
    })
}

pub async fn toggle_theme_api(State(state): State<SharedState>) -> ApiResult<Json<ThemePayload>> {
    let theme = state.toggle_theme().await?;
    Ok(Json(ThemePayload { theme }))
}

#[derive(Debug, Deserialize)]
pub struct ToggleForm {
    #[serde(default)]
    pub back: String,
}

/// Form target of the page's theme button. Redirects back to the page it came
/// from; only local paths are followed.
pub async fn toggle_theme_form(
    State(state): State<SharedState>,
    Form(form): Form<ToggleForm>,
) -> ApiResult<Redirect> {
    state.toggle_theme().await?;
    let back = if form.back.starts_with('/') && !form.back.starts_with("//") {
        form.back
    } else {
        "/".to_string()
    };
    Ok(Redirect::to(&back))
}

pub async fn raw_file(
    State(state): State<SharedState>,
    Path(path): Path<String>,
) -> ApiResult<Response> {
    let bytes = state.fetcher.read_bytes(&path).await?;
    let mime = content_type(&path);
    Ok(([(header::CONTENT_TYPE, mime.to_string())], bytes).into_response())
}

pub async fn asset(Path(path): Path<String>) -> Response {
    match Assets::load(&path) {
        Some((data, mime)) => {
            ([(header::CONTENT_TYPE, mime.to_string())], data.into_owned()).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    #[serde(default)]
    pub q: Option<String>,
}

/// Everything that is not an API route is a location in the explorer.
///
/// The path is mounted as the explorer's initial route. When the explorer
/// corrects it (fallback to an ancestor, auto-select into a folder) the
/// client is redirected to the corrected location instead of seeing the page
/// under the old URL.
pub async fn explorer_page(
    State(state): State<SharedState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Query(params): Query<PageParams>,
) -> Response {
    if method != Method::GET && method != Method::HEAD {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }

    let requested = decode_path(uri.path());
    let config = state.explorer.clone().with_initial_route(requested.clone());
    let (mut explorer, transition) = match state.tree_error().await {
        Some(error) => Explorer::with_error(config, error),
        None => Explorer::mount(state.tree().await, config),
    };

    if let Transition::Replace(path) | Transition::Push(path) = &transition {
        let mut location = href(&explorer.location(path));
        if let Some(query) = uri.query() {
            location.push('?');
            location.push_str(query);
        }
        tracing::debug!("Redirecting {} to {}", requested, location);
        return Redirect::temporary(&location).into_response();
    }

    explorer.set_search_query(params.q.unwrap_or_default());
    explorer.load_content(&state.fetcher).await;

    let theme = state.theme().await.effective(prefers_dark(&headers));
    let page = render_page(
        &explorer,
        &PageContext {
            title: &state.server.service_name,
            theme,
            renderer: &state.renderer,
            syntax: &state.syntax,
        },
    );
    Html(page).into_response()
}

fn prefers_dark(headers: &HeaderMap) -> bool {
    headers
        .get("sec-ch-prefers-color-scheme")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim_matches('"').eq_ignore_ascii_case("dark"))
        .unwrap_or(false)
}

/// Percent-decodes a request path. Invalid UTF-8 is replaced rather than
/// rejected; such a path simply won't match a node.
pub fn decode_path(raw: &str) -> String {
    match urlencoding::decode(raw) {
        Ok(path) => path.into_owned(),
        Err(_) => String::from_utf8_lossy(&urlencoding::decode_binary(raw.as_bytes())).into_owned(),
    }
}

//! Static pages, static assets and health checks.

use std::path::Path;

use axum::{Json, response::Html};
use serde::Serialize;
use tower_http::services::ServeDir;

const INDEX_HTML: &str = include_str!("../assets/index.html");
const PROTECTED_HTML: &str = include_str!("../assets/protected.html");

#[derive(Debug, Serialize)]
pub(crate) struct Health {
    ok: bool,
}

/// The application shell; it calls the JSON API from the browser.
pub(crate) async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Page meant to be reached only through the certificate-checking proxy location.
pub(crate) async fn protected_page() -> Html<&'static str> {
    Html(PROTECTED_HTML)
}

pub(crate) async fn health() -> Json<Health> {
    Json(Health { ok: true })
}

/// Files under `dir`, served as-is. Missing files and directories answer 404.
pub(crate) fn static_files(dir: &Path) -> ServeDir {
    ServeDir::new(dir).append_index_html_on_directories(false)
}

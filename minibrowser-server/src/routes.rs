//! The `/browser` routes.

use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use minibrowser::errors::BrowserError;
use minibrowser::service::BrowserService;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// The `url` query parameter shared by all routes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UrlQuery {
    /// Address for browse, query text for search.
    #[serde(default)]
    pub url: String,
}

/// Builds the router over a shared service.
pub fn router(service: Arc<BrowserService>) -> Router {
    Router::new()
        .route("/browser", get(shell))
        .route("/browser/browse", get(browse))
        .route("/browser/search", get(search))
        .with_state(service)
}

/// `<scheme>://<host>` of the incoming request.
///
/// The scheme comes from `X-Forwarded-Proto` when a proxy sets it.
#[must_use]
pub fn local_base_url(headers: &HeaderMap) -> String {
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("http");
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("localhost");
    format!("{scheme}://{host}")
}

fn html(status: StatusCode, body: String) -> Response {
    (status, [(header::CONTENT_TYPE, HTML_CONTENT_TYPE)], body).into_response()
}

fn error_page(service: &BrowserService, error: &BrowserError, url: Option<&str>) -> Response {
    let status = StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let details = serde_json::json!(error.to_dict());
    if error.is_client_error() {
        info!(details = %details, "Rejected request");
    } else {
        warn!(details = %details, "Rendering error shell");
    }
    html(status, service.render_error(error, url))
}

/// `GET /browser`
pub async fn shell(State(service): State<Arc<BrowserService>>) -> Response {
    html(StatusCode::OK, service.empty_shell())
}

/// `GET /browser/browse?url=…`
pub async fn browse(
    State(service): State<Arc<BrowserService>>,
    Query(query): Query<UrlQuery>,
) -> Response {
    match service.browse(&query.url).await {
        Ok(body) => html(StatusCode::OK, body),
        Err(e) => error_page(&service, &e, Some(query.url.trim()).filter(|u| !u.is_empty())),
    }
}

/// `GET /browser/search?url=<query>`
pub async fn search(
    State(service): State<Arc<BrowserService>>,
    headers: HeaderMap,
    Query(query): Query<UrlQuery>,
) -> Response {
    let base = local_base_url(&headers);
    match service.search(&query.url, &base).await {
        Ok(body) => html(StatusCode::OK, body),
        Err(e) => error_page(&service, &e, None),
    }
}

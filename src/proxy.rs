use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{HeaderMap, HeaderName, Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
    routing::{any, get},
};
use serde_json::{Value, json};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{error, info};

use crate::config::Config;
use crate::constants::*;

#[derive(Clone)]
pub struct ProxyState {
    client: reqwest::Client,
    upstream: String,
}

impl ProxyState {
    /// Upstream redirects are handed back to the caller, never followed.
    pub fn new(upstream: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self {
            client,
            upstream: upstream.into().trim_end_matches('/').to_string(),
        })
    }
}

pub fn router(config: &Config) -> Result<Router, reqwest::Error> {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(config.allowed_origins.clone()))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let state = ProxyState::new(config.upstream_url.clone())?;
    Ok(Router::new()
        .route("/health", get(health))
        .route("/api", any(forward))
        .route("/api/{*path}", any(forward))
        .layer(DefaultBodyLimit::max(MAX_PROXY_BODY_BYTES))
        .layer(cors)
        .with_state(state))
}

async fn health(State(state): State<ProxyState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "Proxy server is running",
        "target": state.upstream,
    }))
}

fn is_hop_by_hop(name: &HeaderName) -> bool {
    matches!(
        name.as_str(),
        "connection"
            | "keep-alive"
            | "proxy-authenticate"
            | "proxy-authorization"
            | "te"
            | "trailer"
            | "transfer-encoding"
            | "upgrade"
    )
}

fn request_headers(incoming: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (name, value) in incoming {
        // Host is rewritten to the upstream origin by the client.
        if is_hop_by_hop(name) || name == header::HOST || name == header::CONTENT_LENGTH {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }
    headers
}

fn response_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (name, value) in upstream {
        // CORS is answered by this server's own policy.
        if is_hop_by_hop(name)
            || name == header::CONTENT_LENGTH
            || name.as_str().starts_with("access-control-")
        {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }
    headers
}

fn proxy_error(err: reqwest::Error) -> Response {
    error!(error = %err, "[PROXY ERROR]");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": ERR_PROXY,
            "message": err.to_string(),
        })),
    )
        .into_response()
}

async fn forward(
    State(state): State<ProxyState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path_and_query = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());
    let target = format!("{}{}", state.upstream, path_and_query);
    info!(%method, path = path_and_query, %target, "[PROXY]");

    let result = state
        .client
        .request(method, &target)
        .headers(request_headers(&headers))
        .body(body)
        .send()
        .await;

    let upstream = match result {
        Ok(upstream) => upstream,
        Err(err) => return proxy_error(err),
    };

    let status = upstream.status();
    let headers = response_headers(upstream.headers());
    info!(status = status.as_u16(), path = uri.path(), "[RESPONSE]");

    match upstream.bytes().await {
        Ok(bytes) => (status, headers, bytes).into_response(),
        Err(err) => proxy_error(err),
    }
}

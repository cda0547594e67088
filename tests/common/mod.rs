//! Shared utilities for integration testing.
//!
//! Starts a mock origin that serves the variant catalog and the two variant
//! pages, plus the edge service itself, both on ephemeral loopback ports.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::{Json, Router};
use futures_util::{stream, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use variant_edge::{EdgeConfig, HttpServer, Shutdown};

/// Marker text that identifies which page the origin served.
pub const PAGE_MARKERS: [&str; 2] = ["origin-page-one", "origin-page-two"];

fn variant_page(marker: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><title></title></head>
<body data-page="{marker}">
<h1 id="title"></h1> <a id="url"></a> <p id="description"></p>
</body>
</html>"#
    )
}

#[derive(Clone)]
struct OriginState {
    base: String,
    hits: Arc<AtomicUsize>,
}

/// A running mock origin.
pub struct Origin {
    pub addr: SocketAddr,
    hits: Arc<AtomicUsize>,
}

impl Origin {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Number of requests the origin has received.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

async fn catalog(State(state): State<OriginState>) -> Json<Value> {
    state.hits.fetch_add(1, Ordering::SeqCst);
    Json(json!({
        "variants": [
            format!("{}/variants/1", state.base),
            format!("{}/variants/2", state.base),
        ]
    }))
}

async fn short_catalog(State(state): State<OriginState>) -> Json<Value> {
    state.hits.fetch_add(1, Ordering::SeqCst);
    Json(json!({ "variants": [format!("{}/variants/1", state.base)] }))
}

async fn dangling_catalog(State(state): State<OriginState>) -> Json<Value> {
    state.hits.fetch_add(1, Ordering::SeqCst);
    Json(json!({
        "variants": [
            format!("{}/missing/1", state.base),
            format!("{}/missing/2", state.base),
        ]
    }))
}

async fn garbage_catalog(State(state): State<OriginState>) -> &'static str {
    state.hits.fetch_add(1, Ordering::SeqCst);
    "this is not json"
}

async fn stalled_catalog(State(state): State<OriginState>) -> Json<Value> {
    state.hits.fetch_add(1, Ordering::SeqCst);
    Json(json!({
        "variants": [
            format!("{}/variants/stalled", state.base),
            format!("{}/variants/stalled", state.base),
        ]
    }))
}

/// Sends the document head, then never sends another byte.
async fn stalled_page(State(state): State<OriginState>) -> impl IntoResponse {
    state.hits.fetch_add(1, Ordering::SeqCst);
    let head = stream::once(async {
        Ok::<_, std::io::Error>(Bytes::from_static(b"<html><head><title>slow</title></head>"))
    });
    (
        [(CONTENT_TYPE, "text/html")],
        Body::from_stream(head.chain(stream::pending())),
    )
}

async fn page_one(State(state): State<OriginState>) -> Html<String> {
    state.hits.fetch_add(1, Ordering::SeqCst);
    Html(variant_page(PAGE_MARKERS[0]))
}

async fn page_two(State(state): State<OriginState>) -> Html<String> {
    state.hits.fetch_add(1, Ordering::SeqCst);
    Html(variant_page(PAGE_MARKERS[1]))
}

/// Start the mock origin.
///
/// Catalog endpoints:
/// - `/api/variants` lists both pages
/// - `/api/short` lists only the first page
/// - `/api/dangling` lists pages that answer 404
/// - `/api/garbage` is not JSON
/// - `/api/stalled` lists a page whose body stops after the head
pub async fn start_origin() -> Origin {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));

    let state = OriginState {
        base: format!("http://{}", addr),
        hits: hits.clone(),
    };
    let app = Router::new()
        .route("/api/variants", get(catalog))
        .route("/api/short", get(short_catalog))
        .route("/api/dangling", get(dangling_catalog))
        .route("/api/garbage", get(garbage_catalog))
        .route("/api/stalled", get(stalled_catalog))
        .route("/variants/stalled", get(stalled_page))
        .route("/variants/1", get(page_one))
        .route("/variants/2", get(page_two))
        .with_state(state);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Origin { addr, hits }
}

/// A running edge service.
pub struct Edge {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl Edge {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for Edge {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the edge service with its catalog at `catalog_url`.
pub async fn start_edge(catalog_url: String) -> Edge {
    start_edge_with(catalog_url, |_| {}).await
}

/// Start the edge service after adjusting its default config.
pub async fn start_edge_with(catalog_url: String, adjust: impl FnOnce(&mut EdgeConfig)) -> Edge {
    let mut config = EdgeConfig::default();
    config.catalog.url = catalog_url;
    adjust(&mut config);
    config.listener.bind_address = "127.0.0.1:0".into();

    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config).unwrap();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    Edge { addr, shutdown }
}

/// Client that never pools or proxies, so every request is independent.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

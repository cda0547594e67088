//! HTTP server setup and the variant request handler.
//!
//! # Responsibilities
//! - Create Axum Router with the single handler
//! - Wire up middleware (tracing, timeout, request ID)
//! - Bind server to listener and shut down gracefully
//! - Run the per-request pipeline: path filter → cookie → catalog →
//!   selection → page fetch → streaming rewrite → response

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::EdgeConfig;
use crate::experiment::{resolve_cookie, select_variant, VariantIndex};
use crate::http::request::{cookie_header, is_site_root, request_id, UuidRequestId, X_REQUEST_ID};
use crate::http::response::{empty_response, variant_response};
use crate::lifecycle::signals::shutdown_signal;
use crate::lifecycle::StartupError;
use crate::observability::metrics;
use crate::rewrite::VariantRewriter;
use crate::upstream::{FetchError, VariantClient};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub client: VariantClient,
    pub rewriter: Arc<VariantRewriter>,
}

/// HTTP server for the variant service.
pub struct HttpServer {
    router: Router,
    config: EdgeConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: EdgeConfig) -> Result<Self, StartupError> {
        let state = AppState {
            client: VariantClient::new(&config)?,
            rewriter: Arc::new(VariantRewriter::new()?),
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &EdgeConfig, state: AppState) -> Router {
        Router::new()
            .route("/", any(variant_handler))
            .fallback(variant_handler)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, UuidRequestId))
            .layer(TraceLayer::new_for_http())
    }

    /// The fully layered router, for driving the service without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            catalog_url = %self.config.catalog.url,
            "HTTP server starting"
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown_signal(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Serve the root page as a sticky A/B variant; everything else is empty.
async fn variant_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(request.headers());

    if !is_site_root(request.uri()) {
        tracing::debug!(
            request_id = %request_id,
            target = %request.uri(),
            "Ignoring request outside the site root"
        );
        let response = empty_response();
        metrics::record_request(response.status().as_u16(), start_time);
        return response;
    }

    let cookie = resolve_cookie(cookie_header(request.headers()).as_deref());

    let response = match serve_variant(&state, cookie, &request_id).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Failed to serve variant");
            e.into_response()
        }
    };

    metrics::record_request(response.status().as_u16(), start_time);
    response
}

async fn serve_variant(
    state: &AppState,
    cookie: Option<VariantIndex>,
    request_id: &str,
) -> Result<Response, FetchError> {
    let catalog = state.client.fetch_catalog().await?;

    let assignment = select_variant(cookie, &mut rand::thread_rng());
    metrics::record_assignment(&assignment);

    let url = catalog
        .url_for(assignment.index)
        .ok_or(FetchError::MissingVariant {
            index: assignment.index,
            available: catalog.variants.len(),
        })?;

    tracing::info!(
        request_id = %request_id,
        variant = assignment.context.variant_number,
        returning = assignment.context.was_returning_visitor,
        url = %url,
        "Serving variant"
    );

    let page = state.client.fetch_page(url).await?;
    let body = state.rewriter.rewrite_stream(page, assignment.context);

    Ok(variant_response(assignment.index, Body::from_stream(body)))
}

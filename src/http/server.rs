//! HTTP server setup and the relay handler.
//!
//! # Responsibilities
//! - Create the Axum Router with the single relay handler
//! - Wire up middleware (request ID, tracing, optional timeout)
//! - Classify each request: preflight, index page, proxy path, not found
//! - Hand proxy paths to the relay and map failures to the JSON 500
//! - Serve until the shutdown signal fires

use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::RelayConfig;
use crate::http::{cors, index};
use crate::observability::metrics::{self, Branch};
use crate::relay::{self, RelayError, RelayResponse};

pub const X_REQUEST_ID: &str = "x-request-id";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub client: reqwest::Client,
}

/// HTTP server for the relay.
pub struct RelayServer {
    router: Router,
}

impl RelayServer {
    /// Create a new server with the given configuration.
    pub fn new(config: RelayConfig) -> Result<Self, reqwest::Error> {
        let client = relay::build_client(&config)?;
        let router = build_router(&config, AppState { client });
        Ok(Self { router })
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
#[allow(deprecated)]
pub fn build_router(config: &RelayConfig, state: AppState) -> Router {
    let mut router = Router::new()
        .route("/", any(relay_handler))
        .route("/{*path}", any(relay_handler))
        .with_state(state);

    if let Some(timeout) = config.timeouts.request() {
        router = router.layer(TimeoutLayer::new(timeout));
    }

    router.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    let request_id = request
                        .headers()
                        .get(X_REQUEST_ID)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("unknown");
                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        path = %request.uri().path(),
                        request_id = %request_id,
                    )
                }),
            )
            .layer(PropagateRequestIdLayer::x_request_id()),
    )
}

/// Main relay handler. First match wins:
/// preflight, index page, proxy path, not found.
async fn relay_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    // The inbound body is never forwarded.
    let (parts, _body) = request.into_parts();
    let method = parts.method;
    let path = parts.uri.path();

    if method == Method::OPTIONS {
        metrics::record_request(&method, StatusCode::NO_CONTENT, Branch::Preflight, start_time);
        return cors::preflight();
    }

    if path == "/" {
        metrics::record_request(&method, StatusCode::OK, Branch::Index, start_time);
        return index::index_page();
    }

    let Some(raw_target) = relay::target_from_path(path) else {
        tracing::warn!(path = %path, "No relay target in path");
        metrics::record_request(&method, StatusCode::NOT_FOUND, Branch::NotFound, start_time);
        return (StatusCode::NOT_FOUND, "Not Found").into_response();
    };

    match relay_target(&state, method.clone(), raw_target, &parts.headers).await {
        Ok(RelayResponse {
            response,
            rewritten_location,
        }) => {
            let branch = match rewritten_location {
                Some(location) => {
                    tracing::info!(
                        status = %response.status(),
                        location = %location,
                        "Rewrote upstream redirect"
                    );
                    Branch::Redirect
                }
                None => Branch::Relay,
            };
            metrics::record_request(&method, response.status(), branch, start_time);
            response
        }
        Err(e) => {
            tracing::error!(target_url = %raw_target, error = %e, "Relay failed");
            metrics::record_request(
                &method,
                StatusCode::INTERNAL_SERVER_ERROR,
                Branch::Error,
                start_time,
            );
            e.into_response()
        }
    }
}

async fn relay_target(
    state: &AppState,
    method: Method,
    raw_target: &str,
    headers: &axum::http::HeaderMap,
) -> Result<RelayResponse, RelayError> {
    let target = relay::resolve_target(raw_target)?;
    tracing::debug!(method = %method, target_url = %target, "Relaying request");
    relay::forward(&state.client, method, target, headers).await
}

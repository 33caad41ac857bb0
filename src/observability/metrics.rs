//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_requests_total` (counter): requests by method, status, branch
//! - `relay_request_duration_seconds` (histogram): time to response head, by branch
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use std::net::SocketAddr;
use std::time::Instant;

use axum::http::{Method, StatusCode};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Which handler branch produced a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    Preflight,
    Index,
    Relay,
    Redirect,
    NotFound,
    Error,
}

impl Branch {
    pub fn as_str(self) -> &'static str {
        match self {
            Branch::Preflight => "preflight",
            Branch::Index => "index",
            Branch::Relay => "relay",
            Branch::Redirect => "redirect",
            Branch::NotFound => "not_found",
            Branch::Error => "error",
        }
    }
}

/// Install the Prometheus exporter with its own HTTP listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_request(method: &Method, status: StatusCode, branch: Branch, start: Instant) {
    metrics::counter!(
        "relay_requests_total",
        "method" => method.to_string(),
        "status" => status.as_u16().to_string(),
        "branch" => branch.as_str()
    )
    .increment(1);

    metrics::histogram!(
        "relay_request_duration_seconds",
        "branch" => branch.as_str()
    )
    .record(start.elapsed().as_secs_f64());
}

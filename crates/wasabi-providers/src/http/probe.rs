//! Request probes
//!
//! A probe observes every request/response cycle passing through the HTTP
//! server. The probe is chosen at construction and monomorphised into the
//! router.

use crate::constants::{HTTP_REQUESTS_METRIC, UNKNOWN_PEER, UNMATCHED_PATH};
use axum::extract::{ConnectInfo, MatchedPath, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use prometheus::{IntCounterVec, Opts, Registry};
use std::future::Future;
use std::net::SocketAddr;
use wasabi_domain::error::Result;
use wasabi_domain::error_ext::ErrorContext;

/// Per-request observer
pub trait Probe: Clone + Send + Sync + 'static {
    /// Observe one request; must forward it to `next`
    fn observe(&self, request: Request, next: Next) -> impl Future<Output = Response> + Send;
}

/// Pass-through probe
#[derive(Debug, Clone, Copy, Default)]
pub struct NopProbe;

impl Probe for NopProbe {
    fn observe(&self, request: Request, next: Next) -> impl Future<Output = Response> + Send {
        next.run(request)
    }
}

/// Counts requests in `app_request_total{ip,method,path,status}`
#[derive(Clone)]
pub struct PrometheusProbe {
    requests: IntCounterVec,
}

impl PrometheusProbe {
    /// Create the counter and register it with `registry`
    pub fn new(registry: &Registry) -> Result<Self> {
        let requests = IntCounterVec::new(
            Opts::new(HTTP_REQUESTS_METRIC, "Total number of application requests"),
            &["ip", "method", "path", "status"],
        )
        .context("Failed to create request counter")?;
        registry
            .register(Box::new(requests.clone()))
            .context("Failed to register request counter")?;
        Ok(Self { requests })
    }

    /// Current count for one label set
    pub fn count(&self, ip: &str, method: &str, path: &str, status: &str) -> u64 {
        self.requests
            .with_label_values(&[ip, method, path, status])
            .get()
    }
}

impl Probe for PrometheusProbe {
    fn observe(&self, request: Request, next: Next) -> impl Future<Output = Response> + Send {
        let requests = self.requests.clone();
        let ip = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map_or_else(|| UNKNOWN_PEER.to_string(), |info| info.0.ip().to_string());
        let method = request.method().to_string();
        let path = request
            .extensions()
            .get::<MatchedPath>()
            .map_or(UNMATCHED_PATH, MatchedPath::as_str)
            .to_string();

        async move {
            let response = next.run(request).await;
            let status = response.status();
            requests
                .with_label_values(&[ip.as_str(), method.as_str(), path.as_str(), status.as_str()])
                .inc();
            response
        }
    }
}

/// Middleware entry point wiring a probe into the router
pub(crate) async fn observe_request<P: Probe>(
    State(probe): State<P>,
    request: Request,
    next: Next,
) -> Response {
    probe.observe(request, next).await
}

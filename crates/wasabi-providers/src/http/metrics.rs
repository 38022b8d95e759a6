//! Metrics scrape server
//!
//! Serves the shared Prometheus registry on its own listener, separate
//! from the application server.

use crate::constants::{METRICS_COMPONENT, METRICS_PATH};
use crate::http::serve::BackgroundServer;
use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use prometheus::{Encoder, Registry, TEXT_FORMAT, TextEncoder};
use std::net::SocketAddr;
use tracing::{Dispatch, error};
use wasabi_domain::error::Result;
use wasabi_domain::error_ext::ErrorContext;
use wasabi_domain::ports::{LifecycleManaged, ServiceState};
use wasabi_domain::value_objects::MetricsConfig;

/// Router exposing `registry` at `/metrics`
pub fn metrics_router(registry: Registry) -> Router {
    Router::new()
        .route(METRICS_PATH, get(scrape))
        .with_state(registry)
}

async fn scrape(State(registry): State<Registry>) -> Response {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&registry.gather(), &mut buffer) {
        error!(error = %e, "failed to encode metrics");
        return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
    }
    ([(header::CONTENT_TYPE, TEXT_FORMAT)], buffer).into_response()
}

/// The metrics listener
#[derive(Debug)]
pub struct MetricsServer {
    inner: BackgroundServer,
}

impl MetricsServer {
    /// Validate the address and build the server; nothing is bound yet
    pub fn new(config: &MetricsConfig, registry: Registry, dispatch: Dispatch) -> Result<Self> {
        config
            .addr
            .parse::<SocketAddr>()
            .config_context(format!("Invalid metrics address {:?}", config.addr))?;

        Ok(Self {
            inner: BackgroundServer::new(
                METRICS_COMPONENT,
                config.addr.clone(),
                metrics_router(registry),
                dispatch,
            ),
        })
    }

    /// Address actually bound, once started
    pub async fn local_addr(&self) -> Option<SocketAddr> {
        self.inner.local_addr().await
    }
}

#[async_trait::async_trait]
impl LifecycleManaged for MetricsServer {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn state(&self) -> ServiceState {
        self.inner.state()
    }

    async fn start(&self) -> Result<()> {
        self.inner.start().await
    }

    async fn stop(&self) -> Result<()> {
        self.inner.stop().await
    }
}

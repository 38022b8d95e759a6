//! Application HTTP server
//!
//! Middleware stack, outermost first:
//!
//! | Layer | Purpose |
//! |-------|---------|
//! | `TraceLayer` | structured access log and request span |
//! | probe | [`Probe`] sees the final status, including recovered panics |
//! | `CompressionLayer` | gzip at the fastest level |
//! | `CatchPanicLayer` | a panicking handler becomes a JSON 500 |

use crate::constants::HTTP_COMPONENT;
use crate::http::probe::{Probe, observe_request};
use crate::http::serve::BackgroundServer;
use axum::Json;
use axum::Router;
use axum::http::StatusCode;
use axum::middleware;
use axum::response::{IntoResponse, Response};
use std::any::Any;
use std::net::SocketAddr;
use tower::ServiceBuilder;
use tower_http::CompressionLevel;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::compression::CompressionLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Dispatch, Level, error};
use wasabi_domain::error::Result;
use wasabi_domain::ports::{LifecycleManaged, ServiceState};
use wasabi_domain::value_objects::HttpConfig;

/// Wrap `routes` in the standard middleware stack
pub fn build_router<P: Probe>(routes: Router, probe: P) -> Router {
    routes.layer(
        ServiceBuilder::new()
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                    .on_response(DefaultOnResponse::new().level(Level::INFO)),
            )
            .layer(middleware::from_fn_with_state(probe, observe_request::<P>))
            .layer(CompressionLayer::new().quality(CompressionLevel::Fastest))
            .layer(CatchPanicLayer::custom(recover_panic)),
    )
}

fn recover_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic".to_string()
    };
    error!(panic = %detail, "request handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": "internal server error" })),
    )
        .into_response()
}

/// The application HTTP server
///
/// Port 0 in the configuration selects the default port 9999.
#[derive(Debug)]
pub struct HttpServer {
    inner: BackgroundServer,
}

impl HttpServer {
    pub fn new<P: Probe>(config: &HttpConfig, probe: P, routes: Router, dispatch: Dispatch) -> Self {
        let router = build_router(routes, probe);
        Self {
            inner: BackgroundServer::new(HTTP_COMPONENT, config.bind_addr(), router, dispatch),
        }
    }

    /// Configured `host:port`
    pub fn addr(&self) -> &str {
        self.inner.addr()
    }

    /// Address actually bound, once started
    pub async fn local_addr(&self) -> Option<SocketAddr> {
        self.inner.local_addr().await
    }
}

#[async_trait::async_trait]
impl LifecycleManaged for HttpServer {
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

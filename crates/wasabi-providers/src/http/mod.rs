//! HTTP adapters
//!
//! - [`HttpServer`]: application server with JSON, compression, panic
//!   recovery, access logging and a pluggable [`Probe`]
//! - [`MetricsServer`]: Prometheus scrape endpoint on a separate listener
//! - [`BackgroundServer`]: bind-then-detach serving shared by both

pub mod metrics;
pub mod probe;
pub mod serve;
pub mod server;

pub use metrics::{MetricsServer, metrics_router};
pub use probe::{NopProbe, PrometheusProbe, Probe};
pub use serve::BackgroundServer;
pub use server::{HttpServer, build_router};

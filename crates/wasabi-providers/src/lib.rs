//! # wasabi - Adapter Implementations
//!
//! Thin configuration-and-lifecycle wrappers around third-party clients and
//! servers. Each adapter implements the lifecycle port from `wasabi-domain`
//! and, where it wraps a connection, exposes a health checker.
//!
//! | Adapter | Library | Lifecycle |
//! |---------|---------|-----------|
//! | [`database::PostgresDatabase`] | sqlx | ping on start, close on stop |
//! | [`cache::RedisCache`] | redis | ping on start, drop connection on stop |
//! | [`http::HttpServer`] | axum + tower-http | bind on start, graceful shutdown on stop |
//! | [`http::MetricsServer`] | axum + prometheus | bind on start, graceful shutdown on stop |
//!
//! Adapters receive their logger as a [`tracing::Dispatch`] at construction
//! and run their own work under it.

pub use wasabi_domain::error::{Error, Result};

/// Provider-specific constants
pub mod constants;

/// PostgreSQL pool, query log bridge and health check
pub mod database;

/// Redis client with tracing and metrics instrumentation
pub mod cache;

/// HTTP server, request probes and the metrics scrape server
pub mod http;

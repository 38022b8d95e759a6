//! Tests for the background servers

use crate::support::{CapturedLogs, free_port};
use axum::Router;
use axum::routing::get;
use prometheus::Registry;
use tracing::Dispatch;
use wasabi_domain::error::Error;
use wasabi_domain::ports::{LifecycleManaged, ServiceState};
use wasabi_domain::value_objects::{HttpConfig, MetricsConfig};
use wasabi_providers::http::{BackgroundServer, HttpServer, MetricsServer, NopProbe, PrometheusProbe};

fn hello() -> Router {
    Router::new().route("/hello", get(|| async { "hello" }))
}

#[tokio::test]
async fn test_background_server_serves_until_stopped() {
    let logs = CapturedLogs::default();
    let server = BackgroundServer::new("test", "127.0.0.1:0".to_string(), hello(), logs.dispatch());
    assert_eq!(server.state(), ServiceState::Stopped);
    assert!(server.local_addr().await.is_none());

    server.start().await.expect("start");
    assert_eq!(server.state(), ServiceState::Running);
    let addr = server.local_addr().await.expect("bound");

    let body = reqwest::get(format!("http://{addr}/hello"))
        .await
        .expect("request")
        .text()
        .await
        .expect("body");
    assert_eq!(body, "hello");

    server.stop().await.expect("stop");
    assert_eq!(server.state(), ServiceState::Stopped);
    assert!(reqwest::get(format!("http://{addr}/hello")).await.is_err());

    assert_eq!(logs.with_message("server listening").len(), 1);
    assert_eq!(logs.with_message("server stopped").len(), 1);
}

#[tokio::test]
async fn test_bind_conflict_fails_start() {
    let holder = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let taken = holder.local_addr().expect("addr");

    let server = BackgroundServer::new("test", taken.to_string(), hello(), Dispatch::none());
    let result = server.start().await;

    assert!(matches!(result, Err(Error::Network { .. })));
    assert_eq!(server.state(), ServiceState::Stopped);
}

#[tokio::test]
async fn test_stop_without_start_and_twice_is_ok() {
    let server = BackgroundServer::new("test", "127.0.0.1:0".to_string(), hello(), Dispatch::none());
    server.stop().await.expect("stop before start");

    server.start().await.expect("start");
    server.stop().await.expect("first stop");
    server.stop().await.expect("second stop");
    assert_eq!(server.state(), ServiceState::Stopped);
}

#[tokio::test]
async fn test_http_server_binds_configured_port() {
    let port = free_port();
    let config = HttpConfig {
        host: "127.0.0.1".to_string(),
        port,
    };
    let server = HttpServer::new(&config, NopProbe, hello(), Dispatch::none());
    assert_eq!(server.addr(), format!("127.0.0.1:{port}"));
    assert_eq!(server.name(), "http");

    server.start().await.expect("start");
    let response = reqwest::get(format!("http://127.0.0.1:{port}/hello"))
        .await
        .expect("request");
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    server.stop().await.expect("stop");
}

#[test]
fn test_http_server_port_zero_uses_default() {
    let config = HttpConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
    };
    let server = HttpServer::new(&config, NopProbe, Router::new(), Dispatch::none());
    assert_eq!(server.addr(), "127.0.0.1:9999");
}

#[tokio::test]
async fn test_metrics_server_exposes_request_counter() {
    let registry = Registry::new();
    let probe = PrometheusProbe::new(&registry).expect("probe");

    let app = HttpServer::new(
        &HttpConfig {
            host: "127.0.0.1".to_string(),
            port: free_port(),
        },
        probe,
        hello(),
        Dispatch::none(),
    );
    let metrics = MetricsServer::new(
        &MetricsConfig {
            addr: "127.0.0.1:0".to_string(),
        },
        registry,
        Dispatch::none(),
    )
    .expect("metrics server");

    app.start().await.expect("app start");
    metrics.start().await.expect("metrics start");

    let app_addr = app.local_addr().await.expect("app bound");
    reqwest::get(format!("http://{app_addr}/hello"))
        .await
        .expect("request");

    let metrics_addr = metrics.local_addr().await.expect("metrics bound");
    let scrape = reqwest::get(format!("http://{metrics_addr}/metrics"))
        .await
        .expect("scrape")
        .text()
        .await
        .expect("body");
    assert!(scrape.contains("app_request_total"));
    assert!(scrape.contains(r#"path="/hello""#));
    assert!(scrape.contains(r#"ip="127.0.0.1""#));

    metrics.stop().await.expect("metrics stop");
    app.stop().await.expect("app stop");
}

#[test]
fn test_metrics_server_rejects_invalid_addr() {
    let result = MetricsServer::new(
        &MetricsConfig {
            addr: "not-an-address".to_string(),
        },
        Registry::new(),
        Dispatch::none(),
    );
    assert!(matches!(result, Err(Error::Configuration { .. })));
}

//! Tests for the middleware stack and request probes

use axum::Router;
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode, header};
use axum::routing::get;
use prometheus::Registry;
use std::net::SocketAddr;
use tower::ServiceExt;
use wasabi_providers::http::{NopProbe, PrometheusProbe, build_router};

fn routes() -> Router {
    Router::new()
        .route("/users/{id}", get(|| async { "user" }))
        .route("/report", get(|| async { "x".repeat(4096) }))
        .route("/boom", get(boom))
}

async fn boom() -> &'static str {
    panic!("handler exploded")
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

#[tokio::test]
async fn test_prometheus_probe_labels_matched_route() {
    let registry = Registry::new();
    let probe = PrometheusProbe::new(&registry).expect("probe");
    let app = build_router(routes(), probe.clone());

    let response = app.oneshot(get_request("/users/42")).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(probe.count("unknown", "GET", "/users/{id}", "200"), 1);
    let families = registry.gather();
    assert!(families.iter().any(|f| f.name() == "app_request_total"));
}

#[tokio::test]
async fn test_prometheus_probe_uses_peer_ip() {
    let probe = PrometheusProbe::new(&Registry::new()).expect("probe");
    let app = build_router(routes(), probe.clone());

    let mut request = get_request("/users/1");
    let peer: SocketAddr = "10.1.2.3:5555".parse().expect("addr");
    request.extensions_mut().insert(ConnectInfo(peer));
    app.oneshot(request).await.expect("response");

    assert_eq!(probe.count("10.1.2.3", "GET", "/users/{id}", "200"), 1);
}

#[tokio::test]
async fn test_prometheus_probe_counts_unmatched() {
    let probe = PrometheusProbe::new(&Registry::new()).expect("probe");
    let app = build_router(routes(), probe.clone());

    let response = app.oneshot(get_request("/nope")).await.expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(probe.count("unknown", "GET", "unmatched", "404"), 1);
}

#[tokio::test]
async fn test_panic_becomes_json_500_and_is_counted() {
    let probe = PrometheusProbe::new(&Registry::new()).expect("probe");
    let app = build_router(routes(), probe.clone());

    let response = app.oneshot(get_request("/boom")).await.expect("response");
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let json: serde_json::Value = serde_json::from_slice(&body).expect("json body");
    assert_eq!(json["error"], "internal server error");
    assert_eq!(probe.count("unknown", "GET", "/boom", "500"), 1);
}

#[tokio::test]
async fn test_responses_are_gzip_compressed() {
    let app = build_router(routes(), NopProbe);

    let request = Request::builder()
        .uri("/report")
        .header(header::ACCEPT_ENCODING, "gzip")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");

    assert_eq!(
        response.headers().get(header::CONTENT_ENCODING),
        Some(&header::HeaderValue::from_static("gzip"))
    );
}

#[tokio::test]
async fn test_nop_probe_passes_through() {
    let app = build_router(routes(), NopProbe);

    let response = app.oneshot(get_request("/users/9")).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    assert_eq!(&body[..], b"user");
}

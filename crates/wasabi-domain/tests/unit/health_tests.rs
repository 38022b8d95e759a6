//! Tests for health check values

use std::time::Duration;
use wasabi_domain::ports::{HealthCheck, HealthStatus};

#[test]
fn test_healthy_check() {
    let check = HealthCheck::healthy("postgres").with_response_time(Duration::from_millis(12));
    assert_eq!(check.status, HealthStatus::Up);
    assert!(check.status.is_healthy());
    assert_eq!(check.response_time_ms, 12);
    assert!(check.error.is_none());
}

#[test]
fn test_failed_check_carries_error() {
    let check = HealthCheck::failed("redis", Some("connection refused".to_string()));
    assert_eq!(check.status, HealthStatus::Down);
    assert_eq!(check.error.as_deref(), Some("connection refused"));
}

#[test]
fn test_status_serializes_lowercase() {
    let json = serde_json::to_string(&HealthStatus::Down).expect("serialize");
    assert_eq!(json, "\"down\"");
}

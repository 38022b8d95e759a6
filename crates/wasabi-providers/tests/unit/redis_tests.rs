//! Tests for the Redis adapter that need no running server

use prometheus::Registry;
use tracing::Dispatch;
use wasabi_domain::error::Error;
use wasabi_domain::ports::{HealthChecker, HealthStatus, LifecycleManaged, ServiceState};
use wasabi_domain::value_objects::CacheConfig;
use wasabi_providers::cache::RedisCache;

fn enabled() -> CacheConfig {
    CacheConfig {
        enable: true,
        addr: "127.0.0.1:1".to_string(),
        ..CacheConfig::default()
    }
}

#[test]
fn test_disabled_cache_refuses_construction() {
    let registry = Registry::new();
    let result = RedisCache::new(&CacheConfig::default(), &registry, Dispatch::none());

    match result {
        Err(err) => {
            assert!(err.is_disabled());
            assert_eq!(err.to_string(), "redis is disabled");
        }
        Ok(_) => panic!("disabled cache must not construct"),
    }
}

#[test]
fn test_enabled_cache_builds_without_connecting() {
    let cache = RedisCache::new(&enabled(), &Registry::new(), Dispatch::none()).expect("client");

    assert_eq!(cache.addr(), "127.0.0.1:1");
    assert_eq!(cache.state(), ServiceState::Stopped);
}

#[test]
fn test_connection_info_carries_db_and_password() {
    let config = CacheConfig {
        db: 3,
        password: "0123:secret@x".to_string(),
        ..enabled()
    };
    let cache = RedisCache::new(&config, &Registry::new(), Dispatch::none()).expect("client");

    let settings = cache.connection_info().redis_settings();
    assert_eq!(settings.db(), 3);
    assert_eq!(settings.password(), Some("0123:secret@x"));
}

#[test]
fn test_malformed_addr_is_configuration_error() {
    let config = CacheConfig {
        addr: "cache-without-port".to_string(),
        ..enabled()
    };
    let result = RedisCache::new(&config, &Registry::new(), Dispatch::none());
    assert!(matches!(result, Err(Error::Configuration { .. })));
}

#[tokio::test]
async fn test_command_before_start_is_cache_error() {
    let cache = RedisCache::new(&enabled(), &Registry::new(), Dispatch::none()).expect("client");

    let result: Result<String, Error> = cache.command("GET", &["key"]).await;
    assert!(matches!(result, Err(Error::Cache { .. })));
}

#[tokio::test]
async fn test_start_fails_when_unreachable() {
    let cache = RedisCache::new(&enabled(), &Registry::new(), Dispatch::none()).expect("client");

    assert!(matches!(cache.start().await, Err(Error::Cache { .. })));
    assert_eq!(cache.state(), ServiceState::Stopped);
}

#[tokio::test]
async fn test_health_check_down_without_connection() {
    let cache = RedisCache::new(&enabled(), &Registry::new(), Dispatch::none()).expect("client");

    let check = cache.health_checker().check_health().await;
    assert_eq!(check.status, HealthStatus::Down);
    assert_eq!(check.name, "redis");
}

#[tokio::test]
async fn test_stop_is_idempotent() {
    let cache = RedisCache::new(&enabled(), &Registry::new(), Dispatch::none()).expect("client");

    cache.stop().await.expect("first stop");
    cache.stop().await.expect("second stop");
    assert_eq!(cache.state(), ServiceState::Stopped);
}

#[test]
fn test_instruments_registered_once_per_registry() {
    let registry = Registry::new();
    let _first = RedisCache::new(&enabled(), &registry, Dispatch::none()).expect("client");

    let second = RedisCache::new(&enabled(), &registry, Dispatch::none());
    assert!(matches!(second, Err(Error::Internal { .. })));
}

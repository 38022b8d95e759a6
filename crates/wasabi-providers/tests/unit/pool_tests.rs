//! Tests for pool settings resolution

use crate::support::CapturedLogs;
use std::time::Duration;
use wasabi_domain::value_objects::DatabaseConfig;
use wasabi_providers::database::PoolSettings;
use wasabi_providers::database::pool::STATEMENT_CACHE_CAPACITY;

fn zeroed() -> DatabaseConfig {
    DatabaseConfig {
        dsn: "postgres://app@localhost/app".to_string(),
        slow_threshold_ms: 0,
        max_idle_conns: 0,
        max_open_conns: 0,
        conn_max_lifetime_millis: 0,
        conn_max_idle_time_millis: 0,
        connect_timeout_millis: 0,
        ..DatabaseConfig::default()
    }
}

#[test]
fn test_unset_fields_resolve_to_defaults() {
    let settings = PoolSettings::resolve(&zeroed());

    assert_eq!(settings.max_idle_conns, 10);
    assert_eq!(settings.max_open_conns, 50);
    assert_eq!(settings.max_lifetime, Duration::from_secs(2 * 60 * 60));
    assert_eq!(settings.idle_timeout, Duration::from_secs(60));
    assert_eq!(settings.acquire_timeout, Duration::from_secs(5));
    assert_eq!(settings.slow_threshold, Duration::from_millis(200));
}

#[test]
fn test_explicit_values_are_kept() {
    let config = DatabaseConfig {
        max_idle_conns: 3,
        max_open_conns: 7,
        conn_max_lifetime_millis: 1_000,
        conn_max_idle_time_millis: 500,
        connect_timeout_millis: 250,
        slow_threshold_ms: 50,
        ..zeroed()
    };
    let settings = PoolSettings::resolve(&config);

    assert_eq!(settings.max_idle_conns, 3);
    assert_eq!(settings.max_open_conns, 7);
    assert_eq!(settings.max_lifetime, Duration::from_secs(1));
    assert_eq!(settings.idle_timeout, Duration::from_millis(500));
    assert_eq!(settings.acquire_timeout, Duration::from_millis(250));
    assert_eq!(settings.slow_threshold, Duration::from_millis(50));
}

#[test]
fn test_each_substitution_logged_at_debug() {
    let logs = CapturedLogs::default();
    tracing::dispatcher::with_default(&logs.dispatch(), || {
        PoolSettings::resolve(&zeroed());
    });

    let substitutions = logs.with_message("using default value for pool setting");
    assert_eq!(substitutions.len(), 6);
    assert!(substitutions.iter().all(|line| line["level"] == "DEBUG"));
    assert!(
        substitutions
            .iter()
            .any(|line| line["fields"]["setting"] == "max_idle_conns")
    );
}

#[test]
fn test_no_log_when_nothing_substituted() {
    let logs = CapturedLogs::default();
    tracing::dispatcher::with_default(&logs.dispatch(), || {
        PoolSettings::resolve(&DatabaseConfig::default());
    });

    assert!(logs.with_message("using default value for pool setting").is_empty());
}

#[test]
fn test_released_connection_kept_below_idle_cap() {
    let settings = PoolSettings::resolve(&DatabaseConfig {
        max_idle_conns: 2,
        ..zeroed()
    });

    assert!(settings.keep_released(0));
    assert!(settings.keep_released(1));
    assert!(!settings.keep_released(2));
    assert!(!settings.keep_released(5));
}

#[test]
fn test_default_idle_cap_applies_on_release() {
    let settings = PoolSettings::resolve(&zeroed());

    assert!(settings.keep_released(9));
    assert!(!settings.keep_released(10));
}

#[test]
fn test_simple_protocol_disables_statement_cache() {
    let logs = CapturedLogs::default();
    let settings = tracing::dispatcher::with_default(&logs.dispatch(), || {
        PoolSettings::resolve(&DatabaseConfig {
            prefer_simple_protocol: true,
            ..DatabaseConfig::default()
        })
    });

    assert_eq!(settings.statement_cache_capacity, 0);
    assert_eq!(logs.with_message("prepared statement cache disabled").len(), 1);
}

#[test]
fn test_extended_protocol_keeps_statement_cache() {
    let settings = PoolSettings::resolve(&DatabaseConfig::default());
    assert_eq!(settings.statement_cache_capacity, STATEMENT_CACHE_CAPACITY);
}

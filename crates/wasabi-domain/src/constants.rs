//! Domain constants

use std::time::Duration;

/// Application name, also used as the configuration namespace
pub const APP_NAME: &str = "wasabi";

/// Application version baked in at build time
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment name that suppresses the startup banner
pub const ENV_PRODUCTION: &str = "production";

/// Environment name used when none is configured
pub const DEFAULT_ENV: &str = "development";

/// Default bound for lifecycle hooks and outbound pings
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

// ============================================================================
// POSTGRES POOL DEFAULTS
// ============================================================================

/// Idle connections kept in the pool
pub const DEFAULT_MAX_IDLE_CONNS: u32 = 10;

/// Open connections allowed in the pool
pub const DEFAULT_MAX_OPEN_CONNS: u32 = 50;

/// Connection lifetime in milliseconds (2 hours)
pub const DEFAULT_CONN_MAX_LIFETIME_MILLIS: u64 = 2 * 60 * 60 * 1000;

/// Connection idle time in milliseconds (1 minute)
pub const DEFAULT_CONN_MAX_IDLE_TIME_MILLIS: u64 = 60 * 1000;

/// Time allowed to obtain a pooled connection, in milliseconds
pub const DEFAULT_CONNECT_TIMEOUT_MILLIS: u64 = 5000;

/// Queries at or above this duration are logged as slow
pub const DEFAULT_SLOW_THRESHOLD_MS: u64 = 200;

// ============================================================================
// NETWORK DEFAULTS
// ============================================================================

/// HTTP port used when the configured port is 0
pub const DEFAULT_HTTP_PORT: u16 = 9999;

/// HTTP bind host
pub const DEFAULT_HTTP_HOST: &str = "127.0.0.1";

/// Metrics listener address
pub const DEFAULT_METRICS_ADDR: &str = "127.0.0.1:9090";

/// Redis endpoint
pub const DEFAULT_REDIS_ADDR: &str = "127.0.0.1:6379";

/// Minimum log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

//! Provider constants

// ============================================================================
// COMPONENT NAMES
// ============================================================================

/// Lifecycle and health check name of the database adapter
pub const POSTGRES_COMPONENT: &str = "postgres";

/// Lifecycle and health check name of the cache adapter
pub const REDIS_COMPONENT: &str = "redis";

/// Lifecycle name of the application HTTP server
pub const HTTP_COMPONENT: &str = "http";

/// Lifecycle name of the metrics server
pub const METRICS_COMPONENT: &str = "metrics";

// ============================================================================
// METRICS
// ============================================================================

/// Request counter incremented by the prometheus probe
pub const HTTP_REQUESTS_METRIC: &str = "app_request_total";

/// Redis command counter
pub const REDIS_COMMANDS_METRIC: &str = "redis_commands_total";

/// Redis command latency histogram
pub const REDIS_DURATION_METRIC: &str = "redis_command_duration_seconds";

/// Scrape endpoint path on the metrics server
pub const METRICS_PATH: &str = "/metrics";

/// Path label for requests that matched no route
pub const UNMATCHED_PATH: &str = "unmatched";

/// IP label when the peer address is unknown
pub const UNKNOWN_PEER: &str = "unknown";

// ============================================================================
// TRACING
// ============================================================================

/// Span name for database statements
pub const DB_QUERY_SPAN: &str = "db.query";

/// Span name for redis commands
pub const REDIS_COMMAND_SPAN: &str = "redis.command";

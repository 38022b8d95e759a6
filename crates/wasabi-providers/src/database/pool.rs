//! Pool settings
//!
//! Resolves the configured pool limits, replacing zero values with the
//! documented defaults and logging each substitution at debug level.

use std::time::Duration;
use tracing::debug;
use wasabi_domain::constants::{
    DEFAULT_CONN_MAX_IDLE_TIME_MILLIS, DEFAULT_CONN_MAX_LIFETIME_MILLIS,
    DEFAULT_CONNECT_TIMEOUT_MILLIS, DEFAULT_MAX_IDLE_CONNS, DEFAULT_MAX_OPEN_CONNS,
    DEFAULT_SLOW_THRESHOLD_MS,
};
use wasabi_domain::value_objects::DatabaseConfig;

/// Per-connection statement cache size when prepared statements are on
pub const STATEMENT_CACHE_CAPACITY: usize = 100;

/// Pool limits applied to the connection pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSettings {
    /// Idle connections above this count are closed on release
    pub max_idle_conns: u32,
    pub max_open_conns: u32,
    pub max_lifetime: Duration,
    pub idle_timeout: Duration,
    pub acquire_timeout: Duration,
    pub slow_threshold: Duration,
    /// Prepared statements cached per connection; 0 with the simple protocol
    pub statement_cache_capacity: usize,
}

impl PoolSettings {
    /// Resolve settings from configuration
    pub fn resolve(config: &DatabaseConfig) -> Self {
        let max_idle_conns = or_default(
            "max_idle_conns",
            config.max_idle_conns,
            DEFAULT_MAX_IDLE_CONNS,
        );
        let max_open_conns = or_default(
            "max_open_conns",
            config.max_open_conns,
            DEFAULT_MAX_OPEN_CONNS,
        );
        let lifetime_ms = or_default(
            "conn_max_lifetime_millis",
            config.conn_max_lifetime_millis,
            DEFAULT_CONN_MAX_LIFETIME_MILLIS,
        );
        let idle_ms = or_default(
            "conn_max_idle_time_millis",
            config.conn_max_idle_time_millis,
            DEFAULT_CONN_MAX_IDLE_TIME_MILLIS,
        );
        let acquire_ms = or_default(
            "connect_timeout_millis",
            config.connect_timeout_millis,
            DEFAULT_CONNECT_TIMEOUT_MILLIS,
        );
        let slow_ms = or_default(
            "slow_threshold_ms",
            config.slow_threshold_ms,
            DEFAULT_SLOW_THRESHOLD_MS,
        );

        let statement_cache_capacity = if config.prefer_simple_protocol {
            debug!("prepared statement cache disabled");
            0
        } else {
            STATEMENT_CACHE_CAPACITY
        };

        Self {
            max_idle_conns,
            max_open_conns,
            max_lifetime: Duration::from_millis(lifetime_ms),
            idle_timeout: Duration::from_millis(idle_ms),
            acquire_timeout: Duration::from_millis(acquire_ms),
            slow_threshold: Duration::from_millis(slow_ms),
            statement_cache_capacity,
        }
    }

    /// Whether a released connection goes back to the pool given the
    /// current idle count
    pub fn keep_released(&self, num_idle: usize) -> bool {
        num_idle < self.max_idle_conns as usize
    }
}

fn or_default<T>(setting: &'static str, value: T, default: T) -> T
where
    T: Copy + Default + PartialEq + std::fmt::Display,
{
    if value == T::default() {
        debug!(setting, default = %default, "using default value for pool setting");
        default
    } else {
        value
    }
}

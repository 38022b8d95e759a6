//! Application configuration root

use serde::{Deserialize, Serialize};
use std::time::Duration;
use wasabi_domain::constants::{DEFAULT_ENV, DEFAULT_TIMEOUT, ENV_PRODUCTION};
use wasabi_domain::value_objects::{
    CacheConfig, DatabaseConfig, HttpConfig, LogConfig, MetricsConfig, TracingConfig,
};

/// Complete configuration, immutable once loaded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Deployment environment name
    pub env: String,
    pub http: HttpConfig,
    pub redis: CacheConfig,
    pub postgres: DatabaseConfig,
    pub metrics: MetricsConfig,
    pub tracing: TracingConfig,
    pub log: LogConfig,
    /// Bound applied to each stop hook
    #[serde(with = "wasabi_domain::value_objects::duration")]
    pub shutdown_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            env: DEFAULT_ENV.to_string(),
            http: HttpConfig::default(),
            redis: CacheConfig::default(),
            postgres: DatabaseConfig::default(),
            metrics: MetricsConfig::default(),
            tracing: TracingConfig::default(),
            log: LogConfig::default(),
            shutdown_timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl AppConfig {
    /// Whether `env` names the production environment
    pub fn is_production(&self) -> bool {
        self.env.eq_ignore_ascii_case(ENV_PRODUCTION)
    }
}

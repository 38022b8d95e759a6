//! Value objects

pub mod config;
pub mod duration;

pub use config::{
    CacheConfig, DatabaseConfig, HttpConfig, LogConfig, MetricsConfig, TracingConfig,
};

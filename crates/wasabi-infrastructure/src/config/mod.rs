//! Configuration
//!
//! [`AppConfig`] aggregates the per-subsystem configs; [`ConfigLoader`]
//! layers defaults, an optional TOML file and `WASABI_*` environment
//! variables into it.

pub mod loader;
pub mod types;

pub use loader::ConfigLoader;
pub use types::AppConfig;

//! Infrastructure layer constants
//!
//! Domain defaults live in `wasabi_domain::constants`.

// ============================================================================
// CONFIGURATION CONSTANTS
// ============================================================================

/// Environment variable prefix for configuration
pub const CONFIG_ENV_PREFIX: &str = "WASABI";

/// Configuration file looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILENAME: &str = "wasabi.toml";

/// Configuration sections addressable as `WASABI_<SECTION>_<FIELD>`
pub const CONFIG_SECTIONS: &[&str] = &["http", "redis", "postgres", "metrics", "tracing", "log"];

// ============================================================================
// LIFECYCLE CONSTANTS
// ============================================================================

/// Component name of the application scope
pub const APP_SCOPE_COMPONENT: &str = "app";

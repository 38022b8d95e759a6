//! # Infrastructure Layer
//!
//! Cross-cutting concerns and the composition root for wasabi.
//!
//! ### Configuration & Composition
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Defaults, TOML file and `WASABI_*` environment layering |
//! | [`di`] | `init_app` composition root and `AppContext` |
//! | [`constants`] | Infrastructure constants |
//!
//! ### Observability
//! | Module | Description |
//! |--------|-------------|
//! | [`logging`] | JSON structured logging with tracing |
//! | [`health`] | Health check registry |
//!
//! ### Runtime
//! | Module | Description |
//! |--------|-------------|
//! | [`infrastructure`] | Lifecycle, application scope, signals |
//! | [`banner`] | Startup banner |

pub mod banner;
pub mod config;
pub mod constants;
pub mod di;
pub mod health;
pub mod infrastructure;
pub mod logging;

pub use wasabi_domain::error_ext::ErrorContext;

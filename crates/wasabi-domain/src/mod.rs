//! # Domain Layer
//!
//! Types shared by every wasabi crate: the error taxonomy, the lifecycle and
//! health ports implemented by adapters, and the per-subsystem configuration
//! value objects.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`error`] | Error enum and `Result` alias |
//! | [`error_ext`] | `ErrorContext` for converting foreign errors |
//! | [`ports`] | `LifecycleManaged` and `HealthChecker` traits |
//! | [`value_objects`] | Subsystem configuration |
//! | [`constants`] | Application name, version and defaults |

pub mod constants;
pub mod error;
pub mod error_ext;
pub mod ports;
pub mod value_objects;

pub use error::{Error, Result};
pub use error_ext::ErrorContext;

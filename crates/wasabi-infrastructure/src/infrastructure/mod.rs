//! Runtime infrastructure
//!
//! - [`lifecycle`]: ordered start/stop of components, application scope and
//!   shutdown coordination
//! - [`signal`]: process termination signals

pub mod lifecycle;
pub mod signal;

pub use lifecycle::{AppScope, DefaultShutdownCoordinator, Lifecycle};
pub use signal::shutdown_signal;

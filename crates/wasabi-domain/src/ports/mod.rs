//! Port traits implemented by adapters

pub mod health;
pub mod lifecycle;

pub use health::{HealthCheck, HealthChecker, HealthStatus};
pub use lifecycle::{LifecycleManaged, ServiceState, ShutdownCoordinator, StateCell};

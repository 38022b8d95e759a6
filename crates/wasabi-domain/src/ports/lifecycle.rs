//! Lifecycle port
//!
//! Every long-lived handle owned by the composition root implements
//! [`LifecycleManaged`]. The infrastructure lifecycle starts components in
//! registration order and stops them in reverse.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU8, Ordering};

/// Component lifecycle state
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ServiceState {
    /// Start hook is running
    Starting,
    /// Start hook completed
    Running,
    /// Stop hook is running
    Stopping,
    /// Not started, or stopped
    #[default]
    Stopped,
}

impl ServiceState {
    fn as_u8(self) -> u8 {
        match self {
            Self::Starting => 0,
            Self::Running => 1,
            Self::Stopping => 2,
            Self::Stopped => 3,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Starting,
            1 => Self::Running,
            2 => Self::Stopping,
            _ => Self::Stopped,
        }
    }
}

/// Lock-free holder for a component's [`ServiceState`]
#[derive(Debug)]
pub struct StateCell(AtomicU8);

impl StateCell {
    pub fn new() -> Self {
        Self(AtomicU8::new(ServiceState::Stopped.as_u8()))
    }

    pub fn get(&self) -> ServiceState {
        ServiceState::from_u8(self.0.load(Ordering::SeqCst))
    }

    pub fn set(&self, state: ServiceState) {
        self.0.store(state.as_u8(), Ordering::SeqCst);
    }
}

impl Default for StateCell {
    fn default() -> Self {
        Self::new()
    }
}

/// Start/stop hooks for a component
///
/// # Example
///
/// ```no_run
/// use wasabi_domain::ports::{LifecycleManaged, ServiceState};
/// use std::sync::Arc;
///
/// async fn bounce(component: Arc<dyn LifecycleManaged>) -> wasabi_domain::Result<()> {
///     if component.state() == ServiceState::Running {
///         component.stop().await?;
///     }
///     component.start().await
/// }
/// ```
#[async_trait::async_trait]
pub trait LifecycleManaged: Send + Sync {
    /// Component name used in logs and error reports
    fn name(&self) -> &str;

    /// Current state
    fn state(&self) -> ServiceState;

    /// Start hook; an error aborts application startup
    async fn start(&self) -> Result<()>;

    /// Stop hook; errors are reported but do not block other stop hooks
    async fn stop(&self) -> Result<()>;
}

/// Process-wide shutdown trigger
pub trait ShutdownCoordinator: Send + Sync {
    /// Request shutdown; idempotent
    fn signal_shutdown(&self);

    /// Whether shutdown has been requested
    fn is_shutting_down(&self) -> bool;
}

//! Component lifecycle
//!
//! [`Lifecycle`] owns the registered components in dependency order:
//!
//! ```text
//!  start ──►  app scope ─► database ─► cache ─► metrics ─► http
//!  stop  ◄──  app scope ◄─ database ◄─ cache ◄─ metrics ◄─ http
//! ```
//!
//! A failing start hook rolls back the components already started, in
//! reverse. Stop runs each started component's hook once, bounded by the
//! shutdown timeout, and keeps going past failures.

use crate::constants::APP_SCOPE_COMPONENT;
use crate::logging::FriendlyLogger;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, Notify};
use tokio_util::sync::CancellationToken;
use wasabi_domain::error::{Error, Result};
use wasabi_domain::ports::{LifecycleManaged, ServiceState, ShutdownCoordinator, StateCell};

/// Ordered set of lifecycle-managed components
pub struct Lifecycle {
    components: Vec<Arc<dyn LifecycleManaged>>,
    started: Mutex<usize>,
    stopped: AtomicBool,
    stop_timeout: Duration,
    logger: FriendlyLogger,
}

impl Lifecycle {
    pub fn new(stop_timeout: Duration, logger: FriendlyLogger) -> Self {
        Self {
            components: Vec::new(),
            started: Mutex::new(0),
            stopped: AtomicBool::new(false),
            stop_timeout,
            logger,
        }
    }

    /// Append a component; it starts after every component registered before it
    pub fn register(&mut self, component: Arc<dyn LifecycleManaged>) {
        self.components.push(component);
    }

    /// Component names in start order
    pub fn names(&self) -> Vec<String> {
        self.components
            .iter()
            .map(|c| c.name().to_string())
            .collect()
    }

    /// Current state of every component, in start order
    pub fn states(&self) -> Vec<(String, ServiceState)> {
        self.components
            .iter()
            .map(|c| (c.name().to_string(), c.state()))
            .collect()
    }

    /// Start every component in order
    ///
    /// On failure the components already started are stopped in reverse
    /// and the start error is returned.
    pub async fn start_all(&self) -> Result<()> {
        let mut started = self.started.lock().await;

        for component in self.components.iter().skip(*started) {
            self.logger.debug(format!("starting {}", component.name()));
            if let Err(e) = component.start().await {
                self.logger
                    .error(format!("{} failed to start: {e}", component.name()));
                let rollback = self.stop_range(*started).await;
                *started = 0;
                self.stopped.store(true, Ordering::SeqCst);
                if let Err(stop_error) = rollback {
                    self.logger.error(stop_error);
                }
                return Err(e);
            }
            *started += 1;
            self.logger.debug(format!("started {}", component.name()));
        }
        Ok(())
    }

    /// Stop every started component in reverse order, once
    pub async fn stop_all(&self) -> Result<()> {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let mut started = self.started.lock().await;
        let result = self.stop_range(*started).await;
        *started = 0;
        result
    }

    async fn stop_range(&self, count: usize) -> Result<()> {
        let mut failures = Vec::new();

        for component in self.components[..count].iter().rev() {
            let name = component.name();
            self.logger.debug(format!("stopping {name}"));
            match tokio::time::timeout(self.stop_timeout, component.stop()).await {
                Ok(Ok(())) => self.logger.debug(format!("stopped {name}")),
                Ok(Err(e)) => failures.push(format!("{name}: {e}")),
                Err(_) => failures.push(format!(
                    "{name}: stop timed out after {}",
                    humantime::format_duration(self.stop_timeout)
                )),
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(Error::shutdown(failures.join("; ")))
        }
    }
}

impl std::fmt::Debug for Lifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lifecycle")
            .field("components", &self.names())
            .field("stop_timeout", &self.stop_timeout)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Application Scope
// ============================================================================

/// Cancellation scope for long-running application work
///
/// Cancelled when the application stops.
#[derive(Debug)]
pub struct AppScope {
    token: CancellationToken,
    state: StateCell,
}

impl AppScope {
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
            state: StateCell::new(),
        }
    }

    /// Token cancelled on stop
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Default for AppScope {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl LifecycleManaged for AppScope {
    fn name(&self) -> &str {
        APP_SCOPE_COMPONENT
    }

    fn state(&self) -> ServiceState {
        self.state.get()
    }

    async fn start(&self) -> Result<()> {
        self.state.set(ServiceState::Running);
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        self.token.cancel();
        self.state.set(ServiceState::Stopped);
        Ok(())
    }
}

// ============================================================================
// Default Shutdown Coordinator
// ============================================================================

/// Shutdown flag with async waiting
pub struct DefaultShutdownCoordinator {
    shutdown_signal: AtomicBool,
    notify: Notify,
}

impl DefaultShutdownCoordinator {
    pub fn new() -> Self {
        Self {
            shutdown_signal: AtomicBool::new(false),
            notify: Notify::new(),
        }
    }

    /// Resolve once `signal_shutdown` has been called
    pub async fn wait_for_shutdown(&self) {
        let notified = self.notify.notified();
        if self.is_shutting_down() {
            return;
        }
        notified.await;
    }
}

impl Default for DefaultShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DefaultShutdownCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultShutdownCoordinator")
            .field("is_shutting_down", &self.is_shutting_down())
            .finish()
    }
}

impl ShutdownCoordinator for DefaultShutdownCoordinator {
    fn signal_shutdown(&self) {
        self.shutdown_signal.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    fn is_shutting_down(&self) -> bool {
        self.shutdown_signal.load(Ordering::SeqCst)
    }
}

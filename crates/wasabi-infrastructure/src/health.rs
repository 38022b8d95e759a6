//! Health monitoring
//!
//! Aggregates the [`HealthChecker`]s registered by the composition root.
//! Checks run on demand; nothing here exposes them over HTTP.

use crate::logging::log_health_check;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::Dispatch;
use tracing::instrument::WithSubscriber;
use wasabi_domain::constants::APP_VERSION;
use wasabi_domain::ports::{HealthCheck, HealthChecker, HealthStatus};

/// Overall health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Worst status among the checks
    pub status: HealthStatus,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Total response time in milliseconds
    pub response_time_ms: u64,
    pub checks: HashMap<String, HealthCheck>,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthResponse {
    pub fn new() -> Self {
        Self {
            status: HealthStatus::Up,
            timestamp: chrono::Utc::now(),
            response_time_ms: 0,
            checks: HashMap::new(),
            version: APP_VERSION.to_string(),
        }
    }

    /// Add a health check result
    pub fn add_check(mut self, check: HealthCheck) -> Self {
        if check.status == HealthStatus::Down {
            self.status = HealthStatus::Down;
        }

        self.checks.insert(check.name.clone(), check);
        self
    }

    pub fn with_response_time(mut self, duration: Duration) -> Self {
        self.response_time_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Check if the overall system is healthy
    pub fn is_healthy(&self) -> bool {
        self.status.is_healthy()
    }
}

/// Health check registry
#[derive(Clone)]
pub struct HealthRegistry {
    checkers: Arc<RwLock<HashMap<String, Box<dyn HealthChecker>>>>,
    dispatch: Dispatch,
}

impl HealthRegistry {
    pub fn new(dispatch: Dispatch) -> Self {
        Self {
            checkers: Arc::new(RwLock::new(HashMap::new())),
            dispatch,
        }
    }

    /// Register a health checker, replacing any checker of the same name
    pub async fn register_checker<C>(&self, name: impl Into<String>, checker: C)
    where
        C: HealthChecker + 'static,
    {
        self.checkers
            .write()
            .await
            .insert(name.into(), Box::new(checker));
    }

    pub async fn unregister_checker(&self, name: &str) {
        self.checkers.write().await.remove(name);
    }

    /// Perform all registered health checks
    pub async fn perform_health_checks(&self) -> HealthResponse {
        let dispatch = self.dispatch.clone();
        async {
            let start_time = Instant::now();
            let checkers = self.checkers.read().await;

            let mut response = HealthResponse::new();
            for (name, checker) in checkers.iter() {
                let check = checker.check_health().await;
                log_health_check(name, check.status.is_healthy(), check.error.as_deref());
                response = response.add_check(check);
            }

            response.with_response_time(start_time.elapsed())
        }
        .with_subscriber(dispatch)
        .await
    }

    /// Registered check names, sorted
    pub async fn list_checks(&self) -> Vec<String> {
        let mut names: Vec<String> = self.checkers.read().await.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for HealthRegistry {
    fn default() -> Self {
        Self::new(Dispatch::none())
    }
}

impl std::fmt::Debug for HealthRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthRegistry").finish_non_exhaustive()
    }
}

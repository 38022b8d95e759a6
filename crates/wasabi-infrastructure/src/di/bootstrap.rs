//! Application bootstrap
//!
//! Construction order:
//!
//! ```text
//! Registry → PostgresDatabase → RedisCache? → Probe
//!          → HealthRegistry → HttpServer → MetricsServer → AppScope
//! ```
//!
//! Construction only validates and allocates; no connection is opened and
//! no port is bound until [`AppContext::start`]. Any construction error
//! aborts before anything has started.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let config = ConfigLoader::new().load()?;
//! let logger = Logger::new(&config.log);
//! let context = init_app(config, &logger).await?;
//! context.run(shutdown_signal()).await?;
//! ```

use crate::config::AppConfig;
use crate::health::HealthRegistry;
use crate::infrastructure::{AppScope, DefaultShutdownCoordinator, Lifecycle};
use crate::logging::Logger;
use axum::Router;
use prometheus::Registry;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use wasabi_domain::constants::{APP_NAME, APP_VERSION};
use wasabi_domain::error::Result;
use wasabi_domain::ports::{LifecycleManaged, ShutdownCoordinator};
use wasabi_providers::cache::RedisCache;
use wasabi_providers::database::PostgresDatabase;
use wasabi_providers::http::{HttpServer, MetricsServer, Probe, PrometheusProbe};

/// Every constructed component plus the lifecycle driving them
pub struct AppContext {
    config: Arc<AppConfig>,
    logger: Logger,
    registry: Registry,
    database: Arc<PostgresDatabase>,
    cache: Option<Arc<RedisCache>>,
    http: Arc<HttpServer>,
    metrics: Arc<MetricsServer>,
    health: HealthRegistry,
    scope: Arc<AppScope>,
    shutdown: Arc<DefaultShutdownCoordinator>,
    lifecycle: Lifecycle,
}

/// Build the application with no business routes, counting requests in
/// the metrics registry
pub async fn init_app(config: AppConfig, logger: &Logger) -> Result<AppContext> {
    init_app_with_routes(config, logger, Router::new(), PrometheusProbe::new).await
}

/// Build the application serving `routes` behind the standard middleware
///
/// `make_probe` chooses the request probe; it receives the registry the
/// metrics server scrapes.
///
/// ```rust,ignore
/// let context = init_app_with_routes(config, &logger, routes, |_| Ok(NopProbe)).await?;
/// ```
pub async fn init_app_with_routes<P, F>(
    config: AppConfig,
    logger: &Logger,
    routes: Router,
    make_probe: F,
) -> Result<AppContext>
where
    P: Probe,
    F: FnOnce(&Registry) -> Result<P>,
{
    let dispatch = logger.dispatch();
    let registry = Registry::new();

    let database = Arc::new(PostgresDatabase::new(&config.postgres, dispatch.clone())?);

    let cache = if config.redis.enable {
        Some(Arc::new(RedisCache::new(
            &config.redis,
            &registry,
            dispatch.clone(),
        )?))
    } else {
        logger.friendly().info("redis disabled, skipping cache");
        None
    };

    let probe = make_probe(&registry)?;

    let health = HealthRegistry::new(dispatch.clone());
    health
        .register_checker(database.name(), database.health_checker())
        .await;
    if let Some(cache) = &cache {
        health
            .register_checker(cache.name(), cache.health_checker())
            .await;
    }

    let http = Arc::new(HttpServer::new(&config.http, probe, routes, dispatch.clone()));
    let metrics = Arc::new(MetricsServer::new(
        &config.metrics,
        registry.clone(),
        dispatch.clone(),
    )?);
    let scope = Arc::new(AppScope::new());

    let mut lifecycle = Lifecycle::new(config.shutdown_timeout, logger.friendly());
    lifecycle.register(scope.clone());
    lifecycle.register(database.clone());
    if let Some(cache) = &cache {
        lifecycle.register(cache.clone());
    }
    lifecycle.register(metrics.clone());
    lifecycle.register(http.clone());

    Ok(AppContext {
        config: Arc::new(config),
        logger: logger.clone(),
        registry,
        database,
        cache,
        http,
        metrics,
        health,
        scope,
        shutdown: Arc::new(DefaultShutdownCoordinator::new()),
        lifecycle,
    })
}

impl AppContext {
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Registry scraped by the metrics server
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn database(&self) -> Arc<PostgresDatabase> {
        Arc::clone(&self.database)
    }

    /// Redis client, absent when disabled
    pub fn cache(&self) -> Option<Arc<RedisCache>> {
        self.cache.clone()
    }

    pub fn http(&self) -> Arc<HttpServer> {
        Arc::clone(&self.http)
    }

    pub fn metrics(&self) -> Arc<MetricsServer> {
        Arc::clone(&self.metrics)
    }

    pub fn health(&self) -> &HealthRegistry {
        &self.health
    }

    /// Token cancelled when the application stops
    pub fn scope_token(&self) -> CancellationToken {
        self.scope.token()
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    /// Programmatic shutdown trigger for [`AppContext::run`]
    pub fn shutdown_coordinator(&self) -> Arc<DefaultShutdownCoordinator> {
        Arc::clone(&self.shutdown)
    }

    /// Run every start hook in order
    pub async fn start(&self) -> Result<()> {
        self.lifecycle.start_all().await?;
        let _guard = tracing::dispatcher::set_default(&self.logger.dispatch());
        info!(
            app = APP_NAME,
            version = APP_VERSION,
            env = %self.config.env,
            http = %self.http.addr(),
            "application started"
        );
        Ok(())
    }

    /// Run every stop hook in reverse order
    pub async fn stop(&self) -> Result<()> {
        let result = self.lifecycle.stop_all().await;
        let _guard = tracing::dispatcher::set_default(&self.logger.dispatch());
        info!(app = APP_NAME, "application stopped");
        result
    }

    /// Start, wait for `signal` or a programmatic shutdown, then stop
    pub async fn run<F>(&self, signal: F) -> Result<()>
    where
        F: Future<Output = ()> + Send,
    {
        self.start().await?;

        tokio::select! {
            () = signal => {}
            () = self.shutdown.wait_for_shutdown() => {}
        }
        self.shutdown.signal_shutdown();
        self.logger.friendly().info("shutdown requested");

        self.stop().await
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("env", &self.config.env)
            .field("lifecycle", &self.lifecycle)
            .finish_non_exhaustive()
    }
}

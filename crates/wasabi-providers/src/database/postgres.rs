//! PostgreSQL adapter
//!
//! Owns the sqlx connection pool for the lifetime of the application.
//!
//! ## States
//!
//! ```text
//! new()          → opened + pool configured (lazy, no connection yet)
//! start()        → ping; failure aborts startup
//! stop()         → pool closed, exactly once
//! ```
//!
//! ## Example
//!
//! ```ignore
//! let db = PostgresDatabase::new(&config.postgres, dispatch)?;
//! db.start().await?;
//! let row = db.fetch_one("SELECT 1").await?;
//! ```

use crate::constants::{DB_QUERY_SPAN, POSTGRES_COMPONENT};
use crate::database::pool::PoolSettings;
use crate::database::query_logger::{QueryLogLevel, QueryLogger};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgQueryResult, PgRow};
use sqlx::{ConnectOptions, Connection};
use std::future::Future;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tracing::instrument::WithSubscriber;
use tracing::{Dispatch, Instrument, field, info, info_span};
use wasabi_domain::constants::DEFAULT_TIMEOUT;
use wasabi_domain::error::{Error, Result};
use wasabi_domain::error_ext::ErrorContext;
use wasabi_domain::ports::{
    HealthCheck, HealthChecker, LifecycleManaged, ServiceState, StateCell,
};
use wasabi_domain::value_objects::DatabaseConfig;

/// Row count reported by a query result, recorded on spans and log lines
pub trait AffectedRows {
    fn affected_rows(&self) -> u64;
}

impl AffectedRows for PgQueryResult {
    fn affected_rows(&self) -> u64 {
        self.rows_affected()
    }
}

impl AffectedRows for PgRow {
    fn affected_rows(&self) -> u64 {
        1
    }
}

impl<T> AffectedRows for Option<T> {
    fn affected_rows(&self) -> u64 {
        u64::from(self.is_some())
    }
}

impl<T> AffectedRows for Vec<T> {
    fn affected_rows(&self) -> u64 {
        self.len() as u64
    }
}

type PoolSlot = Arc<RwLock<Option<PgPool>>>;

/// PostgreSQL connection pool handle
pub struct PostgresDatabase {
    pool: PgPool,
    settings: PoolSettings,
    query_logger: QueryLogger,
    dispatch: Dispatch,
    state: StateCell,
    closed: AtomicBool,
    idle_cap_slot: PoolSlot,
}

impl PostgresDatabase {
    /// Open the pool
    ///
    /// No connection is made; an invalid DSN is a configuration error.
    /// Reachability is verified by [`LifecycleManaged::start`].
    pub fn new(config: &DatabaseConfig, dispatch: Dispatch) -> Result<Self> {
        let _guard = tracing::dispatcher::set_default(&dispatch);
        info!("initializing postgresql connection pool");

        if config.dsn.trim().is_empty() {
            return Err(Error::config("postgres dsn is required"));
        }

        info!("applying database connection pool settings");
        let settings = PoolSettings::resolve(config);

        let options = PgConnectOptions::from_str(&config.dsn)
            .config_context("Invalid postgres dsn")?
            .disable_statement_logging()
            .statement_cache_capacity(settings.statement_cache_capacity);

        let idle_cap_slot: PoolSlot = Arc::new(RwLock::new(None));
        let release_slot = Arc::clone(&idle_cap_slot);

        let pool = PgPoolOptions::new()
            .max_connections(settings.max_open_conns)
            .max_lifetime(settings.max_lifetime)
            .idle_timeout(settings.idle_timeout)
            .acquire_timeout(settings.acquire_timeout)
            .after_release(move |_conn, _meta| {
                let keep = release_slot
                    .read()
                    .ok()
                    .and_then(|slot| {
                        slot.as_ref()
                            .map(|pool| settings.keep_released(pool.num_idle()))
                    })
                    .unwrap_or(true);
                Box::pin(async move { Ok(keep) })
            })
            .connect_lazy_with(options);

        if let Ok(mut slot) = idle_cap_slot.write() {
            *slot = Some(pool.clone());
        }

        let query_logger = QueryLogger::new(
            QueryLogLevel::from_debug(config.debug),
            settings.slow_threshold,
            dispatch.clone(),
        );

        Ok(Self {
            pool,
            settings,
            query_logger,
            dispatch,
            state: StateCell::new(),
            closed: AtomicBool::new(false),
            idle_cap_slot,
        })
    }

    /// Underlying pool for callers issuing their own statements
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Limits applied to the pool
    pub fn settings(&self) -> &PoolSettings {
        &self.settings
    }

    pub fn query_logger(&self) -> &QueryLogger {
        &self.query_logger
    }

    /// Health checker bound to this pool
    pub fn health_checker(&self) -> PostgresHealthChecker {
        PostgresHealthChecker {
            pool: self.pool.clone(),
        }
    }

    /// Round-trip a ping over a pooled connection
    pub async fn ping(&self) -> Result<Duration> {
        ping_pool(&self.pool).await
    }

    /// Run a statement inside a `db.query` span and through the query log bridge
    ///
    /// `statement` is the SQL text as written; bind values supplied inside
    /// `run` are never logged.
    pub async fn traced<T, F, Fut>(&self, statement: &str, run: F) -> Result<T>
    where
        T: AffectedRows,
        F: FnOnce(PgPool) -> Fut,
        Fut: Future<Output = std::result::Result<T, sqlx::Error>>,
    {
        let pool = self.pool.clone();
        let logger = &self.query_logger;

        async move {
            let span = info_span!(
                DB_QUERY_SPAN,
                db.system = "postgresql",
                db.statement = statement,
                db.rows_affected = field::Empty,
            );

            let started = Instant::now();
            let result = run(pool).instrument(span.clone()).await;
            let elapsed = started.elapsed();

            span.in_scope(|| match &result {
                Ok(value) => {
                    let rows = value.affected_rows();
                    span.record("db.rows_affected", rows);
                    logger.trace(statement, elapsed, rows, None);
                }
                Err(err) => logger.trace(statement, elapsed, 0, Some(err)),
            });

            result.db_context("Query failed")
        }
        .with_subscriber(self.dispatch.clone())
        .await
    }

    /// Execute a statement without bind parameters
    pub async fn execute(&self, statement: &str) -> Result<PgQueryResult> {
        self.traced(statement, |pool| async move {
            sqlx::query(statement).execute(&pool).await
        })
        .await
    }

    /// Fetch exactly one row
    pub async fn fetch_one(&self, statement: &str) -> Result<PgRow> {
        self.traced(statement, |pool| async move {
            sqlx::query(statement).fetch_one(&pool).await
        })
        .await
    }

    /// Fetch zero or one row
    pub async fn fetch_optional(&self, statement: &str) -> Result<Option<PgRow>> {
        self.traced(statement, |pool| async move {
            sqlx::query(statement).fetch_optional(&pool).await
        })
        .await
    }

    async fn close(&self) {
        self.pool.close().await;
        if let Ok(mut slot) = self.idle_cap_slot.write() {
            slot.take();
        }
    }
}

async fn ping_pool(pool: &PgPool) -> Result<Duration> {
    let started = Instant::now();
    let mut conn = pool
        .acquire()
        .await
        .db_context("Failed to acquire postgres connection")?;
    conn.ping().await.db_context("Postgres ping failed")?;
    Ok(started.elapsed())
}

#[async_trait::async_trait]
impl LifecycleManaged for PostgresDatabase {
    fn name(&self) -> &str {
        POSTGRES_COMPONENT
    }

    fn state(&self) -> ServiceState {
        self.state.get()
    }

    async fn start(&self) -> Result<()> {
        self.state.set(ServiceState::Starting);
        match self.ping().with_subscriber(self.dispatch.clone()).await {
            Ok(latency) => {
                self.state.set(ServiceState::Running);
                let _guard = tracing::dispatcher::set_default(&self.dispatch);
                info!(latency = ?latency, "postgresql connection verified");
                Ok(())
            }
            Err(e) => {
                self.state.set(ServiceState::Stopped);
                Err(e)
            }
        }
    }

    async fn stop(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.state.set(ServiceState::Stopping);
        self.close().with_subscriber(self.dispatch.clone()).await;
        self.state.set(ServiceState::Stopped);

        let _guard = tracing::dispatcher::set_default(&self.dispatch);
        info!("postgresql connection pool closed");
        Ok(())
    }
}

impl Drop for PostgresDatabase {
    fn drop(&mut self) {
        if let Ok(mut slot) = self.idle_cap_slot.write() {
            slot.take();
        }
    }
}

impl std::fmt::Debug for PostgresDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresDatabase")
            .field("settings", &self.settings)
            .field("state", &self.state.get())
            .finish_non_exhaustive()
    }
}

/// On-demand ping of the pool
///
/// Reports down once the pool is closed.
#[derive(Clone)]
pub struct PostgresHealthChecker {
    pool: PgPool,
}

#[async_trait::async_trait]
impl HealthChecker for PostgresHealthChecker {
    async fn check_health(&self) -> HealthCheck {
        if self.pool.is_closed() {
            return HealthCheck::failed(POSTGRES_COMPONENT, Some("pool closed".to_string()));
        }

        match tokio::time::timeout(DEFAULT_TIMEOUT, ping_pool(&self.pool)).await {
            Ok(Ok(latency)) => HealthCheck::healthy(POSTGRES_COMPONENT)
                .with_response_time(latency)
                .with_details(serde_json::json!({
                    "connections": self.pool.size(),
                    "idle": self.pool.num_idle(),
                })),
            Ok(Err(e)) => HealthCheck::failed(POSTGRES_COMPONENT, Some(e.to_string())),
            Err(_) => HealthCheck::failed(POSTGRES_COMPONENT, Some("ping timed out".to_string())),
        }
    }
}

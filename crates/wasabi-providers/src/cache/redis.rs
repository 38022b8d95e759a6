//! Redis cache adapter
//!
//! Gated by `redis.enable`: constructing the client while disabled fails
//! with [`Error::Disabled`] instead of returning an inert object.
//!
//! Every command runs inside a `redis.command` span and is counted in the
//! shared Prometheus registry.
//!
//! ## Example
//!
//! ```ignore
//! let cache = RedisCache::new(&config.redis, &registry, dispatch)?;
//! cache.start().await?;
//! let value: Option<String> = cache.command("GET", &["session:42"]).await?;
//! ```

use crate::cache::instruments::RedisInstruments;
use crate::constants::{REDIS_COMMAND_SPAN, REDIS_COMPONENT};
use prometheus::Registry;
use redis::aio::MultiplexedConnection;
use redis::{
    Client, ConnectionAddr, ConnectionInfo, FromRedisValue, IntoConnectionInfo,
    RedisConnectionInfo,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::instrument::WithSubscriber;
use tracing::{Dispatch, Instrument, info, info_span};
use wasabi_domain::constants::DEFAULT_TIMEOUT;
use wasabi_domain::error::{Error, Result};
use wasabi_domain::error_ext::ErrorContext;
use wasabi_domain::ports::{
    HealthCheck, HealthChecker, LifecycleManaged, ServiceState, StateCell,
};
use wasabi_domain::value_objects::CacheConfig;

type SharedConnection = Arc<RwLock<Option<MultiplexedConnection>>>;

/// Redis client handle
pub struct RedisCache {
    client: Client,
    addr: String,
    db: u32,
    connection: SharedConnection,
    instruments: RedisInstruments,
    dispatch: Dispatch,
    state: StateCell,
    closed: AtomicBool,
}

impl RedisCache {
    /// Build the client; no connection is made until start
    pub fn new(config: &CacheConfig, registry: &Registry, dispatch: Dispatch) -> Result<Self> {
        if !config.enable {
            return Err(Error::disabled(REDIS_COMPONENT));
        }

        let _guard = tracing::dispatcher::set_default(&dispatch);
        info!(addr = %config.addr, db = config.db, "initializing redis client");

        let client = Client::open(connection_info(config)?)
            .config_context("Invalid redis configuration")?;
        let instruments = RedisInstruments::register(registry)?;

        Ok(Self {
            client,
            addr: config.addr.clone(),
            db: config.db,
            connection: Arc::new(RwLock::new(None)),
            instruments,
            dispatch,
            state: StateCell::new(),
            closed: AtomicBool::new(false),
        })
    }

    /// Endpoint this client talks to
    pub fn addr(&self) -> &str {
        &self.addr
    }

    pub fn db(&self) -> u32 {
        self.db
    }

    /// Resolved endpoint, database and credentials
    pub fn connection_info(&self) -> &ConnectionInfo {
        self.client.get_connection_info()
    }

    /// Health checker bound to this client's connection
    pub fn health_checker(&self) -> RedisHealthChecker {
        RedisHealthChecker {
            connection: Arc::clone(&self.connection),
        }
    }

    /// Round-trip a PING
    pub async fn ping(&self) -> Result<Duration> {
        let started = Instant::now();
        let _: String = self.command("PING", &[]).await?;
        Ok(started.elapsed())
    }

    /// Run one command with tracing and metrics
    pub async fn command<T: FromRedisValue>(&self, name: &str, args: &[&str]) -> Result<T> {
        let mut conn = self
            .connection
            .read()
            .await
            .clone()
            .ok_or_else(|| Error::cache("redis connection is not open"))?;

        let mut cmd = redis::cmd(name);
        for arg in args {
            cmd.arg(*arg);
        }

        let span = info_span!(
            REDIS_COMMAND_SPAN,
            db.system = "redis",
            db.operation = name,
            db.redis.database_index = self.db,
        );

        let started = Instant::now();
        let result = cmd
            .query_async::<T>(&mut conn)
            .instrument(span)
            .with_subscriber(self.dispatch.clone())
            .await;
        self.instruments
            .observe(name, result.is_ok(), started.elapsed());

        result.cache_context(format!("Redis {name} failed"))
    }

    async fn connect(&self) -> Result<()> {
        let conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .cache_context(format!("Failed to connect to redis at {}", self.addr))?;
        *self.connection.write().await = Some(conn);
        Ok(())
    }
}

/// TCP endpoint from `host:port`, plus database index and password
fn connection_info(config: &CacheConfig) -> Result<ConnectionInfo> {
    let (host, port) = config
        .addr
        .rsplit_once(':')
        .ok_or_else(|| Error::config(format!("Invalid redis address {:?}", config.addr)))?;
    let port = port
        .parse::<u16>()
        .config_context(format!("Invalid redis port in {:?}", config.addr))?;

    let mut settings = RedisConnectionInfo::default().set_db(i64::from(config.db));
    if !config.password.is_empty() {
        settings = settings.set_password(&config.password);
    }

    Ok(ConnectionAddr::Tcp(host.to_string(), port)
        .into_connection_info()
        .config_context("Invalid redis configuration")?
        .set_redis_settings(settings))
}

#[async_trait::async_trait]
impl LifecycleManaged for RedisCache {
    fn name(&self) -> &str {
        REDIS_COMPONENT
    }

    fn state(&self) -> ServiceState {
        self.state.get()
    }

    async fn start(&self) -> Result<()> {
        self.state.set(ServiceState::Starting);
        let verified = async {
            self.connect().await?;
            self.ping().await
        }
        .with_subscriber(self.dispatch.clone())
        .await;

        match verified {
            Ok(latency) => {
                self.state.set(ServiceState::Running);
                let _guard = tracing::dispatcher::set_default(&self.dispatch);
                info!(addr = %self.addr, latency = ?latency, "redis connection verified");
                Ok(())
            }
            Err(e) => {
                self.connection.write().await.take();
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
        self.connection.write().await.take();
        self.state.set(ServiceState::Stopped);

        let _guard = tracing::dispatcher::set_default(&self.dispatch);
        info!(addr = %self.addr, "redis connection closed");
        Ok(())
    }
}

impl std::fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCache")
            .field("addr", &self.addr)
            .field("db", &self.db)
            .field("state", &self.state.get())
            .finish_non_exhaustive()
    }
}

/// On-demand PING over the client's connection
///
/// Reports down once the connection is closed.
#[derive(Clone)]
pub struct RedisHealthChecker {
    connection: SharedConnection,
}

#[async_trait::async_trait]
impl HealthChecker for RedisHealthChecker {
    async fn check_health(&self) -> HealthCheck {
        let Some(mut conn) = self.connection.read().await.clone() else {
            return HealthCheck::failed(REDIS_COMPONENT, Some("connection closed".to_string()));
        };

        let started = Instant::now();
        let cmd = redis::cmd("PING");
        let ping = cmd.query_async::<String>(&mut conn);
        match tokio::time::timeout(DEFAULT_TIMEOUT, ping).await {
            Ok(Ok(_)) => HealthCheck::healthy(REDIS_COMPONENT).with_response_time(started.elapsed()),
            Ok(Err(e)) => HealthCheck::failed(REDIS_COMPONENT, Some(e.to_string())),
            Err(_) => HealthCheck::failed(REDIS_COMPONENT, Some("ping timed out".to_string())),
        }
    }
}

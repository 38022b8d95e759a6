//! Structured logging with tracing
//!
//! [`Logger`] builds a JSON subscriber from [`LogConfig`] and hands it out
//! as a [`Dispatch`]. Nothing is installed globally unless the binary asks
//! for it; components receive the dispatch through construction.
//!
//! Three forms are available:
//!
//! | Form | Use |
//! |------|-----|
//! | [`Logger`] | owns the subscriber and its configuration |
//! | [`FriendlyLogger`] | message-only convenience calls |
//! | [`Dispatch`] | raw handle for adapters that emit their own events |

use std::fmt;
use std::panic::Location;
use tracing::level_filters::LevelFilter;
use tracing::{Dispatch, Level, debug, error, info, warn};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Registry, fmt as fmt_layer};
use wasabi_domain::error::{Error, Result};
use wasabi_domain::error_ext::ErrorContext;
use wasabi_domain::value_objects::LogConfig;

/// Base logger
#[derive(Clone)]
pub struct Logger {
    dispatch: Dispatch,
    level: Level,
    caller_depth: u32,
}

impl Logger {
    /// JSON lines on stdout
    pub fn new(config: &LogConfig) -> Self {
        Self::with_writer(config, std::io::stdout)
    }

    /// JSON lines on `writer`
    pub fn with_writer<W>(config: &LogConfig, writer: W) -> Self
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        let parsed = parse_log_level(&config.level);
        let level = parsed.as_ref().copied().unwrap_or(Level::INFO);

        let filter = EnvFilter::builder()
            .with_default_directive(LevelFilter::from_level(level).into())
            .parse_lossy("");
        let json = fmt_layer::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_writer(writer);
        let dispatch = Dispatch::new(Registry::default().with(filter).with(json));

        if parsed.is_err() {
            tracing::dispatcher::with_default(&dispatch, || {
                warn!(level = %config.level, "invalid log level, falling back to info");
            });
        }

        Self {
            dispatch,
            level,
            caller_depth: config.caller_depth,
        }
    }

    /// Raw handle for components that log on their own
    pub fn dispatch(&self) -> Dispatch {
        self.dispatch.clone()
    }

    /// Effective minimum level
    pub fn level(&self) -> Level {
        self.level
    }

    /// Wrapper frames skipped when [`FriendlyLogger`] reports its caller
    pub fn caller_depth(&self) -> u32 {
        self.caller_depth
    }

    pub fn friendly(&self) -> FriendlyLogger {
        FriendlyLogger {
            dispatch: self.dispatch.clone(),
            caller_depth: self.caller_depth,
        }
    }

    /// Make this logger the process default so library events are kept
    pub fn install_global(&self) -> Result<()> {
        tracing::dispatcher::set_global_default(self.dispatch.clone())
            .context("Failed to install global logger")
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("level", &self.level)
            .field("caller_depth", &self.caller_depth)
            .finish_non_exhaustive()
    }
}

/// Message-only logger
///
/// Each event carries a `caller` field. With `caller_depth` 0 it names the
/// line inside this wrapper that emitted the event; with 1 or more the
/// wrapper frame is skipped and it names the code that called the wrapper.
#[derive(Clone)]
pub struct FriendlyLogger {
    dispatch: Dispatch,
    caller_depth: u32,
}

impl FriendlyLogger {
    #[track_caller]
    pub fn debug(&self, message: impl fmt::Display) {
        let caller = self.caller(Location::caller());
        tracing::dispatcher::with_default(&self.dispatch, || {
            debug!(caller = %caller, "{message}");
        });
    }

    #[track_caller]
    pub fn info(&self, message: impl fmt::Display) {
        let caller = self.caller(Location::caller());
        tracing::dispatcher::with_default(&self.dispatch, || {
            info!(caller = %caller, "{message}");
        });
    }

    #[track_caller]
    pub fn warn(&self, message: impl fmt::Display) {
        let caller = self.caller(Location::caller());
        tracing::dispatcher::with_default(&self.dispatch, || {
            warn!(caller = %caller, "{message}");
        });
    }

    #[track_caller]
    pub fn error(&self, message: impl fmt::Display) {
        let caller = self.caller(Location::caller());
        tracing::dispatcher::with_default(&self.dispatch, || {
            error!(caller = %caller, "{message}");
        });
    }

    /// `call_site` when the wrapper frame is skipped, this file otherwise
    fn caller(&self, call_site: &'static Location<'static>) -> &'static Location<'static> {
        if self.caller_depth == 0 {
            Location::caller()
        } else {
            call_site
        }
    }
}

impl fmt::Debug for FriendlyLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FriendlyLogger")
            .field("caller_depth", &self.caller_depth)
            .finish_non_exhaustive()
    }
}

/// Parse log level string to tracing Level
pub fn parse_log_level(level: &str) -> Result<Level> {
    match level.trim().to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" | "warning" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(Error::Configuration {
            message: format!(
                "Invalid log level: {level}. Use trace, debug, info, warn, or error"
            ),
            source: None,
        }),
    }
}

/// Log health check result
pub fn log_health_check(component: &str, healthy: bool, details: Option<&str>) {
    if healthy {
        debug!(component = component, "Health check passed");
    } else {
        error!(
            component = component,
            details = details.unwrap_or("Unknown failure"),
            "Health check failed"
        );
    }
}

//! Prometheus instruments for Redis commands

use crate::constants::{REDIS_COMMANDS_METRIC, REDIS_DURATION_METRIC};
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry};
use std::time::Duration;
use wasabi_domain::error::Result;
use wasabi_domain::error_ext::ErrorContext;

const REGISTER_FAILED: &str = "Failed to register redis metrics";

/// Command counter and latency histogram, labelled by command name
#[derive(Clone)]
pub struct RedisInstruments {
    commands: IntCounterVec,
    duration: HistogramVec,
}

impl RedisInstruments {
    /// Create the instruments and register them with `registry`
    pub fn register(registry: &Registry) -> Result<Self> {
        let commands = IntCounterVec::new(
            Opts::new(REDIS_COMMANDS_METRIC, "Total number of redis commands"),
            &["command", "status"],
        )
        .context(REGISTER_FAILED)?;
        let duration = HistogramVec::new(
            HistogramOpts::new(REDIS_DURATION_METRIC, "Redis command latency in seconds"),
            &["command"],
        )
        .context(REGISTER_FAILED)?;

        registry
            .register(Box::new(commands.clone()))
            .context(REGISTER_FAILED)?;
        registry
            .register(Box::new(duration.clone()))
            .context(REGISTER_FAILED)?;

        Ok(Self { commands, duration })
    }

    /// Record one command execution
    pub fn observe(&self, command: &str, ok: bool, elapsed: Duration) {
        let status = if ok { "ok" } else { "error" };
        self.commands.with_label_values(&[command, status]).inc();
        self.duration
            .with_label_values(&[command])
            .observe(elapsed.as_secs_f64());
    }
}

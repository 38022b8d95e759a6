//! Query log bridge
//!
//! Routes every executed statement through the structured logger. Bind
//! parameters never reach this type; only the statement text, the elapsed
//! time and the affected row count are recorded.

use std::time::Duration;
use tracing::Dispatch;
use tracing::{error, info, warn};

/// Verbosity of the query log bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum QueryLogLevel {
    /// Nothing is logged
    Silent,
    /// Failed statements only
    Error,
    /// Failed and slow statements
    Warn,
    /// Every statement
    Info,
}

impl QueryLogLevel {
    /// `Info` in debug mode, `Warn` otherwise
    pub fn from_debug(debug: bool) -> Self {
        if debug { Self::Info } else { Self::Warn }
    }
}

/// Severity chosen for one executed statement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuerySeverity {
    Error,
    Warn,
    Info,
}

/// Logs executed statements with a severity derived from outcome and latency
#[derive(Clone)]
pub struct QueryLogger {
    level: QueryLogLevel,
    slow_threshold: Duration,
    dispatch: Dispatch,
}

impl QueryLogger {
    pub fn new(level: QueryLogLevel, slow_threshold: Duration, dispatch: Dispatch) -> Self {
        Self {
            level,
            slow_threshold,
            dispatch,
        }
    }

    pub fn level(&self) -> QueryLogLevel {
        self.level
    }

    pub fn slow_threshold(&self) -> Duration {
        self.slow_threshold
    }

    /// Decide the severity of a statement, or `None` when it is not logged
    ///
    /// Failures log at error, except "row not found" which is never an
    /// error line. Statements at or above the slow threshold log at warn.
    /// Anything else logs at info only when the bridge level is `Info`.
    pub fn classify(
        &self,
        elapsed: Duration,
        failure: Option<&sqlx::Error>,
    ) -> Option<QuerySeverity> {
        if self.level == QueryLogLevel::Silent {
            return None;
        }

        let failed = failure.is_some_and(|err| !matches!(err, sqlx::Error::RowNotFound));
        if failed && self.level >= QueryLogLevel::Error {
            Some(QuerySeverity::Error)
        } else if elapsed >= self.slow_threshold && self.level >= QueryLogLevel::Warn {
            Some(QuerySeverity::Warn)
        } else if self.level >= QueryLogLevel::Info {
            Some(QuerySeverity::Info)
        } else {
            None
        }
    }

    /// Log one executed statement
    pub fn trace(
        &self,
        statement: &str,
        elapsed: Duration,
        rows_affected: u64,
        failure: Option<&sqlx::Error>,
    ) {
        let Some(severity) = self.classify(elapsed, failure) else {
            return;
        };

        let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
        tracing::dispatcher::with_default(&self.dispatch, || match severity {
            QuerySeverity::Error => error!(
                sql = statement,
                elapsed_ms,
                rows_affected,
                error = %failure.map_or_else(String::new, ToString::to_string),
                "query failed"
            ),
            QuerySeverity::Warn => warn!(
                sql = statement,
                elapsed_ms,
                rows_affected,
                threshold_ms = u64::try_from(self.slow_threshold.as_millis()).unwrap_or(u64::MAX),
                "slow query"
            ),
            QuerySeverity::Info => info!(sql = statement, elapsed_ms, rows_affected, "query"),
        });
    }
}

impl std::fmt::Debug for QueryLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryLogger")
            .field("level", &self.level)
            .field("slow_threshold", &self.slow_threshold)
            .finish_non_exhaustive()
    }
}

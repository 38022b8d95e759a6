//! Tests for the query log bridge

use crate::support::CapturedLogs;
use std::time::Duration;
use tracing::Dispatch;
use wasabi_providers::database::{QueryLogLevel, QueryLogger, QuerySeverity};

const THRESHOLD: Duration = Duration::from_millis(200);

fn logger(level: QueryLogLevel) -> QueryLogger {
    QueryLogger::new(level, THRESHOLD, Dispatch::none())
}

#[test]
fn test_level_follows_debug_flag() {
    assert_eq!(QueryLogLevel::from_debug(true), QueryLogLevel::Info);
    assert_eq!(QueryLogLevel::from_debug(false), QueryLogLevel::Warn);
}

#[test]
fn test_slow_query_is_warn() {
    for level in [QueryLogLevel::Warn, QueryLogLevel::Info] {
        let logger = logger(level);
        assert_eq!(logger.classify(THRESHOLD, None), Some(QuerySeverity::Warn));
        assert_eq!(
            logger.classify(THRESHOLD * 3, None),
            Some(QuerySeverity::Warn)
        );
    }
}

#[test]
fn test_fast_success_is_at_most_info() {
    let fast = Duration::from_millis(5);
    assert_eq!(
        logger(QueryLogLevel::Info).classify(fast, None),
        Some(QuerySeverity::Info)
    );
    assert_eq!(logger(QueryLogLevel::Warn).classify(fast, None), None);
    assert_eq!(logger(QueryLogLevel::Error).classify(fast, None), None);
}

#[test]
fn test_failure_is_error() {
    let err = sqlx::Error::PoolTimedOut;
    assert_eq!(
        logger(QueryLogLevel::Warn).classify(Duration::from_millis(1), Some(&err)),
        Some(QuerySeverity::Error)
    );
    assert_eq!(
        logger(QueryLogLevel::Error).classify(THRESHOLD * 2, Some(&err)),
        Some(QuerySeverity::Error)
    );
}

#[test]
fn test_row_not_found_never_error() {
    let not_found = sqlx::Error::RowNotFound;
    for level in [
        QueryLogLevel::Silent,
        QueryLogLevel::Error,
        QueryLogLevel::Warn,
        QueryLogLevel::Info,
    ] {
        let logger = logger(level);
        for elapsed in [Duration::ZERO, THRESHOLD, THRESHOLD * 10] {
            assert_ne!(
                logger.classify(elapsed, Some(&not_found)),
                Some(QuerySeverity::Error)
            );
        }
    }
}

#[test]
fn test_silent_logs_nothing() {
    let err = sqlx::Error::PoolClosed;
    let logger = logger(QueryLogLevel::Silent);
    assert_eq!(logger.classify(THRESHOLD * 2, Some(&err)), None);
    assert_eq!(logger.classify(Duration::ZERO, None), None);
}

#[test]
fn test_trace_emits_statement_without_parameters() {
    let logs = CapturedLogs::default();
    let logger = QueryLogger::new(QueryLogLevel::Info, THRESHOLD, logs.dispatch());

    logger.trace(
        "SELECT id FROM users WHERE email = $1",
        Duration::from_millis(3),
        1,
        None,
    );

    let lines = logs.with_message("query");
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["level"], "INFO");
    assert_eq!(
        lines[0]["fields"]["sql"],
        "SELECT id FROM users WHERE email = $1"
    );
    assert_eq!(lines[0]["fields"]["rows_affected"], 1);
}

#[test]
fn test_trace_slow_line_is_warn() {
    let logs = CapturedLogs::default();
    let logger = QueryLogger::new(QueryLogLevel::Warn, THRESHOLD, logs.dispatch());

    logger.trace("SELECT pg_sleep(1)", Duration::from_secs(1), 1, None);
    logger.trace("SELECT 1", Duration::from_millis(1), 1, None);

    assert_eq!(logs.levels(), vec!["WARN".to_string()]);
    assert_eq!(logs.with_message("slow query")[0]["fields"]["threshold_ms"], 200);
}

#[test]
fn test_trace_not_found_emits_no_error_line() {
    let logs = CapturedLogs::default();
    let logger = QueryLogger::new(QueryLogLevel::Info, THRESHOLD, logs.dispatch());

    logger.trace(
        "SELECT * FROM users WHERE id = $1",
        Duration::from_millis(2),
        0,
        Some(&sqlx::Error::RowNotFound),
    );

    assert!(!logs.levels().contains(&"ERROR".to_string()));
    assert_eq!(logs.levels(), vec!["INFO".to_string()]);
}

#[test]
fn test_trace_failure_carries_error_text() {
    let logs = CapturedLogs::default();
    let logger = QueryLogger::new(QueryLogLevel::Warn, THRESHOLD, logs.dispatch());

    logger.trace(
        "INSERT INTO users DEFAULT VALUES",
        Duration::from_millis(2),
        0,
        Some(&sqlx::Error::PoolTimedOut),
    );

    let lines = logs.with_message("query failed");
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["level"], "ERROR");
    assert!(
        lines[0]["fields"]["error"]
            .as_str()
            .is_some_and(|text| !text.is_empty())
    );
}

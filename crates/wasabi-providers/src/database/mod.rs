//! PostgreSQL adapter
//!
//! | Type | Role |
//! |------|------|
//! | [`PostgresDatabase`] | Pool handle with lifecycle hooks and traced queries |
//! | [`PostgresHealthChecker`] | On-demand ping |
//! | [`PoolSettings`] | Pool limits with defaults applied |
//! | [`QueryLogger`] | Statement log bridge |

pub mod pool;
pub mod postgres;
pub mod query_logger;

pub use pool::PoolSettings;
pub use postgres::{AffectedRows, PostgresDatabase, PostgresHealthChecker};
pub use query_logger::{QueryLogLevel, QueryLogger, QuerySeverity};

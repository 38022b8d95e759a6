//! Redis cache adapter

pub mod instruments;
pub mod redis;

pub use self::redis::{RedisCache, RedisHealthChecker};
pub use instruments::RedisInstruments;

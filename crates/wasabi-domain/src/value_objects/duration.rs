//! Serde adapter for human readable durations
//!
//! Accepts `"5s"`, `"1m 30s"` or a bare integer number of seconds, given as
//! a number or as text; always
//! serializes to the humantime form.
//!
//! ```ignore
//! #[serde(with = "wasabi_domain::value_objects::duration")]
//! pub timeout: Duration,
//! ```

use serde::de::{self, Visitor};
use serde::{Deserializer, Serializer};
use std::fmt;
use std::time::Duration;

pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&humantime::format_duration(*value).to_string())
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    deserializer.deserialize_any(DurationVisitor)
}

struct DurationVisitor;

impl Visitor<'_> for DurationVisitor {
    type Value = Duration;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a duration such as \"5s\" or a number of seconds")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Duration, E> {
        let value = value.trim();
        if let Ok(secs) = value.parse::<u64>() {
            return Ok(Duration::from_secs(secs));
        }
        humantime::parse_duration(value).map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Duration, E> {
        Ok(Duration::from_secs(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Duration, E> {
        u64::try_from(value)
            .map(Duration::from_secs)
            .map_err(|_| E::custom("duration cannot be negative"))
    }
}

//! Error handling types

use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed source error carried by the context-bearing variants
pub type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for wasabi
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error
        #[from]
        source: std::io::Error,
    },

    /// Malformed or missing configuration
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error
        message: String,
        /// Optional source error
        #[source]
        source: Option<BoxedSource>,
    },

    /// Database unreachable or query failure
    #[error("Database error: {message}")]
    Database {
        /// Description of the database error
        message: String,
        /// Optional source error
        #[source]
        source: Option<BoxedSource>,
    },

    /// Cache unreachable or command failure
    #[error("Cache error: {message}")]
    Cache {
        /// Description of the cache error
        message: String,
        /// Optional source error
        #[source]
        source: Option<BoxedSource>,
    },

    /// Listener bind or serve failure
    #[error("Network error: {message}")]
    Network {
        /// Description of the network error
        message: String,
        /// Optional source error
        #[source]
        source: Option<BoxedSource>,
    },

    /// A component gated off by configuration was requested
    #[error("{component} is disabled")]
    Disabled {
        /// Name of the disabled component
        component: String,
    },

    /// One or more stop hooks failed
    #[error("Shutdown error: {message}")]
    Shutdown {
        /// Description of the failed hooks
        message: String,
    },

    /// Internal system error
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error
        message: String,
    },
}

impl Error {
    /// Create a configuration error without a source
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create a cache error without a source
    pub fn cache<S: Into<String>>(message: S) -> Self {
        Self::Cache {
            message: message.into(),
            source: None,
        }
    }

    /// Create a disabled-component error
    pub fn disabled<S: Into<String>>(component: S) -> Self {
        Self::Disabled {
            component: component.into(),
        }
    }

    /// Create a shutdown error
    pub fn shutdown<S: Into<String>>(message: S) -> Self {
        Self::Shutdown {
            message: message.into(),
        }
    }

    /// Whether the error belongs to the disabled-component category
    pub fn is_disabled(&self) -> bool {
        matches!(self, Self::Disabled { .. })
    }
}

//! Domain error types for seed broker resolution and connection construction.
//!
//! Uses `thiserror` for ergonomic error definitions with proper context.
//!
//! The taxonomy is deliberately two-sided: [`ConfigError`] is raised
//! synchronously at construction and is never retriable, while
//! [`ConnectionError`] covers resolution and socket failures that a caller
//! may retry under its own policy. This layer never retries on its own.

use thiserror::Error;

/// Boxed error type accepted from user-supplied broker callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors related to configuration parsing and validation.
///
/// Non-retriable: these always surface to the construction caller.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A static broker source needs at least one seed address.
    #[error("failed to connect: expected a non-empty broker list and got nothing")]
    NoBrokers,

    /// Invalid address format.
    #[error("invalid broker address: {0} (expected 'host:port' with port 1-65535)")]
    InvalidAddress(String),

    /// Failed to read configuration file.
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Errors that occur while resolving a seed broker or opening a connection.
///
/// Retriable: callers own the retry policy; this layer never logs, swallows,
/// or retries these.
#[derive(Error, Debug)]
pub enum ConnectionError {
    /// A dynamic or discovery callback failed.
    #[error("broker lookup failed: {source}")]
    Lookup {
        #[source]
        source: BoxError,
    },

    /// A dynamic or discovery callback yielded no brokers.
    #[error("no brokers available")]
    NoBrokersAvailable,

    /// A dynamic or discovery callback yielded a malformed address.
    #[error("invalid broker address from lookup: {0} (expected 'host:port' with port 1-65535)")]
    InvalidBrokerAddress(String),

    /// TCP connection to the broker failed.
    #[error("failed to connect to broker {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// Connection attempt exceeded the configured timeout.
    #[error("connection to broker {address} timed out")]
    Timeout { address: String },
}

/// Result type alias for resolution and connection operations.
pub type Result<T> = std::result::Result<T, ConnectionError>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidAddress("nohost".to_string());
        assert!(err.to_string().contains("nohost"));
        assert!(err.to_string().contains("host:port"));
    }

    #[test]
    fn test_no_brokers_display() {
        let err = ConfigError::NoBrokers;
        assert!(err.to_string().contains("non-empty broker list"));
    }

    #[test]
    fn test_lookup_error_preserves_source() {
        let inner: BoxError = "registry unreachable".into();
        let err = ConnectionError::Lookup { source: inner };
        assert!(err.to_string().contains("registry unreachable"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_connect_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = ConnectionError::Connect {
            address: "broker1:9092".to_string(),
            source: io_err,
        };
        assert!(err.to_string().contains("broker1:9092"));
    }

    #[test]
    fn test_timeout_error_display() {
        let err = ConnectionError::Timeout {
            address: "broker1:9092".to_string(),
        };
        assert!(err.to_string().contains("timed out"));
    }
}

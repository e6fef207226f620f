//! Broker sources: where seed broker addresses come from.
//!
//! A [`BrokerSource`] is chosen once at construction and is immutable for
//! the lifetime of the resolver built on top of it. The three variants are
//! deliberately distinct (no runtime shape inspection):
//!
//! - [`BrokerSource::Static`] - a fixed, ordered seed list
//! - [`BrokerSource::Dynamic`] - an async callback re-invoked on every
//!   resolution
//! - [`BrokerSource::Discovery`] - an async callback that may also carry a
//!   per-connection auth override

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::SaslConfig;
use crate::error::{BoxError, ConfigError};

/// A broker network address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BrokerAddress {
    /// The broker hostname.
    pub host: String,
    /// The broker port (1..=65535).
    pub port: u16,
}

impl BrokerAddress {
    /// Create a new broker address.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for BrokerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl FromStr for BrokerAddress {
    type Err = ConfigError;

    /// Parse a `"host:port"` string.
    ///
    /// The split is on the last colon so IPv6-style hosts with embedded
    /// colons still parse. Port 0 is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (host, port) = s
            .rsplit_once(':')
            .ok_or_else(|| ConfigError::InvalidAddress(s.to_string()))?;
        let port: u16 = port
            .parse()
            .map_err(|_| ConfigError::InvalidAddress(s.to_string()))?;
        if host.is_empty() || port == 0 {
            return Err(ConfigError::InvalidAddress(s.to_string()));
        }
        Ok(Self {
            host: host.to_string(),
            port,
        })
    }
}

/// An explicit broker target passed to `build`.
///
/// When present it bypasses all source logic: the address is used verbatim
/// and no callback is invoked, regardless of the configured source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetBroker {
    /// The broker hostname.
    pub host: String,
    /// The broker port.
    pub port: u16,
    /// Rack the broker lives in, if known.
    pub rack: Option<String>,
}

impl TargetBroker {
    /// Create an explicit target without rack information.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            rack: None,
        }
    }

    /// Attach rack information to the target.
    #[must_use]
    pub fn with_rack(mut self, rack: impl Into<String>) -> Self {
        self.rack = Some(rack.into());
        self
    }

    /// The target as a plain broker address.
    #[must_use]
    pub fn address(&self) -> BrokerAddress {
        BrokerAddress::new(self.host.clone(), self.port)
    }
}

/// Async callback producing the current broker list.
///
/// Invoked on every resolution; the result is never cached. Returned
/// addresses are `"host:port"` strings, parsed by the resolver.
#[async_trait]
pub trait BrokerLookup: Send + Sync {
    /// Fetch the current ordered broker list.
    async fn lookup(&self) -> Result<Vec<String>, BoxError>;
}

/// Result of a cluster discovery call.
#[derive(Debug, Clone)]
pub struct DiscoveryResponse {
    /// Ordered broker addresses ("host:port").
    pub brokers: Vec<String>,
    /// Auth settings that apply only to the connection built from this
    /// discovery result, replacing the configured default.
    pub auth_override: Option<SaslConfig>,
}

/// Async callback discovering the current broker set, optionally bundling
/// an auth override with the response.
#[async_trait]
pub trait ClusterDiscovery: Send + Sync {
    /// Discover the current broker set.
    async fn discover(&self) -> Result<DiscoveryResponse, BoxError>;
}

/// Where seed broker addresses come from. Fixed once at construction.
#[derive(Clone)]
pub enum BrokerSource {
    /// A fixed, ordered seed list ("host:port" strings).
    Static(Vec<String>),
    /// A callback re-invoked on every resolution.
    Dynamic(Arc<dyn BrokerLookup>),
    /// A discovery callback that may carry a per-connection auth override.
    Discovery(Arc<dyn ClusterDiscovery>),
}

impl BrokerSource {
    /// Build a static source from anything yielding address strings.
    pub fn from_seeds<I, S>(seeds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Static(seeds.into_iter().map(Into::into).collect())
    }
}

impl fmt::Debug for BrokerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(seeds) => f.debug_tuple("Static").field(seeds).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
            Self::Discovery(_) => f.write_str("Discovery(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_address() {
        let addr: BrokerAddress = "kafka-1.internal:9092".parse().unwrap();
        assert_eq!(addr.host, "kafka-1.internal");
        assert_eq!(addr.port, 9092);
        assert_eq!(addr.to_string(), "kafka-1.internal:9092");
    }

    #[test]
    fn test_parse_splits_on_last_colon() {
        let addr: BrokerAddress = "::1:9092".parse().unwrap();
        assert_eq!(addr.host, "::1");
        assert_eq!(addr.port, 9092);
    }

    #[test]
    fn test_parse_missing_port() {
        let result = "localhost".parse::<BrokerAddress>();
        assert!(matches!(result, Err(ConfigError::InvalidAddress(_))));
    }

    #[test]
    fn test_parse_port_zero() {
        let result = "localhost:0".parse::<BrokerAddress>();
        assert!(matches!(result, Err(ConfigError::InvalidAddress(_))));
    }

    #[test]
    fn test_parse_port_out_of_range() {
        let result = "localhost:70000".parse::<BrokerAddress>();
        assert!(matches!(result, Err(ConfigError::InvalidAddress(_))));
    }

    #[test]
    fn test_parse_empty_host() {
        let result = ":9092".parse::<BrokerAddress>();
        assert!(matches!(result, Err(ConfigError::InvalidAddress(_))));
    }

    #[test]
    fn test_parse_non_numeric_port() {
        let result = "localhost:port".parse::<BrokerAddress>();
        assert!(matches!(result, Err(ConfigError::InvalidAddress(_))));
    }

    #[test]
    fn test_target_broker_address() {
        let target = TargetBroker::new("h", 9999).with_rack("rack-a");
        assert_eq!(target.address(), BrokerAddress::new("h", 9999));
        assert_eq!(target.rack.as_deref(), Some("rack-a"));
    }

    #[test]
    fn test_source_debug_hides_callbacks() {
        let source = BrokerSource::from_seeds(["a:1"]);
        assert!(format!("{source:?}").contains("a:1"));
    }
}

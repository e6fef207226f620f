//! Seed broker resolution and connection construction for Kafka clients.
//!
//! When a messaging client opens a new transport connection it first has to
//! decide which cluster node to contact. This crate encodes that decision:
//! three broker-sourcing strategies (a fixed seed list, a dynamic lookup
//! callback, a discovery callback), the rotation discipline that spreads
//! load across seed candidates, and the assembly of the resolved address
//! with the cluster-wide client configuration into a connection object.
//!
//! # Architecture
//!
//! - [`config`] - cluster-wide client configuration, YAML loading and validation
//! - [`error`] - domain error types (non-retriable config vs retriable connection)
//! - [`source`] - broker sources: static list, dynamic callback, discovery callback
//! - [`resolver`] - per-call seed selection with static rotation
//! - [`builder`] - merges resolution and configuration into a connection
//! - [`connection`] - the constructed broker connection and its socket factory
//! - [`instrumentation`] - injected observer for connection lifecycle events
//!
//! # Example
//!
//! ```rust,ignore
//! use kafka_bootstrap_core::{ClientConfig, ConnectionBuilder};
//!
//! let config = ClientConfig::from_file("client.yaml")?;
//! let builder = ConnectionBuilder::from_config(config)?;
//!
//! // Each build rotates to the next seed broker.
//! let connection = builder.build(None).await?;
//! connection.connect().await?;
//! ```

#![forbid(unsafe_code)]

pub mod builder;
pub mod config;
pub mod connection;
pub mod error;
pub mod instrumentation;
pub mod resolver;
pub mod source;

/// Test utilities for integration testing.
///
/// This module is only available when compiling tests or when the `testing`
/// feature is enabled.
#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-export commonly used types
pub use builder::ConnectionBuilder;
pub use config::{ClientConfig, LoggingConfig, RetryConfig, SaslConfig, SaslMechanism, TlsConfig};
pub use connection::{BrokerConnection, ConnectionConfig, SocketFactory, TcpSocketFactory};
pub use error::{BoxError, ConfigError, ConfigResult, ConnectionError, Result};
pub use resolver::{Resolution, SeedResolver, ShuffleFn};
pub use source::{
    BrokerAddress, BrokerLookup, BrokerSource, ClusterDiscovery, DiscoveryResponse, TargetBroker,
};

//! Connection construction.
//!
//! [`ConnectionBuilder`] merges a resolved broker address with the immutable
//! cluster configuration and hands the result to [`BrokerConnection`].
//! Assembly is pure: `build` either yields a fully configured connection or
//! fails, and it never retries - resolution failures surface to the caller
//! as retriable [`ConnectionError`]s.

use std::sync::Arc;

use tracing::debug;

use crate::config::ClientConfig;
use crate::connection::{BrokerConnection, ConnectionConfig, SocketFactory, TcpSocketFactory};
use crate::error::{ConfigResult, Result};
use crate::instrumentation::InstrumentationEmitter;
use crate::resolver::SeedResolver;
use crate::source::{BrokerSource, TargetBroker};

/// Builds broker connections for one client session.
pub struct ConnectionBuilder {
    config: ClientConfig,
    resolver: SeedResolver,
    socket_factory: Arc<dyn SocketFactory>,
    instrumentation: Option<Arc<dyn InstrumentationEmitter>>,
}

impl ConnectionBuilder {
    /// Create a builder over an explicit broker source.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`](crate::error::ConfigError) if the source is
    /// structurally invalid (empty or malformed static seed list).
    pub fn new(config: ClientConfig, source: BrokerSource) -> ConfigResult<Self> {
        let resolver = SeedResolver::new(source)?;
        Ok(Self::with_resolver(config, resolver))
    }

    /// Create a builder whose static source is the configured seed list.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`](crate::error::ConfigError) if `brokers` in
    /// the configuration is empty or contains a malformed address.
    pub fn from_config(config: ClientConfig) -> ConfigResult<Self> {
        let source = BrokerSource::Static(config.brokers.clone());
        Self::new(config, source)
    }

    /// Create a builder around an already constructed resolver.
    ///
    /// Useful when the resolver needs a pinned permutation
    /// ([`SeedResolver::with_shuffle`]).
    #[must_use]
    pub fn with_resolver(config: ClientConfig, resolver: SeedResolver) -> Self {
        Self {
            config,
            resolver,
            socket_factory: Arc::new(TcpSocketFactory),
            instrumentation: None,
        }
    }

    /// Replace the socket factory handed to constructed connections.
    #[must_use]
    pub fn socket_factory(mut self, factory: Arc<dyn SocketFactory>) -> Self {
        self.socket_factory = factory;
        self
    }

    /// Attach an instrumentation emitter, passed through to every
    /// constructed connection unmodified.
    #[must_use]
    pub fn instrumentation(mut self, emitter: Arc<dyn InstrumentationEmitter>) -> Self {
        self.instrumentation = Some(emitter);
        self
    }

    /// The cluster configuration this builder was constructed with.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Resolve a broker and construct a connection to it.
    ///
    /// An explicit `target` is used verbatim and skips all source logic.
    /// Otherwise the configured source decides: static rotation completes
    /// without suspension, dynamic and discovery sources await their
    /// callback. A discovery auth override replaces the configured SASL
    /// settings for this one connection only.
    ///
    /// # Errors
    ///
    /// Returns a retriable [`ConnectionError`](crate::error::ConnectionError)
    /// when resolution fails; retry policy belongs to the caller.
    pub async fn build(&self, target: Option<TargetBroker>) -> Result<BrokerConnection> {
        let resolution = self.resolver.resolve(target.as_ref()).await?;
        let rack = target.and_then(|t| t.rack);

        let sasl = resolution
            .auth_override
            .or_else(|| self.config.sasl.clone());

        let connection_config = ConnectionConfig {
            address: resolution.address,
            rack,
            client_id: self.config.client_id.clone(),
            connection_timeout_ms: self.config.connection_timeout_ms,
            request_timeout_ms: self.config.request_timeout_ms,
            enforce_request_timeout: self.config.enforce_request_timeout,
            max_in_flight_requests: self.config.max_in_flight_requests,
            tls: self.config.tls.clone(),
            sasl,
            retry: self.config.retry.clone(),
        };

        debug!(
            broker = %connection_config.address,
            client_id = %connection_config.client_id,
            "assembled broker connection"
        );

        Ok(BrokerConnection::new(
            connection_config,
            Arc::clone(&self.socket_factory),
            self.instrumentation.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SaslConfig, SaslMechanism};
    use crate::error::{BoxError, ConfigError, ConnectionError};
    use crate::source::{BrokerAddress, BrokerLookup, ClusterDiscovery, DiscoveryResponse};
    use async_trait::async_trait;

    fn identity(_: &mut [BrokerAddress]) {}

    fn pinned_builder(config: ClientConfig, seeds: &[&str]) -> ConnectionBuilder {
        let resolver = SeedResolver::with_shuffle(
            BrokerSource::from_seeds(seeds.iter().copied()),
            identity,
        )
        .unwrap();
        ConnectionBuilder::with_resolver(config, resolver)
    }

    fn sasl(username: &str) -> SaslConfig {
        SaslConfig {
            mechanism: SaslMechanism::Plain,
            username: username.to_string(),
            password: "secret".to_string(),
        }
    }

    struct EmptyLookup;

    #[async_trait]
    impl BrokerLookup for EmptyLookup {
        async fn lookup(&self) -> std::result::Result<Vec<String>, BoxError> {
            Ok(Vec::new())
        }
    }

    struct OverridingDiscovery {
        auth: Option<SaslConfig>,
    }

    #[async_trait]
    impl ClusterDiscovery for OverridingDiscovery {
        async fn discover(&self) -> std::result::Result<DiscoveryResponse, BoxError> {
            Ok(DiscoveryResponse {
                brokers: vec!["a:9092".to_string(), "b:9093".to_string()],
                auth_override: self.auth.clone(),
            })
        }
    }

    #[test]
    fn test_from_config_requires_brokers() {
        let result = ConnectionBuilder::from_config(ClientConfig::default());
        assert!(matches!(result, Err(ConfigError::NoBrokers)));
    }

    #[tokio::test]
    async fn test_build_rotates_through_static_seeds() {
        let builder = pinned_builder(ClientConfig::default(), &["a:1", "b:2", "c:3"]);

        let mut seen = Vec::new();
        for _ in 0..4 {
            let conn = builder.build(None).await.unwrap();
            seen.push(conn.address().to_string());
        }

        assert_eq!(seen, vec!["a:1", "b:2", "c:3", "a:1"]);
    }

    #[tokio::test]
    async fn test_build_with_explicit_target() {
        let builder = pinned_builder(ClientConfig::default(), &["a:1"]);
        let target = TargetBroker::new("h", 9999).with_rack("rack-7");

        let conn = builder.build(Some(target)).await.unwrap();
        assert_eq!(conn.address().to_string(), "h:9999");
        assert_eq!(conn.config().rack.as_deref(), Some("rack-7"));
    }

    #[tokio::test]
    async fn test_rack_absent_for_rotated_seeds() {
        let builder = pinned_builder(ClientConfig::default(), &["a:1"]);
        let conn = builder.build(None).await.unwrap();
        assert!(conn.config().rack.is_none());
    }

    #[tokio::test]
    async fn test_build_merges_cluster_config() {
        let config = ClientConfig {
            client_id: "inventory".to_string(),
            connection_timeout_ms: 750,
            max_in_flight_requests: Some(8),
            sasl: Some(sasl("default-user")),
            ..ClientConfig::default()
        };
        let builder = pinned_builder(config, &["a:1"]);

        let conn = builder.build(None).await.unwrap();
        let cc = conn.config();
        assert_eq!(cc.client_id, "inventory");
        assert_eq!(cc.connection_timeout_ms, 750);
        assert_eq!(cc.max_in_flight_requests, Some(8));
        assert_eq!(cc.sasl.as_ref().unwrap().username, "default-user");
        assert!(cc.enforce_request_timeout);
    }

    #[tokio::test]
    async fn test_discovery_auth_override_replaces_default() {
        let config = ClientConfig {
            sasl: Some(sasl("default-user")),
            ..ClientConfig::default()
        };
        let resolver = SeedResolver::with_shuffle(
            BrokerSource::Discovery(Arc::new(OverridingDiscovery {
                auth: Some(sasl("override-user")),
            })),
            identity,
        )
        .unwrap();
        let builder = ConnectionBuilder::with_resolver(config, resolver);

        let conn = builder.build(None).await.unwrap();
        assert_eq!(conn.config().sasl.as_ref().unwrap().username, "override-user");
    }

    #[tokio::test]
    async fn test_discovery_without_override_keeps_default() {
        let config = ClientConfig {
            sasl: Some(sasl("default-user")),
            ..ClientConfig::default()
        };
        let resolver = SeedResolver::with_shuffle(
            BrokerSource::Discovery(Arc::new(OverridingDiscovery { auth: None })),
            identity,
        )
        .unwrap();
        let builder = ConnectionBuilder::with_resolver(config, resolver);

        let conn = builder.build(None).await.unwrap();
        assert_eq!(conn.config().sasl.as_ref().unwrap().username, "default-user");
    }

    #[tokio::test]
    async fn test_resolution_failure_surfaces_unretried() {
        let resolver = SeedResolver::new(BrokerSource::Dynamic(Arc::new(EmptyLookup))).unwrap();
        let builder = ConnectionBuilder::with_resolver(ClientConfig::default(), resolver);

        let result = builder.build(None).await;
        assert!(matches!(result, Err(ConnectionError::NoBrokersAvailable)));
    }
}

//! Single broker connection.
//!
//! [`BrokerConnection`] is the object handed back by
//! [`ConnectionBuilder::build`](crate::builder::ConnectionBuilder::build).
//! Construction is pure assembly: the resolved address and merged cluster
//! settings are stored, and no I/O happens until [`connect`] is called.
//! The wire protocol, TLS and SASL handshakes, and request retries all
//! belong to the layers above; their settings travel in
//! [`ConnectionConfig`] untouched.
//!
//! [`connect`]: BrokerConnection::connect

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::config::{RetryConfig, SaslConfig, TlsConfig};
use crate::error::{ConnectionError, Result};
use crate::instrumentation::{events, InstrumentationEmitter, InstrumentationEvent};
use crate::source::BrokerAddress;

/// Fully assembled configuration for one connection.
///
/// Resolved address and rack merged with the immutable cluster settings.
/// The SASL block already reflects any per-resolution auth override.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// The broker to contact.
    pub address: BrokerAddress,
    /// Rack of the target broker, when an explicit target carried one.
    pub rack: Option<String>,
    /// Client identifier sent to brokers.
    pub client_id: String,
    /// Socket connection timeout in milliseconds.
    pub connection_timeout_ms: u64,
    /// Per-request timeout in milliseconds.
    pub request_timeout_ms: u64,
    /// Whether the request timeout is enforced or merely advisory.
    pub enforce_request_timeout: bool,
    /// Maximum number of in-flight requests, `None` for unlimited.
    pub max_in_flight_requests: Option<usize>,
    /// TLS settings for the transport layer.
    pub tls: Option<TlsConfig>,
    /// SASL settings for the transport layer.
    pub sasl: Option<SaslConfig>,
    /// Retry policy for the caller's retry machinery.
    pub retry: RetryConfig,
}

/// Opens raw sockets to brokers.
///
/// Injected so embedders can route connections through proxies or test
/// doubles; the default opens a plain TCP stream.
#[async_trait]
pub trait SocketFactory: Send + Sync {
    /// Open a socket to `host:port`.
    async fn open(&self, host: &str, port: u16) -> std::io::Result<TcpStream>;
}

/// Default socket factory: plain TCP.
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpSocketFactory;

#[async_trait]
impl SocketFactory for TcpSocketFactory {
    async fn open(&self, host: &str, port: u16) -> std::io::Result<TcpStream> {
        TcpStream::connect((host, port)).await
    }
}

/// A connection to a single broker.
pub struct BrokerConnection {
    config: ConnectionConfig,
    stream: Mutex<Option<TcpStream>>,
    socket_factory: Arc<dyn SocketFactory>,
    instrumentation: Option<Arc<dyn InstrumentationEmitter>>,
}

impl BrokerConnection {
    /// Create a new broker connection (not yet connected).
    ///
    /// Performs no network I/O.
    #[must_use]
    pub fn new(
        config: ConnectionConfig,
        socket_factory: Arc<dyn SocketFactory>,
        instrumentation: Option<Arc<dyn InstrumentationEmitter>>,
    ) -> Self {
        Self {
            config,
            stream: Mutex::new(None),
            socket_factory,
            instrumentation,
        }
    }

    /// The broker address this connection targets.
    #[must_use]
    pub fn address(&self) -> &BrokerAddress {
        &self.config.address
    }

    /// The assembled configuration.
    #[must_use]
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Check if the connection is established.
    pub async fn is_connected(&self) -> bool {
        self.stream.lock().await.is_some()
    }

    /// Open the socket to the broker.
    ///
    /// # Errors
    ///
    /// Returns a retriable [`ConnectionError`] if the socket cannot be
    /// opened within the configured connection timeout.
    pub async fn connect(&self) -> Result<()> {
        let address = &self.config.address;
        let connect_timeout = Duration::from_millis(self.config.connection_timeout_ms);

        let stream = match timeout(
            connect_timeout,
            self.socket_factory.open(&address.host, address.port),
        )
        .await
        {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                warn!(broker = %address, error = %e, "failed to connect to broker");
                return Err(ConnectionError::Connect {
                    address: address.to_string(),
                    source: e,
                });
            }
            Err(_) => {
                warn!(broker = %address, timeout_ms = self.config.connection_timeout_ms, "connection timeout");
                return Err(ConnectionError::Timeout {
                    address: address.to_string(),
                });
            }
        };

        *self.stream.lock().await = Some(stream);
        debug!(broker = %address, client_id = %self.config.client_id, "connected to broker");
        self.emit(events::CONNECT);
        Ok(())
    }

    /// Close the connection. A no-op when not connected.
    pub async fn disconnect(&self) {
        if self.stream.lock().await.take().is_some() {
            debug!(broker = %self.config.address, "disconnected from broker");
            self.emit(events::DISCONNECT);
        }
    }

    fn emit(&self, name: &'static str) {
        if let Some(emitter) = &self.instrumentation {
            emitter.emit(InstrumentationEvent {
                name,
                broker: self.config.address.to_string(),
                client_id: self.config.client_id.clone(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use std::sync::Mutex as StdMutex;
    use tokio::net::TcpListener;

    fn test_config(address: BrokerAddress) -> ConnectionConfig {
        let defaults = ClientConfig::default();
        ConnectionConfig {
            address,
            rack: None,
            client_id: defaults.client_id,
            connection_timeout_ms: 200,
            request_timeout_ms: defaults.request_timeout_ms,
            enforce_request_timeout: defaults.enforce_request_timeout,
            max_in_flight_requests: defaults.max_in_flight_requests,
            tls: None,
            sasl: None,
            retry: defaults.retry,
        }
    }

    fn test_connection(address: BrokerAddress) -> BrokerConnection {
        BrokerConnection::new(test_config(address), Arc::new(TcpSocketFactory), None)
    }

    #[derive(Default)]
    struct CollectingEmitter {
        events: StdMutex<Vec<InstrumentationEvent>>,
    }

    impl InstrumentationEmitter for CollectingEmitter {
        fn emit(&self, event: InstrumentationEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    #[tokio::test]
    async fn test_construction_performs_no_io() {
        let conn = test_connection(BrokerAddress::new("broker.invalid", 9092));
        assert!(!conn.is_connected().await);
        assert_eq!(conn.address().to_string(), "broker.invalid:9092");
    }

    #[tokio::test]
    async fn test_connect_to_dead_port_fails() {
        let conn = test_connection(BrokerAddress::new("127.0.0.1", 59999));
        let result = conn.connect().await;
        assert!(matches!(
            result,
            Err(ConnectionError::Connect { .. } | ConnectionError::Timeout { .. })
        ));
        assert!(!conn.is_connected().await);
    }

    #[tokio::test]
    async fn test_connect_and_disconnect_emit_events() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let emitter = Arc::new(CollectingEmitter::default());
        let conn = BrokerConnection::new(
            test_config(BrokerAddress::new("127.0.0.1", addr.port())),
            Arc::new(TcpSocketFactory),
            Some(Arc::clone(&emitter) as Arc<dyn InstrumentationEmitter>),
        );

        conn.connect().await.unwrap();
        assert!(conn.is_connected().await);

        conn.disconnect().await;
        assert!(!conn.is_connected().await);

        let names: Vec<&'static str> = emitter
            .events
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec![events::CONNECT, events::DISCONNECT]);
    }

    #[tokio::test]
    async fn test_disconnect_when_not_connected_is_noop() {
        let emitter = Arc::new(CollectingEmitter::default());
        let conn = BrokerConnection::new(
            test_config(BrokerAddress::new("127.0.0.1", 59999)),
            Arc::new(TcpSocketFactory),
            Some(Arc::clone(&emitter) as Arc<dyn InstrumentationEmitter>),
        );

        conn.disconnect().await;
        assert!(emitter.events.lock().unwrap().is_empty());
    }
}

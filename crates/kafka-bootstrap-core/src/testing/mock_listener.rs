//! Mock broker endpoint for integration testing.
//!
//! Accepts TCP connections and records them without speaking any protocol.
//! Accepted sockets are held open until the listener is stopped so tests
//! never race a remote reset.

use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, Mutex};

/// A TCP endpoint that records every inbound connection.
pub struct MockListener {
    bind_address: String,
    shutdown_tx: Option<broadcast::Sender<()>>,
    accepted: Arc<Mutex<Vec<TcpStream>>>,
}

impl MockListener {
    /// Create a mock listener that will bind to the given address.
    ///
    /// Use `"127.0.0.1:0"` to let the OS pick a free port.
    pub fn new(bind_address: impl Into<String>) -> Self {
        Self {
            bind_address: bind_address.into(),
            shutdown_tx: None,
            accepted: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Start accepting connections.
    ///
    /// Returns the actual `host:port` the listener is bound to.
    ///
    /// # Errors
    ///
    /// Returns an error if binding fails.
    pub async fn start(&mut self) -> std::io::Result<String> {
        let listener = TcpListener::bind(&self.bind_address).await?;
        let actual_address = listener.local_addr()?.to_string();

        let (shutdown_tx, mut shutdown_rx) = broadcast::channel::<()>(1);
        self.shutdown_tx = Some(shutdown_tx);

        let accepted = Arc::clone(&self.accepted);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        break;
                    }
                    result = listener.accept() => {
                        match result {
                            Ok((stream, _addr)) => {
                                accepted.lock().await.push(stream);
                            }
                            Err(_) => break,
                        }
                    }
                }
            }
        });

        Ok(actual_address)
    }

    /// Stop accepting and drop all held connections.
    pub async fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        self.accepted.lock().await.clear();
    }

    /// Number of connections accepted so far.
    pub async fn connection_count(&self) -> usize {
        self.accepted.lock().await.len()
    }
}

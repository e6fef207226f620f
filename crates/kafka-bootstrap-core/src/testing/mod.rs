//! Test utilities for seed resolution and connection construction.
//!
//! - [`MockListener`] - a TCP endpoint that records inbound connections,
//!   standing in for a broker's accept side.
//!
//! # Example
//!
//! ```rust,ignore
//! use kafka_bootstrap_core::testing::MockListener;
//!
//! #[tokio::test]
//! async fn test_connect() {
//!     let mut listener = MockListener::new("127.0.0.1:0");
//!     let address = listener.start().await.unwrap();
//!
//!     // point a connection at `address` ...
//!     assert_eq!(listener.connection_count().await, 1);
//! }
//! ```

pub mod mock_listener;

pub use mock_listener::MockListener;

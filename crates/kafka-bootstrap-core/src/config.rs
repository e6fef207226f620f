//! Client configuration shared by every connection built for a cluster.
//!
//! Configuration is loaded from YAML files (or assembled programmatically)
//! and validated before use. TLS and SASL settings are carried through to
//! the constructed connection; this crate never performs the handshakes
//! itself.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, ConfigResult};
use crate::source::BrokerAddress;

/// Immutable cluster-wide client configuration.
///
/// Supplied once at builder construction and merged into every
/// [`ConnectionConfig`](crate::connection::ConnectionConfig).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
    /// Client identifier sent to brokers.
    #[serde(default = "default_client_id")]
    pub client_id: String,

    /// Static seed broker addresses ("host:port").
    ///
    /// Only consulted when the broker source is static; dynamic and
    /// discovery sources are wired up programmatically.
    #[serde(default)]
    pub brokers: Vec<String>,

    /// Socket connection timeout in milliseconds.
    #[serde(default = "default_connection_timeout_ms")]
    pub connection_timeout_ms: u64,

    /// Per-request timeout in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Whether the request timeout is enforced or merely advisory.
    #[serde(default = "default_enforce_request_timeout")]
    pub enforce_request_timeout: bool,

    /// Maximum number of in-flight requests per connection.
    /// `None` means unlimited.
    #[serde(default)]
    pub max_in_flight_requests: Option<usize>,

    /// TLS settings for broker connections.
    #[serde(default)]
    pub tls: Option<TlsConfig>,

    /// SASL authentication settings.
    #[serde(default)]
    pub sasl: Option<SaslConfig>,

    /// Retry policy handed to the caller-side retry machinery.
    #[serde(default)]
    pub retry: RetryConfig,

    /// Logging configuration for binary consumers.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// TLS settings for broker connections.
///
/// Carried as configuration only; the TLS handshake is performed by the
/// transport layer above this crate.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to CA certificate file (PEM format) for verifying broker certificates.
    /// If not set, the system's root certificates apply.
    pub ca_cert_path: Option<PathBuf>,

    /// Path to client certificate file (PEM format) for mTLS authentication.
    pub cert_path: Option<PathBuf>,

    /// Path to client private key file (PEM format) for mTLS authentication.
    pub key_path: Option<PathBuf>,

    /// Whether to skip server certificate verification (INSECURE - for testing only).
    #[serde(default)]
    pub insecure_skip_verify: bool,
}

/// SASL authentication mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub enum SaslMechanism {
    /// SASL/PLAIN - simple username/password authentication.
    #[default]
    #[serde(rename = "PLAIN")]
    Plain,
    /// SASL/SCRAM-SHA-256 - salted challenge-response authentication.
    #[serde(rename = "SCRAM-SHA-256")]
    ScramSha256,
    /// SASL/SCRAM-SHA-512 - salted challenge-response authentication.
    #[serde(rename = "SCRAM-SHA-512")]
    ScramSha512,
}

impl SaslMechanism {
    /// Get the Kafka mechanism name as used in the SASL handshake.
    #[must_use]
    pub fn mechanism_name(&self) -> &'static str {
        match self {
            Self::Plain => "PLAIN",
            Self::ScramSha256 => "SCRAM-SHA-256",
            Self::ScramSha512 => "SCRAM-SHA-512",
        }
    }
}

/// SASL authentication configuration.
///
/// A discovery source may supply a per-connection override for this block;
/// the override applies only to the connection built from that resolution.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SaslConfig {
    /// SASL mechanism to use.
    #[serde(default)]
    pub mechanism: SaslMechanism,

    /// Username for authentication.
    /// Supports environment variable expansion: "${KAFKA_USERNAME}"
    pub username: String,

    /// Password for authentication.
    /// Supports environment variable expansion: "${KAFKA_PASSWORD}"
    pub password: String,
}

impl SaslConfig {
    /// Get the username with environment variables expanded.
    #[must_use]
    pub fn username(&self) -> String {
        expand_env_vars(&self.username)
    }

    /// Get the password with environment variables expanded.
    #[must_use]
    pub fn password(&self) -> String {
        expand_env_vars(&self.password)
    }
}

/// Expand environment variables in a string.
///
/// Replaces `${VAR_NAME}` with the value of the environment variable `VAR_NAME`.
/// If the variable is not set, replaces with an empty string.
fn expand_env_vars(s: &str) -> String {
    let re = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid regex");
    re.replace_all(s, |caps: &regex::Captures| {
        std::env::var(&caps[1]).unwrap_or_default()
    })
    .to_string()
}

/// Retry policy parameters.
///
/// Pass-through data for the caller's retry machinery; resolution and
/// construction in this crate never retry on their own.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetryConfig {
    /// Upper bound on the backoff delay in milliseconds.
    #[serde(default = "default_max_retry_time_ms")]
    pub max_retry_time_ms: u64,

    /// Initial backoff delay in milliseconds.
    #[serde(default = "default_initial_retry_time_ms")]
    pub initial_retry_time_ms: u64,

    /// Randomization factor applied to each delay.
    #[serde(default = "default_retry_factor")]
    pub factor: f64,

    /// Exponential growth multiplier between attempts.
    #[serde(default = "default_retry_multiplier")]
    pub multiplier: f64,

    /// Maximum number of retries per call.
    #[serde(default = "default_retries")]
    pub retries: u32,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output logs in JSON format (for production).
    #[serde(default)]
    pub json: bool,
}

// Default value functions

fn default_client_id() -> String {
    "kafka-bootstrap".to_string()
}

fn default_connection_timeout_ms() -> u64 {
    1_000
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

fn default_enforce_request_timeout() -> bool {
    true
}

fn default_max_retry_time_ms() -> u64 {
    30_000
}

fn default_initial_retry_time_ms() -> u64 {
    300
}

fn default_retry_factor() -> f64 {
    0.2
}

fn default_retry_multiplier() -> f64 {
    2.0
}

fn default_retries() -> u32 {
    5
}

fn default_log_level() -> String {
    "info".to_string()
}

// Default implementations

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            client_id: default_client_id(),
            brokers: Vec::new(),
            connection_timeout_ms: default_connection_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            enforce_request_timeout: default_enforce_request_timeout(),
            max_in_flight_requests: None,
            tls: None,
            sasl: None,
            retry: RetryConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retry_time_ms: default_max_retry_time_ms(),
            initial_retry_time_ms: default_initial_retry_time_ms(),
            factor: default_retry_factor(),
            multiplier: default_retry_multiplier(),
            retries: default_retries(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// Configuration loading and validation

impl ClientConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if
    /// validation fails.
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;

        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing or validation fails.
    pub fn from_str(content: &str) -> ConfigResult<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// Every configured seed address must parse as `host:port` with a port
    /// in 1..=65535. An empty seed list is accepted here: whether seeds are
    /// required at all depends on the broker source chosen at builder
    /// construction.
    ///
    /// # Errors
    ///
    /// Returns an error if any seed address is malformed.
    pub fn validate(&self) -> ConfigResult<()> {
        for seed in &self.brokers {
            seed.parse::<BrokerAddress>()?;
        }
        Ok(())
    }
}

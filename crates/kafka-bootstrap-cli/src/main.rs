//! Kafka bootstrap connectivity probe.
//!
//! Resolves seed brokers the way a client would when opening a new
//! connection and reports whether each resolved broker is reachable.

use clap::Parser;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use kafka_bootstrap_core::{ClientConfig, ConnectionBuilder, LoggingConfig};

/// Seed broker connectivity probe.
#[derive(Parser)]
#[command(name = "kafka-bootstrap-check")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file.
    #[arg(short, long)]
    config: Option<String>,

    /// Seed broker address ("host:port"); repeatable. Overrides the config file.
    #[arg(long = "broker")]
    brokers: Vec<String>,

    /// Number of connections to build; each one rotates to the next seed.
    #[arg(long, default_value_t = 1)]
    attempts: usize,

    /// Increase logging verbosity (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = match &args.config {
        Some(path) => ClientConfig::from_file(path)?,
        None => ClientConfig::default(),
    };

    // Apply CLI overrides
    if !args.brokers.is_empty() {
        config.brokers = args.brokers.clone();
    }

    // Override log level from verbosity flag
    let log_config = match args.verbose {
        0 => config.logging.clone(),
        1 => LoggingConfig {
            level: "debug".to_string(),
            ..config.logging.clone()
        },
        _ => LoggingConfig {
            level: "trace".to_string(),
            ..config.logging.clone()
        },
    };

    setup_tracing(&log_config);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        client_id = %config.client_id,
        brokers = ?config.brokers,
        attempts = args.attempts,
        "starting bootstrap check"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_probe(config, args.attempts))
}

fn setup_tracing(config: &LoggingConfig) {
    let level = match config.level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json {
        subscriber.with(fmt::layer().json()).init();
    } else {
        subscriber.with(fmt::layer()).init();
    }
}

async fn run_probe(config: ClientConfig, attempts: usize) -> anyhow::Result<()> {
    let builder = ConnectionBuilder::from_config(config)?;

    let mut failures = 0usize;
    for attempt in 0..attempts {
        let connection = builder.build(None).await?;
        match connection.connect().await {
            Ok(()) => {
                info!(broker = %connection.address(), attempt, "broker reachable");
                connection.disconnect().await;
            }
            Err(e) => {
                warn!(broker = %connection.address(), attempt, error = %e, "broker unreachable");
                failures += 1;
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} of {attempts} connection attempts failed");
    }
    Ok(())
}

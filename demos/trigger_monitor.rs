//! Trigger Monitor Example
//!
//! Finds the SyncBox, configures it, runs one session and prints every
//! trigger until every expected sync pulse has been seen.
//!
//! Usage:
//!   cargo run --example trigger_monitor                      # Default parameters
//!   cargo run --example trigger_monitor -- session.json      # Parameters from JSON
//!
//! Set RUST_LOG environment variable to control logging:
//!   RUST_LOG=debug cargo run --example trigger_monitor

use syncbox_protocol::{SyncBox, SyncBoxConfig, SyncBoxError, TriggerEvent, TriggerRead};
use tracing::{info, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false))
        .init();
}

fn load_config(path: Option<String>) -> Result<SyncBoxConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(&path)?;
            let config: SyncBoxConfig = serde_json::from_str(&text)?;
            config.validate()?;
            info!("Loaded parameters from {}", path);
            Ok(config)
        }
        None => Ok(SyncBoxConfig::default()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let config = load_config(std::env::args().nth(1))?;
    info!("Session parameters: {:?}", config);

    let mut syncbox = SyncBox::connect(&config)?;
    info!(
        "Connected on {}",
        syncbox.port_name().unwrap_or("unknown port")
    );

    syncbox.start()?;
    info!("=== Session started ===");

    let timeout = config.sync_timeout();
    let expected = config.expected_syncs();
    let mut syncs = 0;
    while syncs < expected {
        match syncbox.read_next(Some(timeout))? {
            TriggerRead::Event(TriggerEvent::Sync) => {
                syncs += 1;
                info!("Sync {}/{}", syncs, expected);
            }
            TriggerRead::Event(TriggerEvent::Unknown(byte)) => {
                warn!("Unexpected byte 0x{:02X}", byte);
            }
            TriggerRead::Event(event) => info!("Response: {}", event),
            TriggerRead::TimedOut => {
                warn!("No trigger within {:?}, stopping", timeout);
                break;
            }
        }
    }

    syncbox.stop()?;
    info!("=== Session stopped ===");

    match syncbox.close() {
        Err(e @ SyncBoxError::DisconnectFailed { .. }) => warn!("{}", e),
        other => other?,
    }

    Ok(())
}

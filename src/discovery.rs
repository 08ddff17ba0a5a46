//! Locating the SyncBox among the available serial ports.

use crate::constants::*;
use crate::error::{Result, SyncBoxError};
use crate::session::handshake;
use crate::transport::{Connection, PortOpener, SerialPortOpener, Sleeper, ThreadSleeper};
use tracing::{debug, info};

/// Names of the serial ports the OS reports, in a stable order
pub fn available_ports() -> Result<Vec<String>> {
    let mut names: Vec<String> = serialport::available_ports()?
        .into_iter()
        .map(|info| info.port_name)
        .collect();
    names.sort();
    names.dedup();
    Ok(names)
}

/// Probe `candidates` in order and return the first one that enters
/// computer mode.
///
/// Candidates after the responding one are never opened, so at most one
/// device is switched into computer mode.
pub fn discover<I, S>(
    candidates: I,
    opener: &mut dyn PortOpener,
    sleeper: &dyn Sleeper,
) -> Result<Connection>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut probed = 0;

    for candidate in candidates {
        let name = candidate.as_ref();
        probed += 1;

        let port = match opener.open(name, BAUD_RATE, HANDSHAKE_TIMEOUT) {
            Ok(port) => port,
            Err(e) => {
                debug!("Skipping {}: {}", name, e);
                continue;
            }
        };

        match probe(port, sleeper) {
            Ok(port) => {
                info!("SyncBox found on {}", name);
                return Ok(port);
            }
            Err(e) => debug!("{}", e),
        }
    }

    Err(SyncBoxError::PortNotFound { candidates: probed })
}

/// Search every port the OS reports
pub fn discover_serial() -> Result<Connection> {
    let candidates = available_ports()?;
    debug!("Probing {} serial ports for a SyncBox", candidates.len());
    discover(candidates, &mut SerialPortOpener, &ThreadSleeper)
}

/// Run the computer mode handshake on an open port.
///
/// The port is dropped (closed) on any failure.
fn probe(mut port: Connection, sleeper: &dyn Sleeper) -> Result<Connection> {
    let reply = handshake(&mut *port, sleeper, COMPUTER_MODE_CMD)?;

    if reply == Some(COMPUTER_MODE_CMD) {
        Ok(port)
    } else {
        Err(SyncBoxError::HandshakeFailed {
            port: port.name().to_string(),
            reply,
        })
    }
}

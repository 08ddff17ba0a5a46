use crate::constants::*;
use crate::discovery::discover_serial;
use crate::encoding::config_frame;
use crate::error::{reply_text, Result, SyncBoxError};
use crate::transport::{Connection, Sleeper, ThreadSleeper, Transport};
use crate::trigger::TriggerReader;
use crate::types::*;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Main SyncBox protocol interface
pub struct SyncBox {
    port: Option<Connection>,
    state: ProtocolState,
    config: Option<SyncBoxConfig>,
    sleeper: Box<dyn Sleeper>,
}

impl SyncBox {
    /// Find the SyncBox on any serial port and configure it
    pub fn connect(config: &SyncBoxConfig) -> Result<Self> {
        config.validate()?;
        let port = discover_serial()?;
        let mut syncbox = SyncBox::new(port, Box::new(ThreadSleeper));
        syncbox.configure(config)?;
        Ok(syncbox)
    }

    /// Wrap a connection that already answered the computer mode probe
    pub fn new(port: Connection, sleeper: Box<dyn Sleeper>) -> Self {
        SyncBox {
            port: Some(port),
            state: ProtocolState::ComputerMode,
            config: None,
            sleeper,
        }
    }

    pub fn state(&self) -> ProtocolState {
        self.state
    }

    /// Port the session is bound to, until it is closed
    pub fn port_name(&self) -> Option<&str> {
        self.port.as_ref().map(|port| port.name())
    }

    /// Parameters accepted by the device, once configured
    pub fn config(&self) -> Option<&SyncBoxConfig> {
        self.config.as_ref()
    }

    fn ensure(&self, operation: &'static str, allowed: &[ProtocolState]) -> Result<()> {
        if self.port.is_some() && allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(SyncBoxError::NotConnected {
                operation,
                state: self.state,
            })
        }
    }

    fn port_mut(&mut self, operation: &'static str) -> Result<(&mut dyn Transport, &dyn Sleeper)> {
        let state = self.state;
        match self.port.as_mut() {
            Some(port) => Ok((&mut **port, self.sleeper.as_ref())),
            None => Err(SyncBoxError::NotConnected { operation, state }),
        }
    }

    fn exchange(&mut self, operation: &'static str, command: u8) -> Result<Option<u8>> {
        let (port, sleeper) = self.port_mut(operation)?;
        handshake(port, sleeper, command)
    }

    /// Send the session parameters.
    ///
    /// The whole frame is encoded before anything is written, so an
    /// out-of-range parameter leaves the device untouched.
    pub fn configure(&mut self, config: &SyncBoxConfig) -> Result<()> {
        self.ensure("configure", &[ProtocolState::ComputerMode])?;
        let frame = config_frame(config)?;

        let reply = self.exchange("configure", CONFIGURE_CMD)?;
        if reply != Some(CONFIGURE_CMD) {
            warn!("Configuration mode refused: got {}", reply_text(&reply));
            return Err(SyncBoxError::ConfigurationFailed(format!(
                "expected 'R', got {}",
                reply_text(&reply)
            )));
        }

        let (port, sleeper) = self.port_mut("configure")?;
        debug!("Sending configuration frame {}", String::from_utf8_lossy(&frame));
        port.write_bytes(&frame)?;
        sleeper.sleep(CONFIG_ECHO_DELAY);
        // Only the echo length is checked, never its content.
        let echo = port.read_bytes(CONFIG_FRAME_LEN, HANDSHAKE_TIMEOUT)?;
        sleeper.sleep(SETTLE_INTERVAL);

        if echo.len() < CONFIG_FRAME_LEN {
            warn!("Configuration echo was {} of {} bytes", echo.len(), CONFIG_FRAME_LEN);
            return Err(SyncBoxError::ConfigurationFailed(format!(
                "echo was {} of {} bytes",
                echo.len(),
                CONFIG_FRAME_LEN
            )));
        }

        self.config = Some(config.clone());
        self.state = ProtocolState::Configured;
        info!("SyncBox configured");
        Ok(())
    }

    /// Start a synchronization or simulation session
    pub fn start(&mut self) -> Result<()> {
        self.ensure("start", &[ProtocolState::Configured, ProtocolState::Running])?;

        let reply = self.exchange("start", START_CMD)?;
        if reply != Some(START_CMD) {
            return Err(SyncBoxError::StartFailed { reply });
        }

        self.state = ProtocolState::Running;
        Ok(())
    }

    /// Stop the ongoing session
    pub fn stop(&mut self) -> Result<()> {
        self.ensure("stop", &[ProtocolState::Configured, ProtocolState::Running])?;

        let reply = self.exchange("stop", STOP_CMD)?;
        if reply != Some(STOP_CMD) {
            return Err(SyncBoxError::StopFailed { reply });
        }

        self.state = ProtocolState::Configured;
        Ok(())
    }

    /// Switch computer mode off and release the port.
    ///
    /// The port is released even when the device does not confirm. Closing
    /// twice returns [`SyncBoxError::NotConnected`].
    pub fn close(&mut self) -> Result<()> {
        let mut port = self.port.take().ok_or(SyncBoxError::NotConnected {
            operation: "close",
            state: self.state,
        })?;
        let name = port.name().to_string();

        let reply = handshake(&mut *port, self.sleeper.as_ref(), DISCONNECT_CMD);
        drop(port);
        self.state = ProtocolState::Disconnected;

        match reply? {
            Some(DISCONNECT_CMD) => {
                info!("SyncBox on {} disconnected", name);
                Ok(())
            }
            reply => {
                warn!("SyncBox on {} did not confirm disconnect", name);
                Err(SyncBoxError::DisconnectFailed { reply })
            }
        }
    }

    /// Borrow the connection for reading triggers
    pub fn triggers(&mut self) -> Result<TriggerReader<'_>> {
        let (port, _) = self.port_mut("read triggers")?;
        Ok(TriggerReader::new(port))
    }

    /// See [`TriggerReader::poll_buffered`]
    pub fn poll_buffered(&mut self) -> Result<Vec<TriggerEvent>> {
        self.triggers()?.poll_buffered()
    }

    /// See [`TriggerReader::read_next`]
    pub fn read_next(&mut self, timeout: Option<Duration>) -> Result<TriggerRead> {
        self.triggers()?.read_next(timeout)
    }
}

impl Drop for SyncBox {
    fn drop(&mut self) {
        if let Some(port) = &self.port {
            warn!(
                "SyncBox on {} dropped without close; device is still in computer mode",
                port.name()
            );
        }
    }
}

/// Write a one-byte command and read the one-byte confirmation
pub(crate) fn handshake(port: &mut dyn Transport, sleeper: &dyn Sleeper, command: u8) -> Result<Option<u8>> {
    debug!("Sending '{}' to {}", command as char, port.name());
    port.write_bytes(&[command])?;
    sleeper.sleep(SETTLE_INTERVAL);
    let reply = port.read_bytes(1, HANDSHAKE_TIMEOUT)?.first().copied();
    sleeper.sleep(SETTLE_INTERVAL);
    debug!("Reply to '{}': {}", command as char, reply_text(&reply));
    Ok(reply)
}

//! Decoding of the trigger stream the SyncBox emits while a session runs.

use crate::constants::BLOCKING_READ_SLICE;
use crate::error::Result;
use crate::transport::Transport;
use crate::types::{TriggerEvent, TriggerRead};
use std::time::Duration;
use tracing::debug;

/// Reads trigger bytes from an open connection
pub struct TriggerReader<'a> {
    port: &'a mut dyn Transport,
}

impl<'a> TriggerReader<'a> {
    pub fn new(port: &'a mut dyn Transport) -> Self {
        Self { port }
    }

    /// Decode every byte already buffered, in arrival order, without waiting.
    ///
    /// An empty result just means nothing arrived since the last poll.
    pub fn poll_buffered(&mut self) -> Result<Vec<TriggerEvent>> {
        let bytes = self.port.read_available()?;
        Ok(bytes.into_iter().map(decode).collect())
    }

    /// Wait for a single trigger byte.
    ///
    /// `None` waits until a byte arrives. A zero timeout only returns an
    /// event if one is already buffered.
    pub fn read_next(&mut self, timeout: Option<Duration>) -> Result<TriggerRead> {
        match timeout {
            Some(timeout) => self.read_within(timeout),
            None => loop {
                if let TriggerRead::Event(event) = self.read_within(BLOCKING_READ_SLICE)? {
                    return Ok(TriggerRead::Event(event));
                }
            },
        }
    }

    fn read_within(&mut self, timeout: Duration) -> Result<TriggerRead> {
        Ok(match self.port.read_bytes(1, timeout)?.first() {
            Some(&byte) => TriggerRead::Event(decode(byte)),
            None => TriggerRead::TimedOut,
        })
    }
}

fn decode(byte: u8) -> TriggerEvent {
    let event = TriggerEvent::from_byte(byte);
    if let TriggerEvent::Unknown(byte) = event {
        debug!("Ignoring unknown trigger byte 0x{:02X}", byte);
    }
    event
}

//! Scripted fakes for exercising the protocol without hardware.

use crate::error::{Result, SyncBoxError};
use crate::transport::{Connection, PortOpener, Sleeper, Transport};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Default)]
pub struct MockState {
    pub written: Vec<u8>,
    pub rx: VecDeque<u8>,
    pub read_timeouts: Vec<Duration>,
    pub fail_writes: bool,
    pub dropped: bool,
}

/// Shared view of a [`MockTransport`] that outlives the transport itself
#[derive(Debug, Clone, Default)]
pub struct MockHandle(pub Arc<Mutex<MockState>>);

impl MockHandle {
    pub fn written(&self) -> Vec<u8> {
        self.0.lock().unwrap().written.clone()
    }

    pub fn push_rx(&self, bytes: &[u8]) {
        self.0.lock().unwrap().rx.extend(bytes.iter().copied());
    }

    pub fn pending_rx(&self) -> usize {
        self.0.lock().unwrap().rx.len()
    }

    pub fn read_timeouts(&self) -> Vec<Duration> {
        self.0.lock().unwrap().read_timeouts.clone()
    }

    pub fn fail_writes(&self) {
        self.0.lock().unwrap().fail_writes = true;
    }

    pub fn is_dropped(&self) -> bool {
        self.0.lock().unwrap().dropped
    }
}

/// Transport whose replies are queued up front.
///
/// Reads never block: a read returns whatever is queued, up to the count.
pub struct MockTransport {
    name: String,
    handle: MockHandle,
}

impl MockTransport {
    pub fn new(name: &str, rx: &[u8]) -> (Self, MockHandle) {
        let handle = MockHandle::default();
        handle.push_rx(rx);
        let transport = Self {
            name: name.to_string(),
            handle: handle.clone(),
        };
        (transport, handle)
    }

    pub fn connection(name: &str, rx: &[u8]) -> (Connection, MockHandle) {
        let (transport, handle) = Self::new(name, rx);
        (Box::new(transport), handle)
    }
}

impl Transport for MockTransport {
    fn name(&self) -> &str {
        &self.name
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        let mut state = self.handle.0.lock().unwrap();
        if state.fail_writes {
            return Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "port gone").into());
        }
        state.written.extend_from_slice(data);
        Ok(())
    }

    fn read_bytes(&mut self, count: usize, timeout: Duration) -> Result<Vec<u8>> {
        let mut state = self.handle.0.lock().unwrap();
        state.read_timeouts.push(timeout);
        let n = count.min(state.rx.len());
        Ok(state.rx.drain(..n).collect())
    }

    fn bytes_to_read(&mut self) -> Result<usize> {
        Ok(self.handle.0.lock().unwrap().rx.len())
    }
}

impl Drop for MockTransport {
    fn drop(&mut self) {
        if let Ok(mut state) = self.handle.0.lock() {
            state.dropped = true;
        }
    }
}

/// Opener that serves scripted ports and records every open attempt
#[derive(Default)]
pub struct MockOpener {
    ports: HashMap<String, Vec<u8>>,
    pub opened: Vec<String>,
    pub handles: HashMap<String, MockHandle>,
}

impl MockOpener {
    /// Register a port that opens successfully and replies with `rx`
    pub fn with_port(mut self, name: &str, rx: &[u8]) -> Self {
        self.ports.insert(name.to_string(), rx.to_vec());
        self
    }
}

impl PortOpener for MockOpener {
    fn open(&mut self, name: &str, _baud_rate: u32, _timeout: Duration) -> Result<Connection> {
        self.opened.push(name.to_string());
        match self.ports.get(name) {
            Some(rx) => {
                let (connection, handle) = MockTransport::connection(name, rx);
                self.handles.insert(name.to_string(), handle);
                Ok(connection)
            }
            None => Err(SyncBoxError::SerialPort(serialport::Error::new(
                serialport::ErrorKind::NoDevice,
                format!("{} does not exist", name),
            ))),
        }
    }
}

/// Records requested delays instead of sleeping
#[derive(Debug, Clone, Default)]
pub struct RecordingSleeper(pub Arc<Mutex<Vec<Duration>>>);

impl RecordingSleeper {
    pub fn delays(&self) -> Vec<Duration> {
        self.0.lock().unwrap().clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.0.lock().unwrap().push(duration);
    }
}

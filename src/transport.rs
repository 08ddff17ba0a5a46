//! Byte transport seam between the protocol and the serial hardware.
//!
//! The protocol only needs to open a named endpoint, write bytes, and read a
//! bounded number of bytes within an explicit timeout. Keeping that behind
//! [`Transport`] and [`PortOpener`] lets the handshakes run against scripted
//! fakes, and [`Sleeper`] does the same for the settle delays.

use crate::error::Result;
use serialport::SerialPort;
use std::io::{self, Read, Write};
use std::thread;
use std::time::{Duration, Instant};

/// An open, exclusively owned byte stream to one endpoint
pub trait Transport: Send {
    /// Endpoint identifier this transport was opened on
    fn name(&self) -> &str;

    /// Write every byte of `data`
    fn write_bytes(&mut self, data: &[u8]) -> Result<()>;

    /// Read up to `count` bytes, returning early once `timeout` has elapsed.
    ///
    /// A short (possibly empty) result means the timeout expired.
    fn read_bytes(&mut self, count: usize, timeout: Duration) -> Result<Vec<u8>>;

    /// Number of bytes waiting in the input buffer
    fn bytes_to_read(&mut self) -> Result<usize>;

    /// Drain whatever is buffered without waiting
    fn read_available(&mut self) -> Result<Vec<u8>> {
        let available = self.bytes_to_read()?;
        if available == 0 {
            return Ok(Vec::new());
        }
        self.read_bytes(available, Duration::ZERO)
    }
}

/// An open connection to a SyncBox candidate
pub type Connection = Box<dyn Transport>;

/// Opens named endpoints; the discovery probe goes through this
pub trait PortOpener: Send {
    fn open(&mut self, name: &str, baud_rate: u32, timeout: Duration) -> Result<Connection>;
}

/// Source of the settle delays between handshake steps
pub trait Sleeper: Send {
    fn sleep(&self, duration: Duration);
}

/// Sleeps the calling thread
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// [`Transport`] backed by a `serialport` handle
pub struct SerialTransport {
    name: String,
    port: Box<dyn SerialPort>,
}

impl SerialTransport {
    /// Open `name` with 8N1 framing at `baud_rate`
    pub fn open(name: &str, baud_rate: u32, timeout: Duration) -> Result<Self> {
        let port = serialport::new(name, baud_rate)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .flow_control(serialport::FlowControl::None)
            .timeout(timeout)
            .open()?;

        Ok(Self {
            name: name.to_string(),
            port,
        })
    }
}

impl Transport for SerialTransport {
    fn name(&self) -> &str {
        &self.name
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.port.write_all(data)?;
        Ok(())
    }

    fn read_bytes(&mut self, count: usize, timeout: Duration) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; count];
        let mut filled = 0;
        let deadline = Instant::now() + timeout;

        while filled < count {
            let remaining = deadline.saturating_duration_since(Instant::now());
            self.port.set_timeout(remaining)?;

            match self.port.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::TimedOut => break,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }

            if remaining.is_zero() {
                break;
            }
        }

        buf.truncate(filled);
        Ok(buf)
    }

    fn bytes_to_read(&mut self) -> Result<usize> {
        Ok(self.port.bytes_to_read()? as usize)
    }
}

/// Opens real serial ports
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialPortOpener;

impl PortOpener for SerialPortOpener {
    fn open(&mut self, name: &str, baud_rate: u32, timeout: Duration) -> Result<Connection> {
        Ok(Box::new(SerialTransport::open(name, baud_rate, timeout)?))
    }
}

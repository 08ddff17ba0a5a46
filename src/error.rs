//! Error types for SyncBox protocol operations.

use crate::types::ProtocolState;
use thiserror::Error;

/// Result type alias for SyncBox operations.
pub type Result<T> = std::result::Result<T, SyncBoxError>;

/// Error types for SyncBox communication.
#[derive(Error, Debug)]
pub enum SyncBoxError {
    /// Serial port communication error
    #[error("Serial port error: {0}")]
    SerialPort(#[from] serialport::Error),

    /// General I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No candidate port answered the computer mode probe
    #[error("Unable to find SyncBox ({candidates} ports probed)")]
    PortNotFound {
        /// Number of candidates that were tried
        candidates: usize,
    },

    /// A single candidate did not answer the computer mode probe
    #[error("No SyncBox on {port}: got {}", reply_text(.reply))]
    HandshakeFailed {
        /// Port that was probed
        port: String,
        /// Byte received instead of 'C', if any
        reply: Option<u8>,
    },

    /// Configuration handshake or echo failed
    #[error("Unable to configure SyncBox: {0}. Please restart the SyncBox")]
    ConfigurationFailed(String),

    /// Start handshake failed
    #[error("Unable to start session: got {}", reply_text(.reply))]
    StartFailed {
        /// Byte received instead of 'S', if any
        reply: Option<u8>,
    },

    /// Stop handshake failed
    #[error("Unable to stop session: got {}", reply_text(.reply))]
    StopFailed {
        /// Byte received instead of 'A', if any
        reply: Option<u8>,
    },

    /// Disconnect handshake failed; the port has been released anyway
    #[error("Unable to disconnect from SyncBox (got {}). Please turn it off manually", reply_text(.reply))]
    DisconnectFailed {
        /// Byte received instead of 'D', if any
        reply: Option<u8>,
    },

    /// Parameter does not fit in a 4-digit field
    #[error("Parameter {field} = {value} is unsupported: parameters must be 0..=9999")]
    ParameterOutOfRange {
        /// Name of the offending field
        field: &'static str,
        /// Rejected value
        value: i64,
    },

    /// Operation attempted in the wrong protocol state
    #[error("Cannot {operation} while {state}")]
    NotConnected {
        /// Operation that was attempted
        operation: &'static str,
        /// State the session was in
        state: ProtocolState,
    },
}

/// Render a handshake reply for error messages
pub(crate) fn reply_text(reply: &Option<u8>) -> String {
    match reply {
        Some(byte) if byte.is_ascii_graphic() => format!("'{}'", *byte as char),
        Some(byte) => format!("0x{:02X}", byte),
        None => "no reply".to_string(),
    }
}

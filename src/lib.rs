//! # SyncBox Protocol Library
//!
//! A Rust library for driving the NordicNeuroLab fMRI SyncBox over its serial
//! command interface.
//!
//! ## Features
//!
//! - Locate the SyncBox by probing serial ports with the computer mode handshake
//! - Configure volumes, slices, TR time and trigger selection
//! - Start and stop synchronization or simulation sessions
//! - Decode scanner sync pulses and ResponseGrips button presses
//!
//! ## Example
//!
//! ```no_run
//! use std::time::Duration;
//! use syncbox_protocol::{SyncBox, SyncBoxConfig, TriggerRead};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut syncbox = SyncBox::connect(&SyncBoxConfig::default())?;
//!     syncbox.start()?;
//!     if let TriggerRead::Event(event) = syncbox.read_next(Some(Duration::from_secs(5)))? {
//!         println!("Trigger: {}", event);
//!     }
//!     syncbox.stop()?;
//!     syncbox.close()?;
//!     Ok(())
//! }
//! ```

pub mod constants;
pub mod discovery;
pub mod encoding;
pub mod error;
pub mod session;
pub mod transport;
pub mod trigger;
pub mod types;

#[cfg(test)]
mod test_support;

pub use discovery::{available_ports, discover, discover_serial};
pub use encoding::{config_frame, decode_field, encode_field};
pub use error::{Result, SyncBoxError};
pub use session::SyncBox;
pub use transport::{
    Connection, PortOpener, SerialPortOpener, SerialTransport, Sleeper, ThreadSleeper, Transport,
};
pub use trigger::TriggerReader;
pub use types::*;

//! Protocol constants for SyncBox communication.
//!
//! This module defines the command bytes, the fixed field layout of the
//! configuration frame, and the timing windows the device expects around
//! every handshake.

use std::time::Duration;

/// Enter computer mode (discovery probe)
pub const COMPUTER_MODE_CMD: u8 = b'C';

/// Enter configuration mode
pub const CONFIGURE_CMD: u8 = b'R';

/// Start a synchronization or simulation session
pub const START_CMD: u8 = b'S';

/// Stop the running session
pub const STOP_CMD: u8 = b'A';

/// Leave computer mode
pub const DISCONNECT_CMD: u8 = b'D';

/// Baud rate (57600 bps)
pub const BAUD_RATE: u32 = 57_600;

/// Width of every configuration field in ASCII digits
pub const FIELD_WIDTH: usize = 4;

/// Number of fields in the configuration frame
pub const CONFIG_FIELD_COUNT: usize = 12;

/// Length of the configuration frame and of its echo
pub const CONFIG_FRAME_LEN: usize = FIELD_WIDTH * CONFIG_FIELD_COUNT;

/// Largest value that fits in a configuration field
pub const MAX_FIELD_VALUE: u16 = 9999;

/// Reserved configuration slot
pub const DUMMY_FIELD: [u8; FIELD_WIDTH] = *b"0000";

/// Mode flag for simulation mode
pub const SIMULATION_FLAG: [u8; FIELD_WIDTH] = *b"0000";

/// Mode flag for synchronization mode
pub const SYNCHRONIZATION_FLAG: [u8; FIELD_WIDTH] = *b"0001";

/// Read timeout for every handshake reply and the configuration echo
pub const HANDSHAKE_TIMEOUT: Duration = Duration::from_millis(200);

/// Wait around each handshake read while the device switches modes
pub const SETTLE_INTERVAL: Duration = Duration::from_millis(100);

/// Wait after writing the configuration frame before reading its echo
pub const CONFIG_ECHO_DELAY: Duration = Duration::from_millis(200);

/// Slice length used when waiting indefinitely for a trigger
pub const BLOCKING_READ_SLICE: Duration = Duration::from_secs(1);

/// Shortest wait for the next sync pulse, whatever the TR
pub const MIN_SYNC_TIMEOUT: Duration = Duration::from_secs(1);

/// Optional trigger mode: trigger on the configured slice/volume
pub const TRIGGER_FIXED: u16 = 0;

/// Optional trigger mode: trigger on every slice/volume
pub const TRIGGER_EVERY: u16 = 1;

/// Optional trigger mode: trigger on a random slice/volume
pub const TRIGGER_RANDOM: u16 = 2;

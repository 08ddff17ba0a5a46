use crate::constants::*;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Session parameters sent to the SyncBox during configuration.
///
/// Every numeric field must fit in four decimal digits (`0..=9999`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncBoxConfig {
    /// Number of volumes
    pub num_volumes: u16,
    /// Number of slices in each volume
    pub num_slices: u16,
    /// Slice number to trigger on
    pub trigger_slice: u16,
    /// How often to trigger on a volume
    pub trigger_volume: u16,
    /// Pulse length in ms (simulation mode only)
    pub pulse_length: u16,
    /// TR time in ms (simulation mode only)
    #[serde(alias = "TR_time")]
    pub tr_time: u16,
    /// One of [`TRIGGER_FIXED`], [`TRIGGER_EVERY`], [`TRIGGER_RANDOM`];
    /// the latter two override `trigger_slice`
    pub optional_trigger_slice: u16,
    /// Same as `optional_trigger_slice`, for volumes
    pub optional_trigger_volume: u16,
    /// Simulation mode when true, synchronization mode otherwise
    pub simulation: bool,
}

impl Default for SyncBoxConfig {
    fn default() -> Self {
        Self {
            num_volumes: 16,
            num_slices: 1,
            trigger_slice: 1,
            trigger_volume: 1,
            pulse_length: 100,
            tr_time: 3000,
            optional_trigger_slice: TRIGGER_FIXED,
            optional_trigger_volume: TRIGGER_FIXED,
            simulation: true,
        }
    }
}

impl SyncBoxConfig {
    /// Check that every field fits the device's 4-digit format
    pub fn validate(&self) -> Result<()> {
        crate::encoding::config_frame(self).map(|_| ())
    }

    /// Mode flag sent as the last configuration field
    pub fn mode_flag(&self) -> [u8; FIELD_WIDTH] {
        if self.simulation {
            SIMULATION_FLAG
        } else {
            SYNCHRONIZATION_FLAG
        }
    }

    /// Sync pulses the device emits over a whole session.
    ///
    /// One per volume, or one per slice when `optional_trigger_slice` is
    /// [`TRIGGER_EVERY`].
    pub fn expected_syncs(&self) -> u32 {
        let per_volume = if self.optional_trigger_slice == TRIGGER_EVERY {
            u32::from(self.num_slices.max(1))
        } else {
            1
        };
        u32::from(self.num_volumes) * per_volume
    }

    /// How long to wait for the next sync pulse: two TRs, never less than
    /// [`MIN_SYNC_TIMEOUT`]
    pub fn sync_timeout(&self) -> Duration {
        Duration::from_millis(u64::from(self.tr_time) * 2).max(MIN_SYNC_TIMEOUT)
    }
}

/// Handshake state of a SyncBox session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolState {
    /// Port released, no further commands possible
    Disconnected,
    /// Device answered the discovery probe and accepts commands
    ComputerMode,
    /// Parameters accepted, session idle
    Configured,
    /// Session started, triggers are flowing
    Running,
}

impl fmt::Display for ProtocolState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProtocolState::Disconnected => "disconnected",
            ProtocolState::ComputerMode => "in computer mode",
            ProtocolState::Configured => "configured",
            ProtocolState::Running => "running",
        };
        f.write_str(s)
    }
}

/// Event decoded from a single trigger byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerEvent {
    /// Scanner synchronization pulse ('s')
    Sync,
    /// Left thumb on ResponseGrips ('a')
    LeftThumb,
    /// Left index on ResponseGrips ('b')
    LeftIndex,
    /// Right index on ResponseGrips ('c')
    RightIndex,
    /// Right thumb on ResponseGrips ('d')
    RightThumb,
    /// Any other byte
    Unknown(u8),
}

impl TriggerEvent {
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            b's' => TriggerEvent::Sync,
            b'a' => TriggerEvent::LeftThumb,
            b'b' => TriggerEvent::LeftIndex,
            b'c' => TriggerEvent::RightIndex,
            b'd' => TriggerEvent::RightThumb,
            other => TriggerEvent::Unknown(other),
        }
    }

    /// Byte the device sends for this event
    pub fn as_byte(self) -> u8 {
        match self {
            TriggerEvent::Sync => b's',
            TriggerEvent::LeftThumb => b'a',
            TriggerEvent::LeftIndex => b'b',
            TriggerEvent::RightIndex => b'c',
            TriggerEvent::RightThumb => b'd',
            TriggerEvent::Unknown(byte) => byte,
        }
    }
}

impl fmt::Display for TriggerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerEvent::Sync => f.write_str("sync"),
            TriggerEvent::LeftThumb => f.write_str("left thumb"),
            TriggerEvent::LeftIndex => f.write_str("left index"),
            TriggerEvent::RightIndex => f.write_str("right index"),
            TriggerEvent::RightThumb => f.write_str("right thumb"),
            TriggerEvent::Unknown(byte) => write!(f, "unknown (0x{:02X})", byte),
        }
    }
}

/// Outcome of a single timeout-bounded trigger read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerRead {
    Event(TriggerEvent),
    /// No byte arrived before the timeout
    TimedOut,
}

impl TriggerRead {
    pub fn event(self) -> Option<TriggerEvent> {
        match self {
            TriggerRead::Event(event) => Some(event),
            TriggerRead::TimedOut => None,
        }
    }
}

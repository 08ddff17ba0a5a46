//! Fixed-width ASCII field encoding for the configuration frame.

use crate::constants::*;
use crate::error::{Result, SyncBoxError};
use crate::types::SyncBoxConfig;

/// Encode `value` as four zero-padded ASCII digits
pub fn encode_field(value: i64) -> Result<[u8; FIELD_WIDTH]> {
    encode_named("value", value)
}

fn encode_named(field: &'static str, value: i64) -> Result<[u8; FIELD_WIDTH]> {
    if !(0..=i64::from(MAX_FIELD_VALUE)).contains(&value) {
        return Err(SyncBoxError::ParameterOutOfRange { field, value });
    }

    let digits = format!("{:04}", value);
    let mut encoded = [0u8; FIELD_WIDTH];
    encoded.copy_from_slice(digits.as_bytes());
    Ok(encoded)
}

/// Parse four ASCII digits back into their value
pub fn decode_field(field: &[u8]) -> Option<u16> {
    if field.len() != FIELD_WIDTH || !field.iter().all(u8::is_ascii_digit) {
        return None;
    }
    field
        .iter()
        .try_fold(0u16, |acc, &digit| Some(acc * 10 + u16::from(digit - b'0')))
}

/// Build the 48-byte configuration frame in wire order.
///
/// Fails before producing any bytes if a field is out of range.
pub fn config_frame(config: &SyncBoxConfig) -> Result<[u8; CONFIG_FRAME_LEN]> {
    let value = |field: &'static str, v: u16| encode_named(field, i64::from(v));

    let fields: [[u8; FIELD_WIDTH]; CONFIG_FIELD_COUNT] = [
        DUMMY_FIELD,
        value("num_volumes", config.num_volumes)?,
        value("num_slices", config.num_slices)?,
        value("pulse_length", config.pulse_length)?,
        value("tr_time", config.tr_time)?,
        value("trigger_slice", config.trigger_slice)?,
        value("trigger_volume", config.trigger_volume)?,
        DUMMY_FIELD,
        DUMMY_FIELD,
        value("optional_trigger_slice", config.optional_trigger_slice)?,
        value("optional_trigger_volume", config.optional_trigger_volume)?,
        config.mode_flag(),
    ];

    let mut frame = [0u8; CONFIG_FRAME_LEN];
    for (chunk, field) in frame.chunks_exact_mut(FIELD_WIDTH).zip(fields.iter()) {
        chunk.copy_from_slice(field);
    }
    Ok(frame)
}

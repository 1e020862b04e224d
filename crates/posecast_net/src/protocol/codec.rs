//! # Fixed-Layout Codec
//!
//! Little-endian encode/decode for the two record kinds.
//!
//! The byte order is pinned to little-endian explicitly. Host-native
//! packing would only interoperate between machines of the same
//! endianness, so the layout names its byte order and a test pins it.
//!
//! Decode is all-or-nothing: a slice of any length other than the record's
//! exact packet size is rejected with
//! [`ExchangeError::MalformedPacket`](crate::ExchangeError::MalformedPacket),
//! never partially decoded.

use crate::error::{ExchangeError, ExchangeResult};

use super::records::{MotionRecord, TelemetryRecord};
use super::{MOTION_FIELD_COUNT, MOTION_PACKET_SIZE, TELEMETRY_FIELD_COUNT, TELEMETRY_PACKET_SIZE};

/// Encodes a motion record into its 76-byte wire form.
#[must_use]
pub fn encode_motion(record: &MotionRecord) -> [u8; MOTION_PACKET_SIZE] {
    let fields: [f32; MOTION_FIELD_COUNT] = bytemuck::cast(*record);
    let mut buffer = [0u8; MOTION_PACKET_SIZE];
    for (i, field) in fields.iter().enumerate() {
        buffer[i * 4..i * 4 + 4].copy_from_slice(&field.to_le_bytes());
    }
    buffer
}

/// Decodes a motion record from exactly 76 bytes.
///
/// # Errors
///
/// Returns [`ExchangeError::MalformedPacket`] if `bytes` is not exactly
/// [`MOTION_PACKET_SIZE`] long.
pub fn decode_motion(bytes: &[u8]) -> ExchangeResult<MotionRecord> {
    if bytes.len() != MOTION_PACKET_SIZE {
        return Err(ExchangeError::MalformedPacket {
            expected: MOTION_PACKET_SIZE,
            actual: bytes.len(),
        });
    }

    let mut fields = [0f32; MOTION_FIELD_COUNT];
    for (i, field) in fields.iter_mut().enumerate() {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(&bytes[i * 4..i * 4 + 4]);
        *field = f32::from_le_bytes(raw);
    }
    Ok(bytemuck::cast(fields))
}

/// Encodes a telemetry record into its 72-byte wire form.
#[must_use]
pub fn encode_telemetry(record: &TelemetryRecord) -> [u8; TELEMETRY_PACKET_SIZE] {
    let fields: [f64; TELEMETRY_FIELD_COUNT] = bytemuck::cast(*record);
    let mut buffer = [0u8; TELEMETRY_PACKET_SIZE];
    for (i, field) in fields.iter().enumerate() {
        buffer[i * 8..i * 8 + 8].copy_from_slice(&field.to_le_bytes());
    }
    buffer
}

/// Decodes a telemetry record from exactly 72 bytes.
///
/// # Errors
///
/// Returns [`ExchangeError::MalformedPacket`] if `bytes` is not exactly
/// [`TELEMETRY_PACKET_SIZE`] long.
pub fn decode_telemetry(bytes: &[u8]) -> ExchangeResult<TelemetryRecord> {
    if bytes.len() != TELEMETRY_PACKET_SIZE {
        return Err(ExchangeError::MalformedPacket {
            expected: TELEMETRY_PACKET_SIZE,
            actual: bytes.len(),
        });
    }

    let mut fields = [0f64; TELEMETRY_FIELD_COUNT];
    for (i, field) in fields.iter_mut().enumerate() {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&bytes[i * 8..i * 8 + 8]);
        *field = f64::from_le_bytes(raw);
    }
    Ok(bytemuck::cast(fields))
}

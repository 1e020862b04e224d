//! # Wire Protocol
//!
//! Fixed-layout binary records for the two packet kinds.
//!
//! ## Zero-Allocation Design
//!
//! Both record types are `Copy`, `#[repr(C)]` and padding-free so they can
//! be treated as flat field arrays. Encoding writes into a fixed on-stack
//! buffer; decoding reads from a borrowed slice. There is no length prefix
//! and no version tag - the receiver knows the exact expected byte length
//! a priori and rejects anything else.

mod codec;
mod records;

pub use codec::{decode_motion, decode_telemetry, encode_motion, encode_telemetry};
pub use records::{MotionRecord, TelemetryRecord};

/// Number of single-precision fields in a [`MotionRecord`].
pub const MOTION_FIELD_COUNT: usize = 19;

/// Number of double-precision fields in a [`TelemetryRecord`].
pub const TELEMETRY_FIELD_COUNT: usize = 9;

/// Exact byte length of an encoded [`MotionRecord`] (19 x 4 bytes).
pub const MOTION_PACKET_SIZE: usize = MOTION_FIELD_COUNT * 4;

/// Exact byte length of an encoded [`TelemetryRecord`] (9 x 8 bytes).
pub const TELEMETRY_PACKET_SIZE: usize = TELEMETRY_FIELD_COUNT * 8;

//! # Record Definitions
//!
//! The two records crossing process boundaries.
//!
//! [`MotionRecord`] is local-only: full vehicle dynamics at single
//! precision, consumed by exactly one process over loopback, no identity
//! field. [`TelemetryRecord`] is the cross-network record: identity, a
//! monotonic sequence, a send timestamp and the pose, all at double
//! precision.

use bytemuck::{Pod, Zeroable};
use posecast_core::{DVec3, Pose, Vec3};

/// Local motion feed record: 19 single-precision floats, 76 bytes.
///
/// Always reflects the most recent simulation tick. Staleness between
/// ticks is acceptable; there is no buffering contract.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct MotionRecord {
    /// World position.
    pub position: Vec3,
    /// Linear velocity.
    pub velocity: Vec3,
    /// Linear acceleration (gravity not included).
    pub acceleration: Vec3,
    /// Roll/pitch/yaw orientation ("euler angles").
    pub orientation: Vec3,
    /// Roll/pitch/yaw angular velocity.
    pub angular_rate: Vec3,
    /// Roll/pitch/yaw angular acceleration.
    pub angular_accel: Vec3,
    /// Collision intensity scalar (0.0 = no contact).
    pub collision: f32,
}

impl MotionRecord {
    /// Extracts the pose (position + orientation) widened to double
    /// precision, as the telemetry publisher broadcasts it.
    #[must_use]
    pub fn pose(&self) -> Pose {
        Pose::new(self.position.widen(), self.orientation.widen())
    }
}

/// Cross-network telemetry record: 9 double-precision floats, 72 bytes.
///
/// Fixed field order, no padding. The sequence number and timestamp are
/// carried as `f64` to keep the wire layout homogeneous; the sequence is
/// exactly representable up to 2^53 sends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct TelemetryRecord {
    /// Participant identifier, globally unique per exchange.
    pub participant_id: f64,
    /// Monotonic per-session sequence number: 0, 1, 2, ... never reset.
    pub sequence: f64,
    /// Send timestamp: microseconds within the current wall-clock hour.
    ///
    /// Wraps at every hour boundary; see the clock module for the latency
    /// caveat this implies.
    pub timestamp_micros: f64,
    /// World position.
    pub position: DVec3,
    /// Roll/pitch/yaw rotation, radians.
    pub rotation: DVec3,
}

impl TelemetryRecord {
    /// Builds a record from its constituents.
    #[must_use]
    pub fn new(participant_id: f64, sequence: u64, timestamp_micros: f64, pose: Pose) -> Self {
        // u64 -> f64 is lossless for any session that sends fewer than
        // 2^53 packets; at 1 kHz that is ~285k years.
        #[allow(clippy::cast_precision_loss)]
        Self {
            participant_id,
            sequence: sequence as f64,
            timestamp_micros,
            position: pose.position,
            rotation: pose.rotation,
        }
    }

    /// Returns the carried pose.
    #[must_use]
    pub const fn pose(&self) -> Pose {
        Pose::new(self.position, self.rotation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{MOTION_PACKET_SIZE, TELEMETRY_PACKET_SIZE};

    #[test]
    fn test_record_sizes_match_wire_constants() {
        assert_eq!(std::mem::size_of::<MotionRecord>(), MOTION_PACKET_SIZE);
        assert_eq!(std::mem::size_of::<TelemetryRecord>(), TELEMETRY_PACKET_SIZE);
    }

    #[test]
    fn test_motion_pose_widens() {
        let record = MotionRecord {
            position: Vec3::new(1.0, 2.0, 3.0),
            orientation: Vec3::new(0.1, 0.2, 0.3),
            ..Default::default()
        };
        let pose = record.pose();
        assert_eq!(pose.position, DVec3::new(1.0, 2.0, 3.0));
        assert!(pose.rotation.max_abs_diff(DVec3::new(
            f64::from(0.1f32),
            f64::from(0.2f32),
            f64::from(0.3f32)
        )) < 1e-12);
    }

    #[test]
    fn test_telemetry_sequence_widening() {
        let record = TelemetryRecord::new(5551.0, 42, 0.0, Pose::IDENTITY);
        assert!((record.sequence - 42.0).abs() < f64::EPSILON);
    }
}

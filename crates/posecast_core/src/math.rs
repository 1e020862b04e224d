//! # Math Types
//!
//! Minimal vector/pose types shared between the simulation side and the
//! wire records. Single precision (`Vec3`) for the local motion feed,
//! double precision (`DVec3`, `Pose`) for the cross-network telemetry.

use bytemuck::{Pod, Zeroable};

/// Single-precision 3-component vector.
///
/// Used for the local motion feed (position, velocity, acceleration,
/// orientation, angular rates).
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Vec3 {
    /// X component.
    pub x: f32,
    /// Y component.
    pub y: f32,
    /// Z component.
    pub z: f32,
}

impl Vec3 {
    /// Zero vector.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Creates a new vector.
    #[inline]
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Widens to double precision.
    #[inline]
    #[must_use]
    pub fn widen(self) -> DVec3 {
        DVec3::new(f64::from(self.x), f64::from(self.y), f64::from(self.z))
    }
}

/// Double-precision 3-component vector.
///
/// The telemetry wire format is all-`f64`, so peer poses are carried and
/// stored at double precision.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct DVec3 {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component.
    pub z: f64,
}

impl DVec3 {
    /// Zero vector.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Creates a new vector.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Component-wise absolute difference, reduced to the maximum.
    ///
    /// Used by tests to compare poses within a floating-point tolerance.
    #[inline]
    #[must_use]
    pub fn max_abs_diff(self, other: Self) -> f64 {
        let dx = (self.x - other.x).abs();
        let dy = (self.y - other.y).abs();
        let dz = (self.z - other.z).abs();
        dx.max(dy).max(dz)
    }
}

/// A participant pose: world position plus roll/pitch/yaw rotation in radians.
///
/// This is the unit the peer registry stores as `last_transform` and the
/// unit the actor spawner consumes for proxy placement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Pose {
    /// World position.
    pub position: DVec3,
    /// Rotation as roll/pitch/yaw euler angles, radians.
    pub rotation: DVec3,
}

impl Pose {
    /// Identity pose at the origin.
    pub const IDENTITY: Self = Self {
        position: DVec3::ZERO,
        rotation: DVec3::ZERO,
    };

    /// Creates a new pose.
    #[inline]
    #[must_use]
    pub const fn new(position: DVec3, rotation: DVec3) -> Self {
        Self { position, rotation }
    }

    /// Returns true if both position and rotation match `other` within
    /// `tolerance` on every component.
    #[must_use]
    pub fn approx_eq(self, other: Self, tolerance: f64) -> bool {
        self.position.max_abs_diff(other.position) <= tolerance
            && self.rotation.max_abs_diff(other.rotation) <= tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widen() {
        let v = Vec3::new(1.5, -2.0, 3.25);
        let d = v.widen();
        assert_eq!(d, DVec3::new(1.5, -2.0, 3.25));
    }

    #[test]
    fn test_max_abs_diff() {
        let a = DVec3::new(1.0, 2.0, 3.0);
        let b = DVec3::new(1.0, 2.5, 2.0);
        assert!((a.max_abs_diff(b) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pose_approx_eq() {
        let a = Pose::new(DVec3::new(1.0, 2.0, 3.0), DVec3::new(0.1, 0.2, 0.3));
        let mut b = a;
        b.position.x += 1e-9;
        assert!(a.approx_eq(b, 1e-6));
        b.rotation.z += 0.5;
        assert!(!a.approx_eq(b, 1e-6));
    }
}

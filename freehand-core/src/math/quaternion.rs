//! Rotation quaternion with two Euler decompositions
//!
//! Composition from Euler angles follows the tracking engines' convention:
//! rotate around Z, then X, then Y (`q = qy * qx * qz`).
//!
//! Decomposition back into angles comes in two flavours, and callers pick
//! deliberately:
//!
//! - [`Quaternion::euler_standard`]: roll/pitch/yaw style asin/atan2
//!   decomposition. Hand-orientation envelopes are authored and scored with
//!   this one, so stored references stay comparable.
//! - [`Quaternion::euler_engine`]: the exact inverse of the Z-X-Y composition,
//!   matching what engine inspectors display. Use it for presentation.
//!
//! Both return degrees wrapped into `[0, 360)`.

use core::f32::consts::FRAC_PI_2;
use core::ops::Mul;

use super::angles::{heading, positive_mod, to_degrees, to_radians};
use super::vector::Vector3;

/// Rotation stored as `(x, y, z, w)`
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Quaternion {
    /// Vector part, X
    pub x: f32,
    /// Vector part, Y
    pub y: f32,
    /// Vector part, Z
    pub z: f32,
    /// Scalar part
    pub w: f32,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quaternion {
    /// No rotation
    pub const IDENTITY: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    /// Create from raw components
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Compose from Euler angles in degrees (Z, then X, then Y)
    pub fn from_euler(angles: Vector3) -> Self {
        let (sx, cx) = libm::sincosf(to_radians(angles.x) * 0.5);
        let (sy, cy) = libm::sincosf(to_radians(angles.y) * 0.5);
        let (sz, cz) = libm::sincosf(to_radians(angles.z) * 0.5);

        let qx = Self::new(sx, 0.0, 0.0, cx);
        let qy = Self::new(0.0, sy, 0.0, cy);
        let qz = Self::new(0.0, 0.0, sz, cz);

        qy * qx * qz
    }

    /// Inverse rotation for unit quaternions
    #[inline]
    pub fn conjugate(self) -> Self {
        Self::new(-self.x, -self.y, -self.z, self.w)
    }

    /// Rotate a vector by this quaternion
    #[inline]
    pub fn rotate_vector(self, v: Vector3) -> Vector3 {
        v.rotate(self)
    }

    /// Standard asin/atan2 decomposition, degrees in `[0, 360)`
    ///
    /// At the pitch singularity (`|sin p| >= 1`) pitch saturates to ±90°.
    pub fn euler_standard(self) -> Vector3 {
        let Self { x, y, z, w } = self;

        let roll = libm::atan2f(2.0 * (w * x + y * z), 1.0 - 2.0 * (x * x + y * y));

        let sinp = 2.0 * (w * y - z * x);
        let pitch = if libm::fabsf(sinp) >= 1.0 {
            libm::copysignf(FRAC_PI_2, sinp)
        } else {
            libm::asinf(sinp)
        };

        let yaw = libm::atan2f(2.0 * (w * z + x * y), 1.0 - 2.0 * (y * y + z * z));

        wrap_degrees(roll, pitch, yaw)
    }

    /// Engine-convention decomposition (inverse of [`Quaternion::from_euler`]),
    /// degrees in `[0, 360)`
    pub fn euler_engine(self) -> Vector3 {
        let Self { x, y, z, w } = self;

        let sinx = (2.0 * (w * x - z * y)).clamp(-1.0, 1.0);
        let ex = libm::asinf(sinx);
        let ey = libm::atan2f(2.0 * (w * y + x * z), 1.0 - 2.0 * (y * y + x * x));
        let ez = libm::atan2f(2.0 * (w * z + x * y), 1.0 - 2.0 * (x * x + z * z));

        wrap_degrees(ex, ey, ez)
    }

    /// Re-express a world-space rotation relative to the horizontal look
    /// direction
    ///
    /// The look direction is flattened onto the ground plane and its heading
    /// is undone, so a hand held the same way in front of the user scores the
    /// same whichever way the user faces. A vertical or zero look direction
    /// has no heading and leaves the rotation unchanged.
    pub fn relative_to_look(self, look: Vector3) -> Self {
        let flat = Vector3::new(look.x, 0.0, look.z).normalized();
        if flat.is_zero() {
            return self;
        }

        let yaw = heading(flat.x, flat.z);
        Self::from_euler(Vector3::new(0.0, -yaw, 0.0)) * self
    }
}

fn wrap_degrees(x: f32, y: f32, z: f32) -> Vector3 {
    Vector3::new(
        positive_mod(to_degrees(x), 360.0),
        positive_mod(to_degrees(y), 360.0),
        positive_mod(to_degrees(z), 360.0),
    )
}

impl Mul for Quaternion {
    type Output = Self;

    /// Hamilton product; `a * b` applies `b` first, then `a`
    fn mul(self, rhs: Self) -> Self {
        let (a, b) = (self, rhs);
        Self::new(
            a.w * b.x + a.x * b.w + a.y * b.z - a.z * b.y,
            a.w * b.y - a.x * b.z + a.y * b.w + a.z * b.x,
            a.w * b.z + a.x * b.y - a.y * b.x + a.z * b.w,
            a.w * b.w - a.x * b.x - a.y * b.y - a.z * b.z,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        let d = libm::fabsf(a - b);
        d < 5e-2 || libm::fabsf(d - 360.0) < 5e-2
    }

    fn close_vec(a: Vector3, b: Vector3) -> bool {
        close(a.x, b.x) && close(a.y, b.y) && close(a.z, b.z)
    }

    #[test]
    fn identity_is_neutral() {
        let q = Quaternion::from_euler(Vector3::new(10.0, 20.0, 30.0));
        assert_eq!(Quaternion::IDENTITY * q, q);
        assert_eq!(q * Quaternion::IDENTITY, q);
        assert_eq!(Quaternion::from_euler(Vector3::ZERO), Quaternion::IDENTITY);
    }

    #[test]
    fn composition_order() {
        let a = Quaternion::from_euler(Vector3::new(0.0, 90.0, 0.0));
        let b = Quaternion::from_euler(Vector3::new(90.0, 0.0, 0.0));
        let v = Vector3::UP;

        // b first (up -> forward), then a (forward -> right)
        let r = (a * b).rotate_vector(v);
        assert!(r.distance(Vector3::RIGHT) < 1e-4);
    }

    #[test]
    fn standard_decomposition_single_axes() {
        for angles in [
            Vector3::new(30.0, 0.0, 0.0),
            Vector3::new(0.0, 45.0, 0.0),
            Vector3::new(0.0, 0.0, 300.0),
        ] {
            let q = Quaternion::from_euler(angles);
            assert!(close_vec(q.euler_standard(), angles), "{:?}", angles);
        }
    }

    #[test]
    fn standard_decomposition_pitch_saturates() {
        let q = Quaternion::from_euler(Vector3::new(0.0, 90.0, 0.0));
        assert!(close(q.euler_standard().y, 90.0));

        let q = Quaternion::from_euler(Vector3::new(0.0, -90.0, 0.0));
        assert!(close(q.euler_standard().y, 270.0));
    }

    #[test]
    fn engine_decomposition_inverts_composition() {
        let angles = Vector3::new(25.0, 220.0, 72.0);
        let q = Quaternion::from_euler(angles);
        assert!(close_vec(q.euler_engine(), angles));
    }

    #[test]
    fn decompositions_differ_for_compound_rotations() {
        let q = Quaternion::from_euler(Vector3::new(25.0, 220.0, 72.0));
        assert!(!close_vec(q.euler_standard(), q.euler_engine()));
    }

    #[test]
    fn look_relative_undoes_heading() {
        let hand = Quaternion::from_euler(Vector3::new(0.0, 30.0, 0.0));

        // Facing forward: unchanged
        let r = hand.relative_to_look(Vector3::FORWARD);
        assert!(close_vec(r.euler_standard(), Vector3::new(0.0, 30.0, 0.0)));

        // User turned 90° right, hand turned with them
        let turned = Quaternion::from_euler(Vector3::new(0.0, 120.0, 0.0));
        let r = turned.relative_to_look(Vector3::RIGHT);
        assert!(close_vec(r.euler_standard(), Vector3::new(0.0, 30.0, 0.0)));
    }

    #[test]
    fn look_relative_ignores_vertical_look() {
        let hand = Quaternion::from_euler(Vector3::new(10.0, 0.0, 0.0));
        assert_eq!(hand.relative_to_look(Vector3::UP), hand);
        assert_eq!(hand.relative_to_look(Vector3::ZERO), hand);
    }
}

//! Three-component vector for positions and directions

use core::ops::{Add, AddAssign, Mul, Neg, Sub};

use super::angles::to_radians;
use super::quaternion::Quaternion;

/// Position or direction in 3D space
///
/// Plain `Copy` value; every operation returns a new vector.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vector3 {
    /// Right
    pub x: f32,
    /// Up
    pub y: f32,
    /// Forward
    pub z: f32,
}

impl Vector3 {
    /// Origin
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    /// Unit scale
    pub const ONE: Self = Self::new(1.0, 1.0, 1.0);
    /// +X
    pub const RIGHT: Self = Self::new(1.0, 0.0, 0.0);
    /// +Y
    pub const UP: Self = Self::new(0.0, 1.0, 0.0);
    /// +Z
    pub const FORWARD: Self = Self::new(0.0, 0.0, 1.0);

    /// Create a vector from components
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Scalar product
    #[inline]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Vector product
    #[inline]
    pub fn cross(self, other: Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// Euclidean length
    #[inline]
    pub fn length(self) -> f32 {
        libm::sqrtf(self.dot(self))
    }

    /// Unit vector in the same direction; the zero vector stays zero
    pub fn normalized(self) -> Self {
        let len = self.length();
        if len == 0.0 {
            Self::ZERO
        } else {
            self * (1.0 / len)
        }
    }

    /// True if all components are exactly zero
    #[inline]
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }

    /// Euclidean distance to `other`
    #[inline]
    pub fn distance(self, other: Self) -> f32 {
        (self - other).length()
    }

    /// Component-wise multiply
    #[inline]
    pub fn scale(self, factors: Self) -> Self {
        Self::new(self.x * factors.x, self.y * factors.y, self.z * factors.z)
    }

    /// Midpoint between two points
    #[inline]
    pub fn midpoint(self, other: Self) -> Self {
        (self + other) * 0.5
    }

    /// Rotate by Euler angles in degrees: around Z, then X, then Y
    ///
    /// Same result as rotating by `Quaternion::from_euler(angles)`.
    pub fn rotate_euler(self, angles: Self) -> Self {
        let (sx, cx) = libm::sincosf(to_radians(angles.x));
        let (sy, cy) = libm::sincosf(to_radians(angles.y));
        let (sz, cz) = libm::sincosf(to_radians(angles.z));

        // Around Z
        let x1 = self.x * cz - self.y * sz;
        let y1 = self.y * cz + self.x * sz;
        let z1 = self.z;

        // Around X
        let y2 = y1 * cx - z1 * sx;
        let z2 = z1 * cx + y1 * sx;

        // Around Y
        Self::new(x1 * cy + z2 * sy, y2, z2 * cy - x1 * sy)
    }

    /// Rotate by a unit quaternion: `q * v * conj(q)`
    pub fn rotate(self, rotation: Quaternion) -> Self {
        let v = Quaternion::new(self.x, self.y, self.z, 0.0);
        let r = rotation * v * rotation.conjugate();
        Self::new(r.x, r.y, r.z)
    }
}

impl Add for Vector3 {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vector3 {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Vector3 {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Neg for Vector3 {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl Mul<f32> for Vector3 {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Mul<Vector3> for f32 {
    type Output = Vector3;

    #[inline]
    fn mul(self, rhs: Vector3) -> Vector3 {
        rhs * self
    }
}

//! Angle helpers shared by the vector and quaternion code

use core::f32::consts::PI;

/// Degrees to radians
#[inline]
pub fn to_radians(degrees: f32) -> f32 {
    degrees / 180.0 * PI
}

/// Radians to degrees
#[inline]
pub fn to_degrees(radians: f32) -> f32 {
    radians / PI * 180.0
}

/// Remainder of `value / modulus` shifted into `[0, modulus)`
///
/// `positive_mod(-30.0, 360.0) == 330.0`
#[inline]
pub fn positive_mod(value: f32, modulus: f32) -> f32 {
    let rem = libm::fmodf(value, modulus);
    if rem < 0.0 {
        rem + modulus
    } else {
        rem
    }
}

/// Heading of a horizontal direction in degrees, `[0, 360)`
///
/// Measured clockwise (seen from above) from +Z towards +X, which is the yaw
/// that rotates +Z onto the direction `(x, _, z)`.
pub fn heading(x: f32, z: f32) -> f32 {
    positive_mod(to_degrees(libm::atan2f(x, z)), 360.0)
}

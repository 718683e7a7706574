//! Look-direction-relative orthonormal basis
//!
//! Positional envelopes express "right", "up" and "forward" relative to where
//! the user is looking, with "right" kept horizontal. When the user looks
//! straight up or down, the horizontal part of the look direction vanishes
//! and "right" is undefined. [`BasisCache`] then supplies the last right
//! vector that was computed, so the frame does not jump between updates.
//!
//! The cache is explicit state owned by the caller and threaded through each
//! evaluation (`&mut BasisCache`), rather than hidden inside the envelope.

use super::vector::Vector3;

/// Last computed horizontal right vector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BasisCache {
    last_right: Vector3,
}

impl Default for BasisCache {
    fn default() -> Self {
        Self {
            last_right: Vector3::RIGHT,
        }
    }
}

impl BasisCache {
    /// Fresh cache, falling back to +X until a right vector is computed
    pub fn new() -> Self {
        Self::default()
    }

    /// The right vector the next degenerate look direction will reuse
    pub fn last_right(&self) -> Vector3 {
        self.last_right
    }
}

/// Orthonormal right/up/forward frame built from a look direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookBasis {
    /// Horizontal, perpendicular to forward
    pub right: Vector3,
    /// `-(right x forward)`
    pub up: Vector3,
    /// Normalized look direction
    pub forward: Vector3,
}

impl LookBasis {
    /// Build the frame for `look`, updating `cache` with the right vector used
    pub fn from_look(look: Vector3, cache: &mut BasisCache) -> Self {
        let forward = look.normalized();

        let right = if forward.x == 0.0 && forward.z == 0.0 {
            cache.last_right
        } else {
            Vector3::new(forward.z, 0.0, -forward.x).normalized()
        };
        cache.last_right = right;

        let up = (-right.cross(forward)).normalized();

        Self { right, up, forward }
    }

    /// Map frame-local coordinates into world space
    pub fn to_world(&self, local: Vector3) -> Vector3 {
        self.right * local.x + self.up * local.y + self.forward * local.z
    }

    /// Signed components of a world-space offset along right, up and forward
    pub fn project(&self, offset: Vector3) -> Vector3 {
        Vector3::new(
            offset.dot(self.right),
            offset.dot(self.up),
            offset.dot(self.forward),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vector3, b: Vector3) -> bool {
        a.distance(b) < 1e-5
    }

    #[test]
    fn forward_look_gives_world_axes() {
        let mut cache = BasisCache::new();
        let basis = LookBasis::from_look(Vector3::new(0.0, 0.0, 2.0), &mut cache);

        assert!(close(basis.right, Vector3::RIGHT));
        assert!(close(basis.up, Vector3::UP));
        assert!(close(basis.forward, Vector3::FORWARD));
    }

    #[test]
    fn right_stays_horizontal_when_looking_down() {
        let mut cache = BasisCache::new();
        let basis = LookBasis::from_look(Vector3::new(1.0, -1.0, 0.0), &mut cache);

        assert_eq!(basis.right.y, 0.0);
        assert!(close(basis.right, Vector3::new(0.0, 0.0, -1.0)));
        assert!(libm::fabsf(basis.up.dot(basis.forward)) < 1e-5);
        assert!(basis.up.y > 0.0);
    }

    #[test]
    fn vertical_look_reuses_last_right() {
        let mut cache = BasisCache::new();
        let first = LookBasis::from_look(Vector3::new(-1.0, 0.0, 0.0), &mut cache);
        assert!(close(cache.last_right(), first.right));

        let vertical = LookBasis::from_look(Vector3::UP, &mut cache);
        assert!(close(vertical.right, first.right));
        assert!(close(vertical.forward, Vector3::UP));
    }

    #[test]
    fn project_inverts_to_world() {
        let mut cache = BasisCache::new();
        let basis = LookBasis::from_look(Vector3::new(0.4, 0.2, -0.9), &mut cache);
        let local = Vector3::new(0.1, -0.3, 0.25);

        assert!(close(basis.project(basis.to_world(local)), local));
    }
}

//! Tolerance Curves for Fuzzy Pose Matching
//!
//! ## Overview
//!
//! Hand tracking is noisy and no two people hold a pose identically, so
//! matching is never a yes/no comparison. Instead every comparison yields a
//! confidence in `[0, 1]` through a [`Deviation`] curve:
//!
//! ```text
//! confidence
//!   1 ┤━━━━━━━━╮
//!     │        ╰╮          shape > 1: stays high longer
//!     │          ╲         shape = 1: linear
//!     │           ╲        shape < 1: drops faster
//!   0 ┤            ╰━━━━━━━━━
//!     └──────┬─────┬──────── |deviation|
//!            A     B
//! ```
//!
//! ## Directional Envelopes
//!
//! [`Deviation3D`] combines six curves, one per signed axis, around a
//! reference vector. A hand may be allowed to drift 10 cm forward but only
//! 2 cm sideways. The per-axis confidences are multiplied: one axis far out
//! of tolerance sinks the total, whatever the others say.
//!
//! Three evaluation modes:
//!
//! - **Positional**: the reference is an offset from an anchor point,
//!   expressed in the user's look frame (see [`LookBasis`]). Used for
//!   "right hand 20 cm in front of where it was" style constraints.
//! - **Simple**: the reference is an absolute target, compared per world axis.
//! - **Wrapped**: like simple, but axis values are circular with a period,
//!   so 355° and 5° are 10° apart. Used for hand orientation.

use crate::constants::{
    DEFAULT_DEVIATION_SHAPE, STANDARD_BONE_INNER_RADIUS_M, STANDARD_BONE_OUTER_RADIUS_M,
    STANDARD_BONE_SHAPE,
};
use crate::errors::{GestureError, GestureResult};
use crate::math::angles::positive_mod;
use crate::math::{BasisCache, LookBasis, Vector3};

/// Scalar tolerance curve
///
/// Invariants held by every setter: `0 <= A <= B`, `shape >= 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Deviation {
    inner: f32,
    outer: f32,
    shape: f32,
}

impl Default for Deviation {
    /// Exact match only: confidence 1 at zero deviation, 0 elsewhere
    fn default() -> Self {
        Self {
            inner: 0.0,
            outer: 0.0,
            shape: DEFAULT_DEVIATION_SHAPE,
        }
    }
}

impl Deviation {
    /// Linear curve from `inner` (A) to `outer` (B)
    pub fn new(inner: f32, outer: f32) -> Self {
        Self::with_shape(inner, outer, DEFAULT_DEVIATION_SHAPE)
    }

    /// Curve with an explicit shape exponent
    ///
    /// Out-of-range parameters are clamped, never rejected.
    pub fn with_shape(inner: f32, outer: f32, shape: f32) -> Self {
        let mut dev = Self::default();
        dev.set_inner(inner);
        dev.set_outer(outer);
        dev.set_shape(shape);
        dev
    }

    /// Per-bone tolerance used by the built-in skeleton models
    pub fn standard_bone() -> Self {
        Self::with_shape(
            STANDARD_BONE_INNER_RADIUS_M,
            STANDARD_BONE_OUTER_RADIUS_M,
            STANDARD_BONE_SHAPE,
        )
    }

    /// Inner radius A; confidence is 1 up to here
    pub fn inner(&self) -> f32 {
        self.inner
    }

    /// Outer radius B; confidence is 0 from here on
    pub fn outer(&self) -> f32 {
        self.outer
    }

    /// Shape exponent S
    pub fn shape(&self) -> f32 {
        self.shape
    }

    /// Set A, clamped to `>= 0`; raises B to A if needed
    pub fn set_inner(&mut self, inner: f32) {
        self.inner = inner.max(0.0);
        if self.outer < self.inner {
            self.outer = self.inner;
        }
    }

    /// Set B, clamped to `>= A`
    pub fn set_outer(&mut self, outer: f32) {
        self.outer = outer.max(self.inner);
    }

    /// Set S, clamped to `>= 0`
    pub fn set_shape(&mut self, shape: f32) {
        self.shape = shape.max(0.0);
    }

    /// Confidence for a signed deviation; only its magnitude matters
    pub fn confidence(&self, deviation: f32) -> f32 {
        let value = libm::fabsf(deviation);

        if value <= self.inner {
            return 1.0;
        }
        if value >= self.outer {
            return 0.0;
        }

        let ratio = (value - self.inner) / (self.outer - self.inner);
        let falloff = if self.shape == 1.0 {
            ratio
        } else {
            libm::powf(ratio, self.shape)
        };

        (1.0 - falloff).clamp(0.0, 1.0)
    }
}

/// One of the six signed axes of a [`Deviation3D`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Direction {
    /// -X
    NegX = 0,
    /// +X
    PosX = 1,
    /// -Y
    NegY = 2,
    /// +Y
    PosY = 3,
    /// -Z
    NegZ = 4,
    /// +Z
    PosZ = 5,
}

impl Direction {
    /// All directions in storage order
    pub const ALL: [Direction; 6] = [
        Direction::NegX,
        Direction::PosX,
        Direction::NegY,
        Direction::PosY,
        Direction::NegZ,
        Direction::PosZ,
    ];

    /// Towards the user's left
    pub const LEFT: Direction = Direction::NegX;
    /// Towards the user's right
    pub const RIGHT: Direction = Direction::PosX;
    /// Downwards
    pub const DOWN: Direction = Direction::NegY;
    /// Upwards
    pub const UP: Direction = Direction::PosY;
    /// Towards the user
    pub const BACK: Direction = Direction::NegZ;
    /// Along the look direction
    pub const FORWARD: Direction = Direction::PosZ;

    // Orientation envelopes store Euler angles as (x, y, z); in a left-handed
    // frame a positive X rotation pitches the nose down.

    /// Pitch up (negative X rotation)
    pub const POSITIVE_PITCH: Direction = Direction::NegX;
    /// Pitch down (positive X rotation)
    pub const NEGATIVE_PITCH: Direction = Direction::PosX;
    /// Yaw left (negative Y rotation)
    pub const NEGATIVE_YAW: Direction = Direction::NegY;
    /// Yaw right (positive Y rotation)
    pub const POSITIVE_YAW: Direction = Direction::PosY;
    /// Roll left (negative Z rotation)
    pub const POSITIVE_ROLL: Direction = Direction::NegZ;
    /// Roll right (positive Z rotation)
    pub const NEGATIVE_ROLL: Direction = Direction::PosZ;

    /// Storage index
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Six-way tolerance envelope around a reference vector
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Deviation3D {
    reference: Vector3,
    tolerances: [Deviation; 6],
}

impl Deviation3D {
    /// Same tolerance in every direction
    pub fn new(reference: Vector3, tolerance: Deviation) -> GestureResult<Self> {
        Self::with_tolerances(reference, [tolerance; 6])
    }

    /// Symmetric tolerance per axis
    pub fn per_axis(
        reference: Vector3,
        x: Deviation,
        y: Deviation,
        z: Deviation,
    ) -> GestureResult<Self> {
        Self::with_tolerances(reference, [x, x, y, y, z, z])
    }

    /// Independent tolerance per direction, indexed by [`Direction`]
    pub fn with_tolerances(reference: Vector3, tolerances: [Deviation; 6]) -> GestureResult<Self> {
        if reference.is_zero() {
            return Err(GestureError::ZeroReferenceVector);
        }
        Ok(Self {
            reference,
            tolerances,
        })
    }

    /// Envelope around a target orientation in degrees
    ///
    /// Zero angles are a valid target here, so no reference check applies.
    /// Meant for [`Deviation3D::wrapped_confidence`].
    pub fn orientation(angles: Vector3, tolerances: [Deviation; 6]) -> Self {
        Self {
            reference: angles,
            tolerances,
        }
    }

    /// Reference vector
    pub fn reference(&self) -> Vector3 {
        self.reference
    }

    /// Replace the reference vector
    pub fn set_reference(&mut self, reference: Vector3) -> GestureResult<()> {
        if reference.is_zero() {
            return Err(GestureError::ZeroReferenceVector);
        }
        self.reference = reference;
        Ok(())
    }

    /// Tolerance for one direction
    pub fn tolerance(&self, direction: Direction) -> &Deviation {
        &self.tolerances[direction.index()]
    }

    /// Replace the tolerance for one direction
    pub fn set_tolerance(&mut self, direction: Direction, tolerance: Deviation) {
        self.tolerances[direction.index()] = tolerance;
    }

    /// Confidence that `point` sits at `anchor + reference`, with the
    /// reference read in the frame of `look`
    ///
    /// A missing or zero look direction falls back to the reference vector
    /// itself as forward.
    pub fn positional_confidence(
        &self,
        anchor: Vector3,
        point: Vector3,
        look: Option<Vector3>,
        cache: &mut BasisCache,
    ) -> f32 {
        let look = match look {
            Some(dir) if !dir.is_zero() => dir,
            _ => self.reference,
        };

        let basis = LookBasis::from_look(look, cache);
        let target = anchor + basis.to_world(self.reference);
        let offset = basis.project(point - target);

        self.signed_axis(offset.x, Direction::NegX, Direction::PosX)
            * self.signed_axis(offset.y, Direction::NegY, Direction::PosY)
            * self.signed_axis(offset.z, Direction::NegZ, Direction::PosZ)
    }

    /// Per-world-axis comparison of an absolute point against the reference
    pub fn simple_confidence(&self, point: Vector3) -> f32 {
        let offset = point - self.reference;

        self.signed_axis(offset.x, Direction::NegX, Direction::PosX)
            * self.signed_axis(offset.y, Direction::NegY, Direction::PosY)
            * self.signed_axis(offset.z, Direction::NegZ, Direction::PosZ)
    }

    /// Like [`Deviation3D::simple_confidence`], for circular values
    ///
    /// Each axis is scored both ways round the circle and the better
    /// direction wins.
    pub fn wrapped_confidence(&self, point: Vector3, period: f32) -> f32 {
        let r = self.reference;

        self.wrapped_axis(r.x, point.x, period, Direction::NegX, Direction::PosX)
            * self.wrapped_axis(r.y, point.y, period, Direction::NegY, Direction::PosY)
            * self.wrapped_axis(r.z, point.z, period, Direction::NegZ, Direction::PosZ)
    }

    fn signed_axis(&self, offset: f32, neg: Direction, pos: Direction) -> f32 {
        if offset >= 0.0 {
            self.tolerance(pos).confidence(offset)
        } else {
            self.tolerance(neg).confidence(offset)
        }
    }

    fn wrapped_axis(
        &self,
        reference: f32,
        value: f32,
        period: f32,
        neg: Direction,
        pos: Direction,
    ) -> f32 {
        let below = self.tolerance(neg).confidence(positive_mod(reference - value, period));
        let above = self.tolerance(pos).confidence(positive_mod(value - reference, period));
        below.max(above)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Quaternion;

    fn close(a: f32, b: f32) -> bool {
        libm::fabsf(a - b) < 1e-4
    }

    #[test]
    fn linear_curve() {
        let dev = Deviation::new(0.0, 1.0);
        assert_eq!(dev.confidence(0.0), 1.0);
        assert!(close(dev.confidence(0.5), 0.5));
        assert!(close(dev.confidence(-0.5), 0.5));
        assert_eq!(dev.confidence(1.0), 0.0);
        assert_eq!(dev.confidence(1.5), 0.0);
    }

    #[test]
    fn plateau_inside_inner_radius() {
        let dev = Deviation::new(0.2, 0.6);
        assert_eq!(dev.confidence(0.2), 1.0);
        assert!(close(dev.confidence(0.4), 0.5));
    }

    #[test]
    fn shape_bends_the_curve() {
        let linear = Deviation::new(0.0, 1.0);
        let slow = Deviation::with_shape(0.0, 1.0, 2.0);
        let fast = Deviation::with_shape(0.0, 1.0, 0.5);

        assert!(close(slow.confidence(0.5), 0.75));
        assert!(slow.confidence(0.5) > linear.confidence(0.5));
        assert!(fast.confidence(0.5) < linear.confidence(0.5));
    }

    #[test]
    fn setters_clamp() {
        let mut dev = Deviation::with_shape(-1.0, -2.0, -3.0);
        assert_eq!((dev.inner(), dev.outer(), dev.shape()), (0.0, 0.0, 0.0));

        dev.set_outer(0.5);
        dev.set_inner(0.8);
        assert_eq!((dev.inner(), dev.outer()), (0.8, 0.8));

        dev.set_outer(0.1);
        assert_eq!(dev.outer(), 0.8);
    }

    #[test]
    fn zero_width_curve_is_a_step() {
        let dev = Deviation::new(0.3, 0.3);
        assert_eq!(dev.confidence(0.3), 1.0);
        assert_eq!(dev.confidence(0.300_01), 0.0);
    }

    #[test]
    fn zero_reference_rejected() {
        let err = Deviation3D::new(Vector3::ZERO, Deviation::new(0.0, 1.0));
        assert_eq!(err, Err(GestureError::ZeroReferenceVector));

        let mut env = Deviation3D::new(Vector3::FORWARD, Deviation::new(0.0, 1.0)).unwrap();
        assert_eq!(env.set_reference(Vector3::ZERO), Err(GestureError::ZeroReferenceVector));
        assert_eq!(env.reference(), Vector3::FORWARD);
    }

    #[test]
    fn direction_aliases_share_slots() {
        let mut env = Deviation3D::new(Vector3::UP, Deviation::default()).unwrap();
        env.set_tolerance(Direction::LEFT, Deviation::new(0.0, 0.3));

        assert_eq!(env.tolerance(Direction::NegX).outer(), 0.3);
        assert_eq!(env.tolerance(Direction::POSITIVE_PITCH).outer(), 0.3);
        assert_eq!(env.tolerance(Direction::RIGHT).outer(), 0.0);
    }

    #[test]
    fn positional_hit_and_miss() {
        // 10 cm in front of the anchor, 5 cm slack each way
        let env = Deviation3D::new(Vector3::new(0.0, 0.0, 0.1), Deviation::new(0.0, 0.05)).unwrap();
        let mut cache = BasisCache::new();
        let anchor = Vector3::new(1.0, 1.0, 1.0);

        let hit = env.positional_confidence(
            anchor,
            anchor + Vector3::new(0.0, 0.0, 0.1),
            Some(Vector3::FORWARD),
            &mut cache,
        );
        assert!(close(hit, 1.0));

        let half = env.positional_confidence(
            anchor,
            anchor + Vector3::new(0.025, 0.0, 0.1),
            Some(Vector3::FORWARD),
            &mut cache,
        );
        assert!(close(half, 0.5));

        let miss = env.positional_confidence(
            anchor,
            anchor + Vector3::new(0.0, 0.2, 0.1),
            Some(Vector3::FORWARD),
            &mut cache,
        );
        assert_eq!(miss, 0.0);
    }

    #[test]
    fn positional_follows_look_heading() {
        let env = Deviation3D::new(Vector3::new(0.0, 0.0, 0.1), Deviation::new(0.0, 0.05)).unwrap();
        let mut cache = BasisCache::new();

        // Looking right: "forward" now means +X
        let conf = env.positional_confidence(
            Vector3::ZERO,
            Vector3::new(0.1, 0.0, 0.0),
            Some(Vector3::RIGHT),
            &mut cache,
        );
        assert!(close(conf, 1.0));
    }

    #[test]
    fn positional_asymmetric_tolerances() {
        let mut tolerances = [Deviation::new(0.0, 0.1); 6];
        tolerances[Direction::LEFT.index()] = Deviation::new(0.0, 0.01);
        let env = Deviation3D::with_tolerances(Vector3::new(0.0, 0.0, 0.1), tolerances).unwrap();
        let mut cache = BasisCache::new();
        let look = Some(Vector3::FORWARD);

        let right = env.positional_confidence(Vector3::ZERO, Vector3::new(0.05, 0.0, 0.1), look, &mut cache);
        let left = env.positional_confidence(Vector3::ZERO, Vector3::new(-0.05, 0.0, 0.1), look, &mut cache);
        assert!(close(right, 0.5));
        assert_eq!(left, 0.0);
    }

    #[test]
    fn positional_without_look_uses_reference() {
        let env = Deviation3D::new(Vector3::new(0.0, 0.0, 0.1), Deviation::new(0.0, 0.05)).unwrap();
        let mut cache = BasisCache::new();

        let a = env.positional_confidence(Vector3::ZERO, Vector3::new(0.0, 0.0, 0.1), None, &mut cache);
        let b = env.positional_confidence(
            Vector3::ZERO,
            Vector3::new(0.0, 0.0, 0.1),
            Some(Vector3::ZERO),
            &mut cache,
        );
        assert!(close(a, 1.0));
        assert!(close(b, 1.0));
    }

    #[test]
    fn simple_is_world_aligned() {
        let env = Deviation3D::per_axis(
            Vector3::new(1.0, 2.0, 3.0),
            Deviation::new(0.0, 1.0),
            Deviation::new(0.0, 2.0),
            Deviation::new(0.0, 4.0),
        )
        .unwrap();

        assert_eq!(env.simple_confidence(Vector3::new(1.0, 2.0, 3.0)), 1.0);
        assert!(close(env.simple_confidence(Vector3::new(1.5, 2.0, 3.0)), 0.5));
        assert!(close(env.simple_confidence(Vector3::new(1.0, 1.0, 1.0)), 0.25));
    }

    #[test]
    fn wrapped_crosses_zero() {
        let env = Deviation3D::orientation(Vector3::new(0.0, 0.0, 350.0), [Deviation::new(0.0, 20.0); 6]);

        assert!(close(env.wrapped_confidence(Vector3::new(0.0, 0.0, 5.0), 360.0), 0.25));
        assert!(close(env.wrapped_confidence(Vector3::new(0.0, 0.0, 340.0), 360.0), 0.5));
        assert_eq!(env.wrapped_confidence(Vector3::new(0.0, 0.0, 180.0), 360.0), 0.0);
    }

    #[test]
    fn wrapped_accepts_hand_orientation() {
        let rotation = Quaternion::from_euler(Vector3::new(0.0, 30.0, 0.0));
        let env = Deviation3D::orientation(rotation.euler_standard(), [Deviation::new(0.0, 10.0); 6]);

        assert!(close(env.wrapped_confidence(rotation.euler_standard(), 360.0), 1.0));
    }
}

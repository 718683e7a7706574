//! Hand poses: reference poses to match against, and live tracked hands
//!
//! Bone positions are always stored in the local frame of the hand anchor,
//! so a reference pose matches wherever the hand is held. Live hands carry
//! the anchor transform alongside, for mapping working points into world
//! space.
//!
//! Every constructor validates the bone count against the active
//! [`SkeletonModel`]. A pose with the wrong number of bones is a
//! configuration error and never reaches the scoring code.

use alloc::vec::Vec;

use crate::constants::FULL_TURN_DEG;
use crate::deviation::{Deviation, Deviation3D};
use crate::errors::{GestureError, GestureResult};
use crate::math::{Quaternion, Vector3};
use crate::skeleton::SkeletonModel;

/// Which hand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Hand {
    /// Left hand
    Left,
    /// Right hand
    Right,
}

impl Hand {
    /// Lowercase name for logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Hand::Left => "left",
            Hand::Right => "right",
        }
    }
}

/// Bone positions in the hand anchor's local frame
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HandPose {
    bones: Vec<Vector3>,
}

impl HandPose {
    /// Validate `bones` against the skeleton
    pub fn new(bones: Vec<Vector3>, skeleton: &SkeletonModel) -> GestureResult<Self> {
        skeleton.check_bone_count(bones.len())?;
        Ok(Self { bones })
    }

    /// Bone positions in index order
    pub fn bones(&self) -> &[Vector3] {
        &self.bones
    }
}

/// Reference pose with per-bone importance and tolerance
///
/// Deserialization runs the same table checks as [`WeightedHandPose::new`],
/// minus the skeleton: weights and deviations must have one entry per bone.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "StoredPose"))]
pub struct WeightedHandPose {
    bones: Vec<Vector3>,
    weights: Vec<f32>,
    deviations: Vec<Deviation>,
    /// Target orientation (standard Euler angles, degrees) and its tolerance
    #[cfg_attr(feature = "serde", serde(default))]
    orientation: Option<Deviation3D>,
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct StoredPose {
    bones: Vec<Vector3>,
    weights: Vec<f32>,
    deviations: Vec<Deviation>,
    #[serde(default)]
    orientation: Option<Deviation3D>,
}

#[cfg(feature = "serde")]
impl TryFrom<StoredPose> for WeightedHandPose {
    type Error = GestureError;

    fn try_from(stored: StoredPose) -> GestureResult<Self> {
        let pose = Self {
            bones: stored.bones,
            weights: stored.weights.into_iter().map(clamp_weight).collect(),
            deviations: stored.deviations,
            orientation: stored.orientation,
        };
        if pose.bones.is_empty() {
            return Err(GestureError::BoneCountMismatch { expected: 1, actual: 0 });
        }
        pose.check_len(pose.weights.len())?;
        pose.check_len(pose.deviations.len())?;
        Ok(pose)
    }
}

impl WeightedHandPose {
    /// Pose using the skeleton's default weights and tolerances
    pub fn from_bones(bones: Vec<Vector3>, skeleton: &SkeletonModel) -> GestureResult<Self> {
        Self::new(
            bones,
            skeleton.default_weights().to_vec(),
            skeleton.default_deviations().to_vec(),
            skeleton,
        )
    }

    /// Pose with explicit weights and tolerances
    ///
    /// Weights are clamped to `[0, 1]`.
    pub fn new(
        bones: Vec<Vector3>,
        weights: Vec<f32>,
        deviations: Vec<Deviation>,
        skeleton: &SkeletonModel,
    ) -> GestureResult<Self> {
        skeleton.check_bone_count(bones.len())?;
        skeleton.check_bone_count(weights.len())?;
        skeleton.check_bone_count(deviations.len())?;

        Ok(Self {
            bones,
            weights: weights.into_iter().map(clamp_weight).collect(),
            deviations,
            orientation: None,
        })
    }

    /// Reference bone positions
    pub fn bones(&self) -> &[Vector3] {
        &self.bones
    }

    /// Per-bone importance
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Per-bone tolerance
    pub fn deviations(&self) -> &[Deviation] {
        &self.deviations
    }

    /// Orientation envelope, if any
    pub fn orientation(&self) -> Option<&Deviation3D> {
        self.orientation.as_ref()
    }

    /// Replace all weights; clamped to `[0, 1]`
    pub fn set_weights(&mut self, weights: &[f32]) -> GestureResult<()> {
        self.check_len(weights.len())?;
        for (dst, src) in self.weights.iter_mut().zip(weights) {
            *dst = clamp_weight(*src);
        }
        Ok(())
    }

    /// Replace all tolerances
    pub fn set_deviations(&mut self, deviations: Vec<Deviation>) -> GestureResult<()> {
        self.check_len(deviations.len())?;
        self.deviations = deviations;
        Ok(())
    }

    /// Require the hand to be held like `rotation`, same tolerance on every axis
    ///
    /// `rotation` is read in the look frame, not in world space: the live
    /// hand has the look direction's heading removed before it is compared,
    /// so yaw 0 means "pointing where the user looks". Pitch and roll are
    /// unaffected by the look direction. Without a look direction the
    /// envelope is not scored at all.
    pub fn set_hand_orientation(&mut self, rotation: Quaternion, tolerance: Deviation) {
        self.set_hand_orientation_with(rotation, [tolerance; 6]);
    }

    /// Require the hand to be held like `rotation`, tolerance per direction
    pub fn set_hand_orientation_with(&mut self, rotation: Quaternion, tolerances: [Deviation; 6]) {
        self.orientation = Some(Deviation3D::orientation(rotation.euler_standard(), tolerances));
    }

    /// Drop the orientation requirement
    pub fn clear_hand_orientation(&mut self) {
        self.orientation = None;
    }

    /// How well a live hand matches this pose, in `[0, 1]`
    ///
    /// Weighted mean of per-bone confidences, times the orientation
    /// confidence when both an envelope and a look direction are present.
    /// Zero total weight scores 0, as does any table whose length differs
    /// from the bone count.
    pub fn match_confidence(&self, live: &HandPoseInWorldSpace, look: Option<Vector3>) -> f32 {
        let len = self.bones.len();
        if live.bones.len() != len || self.weights.len() != len || self.deviations.len() != len {
            return 0.0;
        }

        let total_weight: f32 = self.weights.iter().sum();
        if total_weight <= 0.0 {
            return 0.0;
        }

        let weighted: f32 = self
            .bones
            .iter()
            .zip(&live.bones)
            .zip(self.weights.iter().zip(&self.deviations))
            .map(|((reference, actual), (weight, deviation))| {
                deviation.confidence(reference.distance(*actual)) * weight
            })
            .sum();
        let bones = weighted / total_weight;

        let orientation = match (&self.orientation, look) {
            (Some(envelope), Some(look)) => {
                let relative = live.rotation.relative_to_look(look);
                envelope.wrapped_confidence(relative.euler_standard(), FULL_TURN_DEG)
            }
            _ => 1.0,
        };

        (bones * orientation).clamp(0.0, 1.0)
    }

    fn check_len(&self, len: usize) -> GestureResult<()> {
        if len == self.bones.len() {
            Ok(())
        } else {
            log_warn!("rejected table of {} entries for a {}-bone pose", len, self.bones.len());
            Err(GestureError::BoneCountMismatch {
                expected: self.bones.len(),
                actual: len,
            })
        }
    }
}

fn clamp_weight(w: f32) -> f32 {
    w.clamp(0.0, 1.0)
}

/// Live tracked hand: local bones plus the anchor transform
#[derive(Debug, Clone, PartialEq)]
pub struct HandPoseInWorldSpace {
    bones: Vec<Vector3>,
    /// Anchor position in world space
    pub position: Vector3,
    /// Anchor rotation in world space
    pub rotation: Quaternion,
    /// Anchor scale
    pub scale: Vector3,
}

impl HandPoseInWorldSpace {
    /// Validate `bones` and attach the anchor transform
    pub fn new(
        bones: Vec<Vector3>,
        position: Vector3,
        rotation: Quaternion,
        scale: Vector3,
        skeleton: &SkeletonModel,
    ) -> GestureResult<Self> {
        skeleton.check_bone_count(bones.len())?;
        Ok(Self {
            bones,
            position,
            rotation,
            scale,
        })
    }

    /// Local bone positions
    pub fn bones(&self) -> &[Vector3] {
        &self.bones
    }

    /// Replace the bones for a new frame, keeping the skeleton contract
    pub fn set_bones(&mut self, bones: Vec<Vector3>, skeleton: &SkeletonModel) -> GestureResult<()> {
        skeleton.check_bone_count(bones.len())?;
        self.bones = bones;
        Ok(())
    }

    /// True if there is bone data to score
    pub fn is_tracked(&self) -> bool {
        !self.bones.is_empty()
    }

    /// Map a local point into world space: rotate, then scale, then translate
    pub fn local_to_world(&self, point: Vector3) -> Vector3 {
        self.position + point.rotate(self.rotation).scale(self.scale)
    }
}

/// One frame of hand-tracking input
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hands {
    /// Left hand, `None` when untracked
    pub left: Option<HandPoseInWorldSpace>,
    /// Right hand, `None` when untracked
    pub right: Option<HandPoseInWorldSpace>,
}

impl Hands {
    /// Frame with the given hands
    pub fn new(left: Option<HandPoseInWorldSpace>, right: Option<HandPoseInWorldSpace>) -> Self {
        Self { left, right }
    }

    /// Frame with no tracked hands
    pub fn none() -> Self {
        Self::default()
    }

    /// Tracked pose of one hand
    pub fn get(&self, hand: Hand) -> Option<&HandPoseInWorldSpace> {
        let pose = match hand {
            Hand::Left => self.left.as_ref(),
            Hand::Right => self.right.as_ref(),
        };
        pose.filter(|p| p.is_tracked())
    }
}

//! Per-platform hand skeleton metadata
//!
//! A skeleton model fixes how many bones every pose has, what they are
//! called, how much each one matters when scoring, and how far each may
//! stray. The runtime selects one model at construction and every pose
//! built afterwards is validated against it.
//!
//! Built-in models cover the three supported headsets. Weights favour the
//! finger tips, which carry most of a pose's shape, and ignore the wrist
//! and forearm, which only say where the hand is.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::deviation::Deviation;
use crate::errors::{GestureError, GestureResult};

/// Hardware platform the runtime is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Platform {
    /// Meta Quest hand tracking (24 bones)
    OculusQuest,
    /// Microsoft HoloLens 2 articulated hands (25 joints)
    HoloLens2,
    /// HTC Vive Focus hand tracking (21 joints)
    ViveFocus,
    /// Host-supplied skeleton model
    Custom,
}

impl Platform {
    /// Human-readable name
    pub const fn name(&self) -> &'static str {
        match self {
            Platform::OculusQuest => "oculus_quest",
            Platform::HoloLens2 => "hololens2",
            Platform::ViveFocus => "vive_focus",
            Platform::Custom => "custom",
        }
    }

    /// Resolve the skeleton model for this platform
    ///
    /// Built-in platforms ignore `custom`. `Custom` requires it.
    pub fn skeleton(self, custom: Option<SkeletonModel>) -> GestureResult<SkeletonModel> {
        match self {
            Platform::OculusQuest => Ok(SkeletonModel::oculus_quest()),
            Platform::HoloLens2 => Ok(SkeletonModel::hololens2()),
            Platform::ViveFocus => Ok(SkeletonModel::vive_focus()),
            Platform::Custom => custom.ok_or(GestureError::CustomSkeletonMissing),
        }
    }
}

const OCULUS_QUEST_BONES: [&str; 24] = [
    "Hand_WristRoot",
    "Hand_ForearmStub",
    "Hand_Thumb0",
    "Hand_Thumb1",
    "Hand_Thumb2",
    "Hand_Thumb3",
    "Hand_Index1",
    "Hand_Index2",
    "Hand_Index3",
    "Hand_Middle1",
    "Hand_Middle2",
    "Hand_Middle3",
    "Hand_Ring1",
    "Hand_Ring2",
    "Hand_Ring3",
    "Hand_Pinky0",
    "Hand_Pinky1",
    "Hand_Pinky2",
    "Hand_Pinky3",
    "Hand_ThumbTip",
    "Hand_IndexTip",
    "Hand_MiddleTip",
    "Hand_RingTip",
    "Hand_PinkyTip",
];

// Distal phalanges are left out in favour of the tips
const OCULUS_QUEST_WEIGHTS: [f32; 24] = [
    0.0, 0.0, 0.0, 0.5, 0.5, 0.0, 0.5, 0.5, 0.0, 0.5, 0.5, 0.0, 0.5, 0.5, 0.0, 0.4, 0.3, 0.3, 0.0,
    1.0, 1.0, 1.0, 1.0, 1.0,
];

const HOLOLENS2_BONES: [&str; 25] = [
    "Wrist",
    "Thumb Metacarpal",
    "Thumb Proximal",
    "Thumb Distal",
    "Thumb Tip",
    "Index Metacarpal",
    "Index Proximal",
    "Index Intermediate",
    "Index Distal",
    "Index Tip",
    "Middle Metacarpal",
    "Middle Proximal",
    "Middle Intermediate",
    "Middle Distal",
    "Middle Tip",
    "Ring Metacarpal",
    "Ring Proximal",
    "Ring Intermediate",
    "Ring Distal",
    "Ring Tip",
    "Little Metacarpal",
    "Little Proximal",
    "Little Intermediate",
    "Little Distal",
    "Little Tip",
];

const HOLOLENS2_WEIGHTS: [f32; 25] = [
    0.0, // wrist
    0.5, 0.7, 0.8, 1.0, // thumb
    0.5, 0.6, 0.7, 0.8, 1.0, // index
    0.5, 0.6, 0.7, 0.8, 1.0, // middle
    0.5, 0.6, 0.7, 0.8, 1.0, // ring
    0.5, 0.6, 0.7, 0.8, 1.0, // little
];

const VIVE_FOCUS_BONES: [&str; 21] = [
    "Wrist",
    "Thumb Metacarpal",
    "Thumb Proximal",
    "Thumb Distal",
    "Thumb Tip",
    "Index Proximal",
    "Index Intermediate",
    "Index Distal",
    "Index Tip",
    "Middle Proximal",
    "Middle Intermediate",
    "Middle Distal",
    "Middle Tip",
    "Ring Proximal",
    "Ring Intermediate",
    "Ring Distal",
    "Ring Tip",
    "Little Proximal",
    "Little Intermediate",
    "Little Distal",
    "Little Tip",
];

const VIVE_FOCUS_WEIGHTS: [f32; 21] = [
    0.0, // wrist
    0.5, 0.7, 0.8, 1.0, // thumb
    0.5, 0.7, 0.8, 1.0, // index
    0.5, 0.7, 0.8, 1.0, // middle
    0.5, 0.7, 0.8, 1.0, // ring
    0.5, 0.7, 0.8, 1.0, // little
];

/// Immutable description of a hand skeleton
///
/// Deserialized models go through [`SkeletonModel::custom`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "StoredSkeleton"))]
pub struct SkeletonModel {
    name: String,
    bone_names: Vec<String>,
    default_weights: Vec<f32>,
    default_deviations: Vec<Deviation>,
    standard_deviation: Deviation,
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct StoredSkeleton {
    name: String,
    bone_names: Vec<String>,
    default_weights: Vec<f32>,
    default_deviations: Vec<Deviation>,
    standard_deviation: Deviation,
}

#[cfg(feature = "serde")]
impl TryFrom<StoredSkeleton> for SkeletonModel {
    type Error = GestureError;

    fn try_from(stored: StoredSkeleton) -> GestureResult<Self> {
        Self::custom(
            stored.name,
            stored.bone_names,
            stored.default_weights,
            stored.default_deviations,
            stored.standard_deviation,
        )
    }
}

impl SkeletonModel {
    /// Meta Quest skeleton
    pub fn oculus_quest() -> Self {
        Self::builtin("oculus_quest", &OCULUS_QUEST_BONES, &OCULUS_QUEST_WEIGHTS)
    }

    /// HoloLens 2 skeleton
    pub fn hololens2() -> Self {
        Self::builtin("hololens2", &HOLOLENS2_BONES, &HOLOLENS2_WEIGHTS)
    }

    /// Vive Focus skeleton
    pub fn vive_focus() -> Self {
        Self::builtin("vive_focus", &VIVE_FOCUS_BONES, &VIVE_FOCUS_WEIGHTS)
    }

    fn builtin(name: &str, bones: &[&str], weights: &[f32]) -> Self {
        let standard = Deviation::standard_bone();
        Self {
            name: name.to_string(),
            bone_names: bones.iter().map(|b| b.to_string()).collect(),
            default_weights: weights.to_vec(),
            default_deviations: alloc::vec![standard; bones.len()],
            standard_deviation: standard,
        }
    }

    /// Host-supplied skeleton
    ///
    /// Weights are clamped to `[0, 1]`. All tables must have one entry per
    /// bone and there must be at least one bone.
    pub fn custom(
        name: impl Into<String>,
        bone_names: Vec<String>,
        default_weights: Vec<f32>,
        default_deviations: Vec<Deviation>,
        standard_deviation: Deviation,
    ) -> GestureResult<Self> {
        if bone_names.is_empty() {
            return Err(GestureError::InvalidSkeleton {
                reason: "skeleton has no bones",
            });
        }
        if default_weights.len() != bone_names.len() {
            return Err(GestureError::InvalidSkeleton {
                reason: "weight table length differs from bone count",
            });
        }
        if default_deviations.len() != bone_names.len() {
            return Err(GestureError::InvalidSkeleton {
                reason: "deviation table length differs from bone count",
            });
        }

        Ok(Self {
            name: name.into(),
            bone_names,
            default_weights: default_weights.into_iter().map(|w| w.clamp(0.0, 1.0)).collect(),
            default_deviations,
            standard_deviation,
        })
    }

    /// Model name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of bones every pose must have
    pub fn bone_count(&self) -> usize {
        self.bone_names.len()
    }

    /// Bone names in index order
    pub fn bone_names(&self) -> &[String] {
        &self.bone_names
    }

    /// Index of a bone by name
    pub fn bone_index(&self, name: &str) -> Option<usize> {
        self.bone_names.iter().position(|b| b == name)
    }

    /// Default importance per bone
    pub fn default_weights(&self) -> &[f32] {
        &self.default_weights
    }

    /// Default tolerance per bone
    pub fn default_deviations(&self) -> &[Deviation] {
        &self.default_deviations
    }

    /// Platform-wide tolerance the defaults were built from
    pub fn standard_deviation(&self) -> Deviation {
        self.standard_deviation
    }

    /// Fail unless `len` matches the bone count
    pub fn check_bone_count(&self, len: usize) -> GestureResult<()> {
        if len == self.bone_count() {
            Ok(())
        } else {
            Err(GestureError::BoneCountMismatch {
                expected: self.bone_count(),
                actual: len,
            })
        }
    }
}

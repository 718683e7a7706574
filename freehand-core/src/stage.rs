//! Gesture Stages and Stage Confidence
//!
//! ## Overview
//!
//! A stage is one recognizable hold within a gesture: a hand shape, a hand
//! position relative to the other hand or to where the hand was when the
//! previous stage started, or both. [`GestureStage::confidence`] turns a
//! frame of tracking data into a single score in `[0, 1]` plus the hand that
//! justified it.
//!
//! ## Decision Table
//!
//! Let `L`/`R` be each hand's best candidate-pose match, `PL`/`PR` the
//! relative-to-previous-start confidences and `H` the hand-to-hand
//! confidence. A constraint that is not configured contributes 1; one that
//! is configured but cannot be evaluated (hand untracked, no start snapshot)
//! contributes 0.
//!
//! ```text
//! poses?  two-handed  rule
//! ──────  ──────────  ─────────────────────────────────────────────────
//! none    no          both PL, PR configured: max(PL, PR)
//!                     exactly one configured:  min(PL, PR)
//!                     neither configured:      0
//! none    yes         H absent:  PL*PR if both configured, else 0
//!                     H present: H*PL*PR
//! some    no          max(L*PL, R*PR)
//! some    yes         min(L*PL, R*PR) * H
//! ```
//!
//! In one-handed stages a hand without candidate poses scores `L = 0`, so the
//! other hand decides. In two-handed stages it scores 1 while tracked, which
//! lets one hand hold a shape while the other only has to be present.
//! An untracked hand with candidate poses always scores 0.
//!
//! ## Working Points
//!
//! Each hand reduces to one world-space "working point" for relative
//! constraints, path recording and events: either a chosen bone, or the
//! centre of the bounding box around all bones.

use alloc::vec::Vec;

use crate::constants::{
    DEFAULT_DWELL_TIME_MS, DEFAULT_RECOGNITION_CONFIDENCE, DEFAULT_RELEASE_CONFIDENCE,
    DEFAULT_RELEASE_WAITING_TIME_MS,
};
use crate::deviation::Deviation3D;
use crate::math::{BasisCache, Vector3};
use crate::pose::{Hand, HandPoseInWorldSpace, Hands, WeightedHandPose};
use crate::time::Timestamp;

/// Kinds of transition rule a stage can arm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum TransitionCondition {
    /// Host calls [`GestureRuntime::give_cue`](crate::GestureRuntime::give_cue)
    Cue = 0,
    /// The target stage's own pose is recognized
    NextPoseRecognized = 1,
    /// The pose is let go after the release waiting time
    Release = 2,
    /// The stage starts holding
    Start = 3,
}

impl TransitionCondition {
    /// All conditions in storage order
    pub const ALL: [TransitionCondition; 4] = [
        TransitionCondition::Cue,
        TransitionCondition::NextPoseRecognized,
        TransitionCondition::Release,
        TransitionCondition::Start,
    ];

    /// Storage index
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Where an armed transition leads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StageTarget {
    /// Continue with this stage index; an index outside the gesture ends it
    Stage(usize),
    /// End the gesture
    End,
}

/// Hand selection for manipulation and path recording
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RelevantHand {
    /// Left hand only
    Left,
    /// Right hand only
    Right,
    /// Left if tracked, otherwise right
    Any,
    /// Midpoint of both hands
    Both,
}

/// Which hand met the recognition threshold in a confidence evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecognizedHand {
    /// Left hand matched (one-handed stage)
    Left,
    /// Right hand matched (one-handed stage)
    Right,
    /// Both hands matched (two-handed stage)
    Both,
    /// No hand reached the threshold, or the stage has no poses
    Neither,
}

impl RecognizedHand {
    /// Manipulation hand this recognition implies, if any
    pub fn manipulation_hand(self) -> Option<RelevantHand> {
        match self {
            RecognizedHand::Left => Some(RelevantHand::Left),
            RecognizedHand::Right => Some(RelevantHand::Right),
            RecognizedHand::Both => Some(RelevantHand::Both),
            RecognizedHand::Neither => None,
        }
    }
}

/// Point of a hand that stands for the whole hand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ManipulationPoint {
    /// A specific bone; out-of-range indices fall back to the bounding box
    Bone(usize),
    /// Centre of the axis-aligned box around all bones
    #[default]
    BoundingBoxCenter,
}

/// Result of scoring a stage against one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageConfidence {
    /// Combined confidence in `[0, 1]`
    pub score: f32,
    /// Hand that reached the recognition threshold
    pub recognized_hand: RecognizedHand,
}

impl StageConfidence {
    fn unattributed(score: f32) -> Self {
        Self {
            score: score.clamp(0.0, 1.0),
            recognized_hand: RecognizedHand::Neither,
        }
    }
}

/// One recognizable hold within a gesture
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GestureStage {
    /// Candidate left-hand poses; any one may match
    pub left_poses: Vec<WeightedHandPose>,
    /// Candidate right-hand poses; any one may match
    pub right_poses: Vec<WeightedHandPose>,
    /// Both hands must match instead of either
    pub two_handed: bool,
    /// Right working point relative to the left one, in the look frame
    pub relative_hands: Option<Deviation3D>,
    /// Left working point relative to where it was when the previous stage started
    pub relative_to_previous_left: Option<Deviation3D>,
    /// Right working point relative to where it was when the previous stage started
    pub relative_to_previous_right: Option<Deviation3D>,
    /// Record the manipulation hand's path while holding
    pub record_path: bool,
    /// Take the manipulation hand from whichever hand was recognized
    pub auto_manipulation_hand: bool,
    /// Hand that drives paths and downstream interaction
    pub manipulation_hand: RelevantHand,
    /// Working point of the left hand
    pub left_manipulation_point: ManipulationPoint,
    /// Working point of the right hand
    pub right_manipulation_point: ManipulationPoint,

    recognition_confidence: f32,
    release_confidence: f32,
    dwell_time_ms: u64,
    release_waiting_time_ms: u64,
    transitions: [Option<StageTarget>; 4],

    #[cfg_attr(feature = "serde", serde(skip))]
    recognition_time: Option<Timestamp>,
    #[cfg_attr(feature = "serde", serde(skip))]
    left_start: Option<Vector3>,
    #[cfg_attr(feature = "serde", serde(skip))]
    right_start: Option<Vector3>,
}

impl Default for GestureStage {
    fn default() -> Self {
        Self {
            left_poses: Vec::new(),
            right_poses: Vec::new(),
            two_handed: false,
            relative_hands: None,
            relative_to_previous_left: None,
            relative_to_previous_right: None,
            record_path: false,
            auto_manipulation_hand: true,
            manipulation_hand: RelevantHand::Right,
            left_manipulation_point: ManipulationPoint::default(),
            right_manipulation_point: ManipulationPoint::default(),
            recognition_confidence: DEFAULT_RECOGNITION_CONFIDENCE,
            release_confidence: DEFAULT_RELEASE_CONFIDENCE,
            dwell_time_ms: DEFAULT_DWELL_TIME_MS,
            release_waiting_time_ms: DEFAULT_RELEASE_WAITING_TIME_MS,
            transitions: [None; 4],
            recognition_time: None,
            left_start: None,
            right_start: None,
        }
    }
}

impl GestureStage {
    /// Stage with default thresholds and no constraints
    pub fn new() -> Self {
        Self::default()
    }

    /// Set recognition and release thresholds
    pub fn with_thresholds(mut self, recognition: f32, release: f32) -> Self {
        self.set_recognition_confidence(recognition);
        self.set_release_confidence(release);
        self
    }

    /// Set the dwell time
    pub fn with_dwell_time(mut self, ms: u64) -> Self {
        self.dwell_time_ms = ms;
        self
    }

    /// Set the release waiting time
    pub fn with_release_waiting_time(mut self, ms: u64) -> Self {
        self.release_waiting_time_ms = ms;
        self
    }

    /// Arm a transition rule
    pub fn with_transition(mut self, condition: TransitionCondition, target: StageTarget) -> Self {
        self.set_transition(condition, target);
        self
    }

    /// Recognition threshold
    pub fn recognition_confidence(&self) -> f32 {
        self.recognition_confidence
    }

    /// Set the recognition threshold, clamped to `[0, 1]`
    pub fn set_recognition_confidence(&mut self, value: f32) {
        self.recognition_confidence = value.clamp(0.0, 1.0);
    }

    /// Release threshold
    pub fn release_confidence(&self) -> f32 {
        self.release_confidence
    }

    /// Set the release threshold, clamped to `[0, 1]`
    pub fn set_release_confidence(&mut self, value: f32) {
        self.release_confidence = value.clamp(0.0, 1.0);
    }

    /// Hold time before the stage starts
    pub fn dwell_time_ms(&self) -> u64 {
        self.dwell_time_ms
    }

    /// Set the dwell time
    pub fn set_dwell_time_ms(&mut self, ms: u64) {
        self.dwell_time_ms = ms;
    }

    /// Extra hold time after dwell before the release rule is eligible
    pub fn release_waiting_time_ms(&self) -> u64 {
        self.release_waiting_time_ms
    }

    /// Set the release waiting time
    pub fn set_release_waiting_time_ms(&mut self, ms: u64) {
        self.release_waiting_time_ms = ms;
    }

    /// Arm a transition rule
    pub fn set_transition(&mut self, condition: TransitionCondition, target: StageTarget) {
        self.transitions[condition.index()] = Some(target);
    }

    /// Disarm a transition rule
    pub fn clear_transition(&mut self, condition: TransitionCondition) {
        self.transitions[condition.index()] = None;
    }

    /// Target of a rule, `None` if the rule is not armed
    pub fn transition(&self, condition: TransitionCondition) -> Option<StageTarget> {
        self.transitions[condition.index()]
    }

    /// When this stage was last recognized
    pub fn recognition_time(&self) -> Option<Timestamp> {
        self.recognition_time
    }

    pub(crate) fn set_recognition_time(&mut self, timestamp: Timestamp) {
        self.recognition_time = Some(timestamp);
    }

    /// Working points snapshotted when the previous stage started
    pub fn start_positions(&self) -> (Option<Vector3>, Option<Vector3>) {
        (self.left_start, self.right_start)
    }

    /// Overwrite the previous-stage start snapshot
    ///
    /// The runtime does this whenever a stage that can lead here starts.
    pub fn set_start_positions(&mut self, left: Option<Vector3>, right: Option<Vector3>) {
        self.left_start = left;
        self.right_start = right;
    }

    /// Take the manipulation hand from a recognition, if auto-selection is on
    ///
    /// A recognition that matched no hand leaves the current selection alone.
    pub fn adopt_recognized_hand(&mut self, recognized: RecognizedHand) {
        if !self.auto_manipulation_hand {
            return;
        }
        if let Some(hand) = recognized.manipulation_hand() {
            self.manipulation_hand = hand;
        }
    }

    /// World-space working point of a tracked hand
    pub fn working_point(&self, pose: &HandPoseInWorldSpace, hand: Hand) -> Option<Vector3> {
        let bones = pose.bones();
        if bones.is_empty() {
            return None;
        }

        let selection = match hand {
            Hand::Left => self.left_manipulation_point,
            Hand::Right => self.right_manipulation_point,
        };

        let local = match selection {
            ManipulationPoint::Bone(index) if index < bones.len() => bones[index],
            _ => bounding_box_center(bones),
        };

        Some(pose.local_to_world(local))
    }

    /// Working point of one hand of a frame, `None` if untracked
    pub fn hand_position(&self, hands: &Hands, hand: Hand) -> Option<Vector3> {
        hands.get(hand).and_then(|pose| self.working_point(pose, hand))
    }

    /// Point the manipulation hand selection resolves to
    pub fn manipulation_position(&self, hands: &Hands) -> Option<Vector3> {
        let left = self.hand_position(hands, Hand::Left);
        let right = self.hand_position(hands, Hand::Right);

        match self.manipulation_hand {
            RelevantHand::Left => left,
            RelevantHand::Right => right,
            RelevantHand::Both => match (left, right) {
                (Some(l), Some(r)) => Some(l.midpoint(r)),
                _ => None,
            },
            RelevantHand::Any => left.or(right),
        }
    }

    /// Score this stage against a frame
    ///
    /// `cache` stabilizes the look frame when the user looks straight up or
    /// down; pass the same cache on every call.
    pub fn confidence(
        &self,
        hands: &Hands,
        look: Option<Vector3>,
        cache: &mut BasisCache,
    ) -> StageConfidence {
        let left = hands.get(Hand::Left);
        let right = hands.get(Hand::Right);
        let left_point = left.and_then(|p| self.working_point(p, Hand::Left));
        let right_point = right.and_then(|p| self.working_point(p, Hand::Right));

        let prev_left = relative_confidence(
            self.relative_to_previous_left.as_ref(),
            self.left_start,
            left_point,
            look,
            cache,
        );
        let prev_right = relative_confidence(
            self.relative_to_previous_right.as_ref(),
            self.right_start,
            right_point,
            look,
            cache,
        );
        let between = relative_confidence(
            self.relative_hands.as_ref(),
            left_point,
            right_point,
            look,
            cache,
        );

        if self.left_poses.is_empty() && self.right_poses.is_empty() {
            return StageConfidence::unattributed(self.positional_only(prev_left, prev_right, between));
        }

        let left_match = self.hand_match(&self.left_poses, left, look);
        let right_match = self.hand_match(&self.right_poses, right, look);
        let recognized_hand = self.recognized_hand(left_match, right_match);

        let left_total = left_match * prev_left;
        let right_total = right_match * prev_right;
        let score = if self.two_handed {
            left_total.min(right_total) * between
        } else {
            left_total.max(right_total)
        };

        StageConfidence {
            score: score.clamp(0.0, 1.0),
            recognized_hand,
        }
    }

    fn positional_only(&self, prev_left: f32, prev_right: f32, between: f32) -> f32 {
        let has_left = self.relative_to_previous_left.is_some();
        let has_right = self.relative_to_previous_right.is_some();

        if !self.two_handed {
            return match (has_left, has_right) {
                (true, true) => prev_left.max(prev_right),
                (false, false) => 0.0,
                _ => prev_left.min(prev_right),
            };
        }

        if self.relative_hands.is_some() {
            between * prev_left * prev_right
        } else if has_left && has_right {
            prev_left * prev_right
        } else {
            0.0
        }
    }

    fn hand_match(
        &self,
        poses: &[WeightedHandPose],
        live: Option<&HandPoseInWorldSpace>,
        look: Option<Vector3>,
    ) -> f32 {
        match live {
            None => 0.0,
            Some(_) if poses.is_empty() => {
                if self.two_handed {
                    1.0
                } else {
                    0.0
                }
            }
            Some(live) => poses
                .iter()
                .map(|pose| pose.match_confidence(live, look))
                .fold(0.0, f32::max),
        }
    }

    fn recognized_hand(&self, left: f32, right: f32) -> RecognizedHand {
        let threshold = self.recognition_confidence;
        if self.two_handed {
            if left.min(right) >= threshold {
                RecognizedHand::Both
            } else {
                RecognizedHand::Neither
            }
        } else if left > right && left >= threshold {
            RecognizedHand::Left
        } else if right >= left && right >= threshold {
            RecognizedHand::Right
        } else {
            RecognizedHand::Neither
        }
    }
}

/// 1 if unconstrained, 0 if constrained but not evaluable
fn relative_confidence(
    envelope: Option<&Deviation3D>,
    anchor: Option<Vector3>,
    point: Option<Vector3>,
    look: Option<Vector3>,
    cache: &mut BasisCache,
) -> f32 {
    match (envelope, anchor, point) {
        (None, _, _) => 1.0,
        (Some(env), Some(anchor), Some(point)) => env.positional_confidence(anchor, point, look, cache),
        (Some(_), _, _) => 0.0,
    }
}

fn bounding_box_center(bones: &[Vector3]) -> Vector3 {
    let first = bones[0];
    let (min, max) = bones.iter().skip(1).fold((first, first), |(lo, hi), b| {
        (
            Vector3::new(lo.x.min(b.x), lo.y.min(b.y), lo.z.min(b.z)),
            Vector3::new(hi.x.max(b.x), hi.y.max(b.y), hi.z.max(b.z)),
        )
    });
    min.midpoint(max)
}

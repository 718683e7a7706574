//! Gesture definitions and their per-gesture runtime bookkeeping
//!
//! A gesture is a name and an ordered list of stages; stage 0 is always the
//! entry point. Transition targets are stage indices, so a gesture is a
//! plain value tree that clones and serializes without aliasing.
//!
//! While active, a gesture also tracks which stage is current, when it was
//! first recognized, and the path recorded so far. None of that survives
//! serialization.

use alloc::string::String;
use alloc::vec::Vec;

use crate::math::{BasisCache, Vector3};
use crate::path::Path;
use crate::pose::Hands;
use crate::stage::{GestureStage, StageConfidence, StageTarget, TransitionCondition};
use crate::time::{delta_ms, Timestamp};

/// A named sequence of stages
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Gesture {
    /// Name reported in events and used for lookup
    pub name: String,
    /// Stages; index 0 is the entry point
    pub stages: Vec<GestureStage>,
    #[cfg_attr(feature = "serde", serde(default))]
    path: Path,
    #[cfg_attr(feature = "serde", serde(skip))]
    current_stage: Option<usize>,
    #[cfg_attr(feature = "serde", serde(skip))]
    recognition_time: Option<Timestamp>,
}

impl Gesture {
    /// Gesture with no stages
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Gesture with the given stages
    pub fn with_stages(name: impl Into<String>, stages: Vec<GestureStage>) -> Self {
        Self {
            name: name.into(),
            stages,
            ..Self::default()
        }
    }

    /// Number of stages
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Index of the current stage, `None` while idle
    pub fn current_stage(&self) -> Option<usize> {
        self.current_stage
    }

    /// True while this gesture is being performed
    pub fn is_active(&self) -> bool {
        self.current_stage.is_some()
    }

    /// Current stage definition
    pub fn active_stage(&self) -> Option<&GestureStage> {
        self.current_stage.and_then(|i| self.stages.get(i))
    }

    /// When stage 0 was last recognized
    pub fn recognition_time(&self) -> Option<Timestamp> {
        self.recognition_time
    }

    /// Milliseconds since the current stage was recognized, 0 while idle
    pub fn millis_since_stage_recognized(&self, now: Timestamp) -> u64 {
        self.active_stage()
            .and_then(GestureStage::recognition_time)
            .map_or(0, |t| delta_ms(t, now))
    }

    /// Milliseconds since the gesture was recognized, 0 while idle
    pub fn millis_since_gesture_recognized(&self, now: Timestamp) -> u64 {
        match (self.is_active(), self.recognition_time) {
            (true, Some(t)) => delta_ms(t, now),
            _ => 0,
        }
    }

    /// Path recorded during the current activation
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Temporal resolution of the recorded path
    pub fn path_resolution_ms(&self) -> u64 {
        self.path.resolution_ms()
    }

    /// Change the temporal resolution of the recorded path
    pub fn set_path_resolution_ms(&mut self, resolution_ms: u64) {
        self.path.set_resolution_ms(resolution_ms);
    }

    /// Confidence of one stage, `None` if the index is out of range
    pub fn stage_confidence(
        &self,
        index: usize,
        hands: &Hands,
        look: Option<Vector3>,
        cache: &mut BasisCache,
    ) -> Option<StageConfidence> {
        self.stages.get(index).map(|stage| stage.confidence(hands, look, cache))
    }

    /// Confidence of the stage that would be entered next
    ///
    /// Stage 0 while idle. While active, the target of an armed
    /// NextPoseRecognized rule; 0 if there is none.
    pub fn next_stage_confidence(
        &self,
        hands: &Hands,
        look: Option<Vector3>,
        cache: &mut BasisCache,
    ) -> f32 {
        let next = match self.active_stage() {
            None => Some(0),
            Some(stage) => match stage.transition(TransitionCondition::NextPoseRecognized) {
                Some(StageTarget::Stage(target)) => Some(target),
                _ => None,
            },
        };

        next.and_then(|i| self.stage_confidence(i, hands, look, cache))
            .map_or(0.0, |c| c.score)
    }

    pub(crate) fn begin(&mut self, now: Timestamp) {
        self.recognition_time = Some(now);
        self.path.reset();
        self.enter_stage(0, now);
    }

    pub(crate) fn enter_stage(&mut self, index: usize, now: Timestamp) {
        self.current_stage = Some(index);
        if let Some(stage) = self.stages.get_mut(index) {
            stage.set_recognition_time(now);
        }
    }

    pub(crate) fn finish(&mut self) {
        self.current_stage = None;
        self.path.reset();
    }

    pub(crate) fn path_mut(&mut self) -> &mut Path {
        &mut self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deviation::Deviation;
    use crate::math::Quaternion;
    use crate::pose::{HandPoseInWorldSpace, WeightedHandPose};
    use crate::skeleton::SkeletonModel;
    use alloc::vec;

    fn skeleton() -> SkeletonModel {
        SkeletonModel::custom(
            "one",
            vec!["palm".into()],
            vec![1.0],
            vec![Deviation::new(0.0, 0.1)],
            Deviation::new(0.0, 0.1),
        )
        .unwrap()
    }

    fn stage_at(x: f32) -> GestureStage {
        let mut stage = GestureStage::new();
        stage
            .right_poses
            .push(WeightedHandPose::from_bones(vec![Vector3::new(x, 0.0, 0.0)], &skeleton()).unwrap());
        stage
    }

    fn right_at(x: f32) -> Hands {
        let live = HandPoseInWorldSpace::new(
            vec![Vector3::new(x, 0.0, 0.0)],
            Vector3::ZERO,
            Quaternion::IDENTITY,
            Vector3::ONE,
            &skeleton(),
        )
        .unwrap();
        Hands::new(None, Some(live))
    }

    #[test]
    fn idle_by_default() {
        let gesture = Gesture::new("wave");
        assert_eq!(gesture.name, "wave");
        assert_eq!(gesture.current_stage(), None);
        assert_eq!(gesture.millis_since_gesture_recognized(1_000), 0);
        assert_eq!(gesture.millis_since_stage_recognized(1_000), 0);
    }

    #[test]
    fn elapsed_times_follow_stages() {
        let mut gesture = Gesture::with_stages("pinch", vec![stage_at(0.0), stage_at(0.05)]);
        gesture.begin(100);
        gesture.enter_stage(1, 400);

        assert_eq!(gesture.current_stage(), Some(1));
        assert_eq!(gesture.millis_since_gesture_recognized(500), 400);
        assert_eq!(gesture.millis_since_stage_recognized(500), 100);

        gesture.finish();
        assert!(!gesture.is_active());
        assert_eq!(gesture.millis_since_gesture_recognized(500), 0);
    }

    #[test]
    fn next_stage_confidence_idle_and_active() {
        let mut first = stage_at(0.0);
        first.set_transition(TransitionCondition::NextPoseRecognized, StageTarget::Stage(1));
        let mut gesture = Gesture::with_stages("slide", vec![first, stage_at(0.05)]);
        let mut cache = BasisCache::new();

        // Idle scores stage 0
        assert_eq!(gesture.next_stage_confidence(&right_at(0.0), None, &mut cache), 1.0);

        gesture.begin(0);
        let conf = gesture.next_stage_confidence(&right_at(0.0), None, &mut cache);
        assert!(libm::fabsf(conf - 0.5) < 1e-5);

        gesture.stages[0].clear_transition(TransitionCondition::NextPoseRecognized);
        assert_eq!(gesture.next_stage_confidence(&right_at(0.05), None, &mut cache), 0.0);
    }

    #[test]
    fn path_resolution_round_trip() {
        let mut gesture = Gesture::new("draw");
        gesture.set_path_resolution_ms(50);
        assert_eq!(gesture.path_resolution_ms(), 50);

        gesture.path_mut().add_node(Vector3::ONE, 10);
        gesture.finish();
        assert!(gesture.path().is_empty());
        assert_eq!(gesture.path_resolution_ms(), 50);
    }
}

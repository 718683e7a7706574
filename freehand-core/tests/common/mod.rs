//! Common fixtures for integration tests
//!
//! This module provides:
//! - Synthetic Quest hand shapes, from open palm to closed fist
//! - Live hand construction at a world position
//! - An event recorder that attaches to every event kind
//! - A session driver that advances a manual clock between updates

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use freehand_core::{
    Gesture, GestureEvent, GestureEventKind, GestureRuntime, GestureStage, HandPoseInWorldSpace,
    Hands, ManualClock, Platform, Quaternion, SkeletonModel, Vector3, WeightedHandPose,
};

pub const QUEST_BONES: usize = 24;

const KNUCKLE_Z: f32 = 0.09;
const SEGMENTS: [f32; 3] = [0.04, 0.025, 0.02];
const FINGER_X: [f32; 4] = [0.03, 0.01, -0.01, -0.03];

/// Quest bone array for a hand whose fingers are bent by `curl`
///
/// `0.0` is a flat open hand pointing along +Z, `1.0` a fist. Each joint
/// bends by up to 80° toward -Y.
pub fn quest_hand(curl: f32) -> Vec<Vector3> {
    let mut bones = vec![Vector3::ZERO; QUEST_BONES];
    bones[0] = Vector3::ZERO;
    bones[1] = Vector3::new(0.0, 0.0, -0.05);

    let bend = curl * 80f32.to_radians();
    let chain = |x: f32| {
        let mut joints = [Vector3::new(x, 0.0, KNUCKLE_Z); 4];
        for k in 1..4 {
            let angle = bend * k as f32;
            let step = Vector3::new(0.0, -angle.sin(), angle.cos()) * SEGMENTS[k - 1];
            joints[k] = joints[k - 1] + step;
        }
        joints
    };

    // Index, middle, ring: knuckle and two joints, then the tip
    for (finger, first_bone) in [(0usize, 6usize), (1, 9), (2, 12)] {
        let joints = chain(FINGER_X[finger]);
        bones[first_bone..first_bone + 3].copy_from_slice(&joints[..3]);
        bones[20 + finger] = joints[3];
    }

    let pinky = chain(FINGER_X[3]);
    bones[15] = Vector3::new(FINGER_X[3], 0.0, 0.04);
    bones[16..19].copy_from_slice(&pinky[..3]);
    bones[23] = pinky[3];

    // Thumb folds across the palm
    let thumb_base = Vector3::new(0.04, 0.0, 0.02);
    bones[2] = thumb_base;
    for k in 0..3 {
        let t = (k + 1) as f32 * 0.025;
        bones[3 + k] = thumb_base + Vector3::new(0.01 - curl * t, 0.0, t);
    }
    bones[19] = bones[5] + Vector3::new(-curl * 0.02, 0.0, 0.02);

    bones
}

pub fn quest() -> SkeletonModel {
    SkeletonModel::oculus_quest()
}

pub fn quest_pose(curl: f32) -> WeightedHandPose {
    WeightedHandPose::from_bones(quest_hand(curl), &quest()).unwrap()
}

pub fn live(curl: f32, position: Vector3) -> HandPoseInWorldSpace {
    HandPoseInWorldSpace::new(
        quest_hand(curl),
        position,
        Quaternion::IDENTITY,
        Vector3::ONE,
        &quest(),
    )
    .unwrap()
}

pub fn right(curl: f32, position: Vector3) -> Hands {
    Hands::new(None, Some(live(curl, position)))
}

pub fn both(left_curl: f32, left_at: Vector3, right_curl: f32, right_at: Vector3) -> Hands {
    Hands::new(Some(live(left_curl, left_at)), Some(live(right_curl, right_at)))
}

/// Single right-hand stage matching a hand bent by `curl`
pub fn right_stage(curl: f32) -> GestureStage {
    let mut stage = GestureStage::new();
    stage.right_poses.push(quest_pose(curl));
    stage
}

/// Records every event the runtime dispatches
#[derive(Clone, Default)]
pub struct EventRecorder {
    events: Rc<RefCell<Vec<GestureEvent>>>,
}

impl EventRecorder {
    pub fn attach(runtime: &mut GestureRuntime) -> Self {
        let recorder = Self::default();
        for kind in GestureEventKind::ALL {
            let sink = Rc::clone(&recorder.events);
            runtime.add_listener(kind, move |event| sink.borrow_mut().push(event.clone()));
        }
        recorder
    }

    pub fn kinds(&self) -> Vec<GestureEventKind> {
        self.events.borrow().iter().map(|e| e.kind).collect()
    }

    pub fn events(&self) -> Vec<GestureEvent> {
        self.events.borrow().clone()
    }

    pub fn last(&self) -> Option<GestureEvent> {
        self.events.borrow().last().cloned()
    }

    pub fn count(&self, kind: GestureEventKind) -> usize {
        self.events.borrow().iter().filter(|e| e.kind == kind).count()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

/// Runtime on the Quest skeleton driven by a manual clock
pub struct Session {
    pub runtime: GestureRuntime,
    pub clock: ManualClock,
    pub recorder: EventRecorder,
}

impl Session {
    pub fn new(gestures: Vec<Gesture>) -> Self {
        let clock = ManualClock::new(10_000);
        let mut runtime =
            GestureRuntime::new(Platform::OculusQuest, None, Box::new(clock.clone())).unwrap();
        for gesture in gestures {
            runtime.add_gesture(gesture);
        }
        let recorder = EventRecorder::attach(&mut runtime);
        runtime.set_active(true);

        Self {
            runtime,
            clock,
            recorder,
        }
    }

    /// Advance the clock by `ms`, then feed one frame
    pub fn step(&mut self, ms: u64, hands: &Hands) {
        self.clock.advance(ms);
        self.runtime.update(hands, Some(Vector3::FORWARD));
    }

    /// Feed the same frame `frames` times, `ms` apart
    pub fn hold(&mut self, frames: usize, ms: u64, hands: &Hands) {
        for _ in 0..frames {
            self.step(ms, hands);
        }
    }
}

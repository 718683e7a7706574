//! Grab and Drag Example
//!
//! This example walks a two-stage gesture through a scripted sequence of
//! frames: an open hand is recognized, closing it grabs, moving it drags
//! (recording a path), and opening it again releases.
//!
//! ## What You'll Learn
//!
//! - Describing a custom skeleton
//! - Building stages with poses, dwell time and transition rules
//! - Driving the runtime with a manual clock
//! - Listening to global and stage-local events
//!
//! ## Running the Example
//!
//! ```bash
//! cargo run --example 01_grab_and_drag
//! ```

use freehand_core::{
    Deviation, Gesture, GestureEventKind, GestureRuntime, GestureStage, HandPoseInWorldSpace,
    Hands, ManualClock, Platform, Quaternion, SkeletonModel, StageTarget, TransitionCondition,
    Vector3, WeightedHandPose,
};

/// Palm plus four finger tips
fn skeleton() -> SkeletonModel {
    SkeletonModel::custom(
        "palm_and_tips",
        ["palm", "index", "middle", "ring", "little"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        vec![0.0, 1.0, 1.0, 1.0, 1.0],
        vec![Deviation::with_shape(0.0, 0.05, 2.0); 5],
        Deviation::with_shape(0.0, 0.05, 2.0),
    )
    .expect("tables have one entry per bone")
}

/// Tips `reach` metres in front of the palm
fn hand(reach: f32) -> Vec<Vector3> {
    let mut bones = vec![Vector3::ZERO];
    for x in [0.03, 0.01, -0.01, -0.03] {
        bones.push(Vector3::new(x, -0.02 * (1.0 - reach / 0.09), reach));
    }
    bones
}

fn main() {
    println!("FreeHand Grab and Drag Example");
    println!("==============================\n");

    let skeleton = skeleton();
    let open = WeightedHandPose::from_bones(hand(0.09), &skeleton).expect("five bones");
    let closed = WeightedHandPose::from_bones(hand(0.02), &skeleton).expect("five bones");

    // Stage 0: open hand, held for 100 ms, closes into stage 1
    let mut reach = GestureStage::new()
        .with_dwell_time(100)
        .with_transition(TransitionCondition::NextPoseRecognized, StageTarget::Stage(1));
    reach.right_poses.push(open);

    // Stage 1: closed hand, drag until it opens again
    let mut drag = GestureStage::new()
        .with_release_waiting_time(50)
        .with_transition(TransitionCondition::Release, StageTarget::End);
    drag.right_poses.push(closed);
    drag.record_path = true;

    let gesture = Gesture::with_stages("grab_and_drag", vec![reach, drag]);

    let clock = ManualClock::new(0);
    let mut runtime = GestureRuntime::new(
        Platform::Custom,
        Some(skeleton.clone()),
        Box::new(clock.clone()),
    )
    .expect("custom skeleton supplied");
    let index = runtime.add_gesture(gesture);

    for kind in GestureEventKind::ALL {
        runtime.add_listener(kind, |event| {
            if event.kind != GestureEventKind::Holding && event.kind != GestureEventKind::Dwelling {
                println!(
                    "  [{:>5}ms] {:<16} stage {} of '{}'",
                    event.millis_since_gesture,
                    event.kind.name(),
                    event.stage_index,
                    event.gesture_name
                );
            }
        });
    }
    runtime
        .add_stage_listener(index, 1, GestureEventKind::Released, |event| {
            println!("\nDragged along {} samples:", event.path.len());
            for node in event.path.nodes() {
                println!(
                    "  +{:>4}ms  x={:+.2} y={:+.2} z={:+.2}",
                    node.offset_ms, node.position.x, node.position.y, node.position.z
                );
            }
        })
        .expect("gesture and stage exist");
    runtime.set_active(true);

    println!("Frames:");
    let frame = |reach: f32, x: f32| {
        let live = HandPoseInWorldSpace::new(
            hand(reach),
            Vector3::new(x, 1.2, 0.4),
            Quaternion::IDENTITY,
            Vector3::ONE,
            &skeleton,
        )
        .expect("five bones");
        Hands::new(None, Some(live))
    };

    // Open hand, held past the dwell time
    for _ in 0..8 {
        runtime.update(&frame(0.09, 0.0), Some(Vector3::FORWARD));
        clock.advance(20);
    }
    // Close and drag to the right
    for step in 0..15 {
        runtime.update(&frame(0.02, step as f32 * 0.02), Some(Vector3::FORWARD));
        clock.advance(20);
    }
    // Let go
    for _ in 0..5 {
        runtime.update(&frame(0.09, 0.3), Some(Vector3::FORWARD));
        clock.advance(20);
    }

    println!("\nActive gesture afterwards: {:?}", runtime.active_gesture_index());
}

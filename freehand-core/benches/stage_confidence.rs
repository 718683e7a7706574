//! Per-frame hot path benchmarks using Criterion.
//!
//! Benchmarks cover:
//! - Single-pose stage confidence on the Quest skeleton
//! - Stages with several candidate poses and an orientation envelope
//! - Two-handed stages with a hand-to-hand envelope
//! - A full runtime update across many idle gestures
//!
//! Run with: `cargo bench`

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use freehand_core::{
    BasisCache, Deviation, Deviation3D, FixedTime, Gesture, GestureRuntime, GestureStage,
    HandPoseInWorldSpace, Hands, Platform, Quaternion, SkeletonModel, Vector3, WeightedHandPose,
};
use std::hint::black_box;

// ============================================================================
// Fixtures
// ============================================================================

/// Deterministic 24-bone hand; `variant` shifts every bone a little.
fn bones(variant: usize) -> Vec<Vector3> {
    (0..24)
        .map(|i| {
            let t = i as f32 * 0.37 + variant as f32 * 0.11;
            Vector3::new(t.sin() * 0.05, t.cos() * 0.03, 0.02 + (i % 5) as f32 * 0.02)
        })
        .collect()
}

fn live(variant: usize, position: Vector3) -> HandPoseInWorldSpace {
    HandPoseInWorldSpace::new(
        bones(variant),
        position,
        Quaternion::from_euler(Vector3::new(10.0, 30.0, 5.0)),
        Vector3::ONE,
        &SkeletonModel::oculus_quest(),
    )
    .unwrap()
}

fn stage_with(candidates: usize) -> GestureStage {
    let skeleton = SkeletonModel::oculus_quest();
    let mut stage = GestureStage::new();
    for variant in 0..candidates {
        let mut pose = WeightedHandPose::from_bones(bones(variant), &skeleton).unwrap();
        pose.set_hand_orientation(Quaternion::IDENTITY, Deviation::new(10.0, 60.0));
        stage.right_poses.push(pose);
    }
    stage
}

// ============================================================================
// Benchmarks
// ============================================================================

fn bench_single_hand(c: &mut Criterion) {
    let mut group = c.benchmark_group("stage_confidence");
    let hands = Hands::new(None, Some(live(0, Vector3::ZERO)));
    let look = Some(Vector3::FORWARD);

    for candidates in [1, 4, 16] {
        let stage = stage_with(candidates);
        group.bench_with_input(BenchmarkId::new("candidates", candidates), &stage, |b, stage| {
            let mut cache = BasisCache::new();
            b.iter(|| black_box(stage.confidence(black_box(&hands), look, &mut cache)))
        });
    }

    group.finish();
}

fn bench_two_handed(c: &mut Criterion) {
    let skeleton = SkeletonModel::oculus_quest();
    let mut stage = GestureStage::new();
    stage.two_handed = true;
    stage.left_poses.push(WeightedHandPose::from_bones(bones(1), &skeleton).unwrap());
    stage.right_poses.push(WeightedHandPose::from_bones(bones(0), &skeleton).unwrap());
    stage.relative_hands =
        Some(Deviation3D::new(Vector3::new(0.3, 0.0, 0.0), Deviation::new(0.02, 0.1)).unwrap());

    let hands = Hands::new(
        Some(live(1, Vector3::new(-0.15, 1.2, 0.3))),
        Some(live(0, Vector3::new(0.15, 1.2, 0.3))),
    );

    c.bench_function("two_handed_confidence", |b| {
        let mut cache = BasisCache::new();
        b.iter(|| black_box(stage.confidence(black_box(&hands), Some(Vector3::FORWARD), &mut cache)))
    });
}

fn bench_runtime_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("runtime_update");
    // Nothing matches, so every update scores stage 0 of every gesture
    let hands = Hands::new(None, Some(live(7, Vector3::ZERO)));

    for gestures in [1, 10, 50] {
        let mut runtime =
            GestureRuntime::new(Platform::OculusQuest, None, Box::new(FixedTime::new(0))).unwrap();
        for g in 0..gestures {
            let mut stage = stage_with(1);
            stage.set_recognition_confidence(1.0);
            runtime.add_gesture(Gesture::with_stages(format!("gesture_{}", g), vec![stage]));
        }
        runtime.set_active(true);

        group.bench_function(BenchmarkId::new("idle_gestures", gestures), |b| {
            b.iter(|| runtime.update(black_box(&hands), Some(Vector3::FORWARD)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_single_hand, bench_two_handed, bench_runtime_update);
criterion_main!(benches);

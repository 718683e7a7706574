//! Core recognition runtime for FreeHand
//!
//! Recognizes free-hand gestures from streamed skeletal hand-tracking data.
//! The host feeds one [`Hands`] snapshot per frame into a [`GestureRuntime`],
//! which scores every configured gesture, tracks the active stage through
//! its dwell and hold phases, and reports progress through listeners.
//!
//! Key constraints:
//! - Single-threaded, synchronous; one `update` call per frame
//! - No I/O in the core; gesture definitions are built in memory
//! - Builds without `std` (with `alloc`) for standalone headsets
//!
//! ```no_run
//! use freehand_core::{
//!     Gesture, GestureEventKind, GestureRuntime, GestureStage, Hands, Platform,
//!     SkeletonModel, WeightedHandPose,
//! };
//!
//! let skeleton = SkeletonModel::oculus_quest();
//! let fist = WeightedHandPose::from_bones(vec![Default::default(); 24], &skeleton)?;
//!
//! let mut stage = GestureStage::new();
//! stage.right_poses.push(fist);
//! let mut gesture = Gesture::new("grab");
//! gesture.stages.push(stage);
//!
//! let mut runtime = GestureRuntime::with_system_clock(Platform::OculusQuest, None)?;
//! runtime.add_gesture(gesture);
//! runtime.add_listener(GestureEventKind::Start, |event| {
//!     println!("{} started", event.gesture_name);
//! });
//! runtime.set_active(true);
//!
//! // Once per frame
//! runtime.update(&Hands::none(), None);
//! # Ok::<(), freehand_core::GestureError>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

extern crate alloc;

#[macro_use]
mod macros;

pub mod constants;
pub mod deviation;
pub mod errors;
pub mod events;
pub mod gesture;
pub mod math;
pub mod path;
pub mod pose;
pub mod runtime;
pub mod skeleton;
pub mod stage;
pub mod time;

// Public API
pub use deviation::{Deviation, Deviation3D, Direction};
pub use errors::{GestureError, GestureResult};
pub use events::{GestureEvent, GestureEventKind, Listener, ListenerId};
pub use gesture::Gesture;
pub use math::{BasisCache, LookBasis, Quaternion, Vector3};
pub use path::{Path, PathNode};
pub use pose::{Hand, HandPose, HandPoseInWorldSpace, Hands, WeightedHandPose};
pub use runtime::GestureRuntime;
pub use skeleton::{Platform, SkeletonModel};
pub use stage::{
    GestureStage, ManipulationPoint, RecognizedHand, RelevantHand, StageConfidence, StageTarget,
    TransitionCondition,
};
pub use time::{FixedTime, ManualClock, TimeSource, Timestamp};
#[cfg(feature = "std")]
pub use time::SystemTime;

/// Crate version, as recorded in Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Error Types for Gesture Configuration Failures
//!
//! ## Design Philosophy
//!
//! Only configuration mistakes are errors. They surface at construction time
//! (building a pose, selecting a platform, registering a stage listener) so a
//! broken gesture definition never reaches the per-frame path.
//!
//! Everything that can go wrong *during* recognition is policy instead:
//!
//! - An untracked hand scores 0 and its working point is `None`
//! - A transition rule targeting a stage that does not exist ends the gesture
//!
//! Errors carry only inline data and `&'static str` reasons, so they are
//! `Copy` and cheap to return from constructors.
//!
//! ## Error Handling Strategy
//!
//! ```rust
//! use freehand_core::{GestureError, SkeletonModel, WeightedHandPose, Vector3};
//!
//! let skeleton = SkeletonModel::hololens2();
//! match WeightedHandPose::from_bones(vec![Vector3::ZERO; 24], &skeleton) {
//!     Ok(_) => unreachable!(),
//!     Err(GestureError::BoneCountMismatch { expected, actual }) => {
//!         assert_eq!((expected, actual), (25, 24));
//!     }
//!     Err(_) => unreachable!(),
//! }
//! ```

use thiserror_no_std::Error;

/// Result type for gesture configuration operations
pub type GestureResult<T> = Result<T, GestureError>;

/// Configuration errors raised while building gestures or the runtime
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureError {
    /// Bone, weight or deviation array has the wrong length for the skeleton
    #[error("Expected {expected} bones, got {actual}")]
    BoneCountMismatch {
        /// Bone count of the active skeleton model
        expected: usize,
        /// Length of the array that was supplied
        actual: usize,
    },

    /// `Platform::Custom` was selected without a skeleton model
    #[error("Custom platform requires a skeleton model")]
    CustomSkeletonMissing,

    /// A positional envelope was built around a zero-length reference vector
    #[error("Reference vector must not be zero")]
    ZeroReferenceVector,

    /// A custom skeleton model is internally inconsistent
    #[error("Invalid skeleton model: {reason}")]
    InvalidSkeleton {
        /// Which table is wrong
        reason: &'static str,
    },

    /// Gesture index does not exist in the runtime
    #[error("Gesture {index} out of range (have {count})")]
    GestureIndexOutOfRange {
        /// Requested gesture index
        index: usize,
        /// Number of registered gestures
        count: usize,
    },

    /// Stage index does not exist in the gesture
    #[error("Stage {index} out of range (have {count})")]
    StageIndexOutOfRange {
        /// Requested stage index
        index: usize,
        /// Number of stages in the gesture
        count: usize,
    },
}

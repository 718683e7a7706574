//! Default values for gesture recognition
//!
//! Every tunable the runtime falls back to is named here. Units are part of
//! the name: `_MS` for milliseconds, `_M` for metres, `_DEG` for degrees.

// ===== STAGE THRESHOLDS =====

/// Confidence a stage must reach (inclusive) to count as recognized.
pub const DEFAULT_RECOGNITION_CONFIDENCE: f32 = 0.95;

/// Confidence at or below which a held stage counts as released.
///
/// The gap to the recognition threshold is the hold hysteresis.
pub const DEFAULT_RELEASE_CONFIDENCE: f32 = 0.75;

/// Default dwell time before a recognized stage starts.
pub const DEFAULT_DWELL_TIME_MS: u64 = 0;

/// Default extra hold time before the release rule may fire.
pub const DEFAULT_RELEASE_WAITING_TIME_MS: u64 = 0;

// ===== DEVIATION CURVES =====

/// Linear fall-off between the inner and outer radius.
pub const DEFAULT_DEVIATION_SHAPE: f32 = 1.0;

/// Inner radius of the built-in per-bone tolerance (metres).
pub const STANDARD_BONE_INNER_RADIUS_M: f32 = 0.0;

/// Outer radius of the built-in per-bone tolerance (metres).
///
/// A bone 4 cm away from its reference position contributes nothing.
pub const STANDARD_BONE_OUTER_RADIUS_M: f32 = 0.04;

/// Shape of the built-in per-bone tolerance.
///
/// Quadratic keeps confidence high for small tracking jitter.
pub const STANDARD_BONE_SHAPE: f32 = 2.0;

// ===== ANGLES =====

/// Period used when comparing Euler angles.
pub const FULL_TURN_DEG: f32 = 360.0;

// ===== PATH RECORDING =====

/// Minimum spacing between two kept path samples.
pub const DEFAULT_PATH_RESOLUTION_MS: u64 = 25;

/// Initial capacity reserved for a recorded path.
pub const PATH_INITIAL_CAPACITY: usize = 40;

// ===== EVENTS =====

/// Hand distance reported when at least one hand is untracked.
pub const UNTRACKED_HAND_DISTANCE: f32 = f32::MAX;

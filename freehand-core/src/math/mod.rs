//! Geometry kernel
//!
//! Vector algebra, quaternion rotation, Euler-angle conversion and the
//! look-direction-relative basis used by positional tolerance envelopes.
//!
//! ## Conventions
//!
//! - Left-handed, Y-up world: +X right, +Y up, +Z forward
//! - Angles at the public surface are in degrees; radians stay internal
//! - Euler angles compose as Z, then X, then Y
//!
//! All float math goes through `libm` so the kernel behaves identically with
//! and without `std`.

pub mod angles;
pub mod basis;
pub mod quaternion;
pub mod vector;

pub use basis::{BasisCache, LookBasis};
pub use quaternion::Quaternion;
pub use vector::Vector3;

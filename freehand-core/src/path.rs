//! Time-gated motion history of the manipulation hand
//!
//! While a stage is held, the runtime feeds the manipulation hand's working
//! point into the gesture's path every frame. Frames arrive far more often
//! than downstream consumers need, so a temporal resolution thins them out:
//! a sample is kept only if at least `resolution_ms` have passed since the
//! last kept one. The first sample is always kept and defines offset 0.

use alloc::vec::Vec;

use crate::constants::{DEFAULT_PATH_RESOLUTION_MS, PATH_INITIAL_CAPACITY};
use crate::math::Vector3;
use crate::time::{delta_ms, Timestamp};

/// One kept sample
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathNode {
    /// World-space position
    pub position: Vector3,
    /// Milliseconds since the first sample
    pub offset_ms: u64,
}

/// Recorded path
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Path {
    resolution_ms: u64,
    #[cfg_attr(feature = "serde", serde(skip))]
    nodes: Vec<PathNode>,
    #[cfg_attr(feature = "serde", serde(skip))]
    begin: Option<Timestamp>,
}

impl Default for Path {
    fn default() -> Self {
        Self::with_resolution(DEFAULT_PATH_RESOLUTION_MS)
    }
}

impl Path {
    /// Empty path at the default resolution
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty path keeping at most one sample per `resolution_ms`
    pub fn with_resolution(resolution_ms: u64) -> Self {
        Self {
            resolution_ms,
            nodes: Vec::with_capacity(PATH_INITIAL_CAPACITY),
            begin: None,
        }
    }

    /// Minimum spacing between kept samples
    pub fn resolution_ms(&self) -> u64 {
        self.resolution_ms
    }

    /// Change the spacing; applies to samples added from now on
    pub fn set_resolution_ms(&mut self, resolution_ms: u64) {
        self.resolution_ms = resolution_ms;
    }

    /// Offer a sample; returns whether it was kept
    pub fn add_node(&mut self, position: Vector3, timestamp: Timestamp) -> bool {
        let Some(begin) = self.begin else {
            self.begin = Some(timestamp);
            self.nodes.push(PathNode {
                position,
                offset_ms: 0,
            });
            return true;
        };

        let offset_ms = delta_ms(begin, timestamp);
        let last = self.nodes.last().map_or(0, |n| n.offset_ms);
        if offset_ms.saturating_sub(last) < self.resolution_ms {
            log_trace!("path sample at +{}ms dropped (last kept +{}ms)", offset_ms, last);
            return false;
        }

        self.nodes.push(PathNode { position, offset_ms });
        true
    }

    /// Kept samples in recording order
    pub fn nodes(&self) -> &[PathNode] {
        &self.nodes
    }

    /// Number of kept samples
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Timestamp of the first sample
    pub fn begin_time(&self) -> Option<Timestamp> {
        self.begin
    }

    /// Offset of the last kept sample
    pub fn duration_ms(&self) -> u64 {
        self.nodes.last().map_or(0, |n| n.offset_ms)
    }

    /// Forget all samples, keeping the resolution
    pub fn reset(&mut self) {
        self.nodes.clear();
        self.begin = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_sample_defines_origin() {
        let mut path = Path::new();
        assert!(path.add_node(Vector3::UP, 5_000));

        assert_eq!(path.begin_time(), Some(5_000));
        assert_eq!(path.nodes()[0], PathNode { position: Vector3::UP, offset_ms: 0 });
    }

    #[test]
    fn resolution_gates_samples() {
        let mut path = Path::with_resolution(25);
        assert!(path.add_node(Vector3::ZERO, 1_000));
        assert!(!path.add_node(Vector3::ZERO, 1_010));
        assert!(!path.add_node(Vector3::ZERO, 1_024));
        assert!(path.add_node(Vector3::ZERO, 1_025));
        assert!(!path.add_node(Vector3::ZERO, 1_049));
        assert!(path.add_node(Vector3::ZERO, 1_060));

        let offsets: Vec<u64> = path.nodes().iter().map(|n| n.offset_ms).collect();
        assert_eq!(offsets, [0, 25, 60]);
        assert_eq!(path.duration_ms(), 60);
    }

    #[test]
    fn zero_resolution_keeps_everything() {
        let mut path = Path::with_resolution(0);
        for _ in 0..3 {
            assert!(path.add_node(Vector3::ONE, 10));
        }
        assert_eq!(path.len(), 3);
    }

    #[test]
    fn reset_keeps_resolution() {
        let mut path = Path::with_resolution(100);
        path.add_node(Vector3::ZERO, 0);
        path.add_node(Vector3::ZERO, 200);
        path.reset();

        assert!(path.is_empty());
        assert_eq!(path.begin_time(), None);
        assert_eq!(path.resolution_ms(), 100);

        assert!(path.add_node(Vector3::ONE, 250));
        assert_eq!(path.nodes()[0].offset_ms, 0);
    }

    #[test]
    fn default_resolution() {
        assert_eq!(Path::default().resolution_ms(), DEFAULT_PATH_RESOLUTION_MS);
    }
}

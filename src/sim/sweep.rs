//! Motion-gated sweep detection
//!
//! Each tick the blade sweeps a capsule between its endpoints. A slow
//! blade never queries the world, so a resting hand cannot cut.

use std::collections::HashSet;

use glam::Vec3;

use super::blade::BladeSegment;
use super::collider::Capsule;
use super::world::{EntityId, LayerMask, PhysicsQuery};

/// Raw contact reported by the physics world
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepHit {
    pub entity: EntityId,
    pub point: Vec3,
}

/// Query for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepQuery {
    pub segment: BladeSegment,
    pub radius: f32,
    pub velocity: Vec3,
    pub layers: LayerMask,
}

impl SweepQuery {
    pub fn capsule(&self) -> Capsule {
        Capsule::new(self.segment.start, self.segment.end, self.radius)
    }
}

/// A target that may be sliced this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliceCandidate {
    pub target: EntityId,
    pub hit_point: Vec3,
}

/// Speed-gated capsule sweep
#[derive(Debug, Clone, Copy)]
pub struct SweepDetector {
    pub min_cut_speed: f32,
}

impl SweepDetector {
    pub fn new(min_cut_speed: f32) -> Self {
        Self { min_cut_speed }
    }

    /// Whether the blade is moving fast enough to cut
    #[inline]
    pub fn is_cutting_speed(&self, velocity: Vec3) -> bool {
        velocity.length() >= self.min_cut_speed
    }

    /// Unique candidates along the sweep, in the order the world reported them
    pub fn detect(&self, query: &SweepQuery, physics: &impl PhysicsQuery) -> Vec<SliceCandidate> {
        if !self.is_cutting_speed(query.velocity) {
            return Vec::new();
        }

        let hits = physics.capsule_overlap(&query.capsule(), query.layers);
        let mut seen = HashSet::with_capacity(hits.len());
        let candidates: Vec<_> = hits
            .into_iter()
            .filter(|hit| seen.insert(hit.entity))
            .map(|hit| SliceCandidate {
                target: hit.entity,
                hit_point: hit.point,
            })
            .collect();

        if !candidates.is_empty() {
            log::debug!("Sweep hit {} sliceable bodies", candidates.len());
        }
        candidates
    }
}

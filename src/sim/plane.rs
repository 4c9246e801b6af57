//! Cutting plane derivation
//!
//! The plane contains the blade's sweep line and is oriented by the
//! instantaneous motion, so the cut follows the swing rather than a fixed
//! blade orientation.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::blade::BladeSegment;
use crate::consts::DEFAULT_PLANE_EPSILON;

/// Point + unit normal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CutPlane {
    pub point: Vec3,
    pub normal: Vec3,
}

impl CutPlane {
    /// Signed distance from the plane (positive on the normal side)
    #[inline]
    pub fn signed_distance(&self, p: Vec3) -> f32 {
        self.normal.dot(p - self.point)
    }
}

/// Derives a cut plane from blade trajectory and velocity
#[derive(Debug, Clone, Copy)]
pub struct CutPlaneSolver {
    /// Squared-magnitude cutoff below which the normal is undefined
    pub epsilon: f32,
}

impl Default for CutPlaneSolver {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_PLANE_EPSILON,
        }
    }
}

impl CutPlaneSolver {
    pub fn new(epsilon: f32) -> Self {
        Self { epsilon }
    }

    /// Plane through the blade tip, normal = trajectory x velocity
    ///
    /// Returns `None` when trajectory and velocity are (nearly) collinear.
    pub fn solve(&self, blade: &BladeSegment, velocity: Vec3) -> Option<CutPlane> {
        let normal = blade.trajectory().cross(velocity);
        if !(normal.length_squared() >= self.epsilon) {
            return None;
        }
        Some(CutPlane {
            point: blade.end,
            normal: normal.normalize(),
        })
    }
}

//! Blade sampling
//!
//! The blade is two tracked points. They are sampled once per tick and
//! never carried across ticks.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Blade endpoints sampled this tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BladeSegment {
    pub start: Vec3,
    pub end: Vec3,
}

impl BladeSegment {
    pub fn new(start: Vec3, end: Vec3) -> Self {
        Self { start, end }
    }

    /// Unnormalized trajectory from start to tip
    #[inline]
    pub fn trajectory(&self) -> Vec3 {
        self.end - self.start
    }

    /// Unit trajectory (zero for a collapsed blade)
    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.trajectory().normalize_or_zero()
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.trajectory().length()
    }
}

/// Supplies the blade's current velocity
///
/// Estimation (controller history, smoothing) happens outside this crate.
pub trait VelocitySource {
    fn estimate_velocity(&mut self) -> Vec3;
}

/// Constant velocity, for scripted blades
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedVelocity(pub Vec3);

impl VelocitySource for FixedVelocity {
    fn estimate_velocity(&mut self) -> Vec3 {
        self.0
    }
}

impl<F: FnMut() -> Vec3> VelocitySource for F {
    fn estimate_velocity(&mut self) -> Vec3 {
        self()
    }
}

//! Blade Slice - motion-gated slicing of rigid bodies
//!
//! Core modules:
//! - `sim`: Tick-driven slicing pipeline (sweep, cut plane, split, score)
//! - `settings`: Data-driven tuning of the blade and the scorer
//! - `audio`: Fire-and-forget audio sinks for the victory sequence
//! - `error`: Error taxonomy shared by the pipeline

pub mod audio;
pub mod error;
pub mod settings;
pub mod sim;

pub use error::{SettingsError, SliceError};
pub use settings::{AudioSettings, SliceSettings};

use glam::{Quat, Vec3};

/// Slicing configuration constants
pub mod consts {
    /// Fixed physics timestep (50 Hz, the usual fixed-update rate for VR rigs)
    pub const SIM_DT: f32 = 1.0 / 50.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Blade must move at least this fast (m/s) before anything is cut
    pub const DEFAULT_MIN_CUT_SPEED: f32 = 0.25;
    /// Radius of the capsule swept between the blade endpoints
    pub const DEFAULT_BLADE_RADIUS: f32 = 0.02;
    /// Impulse applied to each half after a cut
    pub const DEFAULT_CUT_FORCE: f32 = 2.0;
    /// Cuts needed to trigger the victory sequence
    pub const DEFAULT_TARGET_SCORE: u32 = 10;
    /// Below this squared magnitude the cut normal is undefined
    pub const DEFAULT_PLANE_EPSILON: f32 = 1e-4;

    /// Gravity applied by `SliceWorld::step`
    pub const GRAVITY: [f32; 3] = [0.0, -9.81, 0.0];
    /// Mass given to freshly cut halves
    pub const DEFAULT_HALF_MASS: f32 = 1.0;
}

/// Rigid placement of an entity in world space (no scale)
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            rotation: Quat::IDENTITY,
        }
    }

    /// Local point to world space
    #[inline]
    pub fn to_world(&self, local: Vec3) -> Vec3 {
        self.rotation * local + self.translation
    }

    /// World point to local space
    #[inline]
    pub fn to_local(&self, world: Vec3) -> Vec3 {
        self.rotation.inverse() * (world - self.translation)
    }

    /// World direction to local space
    #[inline]
    pub fn dir_to_local(&self, world_dir: Vec3) -> Vec3 {
        self.rotation.inverse() * world_dir
    }
}

/// Closest point to `p` on the segment `a`-`b`
#[inline]
pub fn closest_point_on_segment(p: Vec3, a: Vec3, b: Vec3) -> Vec3 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq < 1e-12 {
        return a; // Degenerate segment
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

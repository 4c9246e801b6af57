//! Blade and scoring settings
//!
//! Loaded from JSON; every field falls back to its default when absent.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::SettingsError;
use crate::sim::{ImpulseMode, LayerMask, MaterialId};

/// Volume model for the audio sinks
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Silence everything
    pub muted: bool,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }
}

/// Slicing session settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SliceSettings {
    // === Blade ===
    /// Minimum blade speed before the sweep runs at all
    pub min_cut_speed: f32,
    /// Radius of the sweep capsule
    pub blade_radius: f32,
    /// Layers the sweep may hit
    pub sliceable_layers: LayerMask,
    /// Squared-magnitude cutoff for the cut normal
    pub plane_epsilon: f32,

    // === Cut response ===
    /// Impulse magnitude given to each half
    pub cut_force: f32,
    /// How the impulse is directed
    pub impulse: ImpulseMode,
    /// Material for newly exposed cut faces
    pub cross_section_material: Option<MaterialId>,
    /// Gravity used when integrating bodies
    pub gravity: Vec3,

    // === Scoring ===
    /// Cuts needed for victory
    pub target_score: u32,
    /// Prefix of the score text
    pub score_label: String,

    // === Audio ===
    pub audio: AudioSettings,
}

impl Default for SliceSettings {
    fn default() -> Self {
        Self {
            min_cut_speed: DEFAULT_MIN_CUT_SPEED,
            blade_radius: DEFAULT_BLADE_RADIUS,
            sliceable_layers: LayerMask::SLICEABLE,
            plane_epsilon: DEFAULT_PLANE_EPSILON,

            cut_force: DEFAULT_CUT_FORCE,
            impulse: ImpulseMode::Directional,
            cross_section_material: None,
            gravity: Vec3::from_array(GRAVITY),

            target_score: DEFAULT_TARGET_SCORE,
            score_label: "Score: ".to_string(),

            audio: AudioSettings::default(),
        }
    }
}

impl SliceSettings {
    /// Parse settings from a JSON document and validate them
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.target_score == 0 {
            return Err(SettingsError::Invalid("target_score must be > 0".into()));
        }
        if !(self.min_cut_speed >= 0.0) {
            return Err(SettingsError::Invalid("min_cut_speed must be >= 0".into()));
        }
        if !(self.blade_radius >= 0.0) {
            return Err(SettingsError::Invalid("blade_radius must be >= 0".into()));
        }
        if !(self.cut_force >= 0.0) {
            return Err(SettingsError::Invalid("cut_force must be >= 0".into()));
        }
        if !(self.plane_epsilon > 0.0) {
            return Err(SettingsError::Invalid("plane_epsilon must be > 0".into()));
        }
        if let ImpulseMode::Explosion { radius } = self.impulse {
            if !(radius > 0.0) {
                return Err(SettingsError::Invalid(
                    "explosion radius must be > 0".into(),
                ));
            }
        }
        Ok(())
    }
}

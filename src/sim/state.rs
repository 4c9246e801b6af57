//! Session state
//!
//! Everything that lives for one play session: the world, the scorer and
//! the configured pipeline stages.

use super::executor::SliceExecutor;
use super::plane::CutPlaneSolver;
use super::score::ScoreTracker;
use super::sweep::SweepDetector;
use super::world::SliceWorld;
use crate::audio::AudioSink;
use crate::error::SettingsError;
use crate::settings::SliceSettings;

/// One play session
pub struct SliceSession {
    pub settings: SliceSettings,
    pub world: SliceWorld,
    pub score: ScoreTracker,
    pub detector: SweepDetector,
    pub solver: CutPlaneSolver,
    pub executor: SliceExecutor,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Played on every successful cut
    pub(crate) cut_audio: Option<Box<dyn AudioSink>>,
}

impl SliceSession {
    /// Session with an empty world and a collaborator-free score tracker
    ///
    /// Settings are validated first; out-of-range values never reach the
    /// pipeline.
    pub fn new(settings: SliceSettings) -> Result<Self, SettingsError> {
        settings.validate()?;
        let score = ScoreTracker::new(settings.target_score).with_label(settings.score_label.clone());
        Ok(Self {
            detector: SweepDetector::new(settings.min_cut_speed),
            solver: CutPlaneSolver::new(settings.plane_epsilon),
            executor: SliceExecutor::from_settings(&settings),
            settings,
            world: SliceWorld::new(),
            score,
            time_ticks: 0,
            cut_audio: None,
        })
    }

    /// Replace the score tracker (to wire display/audio collaborators)
    pub fn with_score_tracker(mut self, score: ScoreTracker) -> Self {
        self.score = score;
        self
    }

    pub fn with_world(mut self, world: SliceWorld) -> Self {
        self.world = world;
        self
    }

    pub fn with_cut_audio(mut self, audio: Box<dyn AudioSink>) -> Self {
        self.cut_audio = Some(audio);
        self
    }
}

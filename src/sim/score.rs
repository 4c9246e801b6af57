//! Score tracking and the one-shot victory sequence
//!
//! `ScoreTracker` is constructed once per session and handed to the
//! slicing pipeline through `ScoreSink`. Every collaborator is optional
//! and checked at its own call site.

use crate::audio::AudioSink;
use crate::error::SliceError;

/// Receives score events
pub trait ScoreSink {
    fn add_score(&mut self, delta: u32);
}

/// Accepts rendered text
pub trait TextSink {
    fn set_text(&mut self, text: &str);
}

/// Something that can be shown or hidden (panel, animation rig)
pub trait Activatable {
    fn set_active(&mut self, active: bool);
}

/// Scoring state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScorePhase {
    /// Counting toward the target
    Accumulating,
    /// Victory has fired; terminal for the session
    VictoryTriggered,
}

pub struct ScoreTracker {
    score: u32,
    target_score: u32,
    phase: ScorePhase,
    label: String,
    score_text: Option<Box<dyn TextSink>>,
    victory_panel: Option<Box<dyn Activatable>>,
    victory_animation: Option<Box<dyn Activatable>>,
    victory_audio: Option<Box<dyn AudioSink>>,
}

impl std::fmt::Debug for ScoreTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoreTracker")
            .field("score", &self.score)
            .field("target_score", &self.target_score)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

impl ScoreTracker {
    /// `target_score` of 0 is raised to 1
    pub fn new(target_score: u32) -> Self {
        Self {
            score: 0,
            target_score: target_score.max(1),
            phase: ScorePhase::Accumulating,
            label: "Score: ".to_string(),
            score_text: None,
            victory_panel: None,
            victory_animation: None,
            victory_audio: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_score_text(mut self, text: Box<dyn TextSink>) -> Self {
        self.score_text = Some(text);
        self
    }

    /// Victory panel starts hidden
    pub fn with_victory_panel(mut self, mut panel: Box<dyn Activatable>) -> Self {
        panel.set_active(false);
        self.victory_panel = Some(panel);
        self
    }

    /// Victory animation starts hidden after one warm-up cycle
    pub fn with_victory_animation(mut self, mut animation: Box<dyn Activatable>) -> Self {
        animation.set_active(false);
        // Warm-up: upload meshes/textures before they are needed
        animation.set_active(true);
        animation.set_active(false);
        self.victory_animation = Some(animation);
        self
    }

    pub fn with_victory_audio(mut self, audio: Box<dyn AudioSink>) -> Self {
        self.victory_audio = Some(audio);
        self
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn target_score(&self) -> u32 {
        self.target_score
    }

    pub fn phase(&self) -> ScorePhase {
        self.phase
    }

    pub fn victory_triggered(&self) -> bool {
        self.phase == ScorePhase::VictoryTriggered
    }

    /// Text shown on the score display
    pub fn score_label(&self) -> String {
        format!("{}{}", self.label, self.score)
    }

    /// Add to the score; fires victory the first time the target is reached
    ///
    /// Returns `true` only on the call that fired victory.
    pub fn add_score(&mut self, delta: u32) -> bool {
        self.score = self.score.saturating_add(delta);

        let text = self.score_label();
        match self.score_text.as_mut() {
            Some(display) => display.set_text(&text),
            None => log::debug!("{} (no score display)", text),
        }

        if self.phase == ScorePhase::Accumulating && self.score >= self.target_score {
            self.phase = ScorePhase::VictoryTriggered;
            self.trigger_victory();
            return true;
        }
        false
    }

    /// Panel, animation and audio, each attempted independently
    fn trigger_victory(&mut self) {
        log::info!("Victory! {} / {}", self.score, self.target_score);

        match self.victory_panel.as_mut() {
            Some(panel) => panel.set_active(true),
            None => log::warn!("{}", SliceError::MissingCollaborator("victory panel")),
        }
        match self.victory_animation.as_mut() {
            Some(animation) => animation.set_active(true),
            None => log::warn!("{}", SliceError::MissingCollaborator("victory animation")),
        }
        match self.victory_audio.as_mut() {
            Some(audio) => audio.play(),
            None => log::warn!("{}", SliceError::MissingCollaborator("victory audio")),
        }
    }
}

impl ScoreSink for ScoreTracker {
    fn add_score(&mut self, delta: u32) {
        ScoreTracker::add_score(self, delta);
    }
}

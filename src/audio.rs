//! Audio sinks
//!
//! Playback is fire-and-forget: nothing here waits for a clip to finish.
//! The actual mixer lives behind `AudioBackend`; the crate only ships a
//! logging backend for the native demo.

use crate::settings::AudioSettings;

/// Clips the slicing game can request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Victory fanfare
    Victory,
    /// A successful cut
    Slice,
}

/// Something that can play a preloaded clip
pub trait AudioSink {
    fn play(&mut self);
}

/// Mixer that actually produces sound
pub trait AudioBackend {
    fn play(&mut self, effect: SoundEffect, volume: f32);
}

/// Volume-aware clip player
pub struct AudioManager {
    backend: Option<Box<dyn AudioBackend>>,
    clip: SoundEffect,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
    warned_missing: bool,
}

impl AudioManager {
    pub fn new(clip: SoundEffect, backend: Option<Box<dyn AudioBackend>>) -> Self {
        Self {
            backend,
            clip,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
            warned_missing: false,
        }
    }

    /// Apply volume settings
    pub fn with_settings(mut self, settings: &AudioSettings) -> Self {
        self.set_master_volume(settings.master_volume);
        self.set_sfx_volume(settings.sfx_volume);
        self.set_muted(settings.muted);
        self
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }
}

impl AudioSink for AudioManager {
    fn play(&mut self) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }

        let Some(backend) = self.backend.as_mut() else {
            if !self.warned_missing {
                log::warn!("No audio backend - {:?} clip skipped", self.clip);
                self.warned_missing = true;
            }
            return;
        };
        backend.play(self.clip, vol);
    }
}

/// Backend that only writes to the log
#[derive(Debug, Default)]
pub struct LogBackend;

impl AudioBackend for LogBackend {
    fn play(&mut self, effect: SoundEffect, volume: f32) {
        log::info!("♪ {:?} (volume {:.2})", effect, volume);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recorder(Rc<RefCell<Vec<(SoundEffect, f32)>>>);

    impl AudioBackend for Recorder {
        fn play(&mut self, effect: SoundEffect, volume: f32) {
            self.0.borrow_mut().push((effect, volume));
        }
    }

    #[test]
    fn test_plays_clip_at_effective_volume() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut audio =
            AudioManager::new(SoundEffect::Victory, Some(Box::new(Recorder(log.clone()))));
        audio.set_master_volume(0.5);
        audio.set_sfx_volume(0.5);
        audio.play();

        let played = log.borrow();
        assert_eq!(played.len(), 1);
        assert_eq!(played[0].0, SoundEffect::Victory);
        assert!((played[0].1 - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_muted_plays_nothing() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut audio = AudioManager::new(SoundEffect::Victory, Some(Box::new(Recorder(log.clone()))))
            .with_settings(&AudioSettings {
                muted: true,
                ..Default::default()
            });
        audio.play();
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_missing_backend_is_silent() {
        let mut audio = AudioManager::new(SoundEffect::Victory, None);
        audio.play();
        audio.play();
        assert!(audio.warned_missing);
    }
}

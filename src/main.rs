//! Blade Slice native demo
//!
//! Hangs a seeded ring of fruit in the air and swings a scripted blade
//! through it until the victory sequence fires.

use std::f32::consts::TAU;

use blade_slice::audio::{AudioManager, LogBackend, SoundEffect};
use blade_slice::consts::*;
use blade_slice::sim::{
    Activatable, BladeSegment, LayerMask, MaterialId, Mesh, PlaneSlicer, RigidEntityBuilder,
    ScoreTracker, SliceSession, SliceWorld, TextSink, TickInput, VelocitySource, tick,
};
use blade_slice::{SliceSettings, Transform};
use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Fruit field layout
const FRUIT_COUNT: usize = 12;
const FRUIT_HEIGHT: f32 = 1.2;
const RING_MIN: f32 = 0.35;
const RING_MAX: f32 = 0.85;
const FRUIT_HALF_SIZE: f32 = 0.04;

/// Blade rig: hand at the ring center, blade pointing outward
const BLADE_LENGTH: f32 = 1.0;
const SWING_SPEED: f32 = 3.0; // radians per second
const FRAME_DT: f32 = 1.0 / 72.0; // headset refresh
const MAX_SECONDS: f32 = 10.0;

/// Finite-difference velocity of the blade tip
struct TipVelocity {
    last: Option<Vec3>,
    current: Option<Vec3>,
    dt: f32,
}

impl TipVelocity {
    fn new(dt: f32) -> Self {
        Self {
            last: None,
            current: None,
            dt,
        }
    }

    fn track(&mut self, tip: Vec3) {
        self.last = self.current.replace(tip);
    }
}

impl VelocitySource for TipVelocity {
    fn estimate_velocity(&mut self) -> Vec3 {
        match (self.last, self.current) {
            (Some(last), Some(current)) => (current - last) / self.dt,
            _ => Vec3::ZERO,
        }
    }
}

struct LogText;

impl TextSink for LogText {
    fn set_text(&mut self, text: &str) {
        log::info!("[hud] {}", text);
    }
}

struct LogToggle(&'static str);

impl Activatable for LogToggle {
    fn set_active(&mut self, active: bool) {
        log::debug!("[{}] active = {}", self.0, active);
    }
}

fn spawn_fruit_ring(world: &mut SliceWorld, seed: u64) -> usize {
    let mut rng = Pcg32::seed_from_u64(seed);
    let mut spawned = 0;
    for _ in 0..FRUIT_COUNT {
        let angle = rng.random_range(0.0..TAU);
        let radius = rng.random_range(RING_MIN..RING_MAX);
        let pos = Vec3::new(angle.cos() * radius, FRUIT_HEIGHT, angle.sin() * radius);
        let material = MaterialId(rng.random_range(0..4));

        let fruit = RigidEntityBuilder::new()
            .with_mesh(Mesh::cuboid(Vec3::splat(FRUIT_HALF_SIZE), material))
            .with_transform(Transform::from_translation(pos))
            .with_tag("Fruit")
            .with_layer(LayerMask::SLICEABLE_LAYER)
            .with_convex_collision()
            .kinematic();
        match world.spawn(fruit) {
            Ok(_) => spawned += 1,
            Err(e) => log::warn!("Failed to spawn fruit: {}", e),
        }
    }
    spawned
}

fn load_settings() -> SliceSettings {
    let Some(path) = std::env::args().nth(1) else {
        log::info!("Using default settings");
        return SliceSettings::default();
    };
    match SliceSettings::load(&path) {
        Ok(settings) => settings,
        Err(e) => {
            log::warn!("Could not load {}: {} - using defaults", path, e);
            SliceSettings::default()
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Blade Slice (native demo) starting...");

    let settings = load_settings();
    let mut world = SliceWorld::new();
    let fruit = spawn_fruit_ring(&mut world, 0x5EED);
    log::info!("Spawned {} fruit, target score {}", fruit, settings.target_score);

    let score = ScoreTracker::new(settings.target_score)
        .with_label(settings.score_label.clone())
        .with_score_text(Box::new(LogText))
        .with_victory_panel(Box::new(LogToggle("victory-panel")))
        .with_victory_animation(Box::new(LogToggle("victory-animation")))
        .with_victory_audio(Box::new(
            AudioManager::new(SoundEffect::Victory, Some(Box::new(LogBackend)))
                .with_settings(&settings.audio),
        ));
    let cut_audio = AudioManager::new(SoundEffect::Slice, Some(Box::new(LogBackend)))
        .with_settings(&settings.audio);

    let session = match SliceSession::new(settings) {
        Ok(session) => session,
        Err(e) => {
            log::error!("Invalid settings: {}", e);
            return;
        }
    };
    let mut session = session
        .with_world(world)
        .with_score_tracker(score)
        .with_cut_audio(Box::new(cut_audio));
    let slicer = PlaneSlicer::default();
    let mut tip_velocity = TipVelocity::new(SIM_DT);

    let hand = Vec3::new(0.0, FRUIT_HEIGHT, 0.0);
    let mut accumulator = 0.0;
    let mut sim_time = 0.0f32;
    let mut frames = 0u32;

    // Fixed-timestep loop driven by headset frames
    while sim_time < MAX_SECONDS && !session.score.victory_triggered() {
        accumulator += FRAME_DT;
        frames += 1;

        let mut substeps = 0;
        while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let angle = sim_time * SWING_SPEED;
            let tip = hand + Vec3::new(angle.cos(), 0.0, angle.sin()) * BLADE_LENGTH;
            tip_velocity.track(tip);

            let input = TickInput::sample(BladeSegment::new(hand, tip), &mut tip_velocity);
            let report = tick(&mut session, &input, &slicer, SIM_DT);
            if report.slice_count() > 0 {
                log::debug!(
                    "tick {}: {} candidates, {} sliced",
                    report.tick,
                    report.candidates,
                    report.slice_count()
                );
            }

            accumulator -= SIM_DT;
            sim_time += SIM_DT;
            substeps += 1;
        }
    }

    log::info!(
        "Finished after {:.2}s ({} frames, {} ticks): score {}, victory {}, {} bodies in world",
        sim_time,
        frames,
        session.time_ticks,
        session.score.score(),
        session.score.victory_triggered(),
        session.world.len()
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No browser front end
}

//! Fixed timestep slicing tick
//!
//! One synchronous pass: sample, sweep, solve, split, score, integrate.

use std::collections::HashSet;

use glam::Vec3;

use super::blade::{BladeSegment, VelocitySource};
use super::executor::SliceResult;
use super::hull::MeshSlicer;
use super::state::SliceSession;
use super::sweep::{SliceCandidate, SweepQuery};
use super::world::EntityId;
use crate::error::SliceError;

/// Blade state for a single tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickInput {
    pub blade: BladeSegment,
    pub velocity: Vec3,
}

impl TickInput {
    /// Sample the velocity source once for this tick
    pub fn sample(blade: BladeSegment, source: &mut dyn VelocitySource) -> Self {
        Self {
            blade,
            velocity: source.estimate_velocity(),
        }
    }
}

/// What happened to one candidate
#[derive(Debug, Clone, PartialEq)]
pub enum SliceEvent {
    Sliced { target: EntityId, result: SliceResult },
    Skipped { target: EntityId, reason: SliceError },
}

/// Summary of one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    /// Blade was too slow; the world was not queried
    pub gated: bool,
    /// Unique bodies touched by the sweep
    pub candidates: usize,
    pub events: Vec<SliceEvent>,
    /// Victory fired during this tick
    pub victory: bool,
}

impl TickReport {
    pub fn sliced(&self) -> impl Iterator<Item = &SliceResult> {
        self.events.iter().filter_map(|e| match e {
            SliceEvent::Sliced { result, .. } => Some(result),
            SliceEvent::Skipped { .. } => None,
        })
    }

    pub fn slice_count(&self) -> usize {
        self.sliced().count()
    }
}

/// Advance the session by one fixed timestep
pub fn tick(
    session: &mut SliceSession,
    input: &TickInput,
    slicer: &dyn MeshSlicer,
    dt: f32,
) -> TickReport {
    session.time_ticks += 1;
    let mut report = TickReport {
        tick: session.time_ticks,
        gated: !session.detector.is_cutting_speed(input.velocity),
        ..Default::default()
    };

    let query = SweepQuery {
        segment: input.blade,
        radius: session.settings.blade_radius,
        velocity: input.velocity,
        layers: session.settings.sliceable_layers,
    };
    let candidates = session.detector.detect(&query, &session.world);
    report.candidates = candidates.len();

    let victory_before = session.score.victory_triggered();
    report.events = slice_candidates(session, input, &candidates, slicer);
    report.victory = !victory_before && session.score.victory_triggered();

    session.world.step(dt, session.settings.gravity);
    report
}

/// Slice each candidate at most once, in order
///
/// Failures are recorded and never stop the remaining candidates.
pub fn slice_candidates(
    session: &mut SliceSession,
    input: &TickInput,
    candidates: &[SliceCandidate],
    slicer: &dyn MeshSlicer,
) -> Vec<SliceEvent> {
    let SliceSession {
        world,
        score,
        solver,
        executor,
        cut_audio,
        ..
    } = session;

    // Rebuilt every call, so nothing leaks into the next tick
    let mut sliced_this_tick: HashSet<EntityId> = HashSet::with_capacity(candidates.len());
    let mut events = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        let target = candidate.target;
        if !sliced_this_tick.insert(target) {
            log::trace!("{} already processed this tick", target);
            events.push(SliceEvent::Skipped {
                target,
                reason: SliceError::DuplicateSliceAttempt(target),
            });
            continue;
        }

        let Some(plane) = solver.solve(&input.blade, input.velocity) else {
            log::debug!("Degenerate cut plane for {}, skipping", target);
            events.push(SliceEvent::Skipped {
                target,
                reason: SliceError::DegeneratePlane,
            });
            continue;
        };

        match executor.execute(world, target, &plane, slicer, score) {
            Ok(result) => {
                if let Some(audio) = cut_audio.as_mut() {
                    audio.play();
                }
                events.push(SliceEvent::Sliced { target, result });
            }
            Err(reason) => {
                log::warn!("Slice of {} skipped: {}", target, reason);
                events.push(SliceEvent::Skipped { target, reason });
            }
        }
    }
    events
}

//! Slicing simulation module
//!
//! All gameplay logic lives here. This module must stay deterministic:
//! - Fixed timestep only
//! - One synchronous pass per tick (sweep, plane, split, score)
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod blade;
pub mod builder;
pub mod collider;
pub mod executor;
pub mod hull;
pub mod mesh;
pub mod plane;
pub mod score;
pub mod state;
pub mod sweep;
pub mod tick;
pub mod world;

pub use blade::{BladeSegment, FixedVelocity, VelocitySource};
pub use builder::{RigidBody, RigidEntityBuilder};
pub use collider::{Capsule, Collider};
pub use executor::{ImpulseMode, SliceExecutor, SliceResult};
pub use hull::{MeshSlicer, PlaneSlicer, SlicedHull};
pub use mesh::{Face, MaterialId, Mesh};
pub use plane::{CutPlane, CutPlaneSolver};
pub use score::{Activatable, ScorePhase, ScoreSink, ScoreTracker, TextSink};
pub use state::SliceSession;
pub use sweep::{SliceCandidate, SweepDetector, SweepHit, SweepQuery};
pub use tick::{SliceEvent, TickInput, TickReport, slice_candidates, tick};
pub use world::{Entity, EntityId, LayerMask, PhysicsQuery, SliceWorld};

//! Slice execution
//!
//! Turns one candidate and its cut plane into two physical halves and one
//! score event.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::hull::{MeshSlicer, SlicedHull};
use super::mesh::MaterialId;
use super::plane::CutPlane;
use super::score::ScoreSink;
use super::world::{Entity, EntityId, SliceWorld};
use crate::error::SliceError;
use crate::settings::SliceSettings;

/// How the separating impulse is directed
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum ImpulseMode {
    /// `+normal` on the upper half, `-normal` on the lower half
    #[default]
    Directional,
    /// Push each half away from the cut point, fading to zero at `radius`
    Explosion { radius: f32 },
}

/// Entities created by a successful cut
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceResult {
    pub upper: EntityId,
    pub lower: EntityId,
}

/// Splits targets and replaces them with their halves
#[derive(Debug, Clone, Copy)]
pub struct SliceExecutor {
    pub cut_force: f32,
    pub impulse: ImpulseMode,
    pub cross_section_material: Option<MaterialId>,
}

impl SliceExecutor {
    pub fn from_settings(settings: &SliceSettings) -> Self {
        Self {
            cut_force: settings.cut_force,
            impulse: settings.impulse,
            cross_section_material: settings.cross_section_material,
        }
    }

    /// Slice `target` along `plane`
    ///
    /// Call at most once per target per tick. On error the world is left
    /// untouched and no score is reported.
    pub fn execute(
        &self,
        world: &mut SliceWorld,
        target: EntityId,
        plane: &CutPlane,
        slicer: &dyn MeshSlicer,
        score: &mut dyn ScoreSink,
    ) -> Result<SliceResult, SliceError> {
        let original = world.get(target).ok_or(SliceError::EntityNotFound(target))?;
        let hull = slicer
            .slice(&original.mesh, &original.transform, plane)?
            .ok_or(SliceError::NoIntersection)?;

        let (upper_impulse, lower_impulse) = self.impulses(original, &hull, plane);
        let upper = hull
            .create_upper_hull(original, self.cross_section_material)
            .with_convex_collision()
            .with_impulse(upper_impulse);
        let lower = hull
            .create_lower_hull(original, self.cross_section_material)
            .with_convex_collision()
            .with_impulse(lower_impulse);

        let upper_id = world.next_entity_id();
        let lower_id = world.next_entity_id();
        let halves = [upper.build(upper_id)?, lower.build(lower_id)?];
        world.replace_with_halves(target, halves)?;

        log::info!("Sliced {} into {} / {}", target, upper_id, lower_id);
        score.add_score(1);

        Ok(SliceResult {
            upper: upper_id,
            lower: lower_id,
        })
    }

    fn impulses(&self, original: &Entity, hull: &SlicedHull, plane: &CutPlane) -> (Vec3, Vec3) {
        let directional = (
            plane.normal * self.cut_force,
            -plane.normal * self.cut_force,
        );
        match self.impulse {
            ImpulseMode::Directional => directional,
            // No falloff range to work with
            ImpulseMode::Explosion { radius } if !(radius > 0.0) => {
                log::warn!("Explosion radius {} is not positive, using directional impulse", radius);
                directional
            }
            ImpulseMode::Explosion { radius } => {
                let blast = |center: Vec3, fallback: Vec3| {
                    let offset = center - plane.point;
                    let falloff = (1.0 - offset.length() / radius).clamp(0.0, 1.0);
                    offset.normalize_or(fallback) * self.cut_force * falloff
                };
                let upper_center = original.transform.to_world(hull.upper_half().centroid());
                let lower_center = original.transform.to_world(hull.lower_half().centroid());
                (
                    blast(upper_center, plane.normal),
                    blast(lower_center, -plane.normal),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Transform;
    use crate::sim::builder::RigidEntityBuilder;
    use crate::sim::hull::PlaneSlicer;
    use crate::sim::mesh::Mesh;
    use crate::sim::world::LayerMask;

    #[derive(Default)]
    struct Tally(Vec<u32>);

    impl ScoreSink for Tally {
        fn add_score(&mut self, delta: u32) {
            self.0.push(delta);
        }
    }

    /// Splitter that never finds an intersection
    struct NeverSlices;

    impl MeshSlicer for NeverSlices {
        fn slice(
            &self,
            _mesh: &Mesh,
            _transform: &Transform,
            _plane: &CutPlane,
        ) -> Result<Option<SlicedHull>, SliceError> {
            Ok(None)
        }
    }

    struct BrokenSlicer;

    impl MeshSlicer for BrokenSlicer {
        fn slice(
            &self,
            _mesh: &Mesh,
            _transform: &Transform,
            _plane: &CutPlane,
        ) -> Result<Option<SlicedHull>, SliceError> {
            Err(SliceError::SliceFailure("non-manifold input".into()))
        }
    }

    fn world_with_fruit() -> (SliceWorld, EntityId) {
        let mut world = SliceWorld::new();
        let id = world
            .spawn(
                RigidEntityBuilder::new()
                    .with_mesh(Mesh::cuboid(Vec3::splat(0.1), MaterialId(1)))
                    .with_transform(Transform::from_translation(Vec3::new(0.0, 1.0, 0.0)))
                    .with_tag("Fruit")
                    .with_layer(LayerMask::SLICEABLE_LAYER)
                    .with_sphere_collision(0.1),
            )
            .unwrap();
        (world, id)
    }

    fn executor() -> SliceExecutor {
        SliceExecutor::from_settings(&SliceSettings::default())
    }

    fn through_fruit() -> CutPlane {
        CutPlane {
            point: Vec3::new(0.0, 1.0, 0.0),
            normal: Vec3::X,
        }
    }

    #[test]
    fn test_successful_cut_replaces_target() {
        let (mut world, target) = world_with_fruit();
        let mut tally = Tally::default();

        let result = executor()
            .execute(&mut world, target, &through_fruit(), &PlaneSlicer::default(), &mut tally)
            .unwrap();

        assert_eq!(tally.0, vec![1]);
        assert!(!world.contains(target));
        assert_eq!(world.len(), 2);
        for id in [result.upper, result.lower] {
            let half = world.get(id).unwrap();
            assert!(half.body.is_some());
            assert!(half.collider.as_ref().unwrap().is_convex());
            assert_eq!(half.tag, "Fruit");
            assert_eq!(half.layer, LayerMask::SLICEABLE_LAYER);
        }
    }

    #[test]
    fn test_directional_impulse_separates_halves() {
        let (mut world, target) = world_with_fruit();
        let result = executor()
            .execute(&mut world, target, &through_fruit(), &PlaneSlicer::default(), &mut Tally::default())
            .unwrap();

        let velocity = |id| world.get(id).unwrap().body.as_ref().unwrap().linear_velocity;
        assert!((velocity(result.upper) - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-5);
        assert!((velocity(result.lower) - Vec3::new(-2.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_explosion_impulse_points_away_from_cut() {
        let (mut world, target) = world_with_fruit();
        let exec = SliceExecutor {
            impulse: ImpulseMode::Explosion { radius: 1.0 },
            ..executor()
        };
        let result = exec
            .execute(&mut world, target, &through_fruit(), &PlaneSlicer::default(), &mut Tally::default())
            .unwrap();

        let velocity = |id| world.get(id).unwrap().body.as_ref().unwrap().linear_velocity;
        let upper = velocity(result.upper);
        let lower = velocity(result.lower);
        assert!(upper.x > 0.0 && lower.x < 0.0);
        // Falloff keeps it under the full force
        assert!(upper.length() < 2.0);
    }

    #[test]
    fn test_zero_explosion_radius_keeps_velocities_finite() {
        let (mut world, target) = world_with_fruit();
        let exec = SliceExecutor {
            impulse: ImpulseMode::Explosion { radius: 0.0 },
            ..executor()
        };
        let result = exec
            .execute(&mut world, target, &through_fruit(), &PlaneSlicer::default(), &mut Tally::default())
            .unwrap();

        let velocity = |id| world.get(id).unwrap().body.as_ref().unwrap().linear_velocity;
        assert!(velocity(result.upper).is_finite() && velocity(result.lower).is_finite());
        assert!((velocity(result.upper) - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-5);
        assert!((velocity(result.lower) - Vec3::new(-2.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_no_hull_leaves_target_untouched() {
        let (mut world, target) = world_with_fruit();
        let mut tally = Tally::default();
        let err = executor()
            .execute(&mut world, target, &through_fruit(), &NeverSlices, &mut tally)
            .unwrap_err();

        assert_eq!(err, SliceError::NoIntersection);
        assert!(world.contains(target));
        assert_eq!(world.len(), 1);
        assert!(tally.0.is_empty());
    }

    #[test]
    fn test_splitter_failure_is_reported() {
        let (mut world, target) = world_with_fruit();
        let mut tally = Tally::default();
        let err = executor()
            .execute(&mut world, target, &through_fruit(), &BrokenSlicer, &mut tally)
            .unwrap_err();

        assert!(matches!(err, SliceError::SliceFailure(_)));
        assert!(world.contains(target));
        assert!(tally.0.is_empty());
    }

    #[test]
    fn test_missing_target() {
        let (mut world, _) = world_with_fruit();
        let err = executor()
            .execute(&mut world, EntityId(42), &through_fruit(), &PlaneSlicer::default(), &mut Tally::default())
            .unwrap_err();
        assert_eq!(err, SliceError::EntityNotFound(EntityId(42)));
    }

    #[test]
    fn test_cross_section_material_applied() {
        let (mut world, target) = world_with_fruit();
        let exec = SliceExecutor {
            cross_section_material: Some(MaterialId(9)),
            ..executor()
        };
        let result = exec
            .execute(&mut world, target, &through_fruit(), &PlaneSlicer::default(), &mut Tally::default())
            .unwrap();
        let upper = world.get(result.upper).unwrap();
        assert!(upper.mesh.faces.iter().any(|f| f.material == MaterialId(9)));
        assert!(upper.mesh.faces.iter().any(|f| f.material == MaterialId(1)));
    }
}

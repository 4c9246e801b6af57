//! Scene graph and physics world
//!
//! Entities are kept sorted by id so every query and integration step
//! visits them in the same order.

use std::fmt;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::builder::{RigidBody, RigidEntityBuilder};
use super::collider::{Capsule, Collider};
use super::mesh::Mesh;
use super::sweep::SweepHit;
use crate::Transform;
use crate::error::SliceError;

/// Opaque entity handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Bit set of collision layers (layer `n` is bit `n`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const NONE: Self = Self(0);
    pub const ALL: Self = Self(u32::MAX);
    /// Layer used by untagged scenery
    pub const DEFAULT_LAYER: u8 = 0;
    /// Layer for objects the blade may cut
    pub const SLICEABLE_LAYER: u8 = 8;
    pub const SLICEABLE: Self = Self(1 << Self::SLICEABLE_LAYER);

    pub fn from_layer(layer: u8) -> Self {
        Self(1u32.checked_shl(layer as u32).unwrap_or(0))
    }

    #[inline]
    pub fn contains(&self, layer: u8) -> bool {
        self.0 & Self::from_layer(layer).0 != 0
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        Self::SLICEABLE
    }
}

/// Anything in the scene
#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    /// Classification tag (e.g. "Fruit")
    pub tag: String,
    /// Collision layer index
    pub layer: u8,
    pub transform: Transform,
    pub mesh: Mesh,
    pub body: Option<RigidBody>,
    pub collider: Option<Collider>,
}

/// Read-only overlap queries against the physics world
pub trait PhysicsQuery {
    /// Every contact between the capsule and a collider on `mask`
    ///
    /// May report several contacts for the same entity.
    fn capsule_overlap(&self, capsule: &Capsule, mask: LayerMask) -> Vec<SweepHit>;
}

/// In-memory scene with rigid-body integration
#[derive(Debug, Clone, Default)]
pub struct SliceWorld {
    /// Sorted by id
    entities: Vec<Entity>,
    next_id: u32,
}

impl SliceWorld {
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id.max(1));
        self.next_id = id.0 + 1;
        id
    }

    /// Build and insert an entity
    pub fn spawn(&mut self, builder: RigidEntityBuilder) -> Result<EntityId, SliceError> {
        let id = self.next_entity_id();
        let entity = builder.build(id)?;
        self.insert(entity);
        Ok(id)
    }

    fn insert(&mut self, entity: Entity) {
        match self.entities.binary_search_by_key(&entity.id, |e| e.id) {
            Ok(idx) => self.entities[idx] = entity,
            Err(idx) => self.entities.insert(idx, entity),
        }
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.index_of(id).map(|idx| &self.entities[idx])
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        let idx = self.index_of(id)?;
        Some(&mut self.entities[idx])
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        self.index_of(id).map(|idx| self.entities.remove(idx))
    }

    /// Swap an entity for the two halves cut from it
    ///
    /// Both halves are inserted in the same call that removes the original,
    /// so no reader ever sees zero or three copies.
    pub fn replace_with_halves(
        &mut self,
        original: EntityId,
        halves: [Entity; 2],
    ) -> Result<(), SliceError> {
        let idx = self
            .index_of(original)
            .ok_or(SliceError::EntityNotFound(original))?;
        self.entities.remove(idx);
        for half in halves {
            self.insert(half);
        }
        Ok(())
    }

    /// Integrate rigid bodies by one fixed timestep
    pub fn step(&mut self, dt: f32, gravity: Vec3) {
        for entity in &mut self.entities {
            let Some(body) = entity.body.as_mut() else {
                continue;
            };
            if body.kinematic {
                continue;
            }
            body.linear_velocity += gravity * dt;
            entity.transform.translation += body.linear_velocity * dt;

            let spin = body.angular_velocity * dt;
            if spin.length_squared() > 0.0 {
                entity.transform.rotation =
                    (Quat::from_scaled_axis(spin) * entity.transform.rotation).normalize();
            }
        }
    }

    fn index_of(&self, id: EntityId) -> Option<usize> {
        self.entities.binary_search_by_key(&id, |e| e.id).ok()
    }
}

impl PhysicsQuery for SliceWorld {
    fn capsule_overlap(&self, capsule: &Capsule, mask: LayerMask) -> Vec<SweepHit> {
        self.entities
            .iter()
            .filter(|e| mask.contains(e.layer))
            .filter_map(|e| {
                let collider = e.collider.as_ref()?;
                let point = collider.capsule_contact(&e.transform, capsule)?;
                Some(SweepHit {
                    entity: e.id,
                    point,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::mesh::{Face, MaterialId};

    fn fruit(at: Vec3) -> RigidEntityBuilder {
        RigidEntityBuilder::new()
            .with_mesh(Mesh::cuboid(Vec3::splat(0.1), MaterialId(0)))
            .with_transform(Transform::from_translation(at))
            .with_tag("Fruit")
            .with_layer(LayerMask::SLICEABLE_LAYER)
            .with_convex_collision()
    }

    #[test]
    fn test_layer_mask() {
        assert!(LayerMask::SLICEABLE.contains(8));
        assert!(!LayerMask::SLICEABLE.contains(0));
        assert!(LayerMask::ALL.contains(31));
        assert!(!LayerMask::NONE.contains(8));
        assert_eq!(LayerMask::from_layer(40), LayerMask::NONE);
    }

    #[test]
    fn test_spawn_rejects_bad_indices_without_panicking() {
        let mut world = SliceWorld::new();
        let broken = Mesh::new(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            vec![Face {
                indices: [0, 1, 7],
                material: MaterialId(0),
            }],
        );
        let err = world
            .spawn(RigidEntityBuilder::new().with_mesh(broken).with_convex_collision())
            .unwrap_err();
        assert!(matches!(err, SliceError::InvalidMesh(_)));
        assert!(world.is_empty());
    }

    #[test]
    fn test_spawn_assigns_increasing_ids() {
        let mut world = SliceWorld::new();
        let a = world.spawn(fruit(Vec3::ZERO)).unwrap();
        let b = world.spawn(fruit(Vec3::X)).unwrap();
        assert!(b > a);
        assert_eq!(world.len(), 2);
        assert_eq!(world.get(a).unwrap().tag, "Fruit");
    }

    #[test]
    fn test_overlap_filters_by_layer() {
        let mut world = SliceWorld::new();
        let sliceable = world.spawn(fruit(Vec3::ZERO)).unwrap();
        world
            .spawn(fruit(Vec3::new(0.5, 0.0, 0.0)).with_layer(LayerMask::DEFAULT_LAYER))
            .unwrap();

        let blade = Capsule::new(Vec3::new(-1.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0), 0.02);
        let hits = world.capsule_overlap(&blade, LayerMask::SLICEABLE);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].entity, sliceable);

        assert_eq!(world.capsule_overlap(&blade, LayerMask::ALL).len(), 2);
    }

    #[test]
    fn test_replace_with_halves_is_single_step() {
        let mut world = SliceWorld::new();
        let original = world.spawn(fruit(Vec3::ZERO)).unwrap();
        let upper_id = world.next_entity_id();
        let lower_id = world.next_entity_id();
        let upper = fruit(Vec3::Y).build(upper_id).unwrap();
        let lower = fruit(-Vec3::Y).build(lower_id).unwrap();

        world.replace_with_halves(original, [upper, lower]).unwrap();
        assert!(!world.contains(original));
        assert!(world.contains(upper_id) && world.contains(lower_id));
        assert_eq!(world.len(), 2);

        let upper = fruit(Vec3::Y).build(EntityId(99)).unwrap();
        let lower = fruit(-Vec3::Y).build(EntityId(100)).unwrap();
        assert_eq!(
            world.replace_with_halves(original, [upper, lower]),
            Err(SliceError::EntityNotFound(original))
        );
        assert_eq!(world.len(), 2);
    }

    #[test]
    fn test_step_applies_gravity_and_velocity() {
        let mut world = SliceWorld::new();
        let id = world
            .spawn(fruit(Vec3::ZERO).with_impulse(Vec3::new(1.0, 0.0, 0.0)))
            .unwrap();
        world.step(0.5, Vec3::new(0.0, -10.0, 0.0));

        let e = world.get(id).unwrap();
        let body = e.body.as_ref().unwrap();
        assert!((body.linear_velocity - Vec3::new(1.0, -5.0, 0.0)).length() < 1e-5);
        assert!((e.transform.translation - Vec3::new(0.5, -2.5, 0.0)).length() < 1e-5);
    }
}

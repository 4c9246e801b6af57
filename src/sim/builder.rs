//! Rigid entity construction
//!
//! Entities come out of the builder complete: mesh, body, collision volume
//! and initial impulse are decided before the entity enters the world.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::collider::Collider;
use super::mesh::Mesh;
use super::world::{Entity, EntityId, LayerMask};
use crate::Transform;
use crate::consts::DEFAULT_HALF_MASS;
use crate::error::SliceError;

/// Dynamic state of a physics body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigidBody {
    pub mass: f32,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
    /// Moved by game code only, ignored by integration
    pub kinematic: bool,
}

impl RigidBody {
    pub fn new(mass: f32) -> Self {
        Self {
            mass,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            kinematic: false,
        }
    }

    /// Instant change in momentum
    pub fn apply_impulse(&mut self, impulse: Vec3) {
        if self.kinematic || self.mass <= 0.0 {
            return;
        }
        self.linear_velocity += impulse / self.mass;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum CollisionShape {
    None,
    Convex,
    Sphere(f32),
}

/// Builder for physics-enabled entities
#[derive(Debug, Clone)]
pub struct RigidEntityBuilder {
    mesh: Option<Mesh>,
    transform: Transform,
    tag: String,
    layer: u8,
    collision: CollisionShape,
    mass: f32,
    kinematic: bool,
    velocity: Vec3,
    angular_velocity: Vec3,
    impulse: Vec3,
}

impl Default for RigidEntityBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RigidEntityBuilder {
    pub fn new() -> Self {
        Self {
            mesh: None,
            transform: Transform::IDENTITY,
            tag: "Untagged".to_string(),
            layer: LayerMask::DEFAULT_LAYER,
            collision: CollisionShape::None,
            mass: DEFAULT_HALF_MASS,
            kinematic: false,
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            impulse: Vec3::ZERO,
        }
    }

    pub fn with_mesh(mut self, mesh: Mesh) -> Self {
        self.mesh = Some(mesh);
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn with_layer(mut self, layer: u8) -> Self {
        self.layer = layer;
        self
    }

    /// Collide with the convex volume of the mesh
    pub fn with_convex_collision(mut self) -> Self {
        self.collision = CollisionShape::Convex;
        self
    }

    /// Collide with a sphere around the origin
    pub fn with_sphere_collision(mut self, radius: f32) -> Self {
        self.collision = CollisionShape::Sphere(radius);
        self
    }

    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_angular_velocity(mut self, angular_velocity: Vec3) -> Self {
        self.angular_velocity = angular_velocity;
        self
    }

    /// Impulse applied once, at build time
    pub fn with_impulse(mut self, impulse: Vec3) -> Self {
        self.impulse += impulse;
        self
    }

    /// Body is driven by game code, not by integration
    pub fn kinematic(mut self) -> Self {
        self.kinematic = true;
        self
    }

    /// Produce the finished entity
    pub fn build(self, id: EntityId) -> Result<Entity, SliceError> {
        let mesh = self.mesh.ok_or(SliceError::IncompleteEntity("mesh"))?;
        mesh.validate()?;

        let collider = match self.collision {
            CollisionShape::None => None,
            CollisionShape::Convex => Some(
                Collider::convex_from_mesh(&mesh)
                    .ok_or(SliceError::IncompleteEntity("convex collision geometry"))?,
            ),
            CollisionShape::Sphere(radius) => Some(Collider::sphere(radius)),
        };

        let mut body = RigidBody::new(self.mass);
        body.kinematic = self.kinematic;
        body.linear_velocity = self.velocity;
        body.angular_velocity = self.angular_velocity;
        body.apply_impulse(self.impulse);

        Ok(Entity {
            id,
            tag: self.tag,
            layer: self.layer,
            transform: self.transform,
            mesh,
            body: Some(body),
            collider,
        })
    }
}

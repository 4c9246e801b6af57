//! Collision volumes and the blade's sweep capsule
//!
//! Shapes and overlap tests are parry3d's. The scene stays in glam, so the
//! conversions into parry's nalgebra types live here too.

use glam::Vec3;
use parry3d::math::{Isometry, Point, Real};
use parry3d::na::{Quaternion, Translation3, UnitQuaternion};
use parry3d::query;
use parry3d::shape::{Ball, ConvexPolyhedron, Shape};

use super::mesh::Mesh;
use crate::{Transform, closest_point_on_segment};

#[inline]
pub(crate) fn to_point(v: Vec3) -> Point<Real> {
    Point::new(v.x, v.y, v.z)
}

/// Scene transform as a parry isometry
pub(crate) fn to_isometry(transform: &Transform) -> Isometry<Real> {
    let q = transform.rotation.normalize();
    let t = transform.translation;
    Isometry::from_parts(
        Translation3::new(t.x, t.y, t.z),
        UnitQuaternion::new_normalize(Quaternion::new(q.w, q.x, q.y, q.z)),
    )
}

/// Capsule swept between two points (world space)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Capsule {
    pub a: Vec3,
    pub b: Vec3,
    pub radius: f32,
}

impl Capsule {
    pub fn new(a: Vec3, b: Vec3, radius: f32) -> Self {
        Self { a, b, radius }
    }

    fn shape(&self) -> parry3d::shape::Capsule {
        parry3d::shape::Capsule::new(to_point(self.a), to_point(self.b), self.radius)
    }
}

/// Collision volume attached to an entity
#[derive(Debug, Clone)]
pub enum Collider {
    /// Sphere around the entity origin
    Sphere(Ball),
    /// Convex hull of the entity's mesh
    Convex(ConvexPolyhedron),
}

impl Collider {
    pub fn sphere(radius: f32) -> Self {
        Collider::Sphere(Ball::new(radius))
    }

    /// Convex hull of the mesh's referenced vertices
    ///
    /// `None` for flat or degenerate meshes. Face indices must already be
    /// in range (see `Mesh::validate`).
    pub fn convex_from_mesh(mesh: &Mesh) -> Option<Self> {
        let mut points: Vec<Point<Real>> = Vec::with_capacity(mesh.vertices.len());
        for face in &mesh.faces {
            for p in mesh.triangle(face) {
                let p = to_point(p);
                if !points.iter().any(|q| (q - p).norm_squared() < 1e-12) {
                    points.push(p);
                }
            }
        }
        if points.len() < 4 {
            return None;
        }
        ConvexPolyhedron::from_convex_hull(&points).map(Collider::Convex)
    }

    pub fn is_convex(&self) -> bool {
        matches!(self, Collider::Convex(_))
    }

    fn shape(&self) -> &dyn Shape {
        match self {
            Collider::Sphere(ball) => ball,
            Collider::Convex(hull) => hull,
        }
    }

    /// Contact point if the capsule touches this collider
    ///
    /// The reported point is the spot on the blade axis nearest the
    /// entity origin.
    pub fn capsule_contact(&self, transform: &Transform, capsule: &Capsule) -> Option<Vec3> {
        let touching = query::intersection_test(
            &to_isometry(transform),
            self.shape(),
            &Isometry::identity(),
            &capsule.shape(),
        )
        .unwrap_or_else(|e| {
            log::warn!("Capsule test unsupported: {:?}", e);
            false
        });
        touching.then(|| closest_point_on_segment(transform.translation, capsule.a, capsule.b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::hull::{MeshSlicer, PlaneSlicer};
    use crate::sim::mesh::{Face, MaterialId};
    use crate::sim::plane::CutPlane;
    use glam::Quat;

    fn blade_along_z(x: f32, y: f32) -> Capsule {
        Capsule::new(Vec3::new(x, y, -2.0), Vec3::new(x, y, 2.0), 0.02)
    }

    #[test]
    fn test_sphere_contact_respects_blade_radius() {
        let sphere = Collider::sphere(0.1);
        let at = Transform::from_translation(Vec3::new(0.0, 0.15, 0.0));
        let blade = |radius| Capsule::new(Vec3::new(-1.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0), radius);

        assert!(sphere.capsule_contact(&at, &blade(0.02)).is_none());
        let contact = sphere.capsule_contact(&at, &blade(0.06)).unwrap();
        assert!(contact.distance(Vec3::ZERO) < 1e-6);
    }

    #[test]
    fn test_convex_hull_of_cuboid() {
        let mesh = Mesh::cuboid(Vec3::splat(0.5), MaterialId(0));
        let Some(Collider::Convex(hull)) = Collider::convex_from_mesh(&mesh) else {
            panic!("expected convex collider");
        };
        assert_eq!(hull.points().len(), 8);
    }

    #[test]
    fn test_flat_mesh_has_no_hull() {
        let quad = Mesh::new(
            vec![Vec3::ZERO, Vec3::X, Vec3::new(1.0, 1.0, 0.0), Vec3::Y],
            vec![
                Face {
                    indices: [0, 1, 2],
                    material: MaterialId(0),
                },
                Face {
                    indices: [0, 2, 3],
                    material: MaterialId(0),
                },
            ],
        );
        assert!(Collider::convex_from_mesh(&quad).is_none());
    }

    #[test]
    fn test_convex_contact_follows_transform() {
        let collider =
            Collider::convex_from_mesh(&Mesh::cuboid(Vec3::splat(0.5), MaterialId(0))).unwrap();
        let far = Transform::from_translation(Vec3::new(0.0, 5.0, 0.0));
        let blade = Capsule::new(Vec3::new(-2.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0), 0.02);
        assert!(collider.capsule_contact(&Transform::IDENTITY, &blade).is_some());
        assert!(collider.capsule_contact(&far, &blade).is_none());
    }

    #[test]
    fn test_rotated_hull_is_tested_exactly() {
        // Spun 45 degrees about Z the corners reach sqrt(2) * 0.5 along X
        let collider =
            Collider::convex_from_mesh(&Mesh::cuboid(Vec3::splat(0.5), MaterialId(0))).unwrap();
        let spun = Transform {
            translation: Vec3::ZERO,
            rotation: Quat::from_rotation_z(std::f32::consts::FRAC_PI_4),
        };
        assert!(collider.capsule_contact(&spun, &blade_along_z(0.65, 0.0)).is_some());
        assert!(collider.capsule_contact(&spun, &blade_along_z(0.45, 0.45)).is_none());
    }

    #[test]
    fn test_wedge_ignores_blade_in_empty_corner() {
        // Upper wedge of a unit cube cut along x + y = 0; its bounds still
        // span the whole cube
        let hull = PlaneSlicer::default()
            .slice(
                &Mesh::cuboid(Vec3::ONE, MaterialId(0)),
                &Transform::IDENTITY,
                &CutPlane {
                    point: Vec3::ZERO,
                    normal: Vec3::new(1.0, 1.0, 0.0).normalize(),
                },
            )
            .unwrap()
            .unwrap();
        let wedge = Collider::convex_from_mesh(hull.upper_half()).unwrap();

        assert!(wedge.capsule_contact(&Transform::IDENTITY, &blade_along_z(-0.8, -0.8)).is_none());
        assert!(wedge.capsule_contact(&Transform::IDENTITY, &blade_along_z(0.8, 0.8)).is_some());
    }
}

//! Mesh splitting
//!
//! The slicing pipeline only sees `MeshSlicer`. `PlaneSlicer` is the
//! shipped splitter: it clips every triangle against the plane and caps
//! the opening with a fan. The cap is exact for convex meshes; concave
//! cross sections get a single star-shaped cap.

use glam::Vec3;

use super::builder::RigidEntityBuilder;
use super::mesh::{Face, MaterialId, Mesh};
use super::plane::CutPlane;
use super::world::Entity;
use crate::Transform;
use crate::error::SliceError;

/// Splits a mesh along a world-space plane
pub trait MeshSlicer {
    /// `Ok(None)` when the plane misses the mesh
    ///
    /// `plane.normal` must be unit length; `plane.point` is in world space
    /// and is mapped through `transform` into the mesh's space.
    fn slice(
        &self,
        mesh: &Mesh,
        transform: &Transform,
        plane: &CutPlane,
    ) -> Result<Option<SlicedHull>, SliceError>;
}

/// The two closed halves of a cut, in the original's local space
#[derive(Debug, Clone, PartialEq)]
pub struct SlicedHull {
    upper: Mesh,
    lower: Mesh,
}

impl SlicedHull {
    pub fn new(upper: Mesh, lower: Mesh) -> Self {
        Self { upper, lower }
    }

    /// Half on the positive side of the normal
    pub fn upper_half(&self) -> &Mesh {
        &self.upper
    }

    pub fn lower_half(&self) -> &Mesh {
        &self.lower
    }

    /// Builder for the upper half, placed and classified like `original`
    pub fn create_upper_hull(
        &self,
        original: &Entity,
        material: Option<MaterialId>,
    ) -> RigidEntityBuilder {
        hull_builder(&self.upper, original, material)
    }

    pub fn create_lower_hull(
        &self,
        original: &Entity,
        material: Option<MaterialId>,
    ) -> RigidEntityBuilder {
        hull_builder(&self.lower, original, material)
    }
}

fn hull_builder(
    half: &Mesh,
    original: &Entity,
    material: Option<MaterialId>,
) -> RigidEntityBuilder {
    let mut mesh = half.clone();
    let cut_material = material
        .or_else(|| original.mesh.primary_material())
        .unwrap_or_default();
    mesh.assign_cut_material(cut_material);

    RigidEntityBuilder::new()
        .with_mesh(mesh)
        .with_transform(original.transform)
        .with_tag(original.tag.clone())
        .with_layer(original.layer)
}

/// Triangle-clipping splitter
#[derive(Debug, Clone, Copy)]
pub struct PlaneSlicer {
    /// Vertices closer than this to the plane count as on it
    pub epsilon: f32,
}

impl Default for PlaneSlicer {
    fn default() -> Self {
        Self { epsilon: 1e-5 }
    }
}

/// Growing triangle soup
#[derive(Default)]
struct MeshAccum {
    vertices: Vec<Vec3>,
    faces: Vec<Face>,
}

impl MeshAccum {
    fn push_triangle(&mut self, a: Vec3, b: Vec3, c: Vec3, material: MaterialId) {
        if (b - a).cross(c - a).length_squared() < 1e-14 {
            return; // Sliver
        }
        let base = self.vertices.len() as u32;
        self.vertices.extend([a, b, c]);
        self.faces.push(Face {
            indices: [base, base + 1, base + 2],
            material,
        });
    }

    /// Fan-triangulate a convex polygon
    fn push_polygon(&mut self, poly: &[Vec3], material: MaterialId) {
        for i in 1..poly.len().saturating_sub(1) {
            self.push_triangle(poly[0], poly[i], poly[i + 1], material);
        }
    }

    fn into_mesh(self) -> Mesh {
        Mesh::new(self.vertices, self.faces)
    }
}

impl PlaneSlicer {
    /// Keep the part of a triangle on side `sign` (+1 upper, -1 lower)
    fn clip(&self, corners: &[(Vec3, f32); 3], sign: f32, section: Option<&mut Vec<Vec3>>) -> Vec<Vec3> {
        let mut out = Vec::with_capacity(4);
        let mut crossings = Vec::new();
        for i in 0..3 {
            let (pc, dc) = corners[i];
            let (pn, dn) = corners[(i + 1) % 3];
            let cur_in = sign * dc >= -self.epsilon;
            let next_in = sign * dn >= -self.epsilon;
            if cur_in {
                out.push(pc);
            }
            if cur_in != next_in {
                let t = dc / (dc - dn);
                let crossing = pc + (pn - pc) * t;
                out.push(crossing);
                crossings.push(crossing);
            }
        }
        if let Some(section) = section {
            section.extend(crossings);
            section.extend(
                corners
                    .iter()
                    .filter(|(_, d)| d.abs() <= self.epsilon)
                    .map(|(p, _)| *p),
            );
        }
        out
    }
}

impl MeshSlicer for PlaneSlicer {
    fn slice(
        &self,
        mesh: &Mesh,
        transform: &Transform,
        plane: &CutPlane,
    ) -> Result<Option<SlicedHull>, SliceError> {
        let normal = transform.dir_to_local(plane.normal);
        if !(normal.length_squared() > 0.5) {
            return Err(SliceError::SliceFailure(format!(
                "cut normal {:?} is not unit length",
                plane.normal
            )));
        }
        let normal = normal.normalize();
        let origin = transform.to_local(plane.point);

        let dist: Vec<f32> = mesh.vertices.iter().map(|v| normal.dot(*v - origin)).collect();
        let referenced = || {
            mesh.faces
                .iter()
                .flat_map(|f| f.indices)
                .filter_map(|i| dist.get(i as usize).copied())
        };
        mesh.validate()
            .map_err(|e| SliceError::SliceFailure(e.to_string()))?;
        let has_above = referenced().any(|d| d > self.epsilon);
        let has_below = referenced().any(|d| d < -self.epsilon);
        if !(has_above && has_below) {
            return Ok(None);
        }

        let mut upper = MeshAccum::default();
        let mut lower = MeshAccum::default();
        let mut section: Vec<Vec3> = Vec::new();

        for face in &mesh.faces {
            let corners = face
                .indices
                .map(|i| (mesh.vertices[i as usize], dist[i as usize]));
            if corners.iter().all(|(_, d)| d.abs() <= self.epsilon) {
                continue; // Lies in the cut, replaced by the cap
            }
            let above = self.clip(&corners, 1.0, Some(&mut section));
            let below = self.clip(&corners, -1.0, None);
            upper.push_polygon(&above, face.material);
            lower.push_polygon(&below, face.material);
        }

        // Cap the opening on both halves
        let mut ring: Vec<Vec3> = Vec::with_capacity(section.len());
        for p in section {
            if !ring.iter().any(|q| q.distance_squared(p) < 1e-10) {
                ring.push(p);
            }
        }
        if ring.len() >= 3 {
            let center = ring.iter().copied().sum::<Vec3>() / ring.len() as f32;
            let u = normal.any_orthonormal_vector();
            let w = normal.cross(u);
            ring.sort_by(|a, b| {
                let angle = |p: &Vec3| {
                    let rel = *p - center;
                    rel.dot(w).atan2(rel.dot(u))
                };
                angle(a).total_cmp(&angle(b))
            });
            for i in 0..ring.len() {
                let (a, b) = (ring[i], ring[(i + 1) % ring.len()]);
                // Lower cap faces +normal, upper cap faces -normal
                lower.push_triangle(center, a, b, MaterialId::CUT_FACE);
                upper.push_triangle(center, b, a, MaterialId::CUT_FACE);
            }
        }

        if upper.faces.is_empty() || lower.faces.is_empty() {
            return Ok(None);
        }
        Ok(Some(SlicedHull::new(upper.into_mesh(), lower.into_mesh())))
    }
}

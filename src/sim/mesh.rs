//! Triangle meshes in entity-local space

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::SliceError;

/// Material slot of a face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct MaterialId(pub u32);

impl MaterialId {
    /// Placeholder for faces created by a cut, before a material is chosen
    pub const CUT_FACE: Self = Self(u32::MAX);
}

/// A triangle with its material
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Face {
    pub indices: [u32; 3],
    pub material: MaterialId,
}

/// Indexed triangle mesh (counter-clockwise winding is outward)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub vertices: Vec<Vec3>,
    pub faces: Vec<Face>,
}

impl Mesh {
    pub fn new(vertices: Vec<Vec3>, faces: Vec<Face>) -> Self {
        Self { vertices, faces }
    }

    /// Axis-aligned box centered on the origin
    pub fn cuboid(half_extents: Vec3, material: MaterialId) -> Self {
        let h = half_extents;
        let vertices = vec![
            Vec3::new(-h.x, -h.y, -h.z),
            Vec3::new(h.x, -h.y, -h.z),
            Vec3::new(h.x, h.y, -h.z),
            Vec3::new(-h.x, h.y, -h.z),
            Vec3::new(-h.x, -h.y, h.z),
            Vec3::new(h.x, -h.y, h.z),
            Vec3::new(h.x, h.y, h.z),
            Vec3::new(-h.x, h.y, h.z),
        ];
        let quads: [[u32; 4]; 6] = [
            [0, 3, 2, 1], // -z
            [4, 5, 6, 7], // +z
            [0, 1, 5, 4], // -y
            [3, 7, 6, 2], // +y
            [0, 4, 7, 3], // -x
            [1, 2, 6, 5], // +x
        ];
        let faces = quads
            .iter()
            .flat_map(|q| {
                [
                    Face {
                        indices: [q[0], q[1], q[2]],
                        material,
                    },
                    Face {
                        indices: [q[0], q[2], q[3]],
                        material,
                    },
                ]
            })
            .collect();
        Self { vertices, faces }
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Every face index must point at a vertex
    pub fn validate(&self) -> Result<(), SliceError> {
        let count = self.vertices.len();
        for (f, face) in self.faces.iter().enumerate() {
            if let Some(&bad) = face.indices.iter().find(|&&i| i as usize >= count) {
                return Err(SliceError::InvalidMesh(format!(
                    "face {f} references vertex {bad} of {count}"
                )));
            }
        }
        Ok(())
    }

    /// Corners of a face
    #[inline]
    pub fn triangle(&self, face: &Face) -> [Vec3; 3] {
        face.indices.map(|i| self.vertices[i as usize])
    }

    /// Center of mass of the enclosed volume
    ///
    /// Falls back to the average of the indexed vertices when the mesh
    /// encloses no volume (open or flat).
    pub fn centroid(&self) -> Vec3 {
        if self.faces.is_empty() {
            return Vec3::ZERO;
        }
        let mut weighted = Vec3::ZERO;
        let mut volume = 0.0f32;
        for face in &self.faces {
            let [a, b, c] = self.triangle(face);
            // Tetrahedron (origin, a, b, c)
            let v = a.dot(b.cross(c)) / 6.0;
            weighted += (a + b + c) * (v / 4.0);
            volume += v;
        }
        if volume.abs() > 1e-9 {
            return weighted / volume;
        }

        let mut used = vec![false; self.vertices.len()];
        for face in &self.faces {
            for i in face.indices {
                used[i as usize] = true;
            }
        }
        let (sum, count) = self
            .vertices
            .iter()
            .zip(&used)
            .filter(|(_, used)| **used)
            .fold((Vec3::ZERO, 0usize), |(sum, n), (v, _)| (sum + *v, n + 1));
        sum / count.max(1) as f32
    }

    /// Material of the first face, if any
    pub fn primary_material(&self) -> Option<MaterialId> {
        self.faces
            .iter()
            .map(|f| f.material)
            .find(|m| *m != MaterialId::CUT_FACE)
    }

    /// Replace cut-face placeholders with a real material
    pub fn assign_cut_material(&mut self, material: MaterialId) {
        for face in &mut self.faces {
            if face.material == MaterialId::CUT_FACE {
                face.material = material;
            }
        }
    }

    /// Signed volume (positive for closed outward-wound meshes)
    pub fn volume(&self) -> f32 {
        self.faces
            .iter()
            .map(|f| {
                let [a, b, c] = self.triangle(f);
                a.dot(b.cross(c)) / 6.0
            })
            .sum()
    }
}

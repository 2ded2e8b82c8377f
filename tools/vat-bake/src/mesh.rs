//! Read-only mesh snapshots

use glam::Vec3;
use vat_common::{Bounds, Result, VatError, compute_bounds};

use crate::geometry::triangle_normal;

/// Immutable per-LOD mesh arrays
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshSnapshot {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub triangles: Vec<[u32; 3]>,
}

impl MeshSnapshot {
    /// Build a snapshot, checking array lengths and triangle indices
    pub fn new(positions: Vec<Vec3>, normals: Vec<Vec3>, triangles: Vec<[u32; 3]>) -> Result<Self> {
        let mesh = Self {
            positions,
            normals,
            triangles,
        };
        mesh.validate()?;
        Ok(mesh)
    }

    /// Build a snapshot with area-weighted vertex normals
    pub fn from_positions(positions: Vec<Vec3>, triangles: Vec<[u32; 3]>) -> Result<Self> {
        let mut mesh = Self {
            normals: vec![Vec3::ZERO; positions.len()],
            positions,
            triangles,
        };
        mesh.validate()?;
        mesh.normals = compute_vertex_normals(&mesh.positions, &mesh.triangles);
        Ok(mesh)
    }

    pub fn validate(&self) -> Result<()> {
        if self.normals.len() != self.positions.len() {
            return Err(VatError::invalid_input(format!(
                "mesh has {} positions but {} normals",
                self.positions.len(),
                self.normals.len()
            )));
        }
        let num_vertices = self.positions.len();
        if let Some((t, tri)) = self
            .triangles
            .iter()
            .enumerate()
            .find(|(_, tri)| tri.iter().any(|&i| i as usize >= num_vertices))
        {
            return Err(VatError::invalid_input(format!(
                "triangle {} {:?} references a vertex past {}",
                t, tri, num_vertices
            )));
        }
        Ok(())
    }

    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() || self.triangles.is_empty()
    }

    /// Corner positions of triangle `index`
    #[inline]
    pub fn triangle_corners(&self, index: usize) -> [Vec3; 3] {
        self.triangles[index].map(|i| self.positions[i as usize])
    }

    pub fn bounds(&self) -> Bounds {
        compute_bounds(&self.positions)
    }
}

/// Area-weighted vertex normals; isolated vertices get a zero normal
pub fn compute_vertex_normals(positions: &[Vec3], triangles: &[[u32; 3]]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for tri in triangles {
        let [a, b, c] = tri.map(|i| positions[i as usize]);
        let face = triangle_normal(a, b, c);
        for &i in tri {
            normals[i as usize] += face;
        }
    }
    for normal in &mut normals {
        *normal = normal.normalize_or_zero();
    }
    normals
}

/// Static (target) mesh with its LODs
#[derive(Debug, Clone, Default)]
pub struct StaticMesh {
    pub name: String,
    pub lods: Vec<MeshSnapshot>,
}

impl StaticMesh {
    pub fn new(name: impl Into<String>, lods: Vec<MeshSnapshot>) -> Self {
        Self {
            name: name.into(),
            lods,
        }
    }

    pub fn lod(&self, index: usize) -> Result<&MeshSnapshot> {
        self.lods.get(index).ok_or_else(|| {
            VatError::invalid_input(format!(
                "static mesh '{}' has no LOD {} ({} LODs)",
                self.name,
                index,
                self.lods.len()
            ))
        })
    }
}

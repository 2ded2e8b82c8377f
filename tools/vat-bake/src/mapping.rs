//! Static-to-skeletal mesh correspondence
//!
//! Every target (static mesh) vertex is bound to its `N` closest driver
//! (skeletal mesh) triangles. Each binding remembers where on the triangle
//! the vertex projected (barycentric coordinates), how much it contributes
//! (inverse-distance weight) and the vertex position/normal expressed in the
//! triangle's local frame. Deforming re-evaluates those frames on the posed
//! driver triangles and blends the results.
//!
//! A mapping is tied to the exact meshes it was built from. Any change to
//! either mesh requires building a new one.

use glam::Vec3;
use hashbrown::HashMap;
use rayon::prelude::*;
use smallvec::SmallVec;
use vat_common::{MaxInfluenceRecord, Result, VatError, WEIGHT_SUM};

use crate::geometry::{
    barycentric_coordinates, closest_point_on_triangle, inverse_distance_weights, point_at_barycentric,
    triangle_frame, triangle_tangent_corner,
};
use crate::mesh::MeshSnapshot;

/// One target vertex bound to one driver triangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleBinding {
    pub triangle: u32,
    pub barycentric: Vec3,
    /// Inverse-distance weight; weights of one vertex sum to 1
    pub weight: f32,
    /// Triangle corner the local frame's tangent points to
    pub tangent_corner: u8,
    /// Target position in the triangle's reference frame
    pub local_position: Vec3,
    /// Target normal in the triangle's reference frame
    pub local_normal: Vec3,
}

/// Bindings of one target vertex, closest triangle first
pub type MappingEntry = SmallVec<[TriangleBinding; 4]>;

/// Built correspondence between a target mesh and a driver mesh
#[derive(Debug, Clone)]
pub struct SourceToDriverMapping {
    entries: Vec<MappingEntry>,
    driver_triangles: Vec<[u32; 3]>,
    num_driver_vertices: usize,
}

impl SourceToDriverMapping {
    /// Bind every `target` vertex to its `num_driver_triangles` closest
    /// `driver` triangles.
    ///
    /// Candidate triangles are ranked by squared distance to their closest
    /// point, ties going to the lower triangle index. `sigma` sharpens the
    /// inverse-distance falloff. Asking for more triangles than the driver
    /// has binds to all of them.
    pub fn build(
        target: &MeshSnapshot,
        driver: &MeshSnapshot,
        num_driver_triangles: usize,
        sigma: f32,
    ) -> Result<Self> {
        if target.is_empty() {
            return Err(VatError::invalid_input(format!(
                "target mesh has {} vertices and {} triangles",
                target.num_vertices(),
                target.num_triangles()
            )));
        }
        if driver.is_empty() {
            return Err(VatError::invalid_input(format!(
                "driver mesh has {} vertices and {} triangles",
                driver.num_vertices(),
                driver.num_triangles()
            )));
        }
        if num_driver_triangles == 0 {
            return Err(VatError::invalid_input("number of driver triangles must be at least 1"));
        }
        if !(sigma > 0.0 && sigma.is_finite()) {
            return Err(VatError::invalid_input(format!(
                "inverse distance sigma must be positive, got {}",
                sigma
            )));
        }
        target.validate()?;
        driver.validate()?;

        let count = num_driver_triangles.min(driver.num_triangles());
        let entries: Vec<MappingEntry> = (0..target.num_vertices())
            .into_par_iter()
            .map(|vertex| bind_vertex(target.positions[vertex], target.normals[vertex], driver, count, sigma))
            .collect();

        tracing::info!(
            "Built mesh mapping: {} target vertices -> {} driver triangles ({} per vertex, sigma {})",
            entries.len(),
            driver.num_triangles(),
            count,
            sigma
        );

        Ok(Self {
            entries,
            driver_triangles: driver.triangles.clone(),
            num_driver_vertices: driver.num_vertices(),
        })
    }

    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }

    pub fn num_target_vertices(&self) -> usize {
        self.entries.len()
    }

    pub fn num_driver_vertices(&self) -> usize {
        self.num_driver_vertices
    }

    fn check_driver_len(&self, len: usize) -> Result<()> {
        if len != self.num_driver_vertices {
            tracing::warn!(
                "Driver data has {} vertices, mapping was built for {}",
                len,
                self.num_driver_vertices
            );
            return Err(VatError::TopologyMismatch {
                expected: self.num_driver_vertices,
                actual: len,
            });
        }
        Ok(())
    }

    /// Target positions and unit normals for one posed driver frame
    pub fn deform_positions_and_normals(&self, driver_positions: &[Vec3]) -> Result<(Vec<Vec3>, Vec<Vec3>)> {
        self.check_driver_len(driver_positions.len())?;

        let mut positions = Vec::with_capacity(self.entries.len());
        let mut normals = Vec::with_capacity(self.entries.len());

        for entry in &self.entries {
            let mut position = Vec3::ZERO;
            let mut normal = Vec3::ZERO;
            for binding in entry {
                let [a, b, c] = self.driver_triangles[binding.triangle as usize].map(|i| driver_positions[i as usize]);
                let anchor = point_at_barycentric(a, b, c, binding.barycentric);
                let frame = triangle_frame(anchor, a, b, c, binding.tangent_corner);
                position += frame.transform_point3(binding.local_position) * binding.weight;
                normal += frame.transform_vector3(binding.local_normal) * binding.weight;
            }
            positions.push(position);
            normals.push(normal.normalize_or_zero());
        }

        Ok((positions, normals))
    }

    /// Carry driver skin weights over to the target vertices.
    ///
    /// Each corner of each bound triangle contributes
    /// `barycentric * triangle weight * byte / 255` to its bones; the merged
    /// contributions are renormalized into a 255-sum record.
    pub fn project_skin_weights(&self, driver_weights: &[MaxInfluenceRecord]) -> Result<Vec<MaxInfluenceRecord>> {
        self.check_driver_len(driver_weights.len())?;

        let mut contributions: HashMap<u16, f32> = HashMap::new();
        let mut pairs: Vec<(u16, f32)> = Vec::new();

        let projected = self
            .entries
            .iter()
            .map(|entry| {
                contributions.clear();
                for binding in entry {
                    let corners = self.driver_triangles[binding.triangle as usize];
                    for (corner, &vertex) in corners.iter().enumerate() {
                        let scale = binding.barycentric[corner].max(0.0) * binding.weight;
                        if scale <= 0.0 {
                            continue;
                        }
                        for (bone, weight) in driver_weights[vertex as usize].influences() {
                            *contributions.entry(bone).or_insert(0.0) += scale * weight as f32 / WEIGHT_SUM as f32;
                        }
                    }
                }
                pairs.clear();
                pairs.extend(contributions.iter().map(|(&bone, &weight)| (bone, weight)));
                MaxInfluenceRecord::from_contributions(&pairs)
            })
            .collect();

        Ok(projected)
    }
}

fn bind_vertex(position: Vec3, normal: Vec3, driver: &MeshSnapshot, count: usize, sigma: f32) -> MappingEntry {
    let mut candidates: Vec<(f32, u32, Vec3)> = (0..driver.num_triangles())
        .map(|t| {
            let [a, b, c] = driver.triangle_corners(t);
            let closest = closest_point_on_triangle(position, a, b, c);
            (closest.distance_squared(position), t as u32, closest)
        })
        .collect();

    let by_distance = |x: &(f32, u32, Vec3), y: &(f32, u32, Vec3)| x.0.total_cmp(&y.0).then(x.1.cmp(&y.1));
    if count < candidates.len() {
        candidates.select_nth_unstable_by(count - 1, by_distance);
        candidates.truncate(count);
    }
    candidates.sort_by(by_distance);

    let closest_points: SmallVec<[Vec3; 4]> = candidates.iter().map(|c| c.2).collect();
    let weights = inverse_distance_weights(position, &closest_points, sigma);

    candidates
        .iter()
        .zip(weights)
        .map(|(&(_, triangle, closest), weight)| {
            let [a, b, c] = driver.triangle_corners(triangle as usize);
            let barycentric = barycentric_coordinates(closest, a, b, c);
            let anchor = point_at_barycentric(a, b, c, barycentric);
            let tangent_corner = triangle_tangent_corner(anchor, a, b, c);
            let to_local = triangle_frame(anchor, a, b, c, tangent_corner).inverse();
            TriangleBinding {
                triangle,
                barycentric,
                weight,
                tangent_corner,
                local_position: to_local.transform_point3(position),
                local_normal: to_local.transform_vector3(normal),
            }
        })
        .collect()
}

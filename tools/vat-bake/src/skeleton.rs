//! Skeleton, poses and CPU skinning of the driver mesh
//!
//! Bones are stored parent-first. Raw bones come first; virtual bones
//! (computed helpers that never carry skin weights) follow them and are
//! excluded from bone textures.

use glam::{Mat4, Vec3};
use hashbrown::HashMap;
use vat_common::{MaxInfluenceRecord, Result, VatError};

use crate::mesh::MeshSnapshot;
use crate::transform::Transform;

/// One skeleton joint
#[derive(Debug, Clone, PartialEq)]
pub struct Bone {
    pub name: String,
    /// Parent bone index, always lower than this bone's index
    pub parent: Option<usize>,
    /// Reference (bind) pose, relative to the parent
    pub reference: Transform,
    pub is_virtual: bool,
}

impl Bone {
    pub fn new(name: impl Into<String>, parent: Option<usize>, reference: Transform) -> Self {
        Self {
            name: name.into(),
            parent,
            reference,
            is_virtual: false,
        }
    }

    pub fn new_virtual(name: impl Into<String>, parent: Option<usize>, reference: Transform) -> Self {
        Self {
            is_virtual: true,
            ..Self::new(name, parent, reference)
        }
    }
}

/// Validated bone hierarchy
#[derive(Debug, Clone)]
pub struct Skeleton {
    bones: Vec<Bone>,
    name_to_index: HashMap<String, usize>,
    raw_bone_count: usize,
    reference_component: Vec<Transform>,
}

impl Skeleton {
    pub fn new(bones: Vec<Bone>) -> Result<Self> {
        if bones.is_empty() {
            return Err(VatError::invalid_input("skeleton has no bones"));
        }

        let mut name_to_index = HashMap::with_capacity(bones.len());
        let mut raw_bone_count = 0;

        for (index, bone) in bones.iter().enumerate() {
            if bone.parent.is_some_and(|parent| parent >= index) {
                return Err(VatError::invalid_input(format!(
                    "bone '{}' ({}) must come after its parent {:?}",
                    bone.name, index, bone.parent
                )));
            }
            if !bone.reference.is_valid() {
                return Err(VatError::invalid_input(format!(
                    "bone '{}' has an invalid reference transform",
                    bone.name
                )));
            }
            if bone.is_virtual {
                continue;
            }
            if raw_bone_count != index {
                return Err(VatError::invalid_input(format!(
                    "raw bone '{}' ({}) follows a virtual bone",
                    bone.name, index
                )));
            }
            raw_bone_count += 1;
        }

        for (index, bone) in bones.iter().enumerate() {
            if name_to_index.insert(bone.name.clone(), index).is_some() {
                return Err(VatError::invalid_input(format!("duplicate bone name '{}'", bone.name)));
            }
        }

        let reference_component = compose_component(&bones, bones.iter().map(|b| b.reference));

        Ok(Self {
            bones,
            name_to_index,
            raw_bone_count,
            reference_component,
        })
    }

    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    /// All bones, virtual included
    pub fn num_bones(&self) -> usize {
        self.bones.len()
    }

    /// Bones excluding virtual bones
    pub fn raw_bone_count(&self) -> usize {
        self.raw_bone_count
    }

    pub fn bone_index(&self, name: &str) -> Option<usize> {
        self.name_to_index.get(name).copied()
    }

    pub fn has_raw_bone(&self, name: &str) -> bool {
        self.bone_index(name).is_some_and(|i| i < self.raw_bone_count)
    }

    pub fn raw_bone_names(&self) -> Vec<&str> {
        self.bones[..self.raw_bone_count]
            .iter()
            .map(|b| b.name.as_str())
            .collect()
    }

    /// Component-space reference transforms of the raw bones, by raw bone index
    pub fn reference_bone_transforms(&self) -> &[Transform] {
        &self.reference_component[..self.raw_bone_count]
    }

    pub fn reference_pose(&self) -> Pose {
        Pose {
            local: self.bones.iter().map(|b| b.reference).collect(),
            component: self.reference_component.clone(),
        }
    }
}

fn compose_component(bones: &[Bone], local: impl Iterator<Item = Transform>) -> Vec<Transform> {
    let mut component: Vec<Transform> = Vec::with_capacity(bones.len());
    for (bone, local) in bones.iter().zip(local) {
        let transform = match bone.parent {
            Some(parent) => component[parent] * local,
            None => local,
        };
        component.push(transform);
    }
    component
}

/// Local and component-space transforms of every bone at one instant
#[derive(Debug, Clone, PartialEq)]
pub struct Pose {
    local: Vec<Transform>,
    component: Vec<Transform>,
}

impl Pose {
    /// Resolve local transforms through the parent chain
    pub fn from_local(skeleton: &Skeleton, local: Vec<Transform>) -> Result<Self> {
        if local.len() != skeleton.num_bones() {
            return Err(VatError::invalid_input(format!(
                "pose has {} transforms for a skeleton of {} bones",
                local.len(),
                skeleton.num_bones()
            )));
        }
        let component = compose_component(&skeleton.bones, local.iter().copied());
        Ok(Self { local, component })
    }

    pub fn local(&self) -> &[Transform] {
        &self.local
    }

    pub fn component(&self) -> &[Transform] {
        &self.component
    }

    /// Per-bone `component * inverse(reference component)` skinning matrices
    pub fn ref_to_local(&self, skeleton: &Skeleton) -> Vec<Mat4> {
        self.component
            .iter()
            .zip(&skeleton.reference_component)
            .map(|(current, reference)| current.to_mat4() * reference.to_mat4().inverse())
            .collect()
    }
}

/// One LOD of the driver mesh: reference-pose geometry plus skin weights
#[derive(Debug, Clone, Default)]
pub struct SkeletalLod {
    pub mesh: MeshSnapshot,
    pub skin_weights: Vec<MaxInfluenceRecord>,
}

/// Driver mesh bound to a skeleton
#[derive(Debug, Clone)]
pub struct SkeletalMesh {
    pub name: String,
    pub skeleton: Skeleton,
    lods: Vec<SkeletalLod>,
}

impl SkeletalMesh {
    pub fn new(name: impl Into<String>, skeleton: Skeleton, lods: Vec<SkeletalLod>) -> Result<Self> {
        let name = name.into();
        for (index, lod) in lods.iter().enumerate() {
            lod.mesh.validate()?;
            if lod.skin_weights.len() != lod.mesh.num_vertices() {
                return Err(VatError::invalid_input(format!(
                    "skeletal mesh '{}' LOD {}: {} vertices but {} skin weight records",
                    name,
                    index,
                    lod.mesh.num_vertices(),
                    lod.skin_weights.len()
                )));
            }
            if let Some(bone) = lod
                .skin_weights
                .iter()
                .flat_map(|r| r.influences())
                .map(|(bone, _)| bone as usize)
                .find(|&bone| bone >= skeleton.raw_bone_count())
            {
                return Err(VatError::invalid_input(format!(
                    "skeletal mesh '{}' LOD {}: skin weight references bone {} of {} raw bones",
                    name,
                    index,
                    bone,
                    skeleton.raw_bone_count()
                )));
            }
        }
        Ok(Self { name, skeleton, lods })
    }

    pub fn num_lods(&self) -> usize {
        self.lods.len()
    }

    pub fn lod(&self, index: usize) -> Result<&SkeletalLod> {
        self.lods.get(index).ok_or_else(|| {
            VatError::invalid_input(format!(
                "skeletal mesh '{}' has no LOD {} ({} LODs)",
                self.name,
                index,
                self.lods.len()
            ))
        })
    }

    /// Raw per-vertex skin weights of a LOD, unreduced
    pub fn get_skin_weights(&self, lod: usize) -> Result<&[MaxInfluenceRecord]> {
        Ok(&self.lod(lod)?.skin_weights)
    }

    pub fn compute_skinned_vertex_positions(&self, pose: &Pose, lod: usize) -> Result<Vec<Vec3>> {
        Ok(self.compute_skinned_vertices(pose, lod)?.0)
    }

    /// Linear-blend skinning of a LOD's reference geometry into `pose`.
    ///
    /// Returns positions and unit normals in the reference vertex order.
    /// Weights are normalized per vertex; a vertex without weight follows
    /// bone 0.
    pub fn compute_skinned_vertices(&self, pose: &Pose, lod: usize) -> Result<(Vec<Vec3>, Vec<Vec3>)> {
        let lod_data = self.lod(lod)?;
        if pose.component.len() != self.skeleton.num_bones() {
            return Err(VatError::invalid_input(format!(
                "pose has {} bones, skeleton '{}' has {}",
                pose.component.len(),
                self.name,
                self.skeleton.num_bones()
            )));
        }

        let skinning = pose.ref_to_local(&self.skeleton);
        let mesh = &lod_data.mesh;
        let mut positions = Vec::with_capacity(mesh.num_vertices());
        let mut normals = Vec::with_capacity(mesh.num_vertices());

        for ((position, normal), record) in mesh.positions.iter().zip(&mesh.normals).zip(&lod_data.skin_weights) {
            let total = record.total_weight();
            let mut skinned_position = Vec3::ZERO;
            let mut skinned_normal = Vec3::ZERO;

            if total == 0 {
                skinned_position = skinning[0].transform_point3(*position);
                skinned_normal = skinning[0].transform_vector3(*normal);
            } else {
                for (bone, weight) in record.influences() {
                    let w = weight as f32 / total as f32;
                    let matrix = &skinning[bone as usize];
                    skinned_position += matrix.transform_point3(*position) * w;
                    skinned_normal += matrix.transform_vector3(*normal) * w;
                }
            }

            positions.push(skinned_position);
            normals.push(skinned_normal.normalize_or_zero());
        }

        Ok((positions, normals))
    }
}

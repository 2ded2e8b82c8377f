//! Procedural meshes, skeletons and clips shared by the integration tests

#![allow(dead_code)]

use glam::{Quat, Vec3};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use vat_bake::{
    AnimationClip, BakeProgress, Bone, BoneTrack, KeyframedClip, MeshSnapshot, SkeletalLod, SkeletalMesh, Skeleton,
    StaticMesh, Transform,
};
use vat_common::{MaxInfluenceRecord, Result};

/// Install a test-friendly subscriber once; later calls are no-ops
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Chain of `num_bones` bones stacked one unit apart along +Y
pub fn chain_skeleton(num_bones: usize) -> Skeleton {
    let bones = (0..num_bones)
        .map(|i| {
            if i == 0 {
                Bone::new("bone_0", None, Transform::IDENTITY)
            } else {
                Bone::new(format!("bone_{}", i), Some(i - 1), Transform::from_translation(Vec3::Y))
            }
        })
        .collect();
    Skeleton::new(bones).unwrap()
}

/// Root bone with `num_bones - 1` children, all at the origin
pub fn flat_skeleton(num_bones: usize) -> Skeleton {
    let bones = (0..num_bones)
        .map(|i| {
            let parent = if i == 0 { None } else { Some(0) };
            Bone::new(format!("bone_{}", i), parent, Transform::IDENTITY)
        })
        .collect();
    Skeleton::new(bones).unwrap()
}

/// Vertical strip of quads in the XY plane, `levels` quads tall, shifted by `offset`
pub fn strip(levels: u32, offset: Vec3) -> MeshSnapshot {
    let mut positions = Vec::new();
    for level in 0..=levels {
        positions.push(Vec3::new(0.0, level as f32, 0.0) + offset);
        positions.push(Vec3::new(1.0, level as f32, 0.0) + offset);
    }
    let mut triangles = Vec::new();
    for level in 0..levels {
        let i = level * 2;
        triangles.push([i, i + 1, i + 3]);
        triangles.push([i, i + 3, i + 2]);
    }
    MeshSnapshot::from_positions(positions, triangles).unwrap()
}

/// Strip rigidly skinned level by level to the skeleton's raw bones
pub fn skinned_strip(skeleton: Skeleton, levels: u32) -> SkeletalMesh {
    let mesh = strip(levels, Vec3::ZERO);
    let last_bone = skeleton.raw_bone_count() - 1;
    let skin_weights = (0..mesh.num_vertices())
        .map(|v| MaxInfluenceRecord::from_pairs(&[(((v / 2).min(last_bone)) as u16, 255)]))
        .collect();
    SkeletalMesh::new("Strip", skeleton, vec![SkeletalLod { mesh, skin_weights }]).unwrap()
}

/// Static copy of the strip floating slightly in front of the driver
pub fn static_strip(levels: u32) -> StaticMesh {
    StaticMesh::new("StaticStrip", vec![strip(levels, Vec3::new(0.1, 0.2, 0.05))])
}

/// Static mesh holding a single vertex
pub fn single_vertex_mesh(position: Vec3) -> StaticMesh {
    let mesh = MeshSnapshot::new(vec![position], vec![Vec3::Z], vec![[0, 0, 0]]).unwrap();
    StaticMesh::new("Point", vec![mesh])
}

/// Clip that holds the reference pose for `num_keys` keys
pub fn still_clip(name: &str, num_keys: usize) -> Arc<dyn AnimationClip> {
    Arc::new(KeyframedClip::new(name, 30.0, num_keys, vec![]).unwrap())
}

/// Clip turning `bone` about +Z from 0 to `angle` radians over `num_keys` keys
pub fn bend_clip(name: &str, bone: &str, num_keys: usize, angle: f32) -> Arc<dyn AnimationClip> {
    let last = (num_keys.max(2) - 1) as f32;
    let rotations = (0..num_keys)
        .map(|i| Quat::from_rotation_z(angle * i as f32 / last))
        .collect();
    Arc::new(KeyframedClip::new(name, 30.0, num_keys, vec![BoneTrack::new(bone).with_rotations(rotations)]).unwrap())
}

/// Records every progress callback
#[derive(Debug, Default)]
pub struct CountingProgress {
    pub clips: Vec<(usize, String, usize)>,
    pub frames: usize,
}

impl BakeProgress for CountingProgress {
    fn begin_clip(&mut self, clip_index: usize, name: &str, num_samples: usize) {
        self.clips.push((clip_index, name.to_string(), num_samples));
    }

    fn frame(&mut self, _clip_index: usize, _sample: usize) {
        self.frames += 1;
    }
}

/// Clip wrapper counting how often its key count is queried
pub struct KeyQueryCounter {
    inner: Arc<dyn AnimationClip>,
    queries: AtomicUsize,
}

impl KeyQueryCounter {
    pub fn new(inner: Arc<dyn AnimationClip>) -> Self {
        Self {
            inner,
            queries: AtomicUsize::new(0),
        }
    }

    /// Queries since the last reset
    pub fn reset(&self) -> usize {
        self.queries.swap(0, Ordering::SeqCst)
    }
}

impl AnimationClip for KeyQueryCounter {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn num_keys(&self) -> usize {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.inner.num_keys()
    }

    fn frame_rate(&self) -> f32 {
        self.inner.frame_rate()
    }

    fn evaluate_local(&self, skeleton: &Skeleton, time: f32) -> Result<Vec<Transform>> {
        self.inner.evaluate_local(skeleton, time)
    }
}

//! Vertex animation texture baker
//!
//! Plays skeletal animation clips on a driver (skeletal) mesh, carries the
//! motion over to a static target mesh and packs the result into texel
//! grids a shader can decode:
//!
//! - **Vertex mode**: per target vertex position deltas and normals, one
//!   texture row block per frame.
//! - **Bone mode**: per bone positions and rotations (reference pose first),
//!   plus a two-frame texture of four bone indices and weights per vertex.
//!
//! # Modules
//!
//! - [`geometry`] - Closest points, barycentrics, triangle frames, inverse-distance weights
//! - [`transform`] - TRS transforms and axis-angle decomposition
//! - [`mesh`] - Read-only mesh snapshots
//! - [`skeleton`] - Skeletons, poses and CPU skinning
//! - [`mapping`] - Static-to-skeletal mesh correspondence
//! - [`animation`] - Clips, clip validation and frame sampling
//! - [`settings`] - TOML bake settings
//! - [`bake`] - End-to-end bake
//! - [`metadata`] - Metadata and material parameters for consumers

pub mod animation;
pub mod bake;
pub mod geometry;
pub mod mapping;
pub mod mesh;
pub mod metadata;
pub mod settings;
pub mod skeleton;
pub mod transform;

pub use animation::{
    AnimInfo, AnimationClip, AnimationSampler, BakeProgress, BoneTrack, ClipDescriptor, FrameRange, FrameStreams,
    KeyframedClip, NoProgress, ResolvedClip, SampledAnimations, resolve_clips,
};
pub use bake::{BakeOutput, BoneTextures, VertexTextures, bake, normalize_and_pack};
pub use mapping::{MappingEntry, SourceToDriverMapping, TriangleBinding};
pub use mesh::{MeshSnapshot, StaticMesh};
pub use metadata::{BakeMetadata, MaterialParameters, extended_bounds};
pub use settings::{BakeMode, BakeSettings, NumBoneInfluences, RootTransform, load_settings};
pub use skeleton::{Bone, Pose, SkeletalLod, SkeletalMesh, Skeleton};
pub use transform::{Transform, decompose_transform};

pub use vat_common::{Result, VatError};

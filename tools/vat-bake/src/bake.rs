//! Bake orchestration
//!
//! Validates everything up front (settings, LODs, bone limits, clip ranges
//! and texture sizes), then maps, samples and packs. Any failure aborts the
//! bake; nothing partial is returned.

use vat_common::{
    Bounds, FourInfluenceRecord, Result, TexelBuffer, TextureLayout, VatError, Vec3Stream, compute_bounds,
    find_best_resolution, normalize_axis_angles, normalize_normals, normalize_positions, pack_skin_weights,
    pack_to_texels, reduce_skin_weights, vertex_uvs,
};

use crate::animation::{AnimationSampler, BakeProgress, ClipDescriptor, FrameStreams, resolve_clips};
use crate::mapping::SourceToDriverMapping;
use crate::mesh::StaticMesh;
use crate::metadata::BakeMetadata;
use crate::settings::{BakeMode, BakeSettings};
use crate::skeleton::SkeletalMesh;

/// Position deltas and normals of every target vertex
#[derive(Debug, Clone, PartialEq)]
pub struct VertexTextures {
    pub layout: TextureLayout,
    pub bounds: Bounds,
    pub positions: TexelBuffer,
    pub normals: TexelBuffer,
}

/// Bone transforms plus the per-vertex weights that bind the target to them
#[derive(Debug, Clone, PartialEq)]
pub struct BoneTextures {
    pub layout: TextureLayout,
    pub bounds: Bounds,
    pub positions: TexelBuffer,
    pub rotations: TexelBuffer,
    pub weights_layout: TextureLayout,
    pub weights: TexelBuffer,
    pub skin_weights: Vec<FourInfluenceRecord>,
}

/// Result of a successful bake
#[derive(Debug, Clone, PartialEq)]
pub struct BakeOutput {
    pub metadata: BakeMetadata,
    pub vertex: Option<VertexTextures>,
    pub bone: Option<BoneTextures>,
    /// Per target vertex texel-centre UV into the position (vertex mode) or
    /// weight (bone mode) texture
    pub uvs: Vec<[f32; 2]>,
}

fn find_layout(num_frames: usize, elements_per_frame: usize, settings: &BakeSettings) -> Result<TextureLayout> {
    find_best_resolution(
        num_frames,
        elements_per_frame,
        settings.max_height,
        settings.max_width,
        settings.enforce_power_of_two,
    )
}

/// Lay out, normalize against its own bounds and quantize a position stream
pub fn normalize_and_pack(stream: &Vec3Stream, settings: &BakeSettings) -> Result<(TextureLayout, TexelBuffer, Bounds)> {
    let layout = find_layout(stream.num_frames(), stream.elements_per_frame(), settings)?;
    let bounds = compute_bounds(stream.as_slice());
    let normalized = normalize_positions(stream.as_slice(), &bounds);
    let texels = pack_to_texels(&normalized, stream.num_frames(), &layout, settings.precision)?;
    Ok((layout, texels, bounds))
}

/// Bake `clips` played on `skeletal_mesh` onto `static_mesh`
pub fn bake(
    static_mesh: &StaticMesh,
    skeletal_mesh: &SkeletalMesh,
    clips: &[ClipDescriptor],
    settings: &BakeSettings,
    progress: &mut dyn BakeProgress,
) -> Result<BakeOutput> {
    settings.validate()?;
    let target = static_mesh.lod(settings.static_lod)?;
    let driver = skeletal_mesh.lod(settings.skeletal_lod)?;
    if target.num_vertices() == 0 {
        return Err(VatError::invalid_input(format!(
            "static mesh '{}' LOD {} has no vertices",
            static_mesh.name, settings.static_lod
        )));
    }

    let skeleton = &skeletal_mesh.skeleton;
    let num_bones = skeleton.raw_bone_count();
    let attach_bone = match (settings.mode, settings.attach_to_bone.as_deref()) {
        (BakeMode::Bone, Some(name)) => {
            if !skeleton.has_raw_bone(name) {
                return Err(VatError::invalid_input(format!(
                    "attach bone '{}' is not a raw bone of skeletal mesh '{}'",
                    name, skeletal_mesh.name
                )));
            }
            skeleton.bone_index(name)
        }
        _ => None,
    };
    settings.precision.check_bone_count(num_bones)?;

    let resolved = resolve_clips(clips, settings.sample_rate)?;
    let num_frames: usize = resolved.iter().map(|c| c.num_samples).sum();
    let layout = match settings.mode {
        BakeMode::Vertex => find_layout(num_frames, target.num_vertices(), settings)?,
        BakeMode::Bone => find_layout(num_frames + 1, num_bones, settings)?,
    };
    let weights_layout = match settings.mode {
        BakeMode::Vertex => None,
        BakeMode::Bone => Some(find_layout(2, target.num_vertices(), settings)?),
    };

    tracing::info!(
        "Baking {} frames from {} clips ({:?} mode, {}x{} texture, {} rows per frame)",
        num_frames,
        resolved.len(),
        settings.mode,
        layout.width,
        layout.height,
        layout.rows_per_frame
    );

    let sampler = AnimationSampler::new(skeletal_mesh, settings.skeletal_lod, settings.sample_rate)?
        .with_root_transform(settings.root_transform.to_transform());

    let mapping = if attach_bone.is_none() {
        Some(SourceToDriverMapping::build(
            target,
            &driver.mesh,
            settings.num_driver_triangles,
            settings.sigma,
        )?)
    } else {
        None
    };

    let (sampled, vertex, bone) = match (settings.mode, mapping.as_ref()) {
        (BakeMode::Vertex, Some(mapping)) => {
            let sampled = sampler.sample_vertices_resolved(mapping, target, &resolved, progress)?;
            let FrameStreams::Vertex { deltas, normals } = &sampled.streams else {
                return Err(VatError::invalid_input("vertex sampling produced bone streams"));
            };

            let (layout, positions, bounds) = normalize_and_pack(deltas, settings)?;
            let normals = pack_to_texels(
                &normalize_normals(normals.as_slice()),
                normals.num_frames(),
                &layout,
                settings.precision,
            )?;

            let textures = VertexTextures {
                layout,
                bounds,
                positions,
                normals,
            };
            (sampled, Some(textures), None)
        }
        (BakeMode::Bone, mapping) => {
            let skin_weights = match (attach_bone, mapping) {
                (Some(bone), _) => {
                    tracing::info!("Attaching all vertices to bone {}", bone);
                    vec![
                        FourInfluenceRecord {
                            bone_indices: [bone as u16; 4],
                            weights: [255, 0, 0, 0],
                        };
                        target.num_vertices()
                    ]
                }
                (None, Some(mapping)) => reduce_skin_weights(&mapping.project_skin_weights(&driver.skin_weights)?),
                (None, None) => return Err(VatError::invalid_input("bone mode needs a mesh mapping")),
            };

            let sampled = sampler.sample_bones_resolved(&resolved, progress)?;
            let FrameStreams::Bone { positions, rotations } = &sampled.streams else {
                return Err(VatError::invalid_input("bone sampling produced vertex streams"));
            };

            let (layout, position_texels, bounds) = normalize_and_pack(positions, settings)?;
            let rotation_texels = pack_to_texels(
                &normalize_axis_angles(rotations.as_slice()),
                rotations.num_frames(),
                &layout,
                settings.precision,
            )?;

            let weights_layout = weights_layout
                .ok_or_else(|| VatError::invalid_input("bone mode needs a weight texture layout"))?;
            let weights = pack_skin_weights(&skin_weights, num_bones, &weights_layout, settings.precision)?;

            let textures = BoneTextures {
                layout,
                bounds,
                positions: position_texels,
                rotations: rotation_texels,
                weights_layout,
                weights,
                skin_weights,
            };
            (sampled, None, Some(textures))
        }
        (BakeMode::Vertex, None) => return Err(VatError::invalid_input("vertex mode needs a mesh mapping")),
    };

    let bounds = match (&vertex, &bone) {
        (Some(v), _) => v.bounds,
        (_, Some(b)) => b.bounds,
        _ => Bounds::default(),
    };
    let uv_layout = weights_layout.unwrap_or(layout);

    let metadata = BakeMetadata {
        mode: settings.mode,
        num_frames: sampled.num_frames,
        sample_rate: settings.sample_rate,
        num_vertices: target.num_vertices(),
        num_bones: if settings.mode == BakeMode::Bone { num_bones } else { 0 },
        precision: settings.precision,
        layout,
        weights_layout,
        bounds,
        anim_infos: sampled.anim_infos,
    };

    tracing::info!(
        "Baked '{}' onto '{}': {} frames, bounds min {:?} size {:?}",
        skeletal_mesh.name,
        static_mesh.name,
        metadata.num_frames,
        bounds.min,
        bounds.size
    );

    Ok(BakeOutput {
        uvs: vertex_uvs(target.num_vertices(), &uv_layout),
        metadata,
        vertex,
        bone,
    })
}

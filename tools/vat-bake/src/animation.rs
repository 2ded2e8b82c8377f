//! Animation clips and frame sampling
//!
//! Clips are evaluated at fixed time steps and every sample is appended to
//! frame streams in clip input order. Frame indices are positional, so
//! sampling is strictly sequential.

use glam::{Quat, Vec3, Vec4};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use vat_common::{Result, VatError, Vec3Stream, Vec4Stream};

use crate::mapping::SourceToDriverMapping;
use crate::mesh::MeshSnapshot;
use crate::skeleton::{Pose, SkeletalMesh, Skeleton};
use crate::transform::{Transform, decompose_transform, quat_to_axis_angle};

/// Slack when converting a clip duration to a sample count, so durations
/// that are whole multiples of the step do not round up
const SAMPLE_COUNT_TOLERANCE: f32 = 1e-4;

/// Source of skeletal poses over time
pub trait AnimationClip: Send + Sync {
    fn name(&self) -> &str;

    /// Number of sampled keys; the last valid frame is `num_keys() - 1`
    fn num_keys(&self) -> usize;

    /// Native keys per second
    fn frame_rate(&self) -> f32;

    fn last_key(&self) -> i32 {
        self.num_keys() as i32 - 1
    }

    fn time_at_frame(&self, frame: i32) -> f32 {
        frame as f32 / self.frame_rate()
    }

    /// Local transform of every bone of `skeleton` at `time` seconds
    fn evaluate_local(&self, skeleton: &Skeleton, time: f32) -> Result<Vec<Transform>>;

    fn evaluate(&self, skeleton: &Skeleton, time: f32) -> Result<Pose> {
        Pose::from_local(skeleton, self.evaluate_local(skeleton, time)?)
    }
}

// ============================================================================
// Keyframed clip
// ============================================================================

/// Uniformly keyed TRS channels of one bone.
///
/// Each channel holds either no keys (reference pose), one key (constant)
/// or one key per clip frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoneTrack {
    pub bone: String,
    pub translations: Vec<Vec3>,
    pub rotations: Vec<Quat>,
    pub scales: Vec<Vec3>,
}

impl BoneTrack {
    pub fn new(bone: impl Into<String>) -> Self {
        Self {
            bone: bone.into(),
            ..Default::default()
        }
    }

    pub fn with_translations(mut self, keys: Vec<Vec3>) -> Self {
        self.translations = keys;
        self
    }

    pub fn with_rotations(mut self, keys: Vec<Quat>) -> Self {
        self.rotations = keys;
        self
    }

    pub fn with_scales(mut self, keys: Vec<Vec3>) -> Self {
        self.scales = keys;
        self
    }
}

/// Clip built from per-bone keyframes
#[derive(Debug, Clone)]
pub struct KeyframedClip {
    name: String,
    frame_rate: f32,
    num_keys: usize,
    tracks: Vec<BoneTrack>,
}

impl KeyframedClip {
    pub fn new(name: impl Into<String>, frame_rate: f32, num_keys: usize, tracks: Vec<BoneTrack>) -> Result<Self> {
        let name = name.into();
        if !(frame_rate > 0.0 && frame_rate.is_finite()) {
            return Err(VatError::invalid_input(format!(
                "clip '{}' has invalid frame rate {}",
                name, frame_rate
            )));
        }
        if num_keys == 0 {
            return Err(VatError::invalid_input(format!("clip '{}' has no keys", name)));
        }
        for track in &tracks {
            let lengths = [track.translations.len(), track.rotations.len(), track.scales.len()];
            if lengths.iter().any(|&len| len > 1 && len != num_keys) {
                return Err(VatError::invalid_input(format!(
                    "clip '{}' track '{}' has {:?} keys, expected 0, 1 or {}",
                    name, track.bone, lengths, num_keys
                )));
            }
        }
        Ok(Self {
            name,
            frame_rate,
            num_keys,
            tracks,
        })
    }

    pub fn tracks(&self) -> &[BoneTrack] {
        &self.tracks
    }

    /// Key index and blend factor at `time`, clamped to the clip
    fn key_at(&self, time: f32) -> (usize, usize, f32) {
        let last = self.num_keys - 1;
        let position = (time * self.frame_rate).clamp(0.0, last as f32);
        let index = (position.floor() as usize).min(last);
        let next = (index + 1).min(last);
        (index, next, position - index as f32)
    }
}

fn sample_vec3(keys: &[Vec3], index: usize, next: usize, t: f32, fallback: Vec3) -> Vec3 {
    match keys.len() {
        0 => fallback,
        1 => keys[0],
        _ => keys[index].lerp(keys[next], t),
    }
}

fn sample_quat(keys: &[Quat], index: usize, next: usize, t: f32, fallback: Quat) -> Quat {
    match keys.len() {
        0 => fallback,
        1 => keys[0].normalize(),
        _ => keys[index].normalize().slerp(keys[next].normalize(), t),
    }
}

impl AnimationClip for KeyframedClip {
    fn name(&self) -> &str {
        &self.name
    }

    fn num_keys(&self) -> usize {
        self.num_keys
    }

    fn frame_rate(&self) -> f32 {
        self.frame_rate
    }

    fn evaluate_local(&self, skeleton: &Skeleton, time: f32) -> Result<Vec<Transform>> {
        let mut local: Vec<Transform> = skeleton.bones().iter().map(|b| b.reference).collect();
        let (index, next, t) = self.key_at(time);

        for track in &self.tracks {
            let bone = skeleton.bone_index(&track.bone).ok_or_else(|| {
                VatError::invalid_input(format!(
                    "clip '{}' animates bone '{}' missing from the skeleton",
                    self.name, track.bone
                ))
            })?;
            let reference = local[bone];
            local[bone] = Transform {
                translation: sample_vec3(&track.translations, index, next, t, reference.translation),
                rotation: sample_quat(&track.rotations, index, next, t, reference.rotation),
                scale: sample_vec3(&track.scales, index, next, t, reference.scale),
            };
        }

        Ok(local)
    }
}

// ============================================================================
// Clip descriptors
// ============================================================================

/// Inclusive frame sub-range of a clip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameRange {
    pub start: i32,
    pub end: i32,
}

impl FrameRange {
    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    pub fn is_valid_for(&self, last_key: i32) -> bool {
        self.start >= 0 && self.end <= last_key && self.end >= self.start
    }

    /// Number of frames covered, ends included
    pub fn len(&self) -> usize {
        (self.end - self.start + 1).max(0) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One entry of the clip list handed to a bake
#[derive(Clone)]
pub struct ClipDescriptor {
    pub clip: Option<Arc<dyn AnimationClip>>,
    pub enabled: bool,
    /// Sample only these frames instead of the whole clip
    pub custom_range: Option<FrameRange>,
}

impl ClipDescriptor {
    pub fn new(clip: Arc<dyn AnimationClip>) -> Self {
        Self {
            clip: Some(clip),
            enabled: true,
            custom_range: None,
        }
    }

    pub fn with_range(mut self, start: i32, end: i32) -> Self {
        self.custom_range = Some(FrameRange::new(start, end));
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    fn clip_name(&self) -> &str {
        self.clip.as_deref().map_or("<none>", |c| c.name())
    }
}

impl fmt::Debug for ClipDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClipDescriptor")
            .field("clip", &self.clip_name())
            .field("enabled", &self.enabled)
            .field("custom_range", &self.custom_range)
            .finish()
    }
}

/// Frames `[start_frame, end_frame]` of the concatenated stream sampled from one clip
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimInfo {
    pub clip: String,
    pub start_frame: usize,
    pub end_frame: usize,
}

impl AnimInfo {
    pub fn num_frames(&self) -> usize {
        self.end_frame + 1 - self.start_frame
    }
}

/// Per-clip and per-frame callbacks during sampling
pub trait BakeProgress {
    fn begin_clip(&mut self, _clip_index: usize, _name: &str, _num_samples: usize) {}
    fn frame(&mut self, _clip_index: usize, _sample: usize) {}
}

/// Progress sink that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl BakeProgress for NoProgress {}

/// Enabled clip with its validated range
#[derive(Clone)]
pub struct ResolvedClip {
    /// Position in the descriptor list
    pub index: usize,
    pub clip: Arc<dyn AnimationClip>,
    pub range: FrameRange,
    pub num_samples: usize,
}

impl fmt::Debug for ResolvedClip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedClip")
            .field("index", &self.index)
            .field("clip", &self.clip.name())
            .field("range", &self.range)
            .field("num_samples", &self.num_samples)
            .finish()
    }
}

/// Samples needed to cover `range` of `clip` at `sample_rate`, at least one
pub fn sample_count(clip: &dyn AnimationClip, range: FrameRange, sample_rate: f32) -> usize {
    let duration = range.len() as f32 / clip.frame_rate();
    let samples = (duration * sample_rate - SAMPLE_COUNT_TOLERANCE).ceil();
    if samples.is_finite() && samples >= 1.0 { samples as usize } else { 1 }
}

/// Check every descriptor and resolve the enabled ones.
///
/// Runs before any sampling so a bad clip aborts the bake without work.
pub fn resolve_clips(clips: &[ClipDescriptor], sample_rate: f32) -> Result<Vec<ResolvedClip>> {
    let mut resolved = Vec::new();

    for (index, descriptor) in clips.iter().enumerate() {
        if !descriptor.enabled {
            tracing::debug!("Skipping disabled clip {} ('{}')", index, descriptor.clip_name());
            continue;
        }
        let Some(clip) = descriptor.clip.clone() else {
            tracing::warn!("Clip {} has no animation", index);
            return Err(VatError::invalid_input(format!("animation clip {} has no animation", index)));
        };
        if clip.num_keys() == 0 {
            return Err(VatError::invalid_input(format!(
                "animation clip {} ('{}') has no keys",
                index,
                clip.name()
            )));
        }

        let last_key = clip.last_key();
        let range = descriptor.custom_range.unwrap_or(FrameRange::new(0, last_key));
        if !range.is_valid_for(last_key) {
            tracing::warn!(
                "Invalid frame range [{}, {}] for clip '{}' (last key {})",
                range.start,
                range.end,
                clip.name(),
                last_key
            );
            return Err(VatError::InvalidRange {
                clip: clip.name().to_string(),
                clip_index: index,
                start: range.start,
                end: range.end,
                last_key,
            });
        }

        let num_samples = sample_count(clip.as_ref(), range, sample_rate);
        resolved.push(ResolvedClip {
            index,
            clip,
            range,
            num_samples,
        });
    }

    if resolved.is_empty() {
        return Err(VatError::invalid_input("no enabled animation clips"));
    }
    Ok(resolved)
}

// ============================================================================
// Sampling
// ============================================================================

/// Sampled frame streams
#[derive(Debug, Clone, PartialEq)]
pub enum FrameStreams {
    /// Per target vertex position deltas and unit normals
    Vertex { deltas: Vec3Stream, normals: Vec3Stream },
    /// Per raw bone positions and axis-angle rotations, reference pose first
    Bone { positions: Vec3Stream, rotations: Vec4Stream },
}

/// Output of [`AnimationSampler`]
#[derive(Debug, Clone, PartialEq)]
pub struct SampledAnimations {
    pub streams: FrameStreams,
    pub anim_infos: Vec<AnimInfo>,
    /// Sampled frames over all clips; the bone mode reference frame is not counted
    pub num_frames: usize,
}

/// Poses a driver mesh through a list of clips
pub struct AnimationSampler<'a> {
    mesh: &'a SkeletalMesh,
    lod: usize,
    sample_rate: f32,
    root_transform: Transform,
}

impl<'a> AnimationSampler<'a> {
    pub fn new(mesh: &'a SkeletalMesh, lod: usize, sample_rate: f32) -> Result<Self> {
        mesh.lod(lod)?;
        if !(sample_rate > 0.0 && sample_rate.is_finite()) {
            return Err(VatError::invalid_input(format!(
                "sample rate must be positive, got {}",
                sample_rate
            )));
        }
        Ok(Self {
            mesh,
            lod,
            sample_rate,
            root_transform: Transform::IDENTITY,
        })
    }

    /// Offset applied to deformed target vertices in vertex mode
    pub fn with_root_transform(mut self, root_transform: Transform) -> Self {
        self.root_transform = root_transform;
        self
    }

    fn for_each_sample(
        &self,
        clips: &[ResolvedClip],
        progress: &mut dyn BakeProgress,
        mut visit: impl FnMut(&Pose) -> Result<()>,
    ) -> Result<(Vec<AnimInfo>, usize)> {
        let skeleton = &self.mesh.skeleton;
        let mut anim_infos = Vec::with_capacity(clips.len());
        let mut total = 0;

        for resolved in clips {
            let clip = resolved.clip.as_ref();
            progress.begin_clip(resolved.index, clip.name(), resolved.num_samples);

            let start_time = clip.time_at_frame(resolved.range.start);
            let end_time = clip.time_at_frame(resolved.range.end);
            for sample in 0..resolved.num_samples {
                // Never blend in keys past the end of the range
                let time = (start_time + sample as f32 / self.sample_rate).min(end_time);
                let pose = clip.evaluate(skeleton, time)?;
                visit(&pose)?;
                progress.frame(resolved.index, sample);
            }

            anim_infos.push(AnimInfo {
                clip: clip.name().to_string(),
                start_frame: total,
                end_frame: total + resolved.num_samples - 1,
            });
            total += resolved.num_samples;

            tracing::debug!(
                "Sampled clip '{}': frames [{}, {}] -> {} samples at {} fps",
                clip.name(),
                resolved.range.start,
                resolved.range.end,
                resolved.num_samples,
                self.sample_rate
            );
        }

        Ok((anim_infos, total))
    }

    /// Deform `target` through `mapping` at every sample.
    ///
    /// Records the root-transformed deformed position minus the target's
    /// reference position, and the root-transformed deformed normal.
    pub fn sample_vertices(
        &self,
        mapping: &SourceToDriverMapping,
        target: &MeshSnapshot,
        clips: &[ClipDescriptor],
        progress: &mut dyn BakeProgress,
    ) -> Result<SampledAnimations> {
        let resolved = resolve_clips(clips, self.sample_rate)?;
        self.sample_vertices_resolved(mapping, target, &resolved, progress)
    }

    /// [`AnimationSampler::sample_vertices`] over clips already checked by [`resolve_clips`]
    pub fn sample_vertices_resolved(
        &self,
        mapping: &SourceToDriverMapping,
        target: &MeshSnapshot,
        resolved: &[ResolvedClip],
        progress: &mut dyn BakeProgress,
    ) -> Result<SampledAnimations> {
        if mapping.num_target_vertices() != target.num_vertices() {
            return Err(VatError::TopologyMismatch {
                expected: mapping.num_target_vertices(),
                actual: target.num_vertices(),
            });
        }
        let expected_frames: usize = resolved.iter().map(|c| c.num_samples).sum();
        let num_vertices = target.num_vertices();

        let mut deltas = Vec3Stream::with_capacity(num_vertices, expected_frames);
        let mut normals = Vec3Stream::with_capacity(num_vertices, expected_frames);
        let mut frame_deltas = Vec::with_capacity(num_vertices);
        let mut frame_normals = Vec::with_capacity(num_vertices);

        let (anim_infos, num_frames) = self.for_each_sample(resolved, progress, |pose| {
            let (driver_positions, _) = self.mesh.compute_skinned_vertices(pose, self.lod)?;
            let (positions, deformed_normals) = mapping.deform_positions_and_normals(&driver_positions)?;

            frame_deltas.clear();
            frame_normals.clear();
            for ((position, normal), reference) in positions.iter().zip(&deformed_normals).zip(&target.positions) {
                frame_deltas.push(self.root_transform.transform_point(*position) - *reference);
                frame_normals.push(self.root_transform.transform_vector(*normal).normalize_or_zero());
            }
            deltas.push_frame(&frame_deltas)?;
            normals.push_frame(&frame_normals)
        })?;

        tracing::info!(
            "Sampled {} frames of {} vertices from {} clips",
            num_frames,
            num_vertices,
            anim_infos.len()
        );

        Ok(SampledAnimations {
            streams: FrameStreams::Vertex { deltas, normals },
            anim_infos,
            num_frames,
        })
    }

    /// Record every raw bone at every sample, after one reference pose frame.
    ///
    /// The reference frame stores component-space positions and rotations.
    /// Sampled frames store the component-space position minus the
    /// reference position, and the rotation of the bone's ref-to-local
    /// matrix.
    pub fn sample_bones(&self, clips: &[ClipDescriptor], progress: &mut dyn BakeProgress) -> Result<SampledAnimations> {
        let resolved = resolve_clips(clips, self.sample_rate)?;
        self.sample_bones_resolved(&resolved, progress)
    }

    /// [`AnimationSampler::sample_bones`] over clips already checked by [`resolve_clips`]
    pub fn sample_bones_resolved(
        &self,
        resolved: &[ResolvedClip],
        progress: &mut dyn BakeProgress,
    ) -> Result<SampledAnimations> {
        let skeleton = &self.mesh.skeleton;
        let num_bones = skeleton.raw_bone_count();
        let expected_frames: usize = resolved.iter().map(|c| c.num_samples).sum::<usize>() + 1;

        let mut positions = Vec3Stream::with_capacity(num_bones, expected_frames);
        let mut rotations = Vec4Stream::with_capacity(num_bones, expected_frames);

        let reference = skeleton.reference_bone_transforms();
        let reference_positions: Vec<Vec3> = reference.iter().map(|t| t.translation).collect();
        let reference_rotations: Vec<Vec4> = reference.iter().map(|t| quat_to_axis_angle(t.rotation)).collect();
        positions.push_frame(&reference_positions)?;
        rotations.push_frame(&reference_rotations)?;

        let mut frame_positions = Vec::with_capacity(num_bones);
        let mut frame_rotations = Vec::with_capacity(num_bones);

        let (anim_infos, num_frames) = self.for_each_sample(resolved, progress, |pose| {
            let ref_to_local = pose.ref_to_local(skeleton);
            frame_positions.clear();
            frame_rotations.clear();
            for bone in 0..num_bones {
                frame_positions.push(pose.component()[bone].translation - reference_positions[bone]);
                frame_rotations.push(decompose_transform(&ref_to_local[bone]).1);
            }
            positions.push_frame(&frame_positions)?;
            rotations.push_frame(&frame_rotations)
        })?;

        tracing::info!(
            "Sampled {} frames of {} bones from {} clips",
            num_frames,
            num_bones,
            anim_infos.len()
        );

        Ok(SampledAnimations {
            streams: FrameStreams::Bone { positions, rotations },
            anim_infos,
            num_frames,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skeleton::{Bone, SkeletalLod};
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_8};
    use vat_common::MaxInfluenceRecord;

    fn skeleton() -> Skeleton {
        Skeleton::new(vec![
            Bone::new("root", None, Transform::IDENTITY),
            Bone::new("arm", Some(0), Transform::from_translation(Vec3::X)),
        ])
        .unwrap()
    }

    fn clip(num_keys: usize) -> Arc<dyn AnimationClip> {
        let rotations = (0..num_keys)
            .map(|i| Quat::from_rotation_z(i as f32 / (num_keys.max(2) - 1) as f32 * FRAC_PI_2))
            .collect();
        Arc::new(
            KeyframedClip::new("swing", 30.0, num_keys, vec![BoneTrack::new("arm").with_rotations(rotations)]).unwrap(),
        )
    }

    #[test]
    fn test_keyframed_clip_interpolates_and_clamps() {
        let skeleton = skeleton();
        let clip = clip(3);

        let start = clip.evaluate_local(&skeleton, 0.0).unwrap();
        assert_eq!(start[0], Transform::IDENTITY);
        assert_eq!(start[1].translation, Vec3::X);

        let halfway = clip.evaluate_local(&skeleton, 1.5 / 30.0).unwrap();
        // Halfway between keys 1 (45 degrees) and 2 (90 degrees)
        let expected = Quat::from_rotation_z(0.75 * FRAC_PI_2);
        assert!(halfway[1].rotation.dot(expected).abs() > 0.9999);

        let past_end = clip.evaluate_local(&skeleton, 10.0).unwrap();
        assert!(past_end[1].rotation.dot(Quat::from_rotation_z(FRAC_PI_2)).abs() > 0.9999);
    }

    #[test]
    fn test_keyframed_clip_validation() {
        assert!(KeyframedClip::new("a", 0.0, 2, vec![]).is_err());
        assert!(KeyframedClip::new("a", 30.0, 0, vec![]).is_err());
        let bad = BoneTrack::new("arm").with_translations(vec![Vec3::ZERO; 2]);
        assert!(KeyframedClip::new("a", 30.0, 3, vec![bad]).is_err());

        let unknown = KeyframedClip::new("a", 30.0, 1, vec![BoneTrack::new("leg")]).unwrap();
        assert!(unknown.evaluate_local(&skeleton(), 0.0).is_err());
    }

    #[test]
    fn test_sample_count() {
        let clip = clip(10);
        let full = FrameRange::new(0, 9);
        assert_eq!(sample_count(clip.as_ref(), full, 30.0), 10);
        assert_eq!(sample_count(clip.as_ref(), full, 15.0), 5);
        assert_eq!(sample_count(clip.as_ref(), full, 60.0), 20);
        assert_eq!(sample_count(clip.as_ref(), FrameRange::new(4, 4), 1.0), 1);
    }

    #[test]
    fn test_resolve_clips() {
        let clips = vec![
            ClipDescriptor::new(clip(10)),
            ClipDescriptor::new(clip(5)).disabled(),
            ClipDescriptor::new(clip(20)).with_range(5, 9),
        ];
        let resolved = resolve_clips(&clips, 30.0).unwrap();
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].range, FrameRange::new(0, 9));
        assert_eq!(resolved[1].index, 2);
        assert_eq!(resolved[1].num_samples, 5);
    }

    #[test]
    fn test_resolve_clips_errors() {
        for (start, end) in [(10, 5), (-1, 3), (0, 10)] {
            let err = resolve_clips(&[ClipDescriptor::new(clip(10)).with_range(start, end)], 30.0).unwrap_err();
            assert_eq!(
                err,
                VatError::InvalidRange {
                    clip: "swing".to_string(),
                    clip_index: 0,
                    start,
                    end,
                    last_key: 9
                }
            );
        }

        let missing = ClipDescriptor {
            clip: None,
            enabled: true,
            custom_range: None,
        };
        assert!(matches!(resolve_clips(&[missing.clone()], 30.0), Err(VatError::InvalidInput(_))));
        // A disabled empty slot is fine as long as something else is enabled
        assert!(resolve_clips(&[missing.disabled(), ClipDescriptor::new(clip(2))], 30.0).is_ok());
        assert!(resolve_clips(&[ClipDescriptor::new(clip(2)).disabled()], 30.0).is_err());
        assert!(resolve_clips(&[], 30.0).is_err());
    }

    fn arm_mesh() -> SkeletalMesh {
        let mesh = MeshSnapshot::from_positions(
            vec![Vec3::new(1.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 0.0)],
            vec![[0, 1, 2]],
        )
        .unwrap();
        let lod = SkeletalLod {
            mesh,
            skin_weights: vec![MaxInfluenceRecord::rigid(1); 3],
        };
        SkeletalMesh::new("Arm", skeleton(), vec![lod]).unwrap()
    }

    #[test]
    fn test_oversampled_range_stays_inside_range() {
        // Keys 0..4 swing 0..90 degrees; frames [0, 1] end at 22.5 degrees
        let clips = [ClipDescriptor::new(clip(5)).with_range(0, 1)];
        let mesh = arm_mesh();
        let sampled = AnimationSampler::new(&mesh, 0, 60.0)
            .unwrap()
            .sample_bones(&clips, &mut NoProgress)
            .unwrap();
        let FrameStreams::Bone { rotations, .. } = &sampled.streams else {
            panic!("expected bone streams");
        };

        assert_eq!(sampled.num_frames, 4);
        for frame in 1..=4 {
            let angle = rotations.frame(frame).unwrap()[1].w;
            assert!(angle <= FRAC_PI_8 + 1e-4, "frame {} angle {}", frame, angle);
        }
        assert!((rotations.frame(4).unwrap()[1].w - FRAC_PI_8).abs() < 1e-4);
    }

    #[test]
    fn test_resolved_sampling_matches_descriptors() {
        let clips = [ClipDescriptor::new(clip(6)), ClipDescriptor::new(clip(4)).with_range(1, 3)];
        let mesh = arm_mesh();
        let sampler = AnimationSampler::new(&mesh, 0, 30.0).unwrap();

        let resolved = resolve_clips(&clips, 30.0).unwrap();
        let from_resolved = sampler.sample_bones_resolved(&resolved, &mut NoProgress).unwrap();
        let from_descriptors = sampler.sample_bones(&clips, &mut NoProgress).unwrap();
        assert_eq!(from_resolved, from_descriptors);
        assert_eq!(from_resolved.num_frames, 6 + 3);
    }

    #[test]
    fn test_frame_range() {
        assert!(FrameRange::new(0, 0).is_valid_for(0));
        assert!(!FrameRange::new(10, 5).is_valid_for(20));
        assert_eq!(FrameRange::new(3, 7).len(), 5);
        assert!(FrameRange::new(7, 3).is_empty());
    }
}

//! Data handed to downstream consumers
//!
//! [`BakeMetadata`] describes the baked textures; [`MaterialParameters`] is
//! the flat set of values a decoding material needs, keyed by the parameter
//! names in [`param_names`].

use glam::Vec3;
use serde::{Deserialize, Serialize};
use vat_common::{Bounds, Precision, Result, TextureLayout, VatError};

use crate::animation::AnimInfo;
use crate::settings::{BakeMode, BakeSettings, NumBoneInfluences};

/// Everything needed to decode a bake
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BakeMetadata {
    pub mode: BakeMode,
    /// Sampled frames; bone mode textures hold one extra reference frame
    pub num_frames: usize,
    pub sample_rate: f32,
    pub num_vertices: usize,
    /// Raw bones in the bone textures, 0 in vertex mode
    pub num_bones: usize,
    pub precision: Precision,
    /// Layout of the position texture and its normal/rotation companion
    pub layout: TextureLayout,
    /// Layout of the bone weight texture (bone mode only)
    pub weights_layout: Option<TextureLayout>,
    /// Bounds the position texture was normalized against
    pub bounds: Bounds,
    pub anim_infos: Vec<AnimInfo>,
}

impl BakeMetadata {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| VatError::invalid_input(format!("cannot serialize bake metadata: {}", e)))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| VatError::invalid_input(format!("invalid bake metadata: {}", e)))
    }
}

/// Extensions `(positive, negative)` that grow `mesh` to also enclose `animation`.
///
/// Both are non-negative per axis; zero where the mesh already covers the
/// animated range.
pub fn extended_bounds(mesh: &Bounds, animation: &Bounds) -> (Vec3, Vec3) {
    let max = mesh.max().max(animation.max());
    let min = mesh.min.min(animation.min);
    (max - mesh.max(), mesh.min - min)
}

/// Material parameter names
pub mod param_names {
    pub const NUM_FRAMES: &str = "NumFrames";
    pub const SAMPLE_RATE: &str = "SampleRate";
    pub const MIN_BBOX: &str = "MinBBox";
    pub const SIZE_BBOX: &str = "SizeBBox";
    pub const ROWS_PER_FRAME: &str = "RowsPerFrame";
    pub const NUM_BONES: &str = "NumBones";
    pub const BONE_WEIGHT_ROWS_PER_FRAME: &str = "BoneWeightsRowsPerFrame";
    pub const AUTO_PLAY: &str = "AutoPlay";
    pub const START_FRAME: &str = "StartFrame";
    pub const END_FRAME: &str = "EndFrame";
    pub const FRAME: &str = "Frame";
    pub const USE_TWO_INFLUENCES: &str = "UseTwoInfluences";
    pub const USE_FOUR_INFLUENCES: &str = "UseFourInfluences";
}

/// Values a decoding material is configured with.
///
/// Parameters that do not apply (or whose setting is out of range) are
/// `None` and should be left untouched by the consumer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialParameters {
    pub num_frames: usize,
    pub sample_rate: f32,
    pub min_bbox: Vec3,
    pub size_bbox: Vec3,
    pub rows_per_frame: usize,
    pub num_bones: Option<usize>,
    pub bone_weight_rows_per_frame: Option<usize>,
    pub use_two_influences: bool,
    pub use_four_influences: bool,
    pub auto_play: bool,
    pub start_frame: Option<usize>,
    pub end_frame: Option<usize>,
    pub frame: Option<usize>,
}

impl MaterialParameters {
    pub fn from_metadata(metadata: &BakeMetadata, settings: &BakeSettings) -> Self {
        let bone_mode = metadata.mode == BakeMode::Bone;

        let (start_frame, end_frame) = if settings.auto_play {
            match metadata.anim_infos.get(settings.animation_index) {
                Some(info) => (Some(info.start_frame), Some(info.end_frame)),
                None => {
                    tracing::warn!("Invalid animation index: {}", settings.animation_index);
                    (None, None)
                }
            }
        } else {
            (None, None)
        };

        let frame = if settings.auto_play {
            None
        } else if settings.frame < metadata.num_frames {
            Some(settings.frame)
        } else {
            tracing::warn!("Frame out of range: {}", settings.frame);
            None
        };

        let (use_two_influences, use_four_influences) = match (bone_mode, settings.num_bone_influences) {
            (false, _) | (true, NumBoneInfluences::One) => (false, false),
            (true, NumBoneInfluences::Two) => (true, false),
            (true, NumBoneInfluences::Four) => (false, true),
        };

        Self {
            num_frames: metadata.num_frames,
            sample_rate: metadata.sample_rate,
            min_bbox: metadata.bounds.min,
            size_bbox: metadata.bounds.size,
            rows_per_frame: metadata.layout.rows_per_frame,
            num_bones: bone_mode.then_some(metadata.num_bones),
            bone_weight_rows_per_frame: metadata.weights_layout.map(|l| l.rows_per_frame),
            use_two_influences,
            use_four_influences,
            auto_play: settings.auto_play,
            start_frame,
            end_frame,
            frame,
        }
    }

    /// Scalar parameters that are set, by name
    pub fn scalars(&self) -> Vec<(&'static str, f32)> {
        let mut scalars = vec![
            (param_names::NUM_FRAMES, self.num_frames as f32),
            (param_names::SAMPLE_RATE, self.sample_rate),
            (param_names::ROWS_PER_FRAME, self.rows_per_frame as f32),
        ];
        let optional = [
            (param_names::NUM_BONES, self.num_bones),
            (param_names::BONE_WEIGHT_ROWS_PER_FRAME, self.bone_weight_rows_per_frame),
            (param_names::START_FRAME, self.start_frame),
            (param_names::END_FRAME, self.end_frame),
            (param_names::FRAME, self.frame),
        ];
        scalars.extend(
            optional
                .into_iter()
                .filter_map(|(name, value)| value.map(|v| (name, v as f32))),
        );
        scalars
    }

    pub fn vectors(&self) -> [(&'static str, Vec3); 2] {
        [(param_names::MIN_BBOX, self.min_bbox), (param_names::SIZE_BBOX, self.size_bbox)]
    }

    pub fn switches(&self) -> [(&'static str, bool); 3] {
        [
            (param_names::AUTO_PLAY, self.auto_play),
            (param_names::USE_TWO_INFLUENCES, self.use_two_influences),
            (param_names::USE_FOUR_INFLUENCES, self.use_four_influences),
        ]
    }
}

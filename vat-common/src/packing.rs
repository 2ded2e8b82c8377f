//! Texel packing utilities
//!
//! Converts normalized [0, 1] streams to RGBA texel buffers:
//! - f32 → unorm8 (8-bit precision)
//! - f32 → unorm16 (16-bit precision)
//!
//! 3-component records fill RGB and write an opaque alpha; 4-component
//! records (axis-angle rotations) use all four channels.

use bytemuck::cast_slice;
use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::error::{Result, VatError};
use crate::layout::TextureLayout;
use crate::skin_weight::FourInfluenceRecord;

/// Maximum number of bones addressable by an 8-bit bone index
pub const MAX_BONES_EIGHT_BIT: usize = 256;

/// Texel channel precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Precision {
    /// 8 bits per channel
    #[default]
    EightBits,
    /// 16 bits per channel
    SixteenBits,
}

impl Precision {
    /// Largest quantized channel value
    #[inline]
    pub const fn max_value(self) -> u32 {
        match self {
            Precision::EightBits => u8::MAX as u32,
            Precision::SixteenBits => u16::MAX as u32,
        }
    }

    /// Fail if `num_bones` cannot be indexed at this precision
    pub fn check_bone_count(self, num_bones: usize) -> Result<()> {
        if self == Precision::EightBits && num_bones > MAX_BONES_EIGHT_BIT {
            tracing::warn!(
                "Too many bones: {}. There is a maximum of {} bones for 8-bit precision",
                num_bones,
                MAX_BONES_EIGHT_BIT
            );
            return Err(VatError::PrecisionLimitExceeded {
                num_bones,
                max_bones: MAX_BONES_EIGHT_BIT,
            });
        }
        Ok(())
    }
}

/// Row-major RGBA texel buffer
#[derive(Debug, Clone, PartialEq)]
pub enum TexelBuffer {
    Rgba8(Vec<[u8; 4]>),
    Rgba16(Vec<[u16; 4]>),
}

impl TexelBuffer {
    /// Zero-filled buffer of `len` texels
    pub fn zeroed(precision: Precision, len: usize) -> Self {
        match precision {
            Precision::EightBits => TexelBuffer::Rgba8(vec![[0; 4]; len]),
            Precision::SixteenBits => TexelBuffer::Rgba16(vec![[0; 4]; len]),
        }
    }

    pub fn precision(&self) -> Precision {
        match self {
            TexelBuffer::Rgba8(_) => Precision::EightBits,
            TexelBuffer::Rgba16(_) => Precision::SixteenBits,
        }
    }

    /// Number of texels
    pub fn len(&self) -> usize {
        match self {
            TexelBuffer::Rgba8(t) => t.len(),
            TexelBuffer::Rgba16(t) => t.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raw texel bytes (16-bit channels in native byte order)
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            TexelBuffer::Rgba8(t) => cast_slice(t),
            TexelBuffer::Rgba16(t) => cast_slice(t),
        }
    }

    /// Texel `index` widened to u16 channels
    pub fn texel(&self, index: usize) -> Option<[u16; 4]> {
        match self {
            TexelBuffer::Rgba8(t) => t.get(index).map(|c| c.map(u16::from)),
            TexelBuffer::Rgba16(t) => t.get(index).copied(),
        }
    }

    /// Texel `index` decoded back to [0, 1] floats
    pub fn texel_unorm(&self, index: usize) -> Option<Vec4> {
        let max = self.precision().max_value() as f32;
        self.texel(index)
            .map(|c| Vec4::new(c[0] as f32, c[1] as f32, c[2] as f32, c[3] as f32) / max)
    }

    fn set(&mut self, index: usize, value: Vec4) {
        match self {
            TexelBuffer::Rgba8(t) => t[index] = value.to_array().map(f32_to_unorm8),
            TexelBuffer::Rgba16(t) => t[index] = value.to_array().map(f32_to_unorm16),
        }
    }
}

// ============================================================================
// Basic Conversion Functions
// ============================================================================

/// Convert f32 to unsigned normalized 8-bit integer (unorm8)
///
/// Maps f32 range [0.0, 1.0] to u8 range [0, 255], rounding to nearest.
#[inline]
pub fn f32_to_unorm8(value: f32) -> u8 {
    let clamped = value.clamp(0.0, 1.0);
    (clamped * 255.0).round() as u8
}

/// Convert f32 to unsigned normalized 16-bit integer (unorm16)
///
/// Maps f32 range [0.0, 1.0] to u16 range [0, 65535], rounding to nearest.
#[inline]
pub fn f32_to_unorm16(value: f32) -> u16 {
    let clamped = value.clamp(0.0, 1.0);
    (clamped * 65535.0).round() as u16
}

// ============================================================================
// Stream Packing
// ============================================================================

/// Record type that can be written to one RGBA texel
pub trait TexelRecord: Copy {
    fn to_rgba(self) -> Vec4;
}

impl TexelRecord for Vec3 {
    #[inline]
    fn to_rgba(self) -> Vec4 {
        self.extend(1.0)
    }
}

impl TexelRecord for Vec4 {
    #[inline]
    fn to_rgba(self) -> Vec4 {
        self
    }
}

/// Pack a normalized stream of `num_frames` frames into a `layout` texel grid.
///
/// Each frame occupies `layout.rows_per_frame` consecutive rows; texels past
/// the end of a frame's elements stay zero.
pub fn pack_to_texels<T: TexelRecord>(
    values: &[T],
    num_frames: usize,
    layout: &TextureLayout,
    precision: Precision,
) -> Result<TexelBuffer> {
    if num_frames == 0 || values.len() % num_frames != 0 {
        return Err(VatError::invalid_input(format!(
            "{} records do not split into {} frames",
            values.len(),
            num_frames
        )));
    }
    let elements_per_frame = values.len() / num_frames;
    check_fits(layout, num_frames, elements_per_frame)?;

    let mut texels = TexelBuffer::zeroed(precision, layout.texel_count());
    for (frame, chunk) in values.chunks_exact(elements_per_frame).enumerate() {
        for (element, value) in chunk.iter().enumerate() {
            texels.set(layout.texel_index(frame, element), value.to_rgba());
        }
    }

    Ok(texels)
}

/// Pack four-influence skin weights into a two-frame texel grid.
///
/// Frame 0 holds the four bone indices of each vertex, frame 1 the four
/// weights. 8-bit stores indices and weights as raw bytes; 16-bit stores raw
/// u16 indices and weights rescaled to the full u16 range.
pub fn pack_skin_weights(
    weights: &[FourInfluenceRecord],
    num_bones: usize,
    layout: &TextureLayout,
    precision: Precision,
) -> Result<TexelBuffer> {
    precision.check_bone_count(num_bones)?;
    check_fits(layout, 2, weights.len())?;

    if let Some(bone) = weights
        .iter()
        .flat_map(|w| w.bone_indices.iter())
        .find(|&&b| b as usize >= num_bones)
    {
        return Err(VatError::invalid_input(format!(
            "skin weight references bone {} but the skeleton has {} bones",
            bone, num_bones
        )));
    }

    let mut texels = TexelBuffer::zeroed(precision, layout.texel_count());
    for (vertex, record) in weights.iter().enumerate() {
        let index_texel = layout.texel_index(0, vertex);
        let weight_texel = layout.texel_index(1, vertex);
        match &mut texels {
            TexelBuffer::Rgba8(t) => {
                t[index_texel] = record.bone_indices.map(|b| b as u8);
                t[weight_texel] = record.weights;
            }
            TexelBuffer::Rgba16(t) => {
                t[index_texel] = record.bone_indices;
                t[weight_texel] = record.weights.map(|w| w as u16 * 257);
            }
        }
    }

    Ok(texels)
}

fn check_fits(layout: &TextureLayout, num_frames: usize, elements_per_frame: usize) -> Result<()> {
    if layout.width == 0
        || layout.width * layout.rows_per_frame < elements_per_frame
        || num_frames * layout.rows_per_frame > layout.height
    {
        return Err(VatError::invalid_input(format!(
            "{}x{} layout with {} rows per frame cannot hold {} frames of {} elements",
            layout.width, layout.height, layout.rows_per_frame, num_frames, elements_per_frame
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::find_best_resolution;

    #[test]
    fn test_f32_to_unorm8_range() {
        assert_eq!(f32_to_unorm8(0.0), 0);
        assert_eq!(f32_to_unorm8(0.5), 128);
        assert_eq!(f32_to_unorm8(1.0), 255);
        assert_eq!(f32_to_unorm8(-2.0), 0);
        assert_eq!(f32_to_unorm8(7.0), 255);
    }

    #[test]
    fn test_f32_to_unorm16_range() {
        assert_eq!(f32_to_unorm16(0.0), 0);
        assert_eq!(f32_to_unorm16(1.0), 65535);
        assert_eq!(f32_to_unorm16(0.25), 16384);
    }

    #[test]
    fn test_pack_vec3_layout_rows() {
        // 2 frames x 3 elements into width 2 -> 2 rows per frame
        let layout = TextureLayout {
            height: 4,
            width: 2,
            rows_per_frame: 2,
        };
        let values = [
            Vec3::ZERO,
            Vec3::ONE,
            Vec3::X,
            Vec3::Y,
            Vec3::Z,
            Vec3::splat(0.5),
        ];
        let texels = pack_to_texels(&values, 2, &layout, Precision::EightBits).unwrap();

        assert_eq!(texels.len(), 8);
        assert_eq!(texels.texel(0), Some([0, 0, 0, 255]));
        assert_eq!(texels.texel(1), Some([255, 255, 255, 255]));
        assert_eq!(texels.texel(2), Some([255, 0, 0, 255]));
        // Padding texel after frame 0's last element
        assert_eq!(texels.texel(3), Some([0, 0, 0, 0]));
        assert_eq!(texels.texel(4), Some([0, 255, 0, 255]));
        assert_eq!(texels.texel(6), Some([128, 128, 128, 255]));
    }

    #[test]
    fn test_pack_vec4_sixteen_bits() {
        let layout = find_best_resolution(1, 1, 16, 16, false).unwrap();
        let texels = pack_to_texels(
            &[Vec4::new(0.0, 1.0, 0.5, 0.25)],
            1,
            &layout,
            Precision::SixteenBits,
        )
        .unwrap();
        assert_eq!(texels.texel(0), Some([0, 65535, 32768, 16384]));
        assert_eq!(texels.as_bytes().len(), 8);
    }

    #[test]
    fn test_quantization_error_bounds() {
        let values: Vec<Vec3> = (0..=100).map(|i| Vec3::splat(i as f32 / 100.0)).collect();
        for precision in [Precision::EightBits, Precision::SixteenBits] {
            let layout = find_best_resolution(1, values.len(), 64, 256, false).unwrap();
            let texels = pack_to_texels(&values, 1, &layout, precision).unwrap();
            let tolerance = 1.0 / precision.max_value() as f32;
            for (i, v) in values.iter().enumerate() {
                let decoded = texels.texel_unorm(layout.texel_index(0, i)).unwrap();
                assert!((decoded.truncate() - *v).abs().max_element() <= tolerance);
            }
        }
    }

    #[test]
    fn test_pack_rejects_small_layout() {
        let layout = TextureLayout {
            height: 1,
            width: 2,
            rows_per_frame: 1,
        };
        let err = pack_to_texels(&[Vec3::ZERO; 4], 2, &layout, Precision::EightBits).unwrap_err();
        assert!(matches!(err, VatError::InvalidInput(_)));
    }

    #[test]
    fn test_pack_skin_weights() {
        let records = [
            FourInfluenceRecord {
                bone_indices: [3, 1, 0, 0],
                weights: [200, 55, 0, 0],
            },
            FourInfluenceRecord {
                bone_indices: [2, 0, 0, 0],
                weights: [255, 0, 0, 0],
            },
        ];
        let layout = find_best_resolution(2, records.len(), 16, 16, false).unwrap();

        let texels = pack_skin_weights(&records, 4, &layout, Precision::EightBits).unwrap();
        assert_eq!(texels.texel(0), Some([3, 1, 0, 0]));
        assert_eq!(texels.texel(1), Some([2, 0, 0, 0]));
        assert_eq!(texels.texel(2), Some([200, 55, 0, 0]));
        assert_eq!(texels.texel(3), Some([255, 0, 0, 0]));

        let texels = pack_skin_weights(&records, 4, &layout, Precision::SixteenBits).unwrap();
        assert_eq!(texels.texel(3), Some([65535, 0, 0, 0]));
    }

    #[test]
    fn test_pack_skin_weights_rejects_out_of_range_bones() {
        let layout = find_best_resolution(2, 1, 16, 16, false).unwrap();
        let record = FourInfluenceRecord::rigid(0);
        for num_bones in [0, 1] {
            let result = pack_skin_weights(&[FourInfluenceRecord::rigid(1)], num_bones, &layout, Precision::EightBits);
            assert!(matches!(result, Err(VatError::InvalidInput(_))), "{} bones", num_bones);
        }
        assert!(matches!(
            pack_skin_weights(&[record], 0, &layout, Precision::EightBits),
            Err(VatError::InvalidInput(_))
        ));
        assert!(pack_skin_weights(&[record], 1, &layout, Precision::EightBits).is_ok());
    }

    #[test]
    fn test_pack_skin_weights_bone_limit() {
        let layout = find_best_resolution(2, 1, 16, 16, false).unwrap();
        let err =
            pack_skin_weights(&[FourInfluenceRecord::default()], 300, &layout, Precision::EightBits)
                .unwrap_err();
        assert_eq!(
            err,
            VatError::PrecisionLimitExceeded {
                num_bones: 300,
                max_bones: 256
            }
        );
        assert!(
            pack_skin_weights(&[FourInfluenceRecord::default()], 300, &layout, Precision::SixteenBits)
                .is_ok()
        );
    }
}

//! Bounding boxes and [0, 1] normalization of sampled streams
//!
//! Positions and deltas are normalized against the axis-aligned bounding box
//! of the whole stream. Normals and rotation axes are unit vectors and are
//! mapped with `(v + 1) / 2` instead, independent of any box.

use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/// Normalized value written for an axis whose bounding box size is zero.
///
/// Decoding `0.5 * 0.0 + min` yields the constant exactly.
pub const DEGENERATE_AXIS_VALUE: f32 = 0.5;

/// Axis-aligned bounding box as min corner + size
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Vec3,
    pub size: Vec3,
}

impl Bounds {
    /// Max corner (`min + size`)
    #[inline]
    pub fn max(&self) -> Vec3 {
        self.min + self.size
    }

    /// True if any axis has zero extent
    pub fn is_degenerate(&self) -> bool {
        self.size.cmple(Vec3::ZERO).any()
    }

    /// Map a value into [0, 1] on every axis with non-zero extent
    #[inline]
    pub fn normalize(&self, value: Vec3) -> Vec3 {
        Vec3::new(
            normalize_axis(value.x, self.min.x, self.size.x),
            normalize_axis(value.y, self.min.y, self.size.y),
            normalize_axis(value.z, self.min.z, self.size.z),
        )
    }

    /// Inverse of [`Bounds::normalize`]
    #[inline]
    pub fn denormalize(&self, value: Vec3) -> Vec3 {
        value * self.size + self.min
    }
}

#[inline]
fn normalize_axis(value: f32, min: f32, size: f32) -> f32 {
    if size > 0.0 {
        (value - min) / size
    } else {
        DEGENERATE_AXIS_VALUE
    }
}

/// Per-axis min/max scan of a stream.
///
/// An empty stream yields a zero box at the origin.
pub fn compute_bounds(values: &[Vec3]) -> Bounds {
    if values.is_empty() {
        return Bounds::default();
    }

    let (min, max) = values.iter().fold(
        (Vec3::splat(f32::MAX), Vec3::splat(f32::MIN)),
        |(min, max), v| (min.min(*v), max.max(*v)),
    );

    Bounds {
        min,
        size: max - min,
    }
}

/// Normalize positions/deltas into [0, 1] against `bounds`.
///
/// Zero-extent axes are written as [`DEGENERATE_AXIS_VALUE`].
pub fn normalize_positions(values: &[Vec3], bounds: &Bounds) -> Vec<Vec3> {
    if bounds.is_degenerate() && !values.is_empty() {
        tracing::warn!(
            "Degenerate bounding box (size {:?}); constant axes are written as {}",
            bounds.size,
            DEGENERATE_AXIS_VALUE
        );
    }
    values.iter().map(|v| bounds.normalize(*v)).collect()
}

/// Map directions into [0, 1] by unit-vector projection: `(normalize(v) + 1) / 2`.
///
/// Zero vectors map to 0.5 on every axis.
pub fn normalize_normals(values: &[Vec3]) -> Vec<Vec3> {
    values.iter().map(|v| encode_unit_vector(*v)).collect()
}

/// Map axis-angle rotations into [0, 1]: axis as in [`normalize_normals`],
/// angle (radians, [0, 2π)) divided by 2π.
pub fn normalize_axis_angles(values: &[Vec4]) -> Vec<Vec4> {
    values
        .iter()
        .map(|r| encode_unit_vector(r.truncate()).extend(r.w / TAU))
        .collect()
}

#[inline]
fn encode_unit_vector(v: Vec3) -> Vec3 {
    (v.normalize_or_zero() + Vec3::ONE) * 0.5
}

//! Rigid transforms and axis-angle decomposition

use glam::{Mat4, Quat, Vec3, Vec4};
use std::f32::consts::TAU;
use std::ops::Mul;

/// Translation, rotation, scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    pub fn from_rotation(rotation: Quat) -> Self {
        Self {
            rotation,
            ..Self::IDENTITY
        }
    }

    pub fn from_translation_rotation(translation: Vec3, rotation: Quat) -> Self {
        Self {
            translation,
            rotation,
            scale: Vec3::ONE,
        }
    }

    /// Decompose an affine matrix (shear is lost)
    pub fn from_mat4(matrix: &Mat4) -> Self {
        let (scale, rotation, translation) = matrix.to_scale_rotation_translation();
        Self {
            translation,
            rotation: rotation.normalize(),
            scale,
        }
    }

    #[inline]
    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// Scale, rotate, then translate a point
    #[inline]
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.rotation * (self.scale * point) + self.translation
    }

    /// Scale and rotate a direction (no translation)
    #[inline]
    pub fn transform_vector(&self, vector: Vec3) -> Vec3 {
        self.rotation * (self.scale * vector)
    }

    /// True if every component is finite and the rotation is a unit quaternion
    pub fn is_valid(&self) -> bool {
        self.translation.is_finite()
            && self.scale.is_finite()
            && self.rotation.is_finite()
            && self.rotation.is_normalized()
    }
}

/// `parent * child`: the child expressed in the parent's space
impl Mul for Transform {
    type Output = Transform;

    fn mul(self, child: Transform) -> Transform {
        Transform {
            translation: self.transform_point(child.translation),
            rotation: (self.rotation * child.rotation).normalize(),
            scale: self.scale * child.scale,
        }
    }
}

/// Split a matrix into its translation and its rotation as axis-angle.
///
/// The rotation comes back as `(axis.xyz, angle)` with a unit axis and the
/// angle in radians in `[0, 2π)`. The identity rotation returns `(+X, 0)`.
pub fn decompose_transform(matrix: &Mat4) -> (Vec3, Vec4) {
    let (_, rotation, translation) = matrix.to_scale_rotation_translation();
    (translation, quat_to_axis_angle(rotation))
}

/// Rotation as `(axis.xyz, angle)` with the angle in `[0, 2π)`
pub fn quat_to_axis_angle(rotation: Quat) -> Vec4 {
    let (axis, mut angle) = rotation.normalize().to_axis_angle();
    if !angle.is_finite() {
        return Vec3::X.extend(0.0);
    }
    angle = angle.rem_euclid(TAU);
    if angle >= TAU {
        angle = 0.0;
    }
    axis.normalize_or(Vec3::X).extend(angle)
}

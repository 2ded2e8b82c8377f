//! Bake settings
//!
//! Loaded from TOML, e.g.:
//!
//! ```toml
//! mode = "bone"
//! sample_rate = 24.0
//! precision = "sixteen_bits"
//!
//! [root_transform]
//! rotation = [0.0, 0.0, 0.7071068, 0.7071068]
//! ```

use anyhow::Context;
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::path::Path;
use vat_common::{Precision, Result, VatError};

use crate::transform::Transform;

/// What gets baked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BakeMode {
    /// Per target vertex position deltas and normals
    #[default]
    Vertex,
    /// Per bone positions and rotations, plus per vertex bone weights
    Bone,
}

/// Number of bone influences the consumer blends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumBoneInfluences {
    One,
    Two,
    #[default]
    Four,
}

/// Rigid offset applied to deformed vertices before deltas are taken
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RootTransform {
    pub translation: [f32; 3],
    /// Quaternion [x, y, z, w]
    pub rotation: [f32; 4],
    pub scale: [f32; 3],
}

impl Default for RootTransform {
    fn default() -> Self {
        Self {
            translation: [0.0, 0.0, 0.0],
            rotation: [0.0, 0.0, 0.0, 1.0],
            scale: [1.0, 1.0, 1.0],
        }
    }
}

impl RootTransform {
    pub fn to_transform(&self) -> Transform {
        Transform {
            translation: Vec3::from_array(self.translation),
            rotation: Quat::from_array(self.rotation).normalize(),
            scale: Vec3::from_array(self.scale),
        }
    }
}

impl From<Transform> for RootTransform {
    fn from(transform: Transform) -> Self {
        Self {
            translation: transform.translation.to_array(),
            rotation: transform.rotation.to_array(),
            scale: transform.scale.to_array(),
        }
    }
}

/// Everything that shapes one bake
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BakeSettings {
    pub mode: BakeMode,
    pub root_transform: RootTransform,
    /// Bind every target vertex rigidly to this bone (bone mode only)
    pub attach_to_bone: Option<String>,
    /// Samples per second of clip time
    pub sample_rate: f32,
    pub num_driver_triangles: usize,
    /// Inverse-distance falloff exponent
    pub sigma: f32,
    pub max_width: usize,
    pub max_height: usize,
    pub enforce_power_of_two: bool,
    pub precision: Precision,
    pub static_lod: usize,
    pub skeletal_lod: usize,

    // Playback parameters handed to the material
    pub auto_play: bool,
    pub animation_index: usize,
    pub frame: usize,
    pub num_bone_influences: NumBoneInfluences,
}

impl Default for BakeSettings {
    fn default() -> Self {
        Self {
            mode: BakeMode::Vertex,
            root_transform: RootTransform::default(),
            attach_to_bone: None,
            sample_rate: 30.0,
            num_driver_triangles: 10,
            sigma: 1.0,
            max_width: 4096,
            max_height: 4096,
            enforce_power_of_two: false,
            precision: Precision::EightBits,
            static_lod: 0,
            skeletal_lod: 0,
            auto_play: true,
            animation_index: 0,
            frame: 0,
            num_bone_influences: NumBoneInfluences::Four,
        }
    }
}

impl BakeSettings {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let settings: Self = toml::from_str(text)
            .map_err(|e| VatError::invalid_input(format!("invalid bake settings: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| VatError::invalid_input(format!("cannot serialize bake settings: {}", e)))
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.sample_rate > 0.0 && self.sample_rate.is_finite()) {
            return Err(VatError::invalid_input(format!(
                "sample rate must be positive, got {}",
                self.sample_rate
            )));
        }
        if self.num_driver_triangles == 0 {
            return Err(VatError::invalid_input("number of driver triangles must be at least 1"));
        }
        if !(self.sigma > 0.0 && self.sigma.is_finite()) {
            return Err(VatError::invalid_input(format!("sigma must be positive, got {}", self.sigma)));
        }
        if self.max_width == 0 || self.max_height == 0 {
            return Err(VatError::invalid_input(format!(
                "maximum texture size {}x{} is empty",
                self.max_width, self.max_height
            )));
        }

        let root = &self.root_transform;
        let finite = root
            .translation
            .iter()
            .chain(&root.rotation)
            .chain(&root.scale)
            .all(|v| v.is_finite());
        if !finite || Quat::from_array(root.rotation).length_squared() <= f32::EPSILON {
            return Err(VatError::invalid_input(format!("invalid root transform {:?}", root)));
        }

        if self.attach_to_bone.is_some() && self.mode == BakeMode::Vertex {
            tracing::warn!("attach_to_bone is ignored in vertex mode");
        }
        Ok(())
    }
}

/// Read and validate a settings file
pub fn load_settings(path: &Path) -> anyhow::Result<BakeSettings> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read bake settings: {:?}", path))?;
    let settings = BakeSettings::from_toml_str(&content)
        .with_context(|| format!("Failed to parse bake settings: {:?}", path))?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = BakeSettings::from_toml_str("").unwrap();
        assert_eq!(settings, BakeSettings::default());
        assert_eq!(settings.sample_rate, 30.0);
        assert_eq!(settings.num_driver_triangles, 10);
        assert_eq!(settings.max_width, 4096);
        assert_eq!(settings.precision, Precision::EightBits);
        assert_eq!(settings.root_transform.to_transform(), Transform::IDENTITY);
    }

    #[test]
    fn test_parse_partial_toml() {
        let settings = BakeSettings::from_toml_str(
            r#"
            mode = "bone"
            attach_to_bone = "hand_r"
            precision = "sixteen_bits"
            num_bone_influences = "two"
            enforce_power_of_two = true

            [root_transform]
            translation = [0.0, 0.0, 10.0]
            "#,
        )
        .unwrap();

        assert_eq!(settings.mode, BakeMode::Bone);
        assert_eq!(settings.attach_to_bone.as_deref(), Some("hand_r"));
        assert_eq!(settings.precision, Precision::SixteenBits);
        assert_eq!(settings.num_bone_influences, NumBoneInfluences::Two);
        assert!(settings.enforce_power_of_two);
        assert_eq!(settings.root_transform.rotation, [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(settings.root_transform.to_transform().translation, Vec3::new(0.0, 0.0, 10.0));
    }

    #[test]
    fn test_validation_failures() {
        for text in [
            "sample_rate = 0.0",
            "num_driver_triangles = 0",
            "sigma = -1.0",
            "max_width = 0",
            "root_transform = { rotation = [0.0, 0.0, 0.0, 0.0] }",
            "mode = \"sideways\"",
        ] {
            let err = BakeSettings::from_toml_str(text).unwrap_err();
            assert!(matches!(err, VatError::InvalidInput(_)), "{}", text);
        }
    }

    #[test]
    fn test_toml_round_trip() {
        let settings = BakeSettings {
            mode: BakeMode::Bone,
            sample_rate: 60.0,
            root_transform: Transform::from_translation(Vec3::X).into(),
            ..Default::default()
        };
        let text = settings.to_toml_string().unwrap();
        assert_eq!(BakeSettings::from_toml_str(&text).unwrap(), settings);
    }
}

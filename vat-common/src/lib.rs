//! Shared types and utilities for vertex animation textures (VAT)
//!
//! This crate holds the data contract between the baker (`vat-bake`) and
//! whatever persists or decodes its output:
//!
//! # Modules
//!
//! - [`error`] - Error taxonomy shared by every bake stage
//! - [`stream`] - Append-only per-frame record streams
//! - [`bounds`] - Bounding boxes and [0, 1] normalization
//! - [`layout`] - Texel grid search and vertex UVs
//! - [`packing`] - Quantization of normalized streams into RGBA texels
//! - [`skin_weight`] - Fixed-size influence records and the four-influence reducer

pub mod bounds;
pub mod error;
pub mod layout;
pub mod packing;
pub mod skin_weight;
pub mod stream;

pub use bounds::{
    Bounds, DEGENERATE_AXIS_VALUE, compute_bounds, normalize_axis_angles, normalize_normals,
    normalize_positions,
};
pub use error::{Result, VatError};
pub use layout::{TextureLayout, find_best_resolution, vertex_uvs};
pub use packing::{
    MAX_BONES_EIGHT_BIT, Precision, TexelBuffer, TexelRecord, f32_to_unorm8, f32_to_unorm16,
    pack_skin_weights, pack_to_texels,
};
pub use skin_weight::{
    FourInfluenceRecord, InfluenceRecord, MAX_TOTAL_INFLUENCES, MaxInfluenceRecord, WEIGHT_SUM,
    reduce_skin_weights,
};
pub use stream::{FrameStream, Vec3Stream, Vec4Stream};

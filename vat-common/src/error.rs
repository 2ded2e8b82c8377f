//! Error taxonomy shared by every bake stage

/// Result alias used across the VAT crates
pub type Result<T> = std::result::Result<T, VatError>;

/// Failure of a bake stage.
///
/// Every variant carries enough context (clip, LOD, dimension) for a caller
/// to present an actionable message. Any error aborts the whole bake.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum VatError {
    /// Missing or empty input (null clip, mesh without vertices, unknown LOD, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Custom frame sub-range out of bounds or inverted
    #[error(
        "Invalid frame range [{start}, {end}] for clip '{clip}' (index {clip_index}, last sampled key {last_key})"
    )]
    InvalidRange {
        clip: String,
        clip_index: usize,
        start: i32,
        end: i32,
        last_key: i32,
    },

    /// Data does not fit in the configured maximum texture dimensions
    #[error(
        "{num_frames} frames x {elements_per_frame} elements need a {width}x{height} texture, maximum is {max_width}x{max_height}"
    )]
    ResolutionExceeded {
        num_frames: usize,
        elements_per_frame: usize,
        width: usize,
        height: usize,
        max_width: usize,
        max_height: usize,
    },

    /// Driver data disagrees with the mesh the mapping was built from
    #[error("Topology mismatch: mapping built for {expected} driver vertices, got {actual}")]
    TopologyMismatch { expected: usize, actual: usize },

    /// Too many bones for the configured texel precision
    #[error("Too many bones: {num_bones}. There is a maximum of {max_bones} bones for 8-bit precision")]
    PrecisionLimitExceeded { num_bones: usize, max_bones: usize },
}

impl VatError {
    /// Shorthand for [`VatError::InvalidInput`]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

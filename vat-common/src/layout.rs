//! Texture layout search
//!
//! Every frame occupies `rows_per_frame` consecutive texel rows; element `i`
//! of a frame lands at `(row = i / width, col = i % width)` inside that block.

use serde::{Deserialize, Serialize};

use crate::error::{Result, VatError};

/// Texel grid chosen for a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TextureLayout {
    pub height: usize,
    pub width: usize,
    /// Texel rows consumed by one frame
    pub rows_per_frame: usize,
}

impl TextureLayout {
    /// Total number of texels
    #[inline]
    pub fn texel_count(&self) -> usize {
        self.width * self.height
    }

    /// Linear texel index of element `element` in frame `frame`
    #[inline]
    pub fn texel_index(&self, frame: usize, element: usize) -> usize {
        (frame * self.rows_per_frame + element / self.width) * self.width + element % self.width
    }
}

/// Find the smallest grid holding `num_frames` frames of `elements_per_frame` elements.
///
/// With `enforce_power_of_two` the width doubles from 2 until it covers a
/// frame (or reaches `max_width`) and the height doubles from 2 until it
/// covers every frame's rows. Otherwise rows are packed as wide as
/// `max_width` allows and the width is then shrunk to the smallest value
/// that still fits a frame in the same number of rows.
pub fn find_best_resolution(
    num_frames: usize,
    elements_per_frame: usize,
    max_height: usize,
    max_width: usize,
    enforce_power_of_two: bool,
) -> Result<TextureLayout> {
    if num_frames == 0 || elements_per_frame == 0 {
        return Err(VatError::invalid_input(format!(
            "cannot lay out {} frames of {} elements",
            num_frames, elements_per_frame
        )));
    }
    if max_width == 0 || max_height == 0 {
        return Err(VatError::invalid_input(format!(
            "maximum texture size {}x{} is empty",
            max_width, max_height
        )));
    }

    let layout = if enforce_power_of_two {
        let mut width = 2;
        while width < elements_per_frame && width < max_width {
            width *= 2;
        }
        let rows_per_frame = elements_per_frame.div_ceil(width);

        let target_height = num_frames * rows_per_frame;
        let mut height = 2;
        while height < target_height {
            height *= 2;
        }

        TextureLayout {
            height,
            width,
            rows_per_frame,
        }
    } else {
        let rows_per_frame = elements_per_frame.div_ceil(max_width);
        let width = elements_per_frame.div_ceil(rows_per_frame);

        TextureLayout {
            height: num_frames * rows_per_frame,
            width,
            rows_per_frame,
        }
    };

    if layout.width > max_width || layout.height > max_height {
        tracing::warn!(
            "Animation data cannot be fit in a {}x{} texture (needs {}x{})",
            max_width,
            max_height,
            layout.width,
            layout.height
        );
        return Err(VatError::ResolutionExceeded {
            num_frames,
            elements_per_frame,
            width: layout.width,
            height: layout.height,
            max_width,
            max_height,
        });
    }

    Ok(layout)
}

/// Texel-centre UV of every vertex's column in the first frame block.
///
/// The consumer shader adds the frame's row offset to `v` at runtime.
pub fn vertex_uvs(num_vertices: usize, layout: &TextureLayout) -> Vec<[f32; 2]> {
    let width = layout.width.max(1) as f32;
    let height = layout.height.max(1) as f32;
    let columns = layout.width.max(1);

    (0..num_vertices)
        .map(|i| {
            let u = ((i % columns) as f32 + 0.5) / width;
            let v = ((i / columns) as f32 + 0.5) / height;
            [u, v]
        })
        .collect()
}

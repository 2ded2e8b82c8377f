//! Frame streams
//!
//! A frame stream is a flat, append-only sequence of per-element records where
//! every frame contributes exactly `elements_per_frame` records. Frame indices
//! are positional: frame `f` occupies `data[f * elements_per_frame..]`.

use glam::{Vec3, Vec4};

use crate::error::{Result, VatError};

/// Ordered per-frame records concatenated across all sampled clips
#[derive(Debug, Clone, PartialEq)]
pub struct FrameStream<T> {
    elements_per_frame: usize,
    data: Vec<T>,
}

/// Stream of 3-component records (positions, deltas, normals)
pub type Vec3Stream = FrameStream<Vec3>;

/// Stream of 4-component records (rotation as axis + angle)
pub type Vec4Stream = FrameStream<Vec4>;

impl<T: Copy> FrameStream<T> {
    /// Create an empty stream for frames of `elements_per_frame` records
    pub fn new(elements_per_frame: usize) -> Self {
        Self {
            elements_per_frame,
            data: Vec::new(),
        }
    }

    /// Create an empty stream with room for `num_frames` frames
    pub fn with_capacity(elements_per_frame: usize, num_frames: usize) -> Self {
        Self {
            elements_per_frame,
            data: Vec::with_capacity(elements_per_frame * num_frames),
        }
    }

    /// Wrap already concatenated data
    pub fn from_vec(elements_per_frame: usize, data: Vec<T>) -> Result<Self> {
        if elements_per_frame == 0 || data.len() % elements_per_frame != 0 {
            return Err(VatError::invalid_input(format!(
                "stream of {} records is not a whole number of {}-element frames",
                data.len(),
                elements_per_frame
            )));
        }
        Ok(Self {
            elements_per_frame,
            data,
        })
    }

    /// Append one frame; it must hold exactly `elements_per_frame` records
    pub fn push_frame(&mut self, frame: &[T]) -> Result<()> {
        if frame.len() != self.elements_per_frame {
            return Err(VatError::invalid_input(format!(
                "frame has {} records, stream expects {}",
                frame.len(),
                self.elements_per_frame
            )));
        }
        self.data.extend_from_slice(frame);
        Ok(())
    }

    /// Records per frame
    #[inline]
    pub fn elements_per_frame(&self) -> usize {
        self.elements_per_frame
    }

    /// Number of complete frames in the stream
    #[inline]
    pub fn num_frames(&self) -> usize {
        if self.elements_per_frame == 0 {
            0
        } else {
            self.data.len() / self.elements_per_frame
        }
    }

    /// Records of frame `index`
    pub fn frame(&self, index: usize) -> Option<&[T]> {
        let start = index.checked_mul(self.elements_per_frame)?;
        self.data.get(start..start + self.elements_per_frame)
    }

    /// All records in frame order
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }
}

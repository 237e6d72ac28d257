//! Pixel difference between two images.

use std::path::Path;

use crate::buffer::{PixelBuffer, CHANNELS};
use crate::codec;
use crate::error::{FilterError, Result};

/// Decode two images and return their per-channel absolute difference.
///
/// Both images are normalized to RGB before comparison.
pub fn diff(path_a: impl AsRef<Path>, path_b: impl AsRef<Path>) -> Result<PixelBuffer> {
    let a = codec::decode(path_a)?;
    let b = codec::decode(path_b)?;
    diff_buffers(&a, &b)
}

/// `|a - b|` per pixel and channel.
///
/// Fails with [`FilterError::DimensionMismatch`] unless both buffers have
/// the same width and height.
pub fn diff_buffers(a: &PixelBuffer, b: &PixelBuffer) -> Result<PixelBuffer> {
    let (left_width, left_height) = a.dimensions();
    let (right_width, right_height) = b.dimensions();
    if (left_width, left_height) != (right_width, right_height) {
        return Err(FilterError::DimensionMismatch {
            left_width,
            left_height,
            right_width,
            right_height,
        });
    }

    let data = a
        .as_bytes()
        .iter()
        .zip(b.as_bytes())
        .map(|(&x, &y)| x.abs_diff(y))
        .collect();

    PixelBuffer::from_raw(left_width, left_height, data)
}

/// Summary of a difference image.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DiffStats {
    /// Largest channel difference
    pub max: u8,
    /// Pixels with at least one non-zero channel
    pub differing_pixels: usize,
    /// Mean channel difference over the whole image
    pub mean: f64,
}

impl DiffStats {
    pub fn from_buffer(diff: &PixelBuffer) -> Self {
        let bytes = diff.as_bytes();
        let max = bytes.iter().copied().max().unwrap_or(0);
        let differing_pixels = bytes
            .chunks_exact(CHANNELS)
            .filter(|px| px.iter().any(|&v| v != 0))
            .count();
        let total: u64 = bytes.iter().map(|&v| v as u64).sum();
        let mean = if bytes.is_empty() {
            0.0
        } else {
            total as f64 / bytes.len() as f64
        };

        Self {
            max,
            differing_pixels,
            mean,
        }
    }

    pub fn identical(&self) -> bool {
        self.max == 0
    }
}

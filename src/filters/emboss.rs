//! Emboss filter.
//!
//! Each output pixel is a grey level centred on 128, offset by the largest
//! signed channel difference between the pixel and its top-left neighbour.
//! Neighbours outside the image are clamped to the border, so the top row
//! and left column compare against themselves where needed.

use ndarray::{Array3, ArrayView3};

use super::{map_rows, ExecutionPath};
use crate::buffer::CHANNELS;

/// Apply emboss to an RGB u8 image.
///
/// # Arguments
/// * `input` - Image (height, width, 3)
/// * `depth` - Multiplier for the relief difference
/// * `path` - Sequential or parallel execution
///
/// # Returns
/// Greyscale relief image (R=G=B) with same dimensions
pub fn emboss_rgb_u8(input: ArrayView3<u8>, depth: i32, path: ExecutionPath) -> Array3<u8> {
    let (height, width, _) = input.dim();

    map_rows(path, height, width, |y, row| {
        let ny = y.saturating_sub(1);
        for x in 0..width {
            let nx = x.saturating_sub(1);

            let diff = (0..CHANNELS)
                .map(|c| input[[y, x, c]] as i32 - input[[ny, nx, c]] as i32)
                .max()
                .unwrap_or(0);

            let v = (128 + depth * diff).clamp(0, 255) as u8;
            row[x * CHANNELS..(x + 1) * CHANNELS].fill(v);
        }
    })
}

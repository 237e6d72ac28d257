//! Gaussian blur for RGB images.
//!
//! The kernel is the binomial approximation of a Gaussian: row `2 * radius`
//! of Pascal's triangle (radius 2 gives the classic 1-4-6-4-1 kernel). It is
//! applied as two separable passes with integer accumulators, so the result
//! is exact and independent of how rows are scheduled.
//!
//! Taps outside the image are clamped to the nearest border pixel (edge
//! replication), which keeps flat regions flat up to the border.

use ndarray::{Array3, ArrayView3};

use super::{for_each_row, map_rows, ExecutionPath};
use crate::buffer::CHANNELS;

/// Largest accepted radius. Keeps a row sum (255 * 4^r) inside u32 and the 2D
/// sum (255 * 4^(2r)) inside u64.
pub const MAX_BLUR_RADIUS: usize = 8;

/// Binomial kernel with `2 * radius + 1` taps, summing to `4^radius`.
pub fn binomial_kernel(radius: usize) -> Vec<u64> {
    let n = 2 * radius as u64;
    let mut kernel = Vec::with_capacity(2 * radius + 1);
    let mut coeff = 1u64;
    kernel.push(coeff);
    for i in 1..=n {
        coeff = coeff * (n - i + 1) / i;
        kernel.push(coeff);
    }
    kernel
}

/// Apply binomial blur to an RGB u8 image.
///
/// # Arguments
/// * `input` - RGB image (height, width, 3) as u8
/// * `radius` - Kernel radius in pixels, at most [`MAX_BLUR_RADIUS`]; 0 returns a copy
/// * `path` - Sequential or parallel execution
///
/// # Returns
/// Blurred RGB image with same dimensions
pub fn blur_rgb_u8(input: ArrayView3<u8>, radius: usize, path: ExecutionPath) -> Array3<u8> {
    let (height, width, _) = input.dim();

    if radius == 0 {
        return input.to_owned();
    }

    let radius = radius.min(MAX_BLUR_RADIUS);
    let kernel = binomial_kernel(radius);
    let half = radius as isize;
    let row_len = width * CHANNELS;

    // Horizontal pass
    let mut temp = vec![0u32; height * row_len];
    for_each_row(path, &mut temp, row_len, |y, row| {
        for x in 0..width {
            for c in 0..CHANNELS {
                let mut sum = 0u32;
                for (ki, &kv) in kernel.iter().enumerate() {
                    let sx = (x as isize + ki as isize - half).clamp(0, width as isize - 1);
                    let sx = sx as usize;
                    sum += input[[y, sx, c]] as u32 * kv as u32;
                }
                row[x * CHANNELS + c] = sum;
            }
        }
    });

    // Vertical pass, normalizing by the 2D kernel sum 4^(2r) = 2^(4r)
    let shift = 4 * radius as u32;
    let round = 1u64 << (shift - 1);
    let temp = &temp;
    map_rows(path, height, width, |y, row| {
        for x in 0..width {
            for c in 0..CHANNELS {
                let mut sum = 0u64;
                for (ki, &kv) in kernel.iter().enumerate() {
                    let sy = (y as isize + ki as isize - half).clamp(0, height as isize - 1);
                    let sy = sy as usize;
                    sum += temp[sy * row_len + x * CHANNELS + c] as u64 * kv;
                }
                row[x * CHANNELS + c] = ((sum + round) >> shift).min(255) as u8;
            }
        }
    })
}

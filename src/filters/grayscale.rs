//! Greyscale conversion filter.
//!
//! Uses ITU-R BT.709 luminosity coefficients by default. Weights are turned
//! into fixed-point integers summing to [`WEIGHT_SCALE`] so that the result
//! is exact: grey pixels map to themselves, which makes the filter
//! idempotent, and both execution paths agree byte for byte.

use ndarray::{Array3, ArrayView3};
use serde::Deserialize;

use super::{map_rows, ExecutionPath};
use crate::buffer::CHANNELS;
use crate::error::{FilterError, Result};

/// ITU-R BT.709 luminosity coefficients
pub const LUMA_R: f32 = 0.2126;
pub const LUMA_G: f32 = 0.7152;
pub const LUMA_B: f32 = 0.0722;

/// Fixed-point denominator of the integer weights.
pub const WEIGHT_SCALE: u32 = 10_000;

/// RGB channel weights for greyscale conversion.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct GrayscaleWeights {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Default for GrayscaleWeights {
    fn default() -> Self {
        Self {
            r: LUMA_R,
            g: LUMA_G,
            b: LUMA_B,
        }
    }
}

impl GrayscaleWeights {
    /// BT.709 luminosity (default)
    pub fn bt709() -> Self {
        Self::default()
    }

    /// Simple average (R+G+B)/3
    pub fn average() -> Self {
        Self {
            r: 1.0 / 3.0,
            g: 1.0 / 3.0,
            b: 1.0 / 3.0,
        }
    }

    /// Create custom weights (normalized automatically)
    pub fn custom(r: f32, g: f32, b: f32) -> Self {
        let sum = (r + g + b).abs().max(0.001);
        Self {
            r: r / sum,
            g: g / sum,
            b: b / sum,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let all = [self.r, self.g, self.b];
        if all.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(FilterError::InvalidOptions(format!(
                "greyscale weights must be finite and non-negative, got {:?}",
                all
            )));
        }
        let sum: f32 = all.iter().sum();
        if !sum.is_finite() || sum < f32::MIN_POSITIVE {
            return Err(FilterError::InvalidOptions(format!(
                "greyscale weights must have a finite, non-zero sum, got {}",
                sum
            )));
        }
        Ok(())
    }

    /// Integer weights summing exactly to [`WEIGHT_SCALE`].
    pub fn fixed_point(&self) -> [u32; 3] {
        let sum = (self.r + self.g + self.b).max(f32::MIN_POSITIVE);
        let scale = WEIGHT_SCALE as f32;
        let r = ((self.r / sum * scale).round() as u32).min(WEIGHT_SCALE);
        let g = ((self.g / sum * scale).round() as u32).min(WEIGHT_SCALE - r);
        // Blue absorbs the rounding error so the total is exact.
        let b = WEIGHT_SCALE - r - g;
        [r, g, b]
    }
}

/// Luminance of one pixel with fixed-point weights.
#[inline]
pub fn luminance(weights: [u32; 3], r: u8, g: u8, b: u8) -> u8 {
    let sum = weights[0] * r as u32 + weights[1] * g as u32 + weights[2] * b as u32;
    ((sum + WEIGHT_SCALE / 2) / WEIGHT_SCALE) as u8
}

/// Convert an RGB u8 image to greyscale.
///
/// Output is RGB with R=G=B=luminosity.
///
/// # Arguments
/// * `input` - 3D array view of shape (height, width, 3) with RGB u8 values (0-255)
/// * `weights` - Channel weights, normalized internally
/// * `path` - Sequential or parallel execution
pub fn grayscale_rgb_u8(
    input: ArrayView3<u8>,
    weights: GrayscaleWeights,
    path: ExecutionPath,
) -> Array3<u8> {
    let (height, width, _) = input.dim();
    let fixed = weights.fixed_point();

    map_rows(path, height, width, |y, row| {
        for x in 0..width {
            let gray = luminance(fixed, input[[y, x, 0]], input[[y, x, 1]], input[[y, x, 2]]);
            row[x * CHANNELS..(x + 1) * CHANNELS].fill(gray);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(r: u8, g: u8, b: u8) -> Array3<u8> {
        let mut img = Array3::<u8>::zeros((1, 1, 3));
        img[[0, 0, 0]] = r;
        img[[0, 0, 1]] = g;
        img[[0, 0, 2]] = b;
        img
    }

    #[test]
    fn test_grayscale_red() {
        let img = pixel(255, 0, 0);
        let result = grayscale_rgb_u8(
            img.view(),
            GrayscaleWeights::default(),
            ExecutionPath::Sequential,
        );

        // 0.2126 * 255 ≈ 54
        assert!((result[[0, 0, 0]] as i32 - 54).abs() <= 1);
        assert_eq!(result[[0, 0, 0]], result[[0, 0, 1]]);
        assert_eq!(result[[0, 0, 1]], result[[0, 0, 2]]);
    }

    #[test]
    fn test_grayscale_green() {
        let img = pixel(0, 255, 0);
        let result = grayscale_rgb_u8(
            img.view(),
            GrayscaleWeights::default(),
            ExecutionPath::Sequential,
        );

        // 0.7152 * 255 ≈ 182
        assert!((result[[0, 0, 0]] as i32 - 182).abs() <= 1);
    }

    #[test]
    fn test_grayscale_white_stays_white() {
        let img = Array3::<u8>::from_elem((2, 2, 3), 255);
        let result = grayscale_rgb_u8(
            img.view(),
            GrayscaleWeights::default(),
            ExecutionPath::Parallel,
        );
        assert!(result.iter().all(|&v| v == 255));
    }

    #[test]
    fn test_grey_is_fixed_point() {
        for v in 0..=255u8 {
            let img = pixel(v, v, v);
            let result =
                grayscale_rgb_u8(img.view(), GrayscaleWeights::bt709(), ExecutionPath::Sequential);
            assert_eq!(result[[0, 0, 0]], v);
        }
    }

    #[test]
    fn test_fixed_point_sums_to_scale() {
        for weights in [
            GrayscaleWeights::bt709(),
            GrayscaleWeights::average(),
            GrayscaleWeights::custom(0.49995, 0.50005, 0.0),
            GrayscaleWeights::custom(3.0, 1.0, 0.0),
        ] {
            let [r, g, b] = weights.fixed_point();
            assert_eq!(r + g + b, WEIGHT_SCALE, "{weights:?}");
        }
        assert_eq!(GrayscaleWeights::bt709().fixed_point(), [2126, 7152, 722]);
    }

    #[test]
    fn test_custom_weights() {
        let img = pixel(200, 100, 0);
        let weights = GrayscaleWeights::custom(1.0, 0.0, 0.0);
        let result = grayscale_rgb_u8(img.view(), weights, ExecutionPath::Sequential);
        assert_eq!(result[[0, 0, 0]], 200);
    }

    #[test]
    fn test_validate_rejects_negative() {
        let weights = GrayscaleWeights {
            r: -0.1,
            g: 0.6,
            b: 0.5,
        };
        assert!(matches!(weights.validate(), Err(FilterError::InvalidOptions(_))));
        let zero = GrayscaleWeights {
            r: 0.0,
            g: 0.0,
            b: 0.0,
        };
        assert!(zero.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_degenerate_sum() {
        // Each weight is finite, but the sum overflows.
        let huge = GrayscaleWeights {
            r: f32::MAX,
            g: f32::MAX,
            b: 0.0,
        };
        assert!(matches!(huge.validate(), Err(FilterError::InvalidOptions(_))));

        let subnormal = GrayscaleWeights {
            r: 1e-40,
            g: 1e-40,
            b: 0.0,
        };
        assert!(matches!(subnormal.validate(), Err(FilterError::InvalidOptions(_))));
    }

    #[test]
    fn test_small_normal_weights_keep_proportions() {
        let weights = GrayscaleWeights {
            r: 1e-30,
            g: 1e-30,
            b: 0.0,
        };
        assert!(weights.validate().is_ok());
        assert_eq!(weights.fixed_point(), [5000, 5000, 0]);
    }
}

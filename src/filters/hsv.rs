//! HSV adjustment filter.
//!
//! Each pixel is converted to HSV, the hue is rotated and saturation and
//! value are scaled, then the pixel is converted back to RGB and clamped.
//! The transform is purely per pixel, so row scheduling cannot change it.

use ndarray::{Array3, ArrayView3};
use serde::Deserialize;

use super::{map_rows, ExecutionPath};
use crate::buffer::CHANNELS;
use crate::error::{FilterError, Result};

/// Parameters of the HSV transform.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct HsvAdjust {
    /// Hue rotation in degrees (wraps around)
    pub hue_shift: f32,
    /// Saturation multiplier
    pub saturation: f32,
    /// Value multiplier
    pub value: f32,
}

impl Default for HsvAdjust {
    fn default() -> Self {
        Self {
            hue_shift: 0.0,
            saturation: 1.2,
            value: 1.1,
        }
    }
}

impl HsvAdjust {
    /// No-op transform: converts to HSV and straight back.
    pub fn identity() -> Self {
        Self {
            hue_shift: 0.0,
            saturation: 1.0,
            value: 1.0,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.hue_shift.is_finite() {
            return Err(FilterError::InvalidOptions("hue shift must be finite".to_string()));
        }
        for (name, v) in [("saturation", self.saturation), ("value", self.value)] {
            if !v.is_finite() || v < 0.0 {
                return Err(FilterError::InvalidOptions(format!(
                    "{} scale must be finite and non-negative, got {}",
                    name, v
                )));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Color Space Conversion Utilities
// ============================================================================

/// Convert RGB to HSV.
/// Input: r, g, b in 0.0-1.0
/// Output: (h, s, v) where h is 0.0-360.0, s and v are 0.0-1.0
#[inline]
pub fn rgb_to_hsv(r: f32, g: f32, b: f32) -> (f32, f32, f32) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let d = max - min;

    let v = max;
    let s = if max > 0.0 { d / max } else { 0.0 };

    if d <= 0.0 {
        return (0.0, s, v);
    }

    let h = if max == r {
        let mut h = (g - b) / d;
        if h < 0.0 {
            h += 6.0;
        }
        h * 60.0
    } else if max == g {
        ((b - r) / d + 2.0) * 60.0
    } else {
        ((r - g) / d + 4.0) * 60.0
    };

    (h, s, v)
}

/// Convert HSV to RGB.
/// Input: h in degrees (any value, wrapped), s and v in 0.0-1.0
/// Output: (r, g, b) in 0.0-1.0
#[inline]
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> (f32, f32, f32) {
    if s <= 0.0 {
        return (v, v, v);
    }

    // rem_euclid can round a tiny negative hue up to exactly 360.0.
    let h = h.rem_euclid(360.0);
    let h = if h >= 360.0 { 0.0 } else { h / 60.0 };
    let sector = h.floor();
    let f = h - sector;

    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    match sector as i32 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    }
}

#[inline]
fn to_u8(v: f32) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Apply the HSV transform to an RGB u8 image.
///
/// # Arguments
/// * `input` - Image (height, width, 3)
/// * `adjust` - Hue shift and saturation/value multipliers
/// * `path` - Sequential or parallel execution
pub fn hsv_rgb_u8(input: ArrayView3<u8>, adjust: HsvAdjust, path: ExecutionPath) -> Array3<u8> {
    let (height, width, _) = input.dim();

    map_rows(path, height, width, |y, row| {
        for x in 0..width {
            let r = input[[y, x, 0]] as f32 / 255.0;
            let g = input[[y, x, 1]] as f32 / 255.0;
            let b = input[[y, x, 2]] as f32 / 255.0;

            let (h, s, v) = rgb_to_hsv(r, g, b);
            let h = h + adjust.hue_shift;
            let s = (s * adjust.saturation).clamp(0.0, 1.0);
            let v = (v * adjust.value).clamp(0.0, 1.0);
            let (nr, ng, nb) = hsv_to_rgb(h, s, v);

            let out = &mut row[x * CHANNELS..(x + 1) * CHANNELS];
            out[0] = to_u8(nr);
            out[1] = to_u8(ng);
            out[2] = to_u8(nb);
        }
    })
}

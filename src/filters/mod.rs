//! Filter kernels for RGB pixel buffers.
//!
//! ## Supported Formats
//!
//! Every kernel reads an RGB8 image of shape (H, W, 3) and writes a fresh
//! RGB8 image of the same shape. The input is only ever borrowed.
//!
//! ## Architecture
//!
//! All kernels follow these principles:
//! - **Row kernels** - each kernel is written as a function of one output row
//! - **Two execution paths** - the same row kernel is driven either by a
//!   plain ordered loop or by rayon over disjoint rows
//! - **Deterministic** - integer or per-pixel arithmetic only, so both paths
//!   produce byte-identical output
//!
//! ## Filters
//!
//! - **Greyscale**: weighted luminance, replicated to R, G and B
//! - **Blur**: separable binomial (Gaussian) blur with edge replication
//! - **HSV**: hue shift plus saturation/value scaling in HSV space
//! - **Emboss**: directional relief against the top-left neighbour

pub mod blur;
pub mod emboss;
pub mod grayscale;
pub mod hsv;

use std::fmt;
use std::str::FromStr;

use log::debug;
use ndarray::Array3;
use rayon::prelude::*;
use serde::Deserialize;

use crate::buffer::{PixelBuffer, CHANNELS};
use crate::error::{FilterError, Result};

pub use blur::MAX_BLUR_RADIUS;
pub use grayscale::GrayscaleWeights;
pub use hsv::HsvAdjust;

/// The transforms this crate knows how to apply.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum FilterMode {
    Greyscale,
    Blur,
    Hsv,
    Emboss,
}

impl FilterMode {
    pub const ALL: [FilterMode; 4] = [
        FilterMode::Greyscale,
        FilterMode::Blur,
        FilterMode::Hsv,
        FilterMode::Emboss,
    ];

    /// Short name used on the command line and in output file names.
    pub fn name(self) -> &'static str {
        match self {
            FilterMode::Greyscale => "grey",
            FilterMode::Blur => "blur",
            FilterMode::Hsv => "hsv",
            FilterMode::Emboss => "emboss",
        }
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FilterMode {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "grey" | "gray" | "greyscale" | "grayscale" => Ok(FilterMode::Greyscale),
            "blur" => Ok(FilterMode::Blur),
            "hsv" => Ok(FilterMode::Hsv),
            "emboss" => Ok(FilterMode::Emboss),
            _ => Err(FilterError::UnsupportedMode(s.to_string())),
        }
    }
}

impl TryFrom<String> for FilterMode {
    type Error = FilterError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

/// How a kernel is executed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum ExecutionPath {
    /// One thread, rows in order.
    #[default]
    Sequential,
    /// Rows distributed over the current rayon pool.
    Parallel,
}

impl ExecutionPath {
    pub fn name(self) -> &'static str {
        match self {
            ExecutionPath::Sequential => "sequential",
            ExecutionPath::Parallel => "parallel",
        }
    }
}

impl fmt::Display for ExecutionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExecutionPath {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" | "seq" | "cpu" => Ok(ExecutionPath::Sequential),
            "parallel" | "par" => Ok(ExecutionPath::Parallel),
            _ => Err(FilterError::UnsupportedMode(s.to_string())),
        }
    }
}

impl TryFrom<String> for ExecutionPath {
    type Error = FilterError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

/// Kernel parameters.
///
/// Defaults: BT.709 luminance weights, a 5x5 binomial blur (radius 2),
/// saturation x1.2 and value x1.1 with no hue shift, emboss depth 1.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct FilterOptions {
    pub grayscale_weights: GrayscaleWeights,
    pub blur_radius: usize,
    pub hsv: HsvAdjust,
    pub emboss_depth: i32,
}

/// Largest accepted emboss depth.
pub const MAX_EMBOSS_DEPTH: i32 = 8;

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            grayscale_weights: GrayscaleWeights::default(),
            blur_radius: 2,
            hsv: HsvAdjust::default(),
            emboss_depth: 1,
        }
    }
}

impl FilterOptions {
    pub fn validate(&self) -> Result<()> {
        self.grayscale_weights.validate()?;
        self.hsv.validate()?;
        if self.blur_radius > MAX_BLUR_RADIUS {
            return Err(FilterError::InvalidOptions(format!(
                "blur radius {} exceeds {}",
                self.blur_radius, MAX_BLUR_RADIUS
            )));
        }
        if !(1..=MAX_EMBOSS_DEPTH).contains(&self.emboss_depth) {
            return Err(FilterError::InvalidOptions(format!(
                "emboss depth {} outside 1..={}",
                self.emboss_depth, MAX_EMBOSS_DEPTH
            )));
        }
        Ok(())
    }
}

/// Apply `mode` to `input` with default options.
pub fn apply(mode: FilterMode, path: ExecutionPath, input: &PixelBuffer) -> Result<PixelBuffer> {
    apply_with(mode, path, input, &FilterOptions::default())
}

/// Apply `mode` to `input`, producing a new buffer.
///
/// Fails with [`FilterError::InvalidBuffer`] for empty buffers and
/// [`FilterError::InvalidOptions`] for out-of-range parameters.
pub fn apply_with(
    mode: FilterMode,
    path: ExecutionPath,
    input: &PixelBuffer,
    options: &FilterOptions,
) -> Result<PixelBuffer> {
    input.validate()?;
    options.validate()?;

    let (width, height) = input.dimensions();
    debug!("applying {} ({}) to {}x{} image", mode, path, width, height);

    let view = input.view();
    let output = match mode {
        FilterMode::Greyscale => grayscale::grayscale_rgb_u8(view, options.grayscale_weights, path),
        FilterMode::Blur => blur::blur_rgb_u8(view, options.blur_radius, path),
        FilterMode::Hsv => hsv::hsv_rgb_u8(view, options.hsv, path),
        FilterMode::Emboss => emboss::emboss_rgb_u8(view, options.emboss_depth, path),
    };

    PixelBuffer::from_array(output)
}

// ============================================================================
// Row execution
// ============================================================================

/// Drive `kernel` over every `row_len`-sized row of `out`.
///
/// Rows are disjoint, so the parallel path needs no synchronisation.
pub(crate) fn for_each_row<T, F>(path: ExecutionPath, out: &mut [T], row_len: usize, kernel: F)
where
    T: Send,
    F: Fn(usize, &mut [T]) + Sync,
{
    if row_len == 0 {
        return;
    }
    match path {
        ExecutionPath::Sequential => out
            .chunks_mut(row_len)
            .enumerate()
            .for_each(|(y, row)| kernel(y, row)),
        ExecutionPath::Parallel => out
            .par_chunks_mut(row_len)
            .enumerate()
            .for_each(|(y, row)| kernel(y, row)),
    }
}

/// Allocate a (height, width, 3) output and fill it row by row.
pub(crate) fn map_rows<F>(path: ExecutionPath, height: usize, width: usize, kernel: F) -> Array3<u8>
where
    F: Fn(usize, &mut [u8]) + Sync,
{
    let mut output = Array3::<u8>::zeros((height, width, CHANNELS));
    // A freshly allocated array is always contiguous.
    if let Some(flat) = output.as_slice_mut() {
        for_each_row(path, flat, width * CHANNELS, kernel);
    }
    output
}

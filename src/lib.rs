//! Image Modifier
//!
//! Image filters with a sequential and a parallel execution path, an image
//! codec adapter, a difference utility and a small performance harness that
//! compares the two paths.
//!
//! ## Image Format
//! All kernels work on 8-bit RGB rasters, (height, width, 3), held in a
//! [`PixelBuffer`]. Decoding normalizes any source image to that format;
//! alpha and extra channels are dropped.
//!
//! ## Execution Paths
//! Every filter is written once as a row kernel. [`ExecutionPath::Sequential`]
//! runs it over the rows in order on the calling thread,
//! [`ExecutionPath::Parallel`] hands disjoint rows to rayon. Both produce
//! byte-identical output.
//!
//! ```no_run
//! use image_modifier::{apply, codec, ExecutionPath, FilterMode};
//!
//! let input = codec::decode("photo.png")?;
//! let output = apply(FilterMode::Blur, ExecutionPath::Parallel, &input)?;
//! codec::encode(&output, "photo_blur.png")?;
//! # Ok::<(), image_modifier::FilterError>(())
//! ```

pub mod buffer;
pub mod codec;
pub mod diff;
pub mod error;
pub mod filters;
pub mod harness;

#[cfg(feature = "python")]
mod python;

pub use buffer::PixelBuffer;
pub use diff::{diff, diff_buffers, DiffStats};
pub use error::{FilterError, Result};
pub use filters::{apply, apply_with, ExecutionPath, FilterMode, FilterOptions};

#[cfg(feature = "python")]
pub use python::image_modifier;

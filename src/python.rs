//! Python bindings.
//!
//! Images are exchanged as `(height, width, 3)` uint8 numpy arrays. Kernels
//! run with the GIL released.

use numpy::{IntoPyArray, PyArray3, PyReadonlyArray3};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::buffer::PixelBuffer;
use crate::diff::diff_buffers;
use crate::error::FilterError;
use crate::filters::{apply_with, ExecutionPath, FilterMode, FilterOptions};

fn to_py_err(err: FilterError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

fn to_buffer(image: &PyReadonlyArray3<'_, u8>) -> PyResult<PixelBuffer> {
    PixelBuffer::from_array(image.as_array().to_owned()).map_err(to_py_err)
}

/// Apply a filter ("grey", "blur", "hsv" or "emboss") to an RGB u8 image.
#[pyfunction]
#[pyo3(signature = (image, mode, parallel=true, blur_radius=2))]
pub fn apply_filter<'py>(
    py: Python<'py>,
    image: PyReadonlyArray3<'py, u8>,
    mode: &str,
    parallel: bool,
    blur_radius: usize,
) -> PyResult<Bound<'py, PyArray3<u8>>> {
    let mode: FilterMode = mode.parse().map_err(to_py_err)?;
    let path = if parallel {
        ExecutionPath::Parallel
    } else {
        ExecutionPath::Sequential
    };
    let options = FilterOptions {
        blur_radius,
        ..FilterOptions::default()
    };
    let input = to_buffer(&image)?;

    let output = py
        .allow_threads(|| apply_with(mode, path, &input, &options))
        .map_err(to_py_err)?;
    Ok(output.into_array().into_pyarray(py))
}

/// Per-channel absolute difference of two RGB u8 images of equal size.
#[pyfunction]
pub fn diff_images<'py>(
    py: Python<'py>,
    a: PyReadonlyArray3<'py, u8>,
    b: PyReadonlyArray3<'py, u8>,
) -> PyResult<Bound<'py, PyArray3<u8>>> {
    let a = to_buffer(&a)?;
    let b = to_buffer(&b)?;
    let output = diff_buffers(&a, &b).map_err(to_py_err)?;
    Ok(output.into_array().into_pyarray(py))
}

/// image_modifier extension module
#[pymodule]
pub fn image_modifier(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(apply_filter, m)?)?;
    m.add_function(wrap_pyfunction!(diff_images, m)?)?;
    Ok(())
}

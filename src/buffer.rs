//! RGB pixel buffer.
//!
//! A [`PixelBuffer`] is an 8-bit RGB raster stored as an `ndarray` array of
//! shape (height, width, 3) in standard (row-major) layout, so the raw bytes
//! are exactly `width * height * 3` long and rows are contiguous.

use ndarray::{Array3, ArrayView3};

use crate::error::{FilterError, Result};

/// Number of channels in every buffer.
pub const CHANNELS: usize = 3;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    data: Array3<u8>,
}

impl PixelBuffer {
    /// Wrap raw row-major RGB bytes.
    ///
    /// Fails with [`FilterError::InvalidBuffer`] when `data.len()` is not
    /// `width * height * 3`.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * CHANNELS;
        if data.len() != expected {
            return Err(FilterError::InvalidBuffer(format!(
                "{}x{} RGB needs {} bytes, got {}",
                width,
                height,
                expected,
                data.len()
            )));
        }
        let data = Array3::from_shape_vec((height as usize, width as usize, CHANNELS), data)
            .map_err(|e| FilterError::InvalidBuffer(e.to_string()))?;
        Ok(Self { data })
    }

    /// Wrap an existing (height, width, 3) array.
    pub fn from_array(data: Array3<u8>) -> Result<Self> {
        let (_, _, channels) = data.dim();
        if channels != CHANNELS {
            return Err(FilterError::InvalidBuffer(format!(
                "expected {} channels, got {}",
                CHANNELS, channels
            )));
        }
        // Force standard layout so `as_slice` and row chunking always work.
        let data = if data.is_standard_layout() {
            data
        } else {
            data.as_standard_layout().into_owned()
        };
        Ok(Self { data })
    }

    /// A buffer with every pixel set to `rgb`.
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let data = Array3::from_shape_fn((height as usize, width as usize, CHANNELS), |(_, _, c)| {
            rgb[c]
        });
        Self { data }
    }

    pub fn width(&self) -> u32 {
        self.data.dim().1 as u32
    }

    pub fn height(&self) -> u32 {
        self.data.dim().0 as u32
    }

    /// (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    /// Bytes per row.
    pub fn row_len(&self) -> usize {
        self.width() as usize * CHANNELS
    }

    pub fn view(&self) -> ArrayView3<'_, u8> {
        self.data.view()
    }

    pub fn as_array(&self) -> &Array3<u8> {
        &self.data
    }

    /// Raw row-major bytes.
    pub fn as_bytes(&self) -> &[u8] {
        // Standard layout is enforced by every constructor.
        self.data.as_slice().unwrap_or(&[])
    }

    pub fn into_array(self) -> Array3<u8> {
        self.data
    }

    /// RGB triple at (x, y).
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let (x, y) = (x as usize, y as usize);
        [
            self.data[[y, x, 0]],
            self.data[[y, x, 1]],
            self.data[[y, x, 2]],
        ]
    }

    /// Check the buffer is something a kernel can process.
    pub fn validate(&self) -> Result<()> {
        let (width, height) = self.dimensions();
        if width == 0 || height == 0 {
            return Err(FilterError::InvalidBuffer(format!(
                "empty image ({}x{})",
                width, height
            )));
        }
        if self.as_bytes().len() != width as usize * height as usize * CHANNELS {
            return Err(FilterError::InvalidBuffer(
                "buffer is not contiguous".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::s;

    #[test]
    fn test_from_raw_layout() {
        // 2x1 image: red, blue
        let buf = PixelBuffer::from_raw(2, 1, vec![255, 0, 0, 0, 0, 255]).unwrap();
        assert_eq!(buf.dimensions(), (2, 1));
        assert_eq!(buf.pixel(0, 0), [255, 0, 0]);
        assert_eq!(buf.pixel(1, 0), [0, 0, 255]);
        assert_eq!(buf.row_len(), 6);
    }

    #[test]
    fn test_from_raw_length_mismatch() {
        let err = PixelBuffer::from_raw(2, 2, vec![0; 11]).unwrap_err();
        assert!(matches!(err, FilterError::InvalidBuffer(_)));
    }

    #[test]
    fn test_from_array_rejects_rgba() {
        let err = PixelBuffer::from_array(Array3::<u8>::zeros((2, 2, 4))).unwrap_err();
        assert!(matches!(err, FilterError::InvalidBuffer(_)));
    }

    #[test]
    fn test_from_array_transposed_becomes_standard() {
        let mut arr = Array3::<u8>::zeros((3, 2, 3));
        arr[[2, 1, 0]] = 7;
        // Swap the spatial axes to get a non-standard view, then own it.
        let mut swapped = arr.clone();
        swapped.swap_axes(0, 1);
        let buf = PixelBuffer::from_array(swapped).unwrap();
        assert_eq!(buf.dimensions(), (3, 2));
        assert_eq!(buf.pixel(2, 1), [7, 0, 0]);
        assert_eq!(buf.as_bytes().len(), 18);
    }

    #[test]
    fn test_validate_empty() {
        let buf = PixelBuffer::from_raw(0, 4, Vec::new()).unwrap();
        assert!(matches!(buf.validate(), Err(FilterError::InvalidBuffer(_))));
    }

    #[test]
    fn test_as_bytes_roundtrip() {
        let raw: Vec<u8> = (0..12).collect();
        let buf = PixelBuffer::from_raw(2, 2, raw.clone()).unwrap();
        assert_eq!(buf.as_bytes(), raw.as_slice());
    }

    #[test]
    fn test_from_array_sliced_rows() {
        // Dropping the first row keeps standard layout but offsets the data.
        let mut arr = Array3::from_shape_vec((2, 1, 3), vec![0, 1, 2, 10, 11, 12]).unwrap();
        arr.slice_collapse(s![1.., .., ..]);
        let buf = PixelBuffer::from_array(arr).unwrap();
        assert_eq!(buf.dimensions(), (1, 1));
        assert_eq!(buf.as_bytes(), &[10, 11, 12]);
        assert_eq!(buf.pixel(0, 0), [10, 11, 12]);
        assert_eq!(buf.into_array().iter().copied().collect::<Vec<_>>(), vec![10, 11, 12]);
    }
}

//! Image file decoding and encoding.
//!
//! Decoding normalizes every source (grey, RGBA, 16-bit, palette) to 8-bit
//! RGB. Encoding picks the format from the file extension and writes through
//! a temporary file in the destination directory that is renamed over the
//! target only once the image has been fully written.

use std::io::{BufWriter, Write};
use std::path::Path;

use image::{DynamicImage, ImageFormat, ImageReader, RgbImage};
use log::debug;
use tempfile::NamedTempFile;

use crate::buffer::PixelBuffer;
use crate::error::{FilterError, Result};

/// Decode an image file into an RGB buffer.
pub fn decode(path: impl AsRef<Path>) -> Result<PixelBuffer> {
    let path = path.as_ref();

    if !path.is_file() {
        return Err(FilterError::unreadable(path, "no such file"));
    }

    let image = ImageReader::open(path)
        .map_err(|e| FilterError::unreadable(path, e))?
        .with_guessed_format()
        .map_err(|e| FilterError::unreadable(path, e))?
        .decode()
        .map_err(|e| FilterError::unreadable(path, e))?;

    debug!(
        "decoded {} ({}x{}, {:?})",
        path.display(),
        image.width(),
        image.height(),
        image.color()
    );

    let rgb = image.into_rgb8();
    let (width, height) = rgb.dimensions();
    PixelBuffer::from_raw(width, height, rgb.into_raw())
}

/// Encode `buffer` to `path`, replacing any existing file.
///
/// The format is inferred from the extension. On failure the target is left
/// untouched.
pub fn encode(buffer: &PixelBuffer, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();

    let format = ImageFormat::from_path(path).map_err(|e| FilterError::unwritable(path, e))?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if !dir.is_dir() {
        return Err(FilterError::unwritable(
            path,
            format!("directory {} does not exist", dir.display()),
        ));
    }

    let (width, height) = buffer.dimensions();
    let image = RgbImage::from_raw(width, height, buffer.as_bytes().to_vec())
        .ok_or_else(|| FilterError::unwritable(path, "buffer does not match its dimensions"))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| FilterError::unwritable(path, e))?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        DynamicImage::ImageRgb8(image)
            .write_to(&mut writer, format)
            .map_err(|e| FilterError::unwritable(path, e))?;
        writer.flush().map_err(|e| FilterError::unwritable(path, e))?;
    }
    tmp.as_file()
        .sync_all()
        .map_err(|e| FilterError::unwritable(path, e))?;

    // Temp files are created owner-only; published images should not be.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o644))
            .map_err(|e| FilterError::unwritable(path, e))?;
    }

    tmp.persist(path)
        .map_err(|e| FilterError::unwritable(path, e.error))?;

    debug!("encoded {} ({}x{}, {:?})", path.display(), width, height, format);
    Ok(())
}

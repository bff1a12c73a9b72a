//! PNG encoding of captured frames.
//!
//! Feature-gated behind `png` (default on). Row flipping lives in
//! [`crate::pixel`] and is always available.

use fragshot_core::HarnessError;
use std::path::Path;

use crate::pixel::flip_rows;

/// Writes a top-down RGBA8 buffer as a PNG image.
///
/// # Errors
///
/// Returns `HarnessError::Encode` if the buffer does not match the
/// dimensions or the encoder fails to write `path`.
pub fn write_png(rgba: Vec<u8>, width: u32, height: u32, path: &Path) -> Result<(), HarnessError> {
    let img = image::RgbaImage::from_raw(width, height, rgba).ok_or_else(|| {
        HarnessError::Encode(format!("RGBA buffer size mismatch for {width}x{height}"))
    })?;
    img.save(path)
        .map_err(|e| HarnessError::Encode(format!("{}: {e}", path.display())))
}

/// Flips a bottom-up framebuffer readback and writes it as a PNG image.
///
/// # Errors
///
/// Returns `HarnessError::Encode` on a size mismatch or encoder failure.
pub fn write_capture(
    readback: &[u8],
    width: u32,
    height: u32,
    path: &Path,
) -> Result<(), HarnessError> {
    let rgba = flip_rows(readback, width, height)?;
    write_png(rgba, width, height, path)?;
    tracing::info!(width, height, "wrote {}", path.display());
    Ok(())
}

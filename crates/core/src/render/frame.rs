//! Per-frame GL work: drawing the quad and reading the color buffer back.

use super::context::check_gl_error;
use super::pipeline::BoundProgram;
use crate::driver::{drive_frames, LoopOutcome, RenderSurface};
use crate::error::HarnessError;
use crate::params::RunParams;

/// Clears to opaque black and draws the quad as two triangles.
///
/// # Errors
///
/// Returns `HarnessError::Backend` if the GL error flag is raised.
#[allow(unsafe_code)]
pub fn draw_frame(gl: &glow::Context) -> Result<(), HarnessError> {
    use glow::HasContext;

    // SAFETY: the program, vertex buffer and vertex array from the
    // pipeline are still bound.
    unsafe {
        gl.clear_color(0.0, 0.0, 0.0, 1.0);
        gl.clear(glow::COLOR_BUFFER_BIT);
        gl.draw_arrays(glow::TRIANGLES, 0, 3);
        gl.draw_arrays(glow::TRIANGLES, 3, 3);
        gl.flush();
    }
    check_gl_error(gl, "glDrawArrays")
}

/// Reads `width * height` RGBA8 pixels from the bound framebuffer.
///
/// Rows come back bottom-up, as OpenGL stores them.
///
/// # Errors
///
/// Returns `HarnessError::Backend` if the GL error flag is raised.
#[allow(unsafe_code)]
pub fn read_pixels(gl: &glow::Context, width: u32, height: u32) -> Result<Vec<u8>, HarnessError> {
    use glow::HasContext;

    let mut pixels = vec![0u8; width as usize * height as usize * 4];
    // SAFETY: the buffer holds exactly width * height RGBA8 pixels and
    // RGBA8 rows are always 4-byte aligned.
    unsafe {
        gl.read_pixels(
            0,
            0,
            width as i32,
            height as i32,
            glow::RGBA,
            glow::UNSIGNED_BYTE,
            glow::PixelPackData::Slice(Some(&mut pixels)),
        );
    }
    check_gl_error(gl, "glReadPixels")?;
    Ok(pixels)
}

/// Renders frames on `surface` until the capture frame, then hands the
/// raw bottom-up readback to `on_capture`.
///
/// # Errors
///
/// Propagates errors from drawing, reading back, `on_capture` and the
/// surface.
pub fn render_and_capture<S, F>(
    gl: &glow::Context,
    surface: &mut S,
    bound: &BoundProgram,
    params: &RunParams,
    mut on_capture: F,
) -> Result<LoopOutcome, HarnessError>
where
    S: RenderSurface,
    F: FnMut(Vec<u8>) -> Result<(), HarnessError>,
{
    tracing::debug!(
        vertices = bound.vertex_count(),
        uniforms = bound.uniform_count(),
        "entering render loop"
    );
    drive_frames(
        surface,
        params.delay,
        params.persist,
        || draw_frame(gl),
        || on_capture(read_pixels(gl, params.width, params.height)?),
    )
}

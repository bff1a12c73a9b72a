//! The render/capture loop, independent of any GL context.
//!
//! A window system implements [`RenderSurface`]; the loop in
//! [`drive_frames`] asks it whether to keep going, calls back to draw and
//! capture, and presents each frame. The GL work itself lives in
//! `render::frame`, which plugs into this loop.

use crate::error::HarnessError;
use crate::schedule::{CaptureSchedule, FrameAction};

/// Window/context collaborator of the render loop.
pub trait RenderSurface {
    /// Whether the loop may draw another frame (false once the window
    /// has been asked to close).
    fn keep_looping(&mut self) -> bool;

    /// Presents the frame just drawn.
    ///
    /// # Errors
    ///
    /// Returns `HarnessError::Backend` if the swap fails.
    fn swap_buffers(&mut self) -> Result<(), HarnessError>;

    /// Blocks until a key is pressed or the window is closed.
    fn wait_for_key_then_close(&mut self);

    /// Releases the window and context.
    fn terminate(self)
    where
        Self: Sized;
}

/// How the loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopOutcome {
    /// The capture frame was reached and `capture` succeeded.
    Captured { frames: u32 },
    /// The surface stopped looping before the capture frame.
    ClosedEarly { frames: u32 },
}

/// Runs frames until capture (or until the surface closes).
///
/// Each iteration calls `draw`; on the capture frame `capture` runs
/// after drawing and before the swap, so it sees the frame's back
/// buffer. With `persist` set the loop stops drawing after capture and
/// waits for a key instead of returning straight away.
///
/// # Errors
///
/// Propagates the first error from `draw`, `capture` or the surface.
pub fn drive_frames<S, D, C>(
    surface: &mut S,
    delay: u32,
    persist: bool,
    mut draw: D,
    mut capture: C,
) -> Result<LoopOutcome, HarnessError>
where
    S: RenderSurface,
    D: FnMut() -> Result<(), HarnessError>,
    C: FnMut() -> Result<(), HarnessError>,
{
    let mut schedule = CaptureSchedule::new(delay);

    while surface.keep_looping() {
        let action = schedule.next_frame();
        draw()?;
        if action == FrameAction::Capture {
            capture()?;
        }
        surface.swap_buffers()?;

        if action == FrameAction::Capture {
            tracing::debug!(frame = schedule.frames_rendered(), "captured frame");
            if persist {
                surface.wait_for_key_then_close();
            }
            return Ok(LoopOutcome::Captured {
                frames: schedule.frames_rendered(),
            });
        }
    }

    tracing::warn!(
        "window closed after {} of {} frames, no image captured",
        schedule.frames_rendered(),
        schedule.capture_frame()
    );
    Ok(LoopOutcome::ClosedEarly {
        frames: schedule.frames_rendered(),
    })
}

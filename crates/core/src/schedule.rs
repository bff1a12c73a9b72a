//! Frame counting for the render loop.
//!
//! `CaptureSchedule` decides which frame is read back. It is pure counter
//! logic with no GPU dependency, so the driver loop only has to ask it
//! what to do with each frame it draws.

/// What the render loop should do with the frame it is about to finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameAction {
    /// Draw and present.
    Render,
    /// Draw, read the framebuffer back, then present.
    Capture,
}

/// Counts frames and flags exactly one of them for capture.
///
/// The capture frame is `max(delay, 1)`, so a delay of zero still
/// captures the first frame rendered.
#[derive(Debug, Clone)]
pub struct CaptureSchedule {
    capture_frame: u32,
    frame: u32,
}

impl CaptureSchedule {
    /// Creates a schedule that captures after `delay` frames.
    pub fn new(delay: u32) -> Self {
        Self {
            capture_frame: delay.max(1),
            frame: 0,
        }
    }

    /// Advances to the next frame and reports what to do with it.
    ///
    /// Returns [`FrameAction::Capture`] exactly once, on the capture frame.
    pub fn next_frame(&mut self) -> FrameAction {
        self.frame = self.frame.saturating_add(1);
        if self.frame == self.capture_frame {
            FrameAction::Capture
        } else {
            FrameAction::Render
        }
    }

    /// The 1-based index of the frame that gets captured.
    pub fn capture_frame(&self) -> u32 {
        self.capture_frame
    }

    /// Frames handed out so far.
    pub fn frames_rendered(&self) -> u32 {
        self.frame
    }

    /// Whether the capture frame has been reached.
    pub fn is_captured(&self) -> bool {
        self.frame >= self.capture_frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actions(delay: u32, frames: usize) -> Vec<FrameAction> {
        let mut schedule = CaptureSchedule::new(delay);
        (0..frames).map(|_| schedule.next_frame()).collect()
    }

    #[test]
    fn captures_on_the_delay_frame() {
        let got = actions(5, 5);
        assert_eq!(got[..4], [FrameAction::Render; 4]);
        assert_eq!(got[4], FrameAction::Capture);
    }

    #[test]
    fn zero_delay_captures_first_frame() {
        let mut schedule = CaptureSchedule::new(0);
        assert_eq!(schedule.capture_frame(), 1);
        assert_eq!(schedule.next_frame(), FrameAction::Capture);
    }

    #[test]
    fn delay_of_one_captures_first_frame() {
        assert_eq!(actions(1, 1), [FrameAction::Capture]);
    }

    #[test]
    fn captures_exactly_once() {
        let captures = actions(3, 100)
            .into_iter()
            .filter(|a| *a == FrameAction::Capture)
            .count();
        assert_eq!(captures, 1, "capture must happen exactly once");
    }

    #[test]
    fn is_captured_flips_at_capture_frame() {
        let mut schedule = CaptureSchedule::new(2);
        assert!(!schedule.is_captured());
        schedule.next_frame();
        assert!(!schedule.is_captured());
        schedule.next_frame();
        assert!(schedule.is_captured());
        schedule.next_frame();
        assert!(schedule.is_captured(), "stays captured after the capture frame");
        assert_eq!(schedule.frames_rendered(), 3);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn capture_index_is_max_of_delay_and_one(delay in 0u32..500, extra in 0usize..50) {
                let total = delay.max(1) as usize + extra;
                let got = actions(delay, total);
                let index = got.iter().position(|a| *a == FrameAction::Capture);
                prop_assert_eq!(index, Some(delay.max(1) as usize - 1));
                prop_assert_eq!(got.iter().filter(|a| **a == FrameAction::Capture).count(), 1);
            }
        }
    }
}

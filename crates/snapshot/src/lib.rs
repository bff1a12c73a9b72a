#![deny(unsafe_code)]
//! Frame capture output for fragshot.
//!
//! OpenGL reads the framebuffer back bottom row first. [`pixel`] turns that
//! into top-down rows and is always available; [`snapshot`] encodes the
//! result as PNG and sits behind the default `png` feature so that callers
//! which only need raw pixels do not pull in the `image` crate.

pub mod pixel;

#[cfg(feature = "png")]
pub mod snapshot;

pub use pixel::{flip_rows, RGBA_CHANNELS};

#[cfg(feature = "png")]
pub use snapshot::{write_capture, write_png};

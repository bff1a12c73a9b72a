#![deny(unsafe_code)]
//! Core of the fragshot GLSL fragment-shader harness.
//!
//! Everything that does not need a GPU lives at the top level: shader
//! loading and `#version` detection, the generated vertex shader, run
//! parameters, uniform descriptions, the capture schedule and the frame
//! loop. The OpenGL side (compile, link, bind, draw, read back) is in
//! [`render`], behind the `render` feature.

pub mod driver;
pub mod error;
pub mod params;
pub mod schedule;
pub mod source;
pub mod uniforms;
pub mod vertex;

#[cfg(feature = "render")]
pub mod render;

pub use driver::{drive_frames, LoopOutcome, RenderSurface};
pub use error::{HarnessError, ShaderError, ShaderStage};
pub use params::{ApiVersion, ContextRequest, GraphicsApi, RunParams};
pub use schedule::{CaptureSchedule, FrameAction};
pub use source::{detect_version, read_source, GlslVersion, SUPPORTED_VERSIONS};
pub use uniforms::{plan_bindings, UniformBinding, UniformDescription, UniformInit};
pub use vertex::{generate_vertex_shader, vertex_source, VERTEX_POSITION_ATTRIBUTE};

//! OpenGL / OpenGL ES rendering.
//!
//! This module is only available when the `render` feature is enabled.
//! Everything here needs a current `glow::Context`.
//!
//! # Module overview
//!
//! - [`context`] -- Context wrapper with the negotiated API, and GL error polling.
//! - [`shader`] -- Shader compilation, linking, and error formatting.
//! - [`quad`] -- The two-triangle quad and its vertex buffer.
//! - [`binder`] -- Uniform uploads from a description.
//! - [`binary`] -- Program binary dump.
//! - [`pipeline`] -- The compile → link → bind sequence.
//! - [`frame`] -- Drawing, readback and the render loop.

pub mod binary;
pub mod binder;
pub mod context;
pub mod frame;
pub mod pipeline;
pub mod quad;
pub mod shader;

pub use binary::{dump_program_binary, DumpOutcome};
pub use binder::{apply_uniform, bind_uniforms};
pub use context::{check_gl_error, gl_error_name, GpuContext};
pub use frame::{draw_frame, read_pixels, render_and_capture};
pub use pipeline::{build_pipeline, BoundProgram, PipelineOutcome, Stage};
pub use quad::{QuadBuffers, QUAD_VERTICES};
pub use shader::{compile_shader, format_shader_error, link_program};

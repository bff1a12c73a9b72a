//! The compile → link → bind pipeline.
//!
//! [`build_pipeline`] walks the stages in order and stops early when the
//! run asks it to (`exit_after_compile`, `exit_after_link`). A pipeline
//! that runs to the end returns a [`BoundProgram`] that is in use, has
//! its uniforms set and the quad bound, ready to draw.

use super::binary::dump_program_binary;
use super::binder::bind_uniforms;
use super::context::{check_gl_error, GpuContext};
use super::quad::{position_attribute, upload_quad, QuadBuffers, QUAD_VERTEX_COUNT};
use super::shader::{compile_shader, link_program};
use crate::error::{HarnessError, ShaderStage};
use crate::params::{ApiVersion, RunParams};
use crate::vertex::vertex_source;
use std::fmt;

/// Pipeline stages, in the order they are reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Uncompiled,
    FragmentCompiled,
    VertexCompiled,
    Linked,
    Bound,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Uncompiled => "uncompiled",
            Stage::FragmentCompiled => "fragment compiled",
            Stage::VertexCompiled => "vertex compiled",
            Stage::Linked => "linked",
            Stage::Bound => "bound",
        };
        f.write_str(name)
    }
}

/// How far [`build_pipeline`] got.
#[derive(Debug)]
pub enum PipelineOutcome {
    /// The run asked to stop after this stage; nothing is left bound.
    StoppedAfter(Stage),
    /// Every stage completed.
    Ready(BoundProgram),
}

/// A linked program in use, with its quad uploaded and uniforms set.
#[derive(Debug)]
pub struct BoundProgram {
    program: glow::Program,
    quad: QuadBuffers,
    uniforms: usize,
}

impl BoundProgram {
    /// Vertices drawn per frame.
    pub fn vertex_count(&self) -> i32 {
        QUAD_VERTEX_COUNT
    }

    /// Number of active uniforms that were set.
    pub fn uniform_count(&self) -> usize {
        self.uniforms
    }

    /// Deletes the program and quad buffers.
    #[allow(unsafe_code)]
    pub fn destroy(self, gl: &glow::Context) {
        use glow::HasContext;

        self.quad.destroy(gl);
        // SAFETY: program was created on this context and is not used
        // after this call.
        unsafe {
            gl.use_program(None);
            gl.delete_program(self.program);
        }
    }
}

fn fragment_origin(params: &RunParams) -> String {
    params.fragment_path.display().to_string()
}

fn vertex_origin(params: &RunParams) -> String {
    params
        .vertex_path
        .as_ref()
        .map_or_else(|| "generated".to_string(), |p| p.display().to_string())
}

/// Compiles, links and binds the shader program for `params`.
///
/// The vertex source is only read once the fragment shader has compiled.
/// When the API supports it the program is linked with the
/// binary-retrievable hint, and the binary is dumped right after linking
/// if `params.binary_dump` is set.
///
/// # Errors
///
/// - `ShaderError::CompileError` (wrapped) for either stage.
/// - `ShaderError::LinkError` (wrapped) if linking fails.
/// - `FileNotFound` for an unreadable user vertex shader.
/// - Description and binding errors from [`bind_uniforms`].
/// - `HarnessError::Backend` for missing attributes or GL errors.
#[allow(unsafe_code)]
pub fn build_pipeline(
    ctx: &GpuContext,
    params: &RunParams,
    fragment_source: &str,
) -> Result<PipelineOutcome, HarnessError> {
    use glow::HasContext;

    let gl = ctx.gl();
    let api = ctx.api();
    tracing::debug!(stage = %Stage::Uncompiled, "building pipeline");

    let fragment = compile_shader(
        gl,
        ShaderStage::Fragment,
        &fragment_origin(params),
        fragment_source,
    )?;
    tracing::debug!(stage = %Stage::FragmentCompiled);

    if params.exit_after_compile {
        // SAFETY: fragment is a valid shader handle that nothing else owns.
        unsafe { gl.delete_shader(fragment) };
        return Ok(PipelineOutcome::StoppedAfter(Stage::FragmentCompiled));
    }

    let vertex = vertex_source(params.vertex_path.as_deref(), params.shader_version)
        .and_then(|source| compile_shader(gl, ShaderStage::Vertex, &vertex_origin(params), &source));
    let vertex = match vertex {
        Ok(vertex) => vertex,
        Err(e) => {
            unsafe { gl.delete_shader(fragment) };
            return Err(e);
        }
    };
    tracing::debug!(stage = %Stage::VertexCompiled);

    let linked = link_program(gl, vertex, fragment, api.supports_program_binary());
    // SAFETY: both handles are valid; a linked program keeps what it needs.
    unsafe {
        gl.delete_shader(vertex);
        gl.delete_shader(fragment);
    }
    let program = linked?;
    tracing::debug!(stage = %Stage::Linked);

    let bound = finish_linked(gl, api, program, params);
    match bound {
        Ok(PipelineOutcome::StoppedAfter(stage)) => {
            unsafe { gl.delete_program(program) };
            Ok(PipelineOutcome::StoppedAfter(stage))
        }
        Ok(ready) => Ok(ready),
        Err(e) => {
            unsafe { gl.delete_program(program) };
            Err(e)
        }
    }
}

/// The post-link steps: dump, optional stop, attribute, quad, uniforms,
/// viewport.
#[allow(unsafe_code)]
fn finish_linked(
    gl: &glow::Context,
    api: ApiVersion,
    program: glow::Program,
    params: &RunParams,
) -> Result<PipelineOutcome, HarnessError> {
    use glow::HasContext;

    if let Some(path) = &params.binary_dump {
        dump_program_binary(gl, api, program, path)?;
    }

    if params.exit_after_link {
        return Ok(PipelineOutcome::StoppedAfter(Stage::Linked));
    }

    let attribute = position_attribute(gl, program)?;
    let quad = upload_quad(gl, api, attribute)?;

    // SAFETY: program is linked.
    unsafe { gl.use_program(Some(program)) };
    check_gl_error(gl, "glUseProgram")?;

    let uniforms = bind_uniforms(gl, program, api, params)?;

    unsafe { gl.viewport(0, 0, params.width as i32, params.height as i32) };
    check_gl_error(gl, "glViewport")?;
    tracing::debug!(stage = %Stage::Bound, uniforms);

    Ok(PipelineOutcome::Ready(BoundProgram {
        program,
        quad,
        uniforms,
    }))
}

//! Shader compilation and linking helpers for OpenGL / OpenGL ES.
//!
//! The compile/link functions require a live `glow::Context`; the
//! formatting utility is pure string processing.

use crate::error::HarnessError;
pub use crate::error::{ShaderError, ShaderStage};

/// Formats a shader compilation error for human-readable debugging.
///
/// Prepends right-aligned line numbers to each line of `source`, then
/// appends the driver's error `log`, so that line references in the log
/// can be matched against the GLSL.
pub fn format_shader_error(source: &str, log: &str) -> String {
    let source_lines: Vec<&str> = source.lines().collect();
    let width = source_lines.len().max(1).to_string().len();

    let numbered = source_lines
        .iter()
        .enumerate()
        .map(|(i, line)| format!("{:>width$}: {line}", i + 1))
        .collect::<Vec<_>>()
        .join("\n");

    match (numbered.is_empty(), log.is_empty()) {
        (true, true) => String::new(),
        (true, false) => log.to_string(),
        (false, true) => numbered,
        (false, false) => format!("{numbered}\n\n{log}"),
    }
}

fn gl_shader_type(stage: ShaderStage) -> u32 {
    match stage {
        ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        ShaderStage::Vertex => glow::VERTEX_SHADER,
    }
}

/// Compiles a single shader stage.
///
/// `origin` names where the source came from (a path, or `generated`)
/// and is carried into the error.
///
/// # Errors
///
/// - `HarnessError::Backend` if the shader object cannot be created.
/// - `ShaderError::CompileError` (wrapped) if the GLSL fails to compile;
///   the log holds the numbered source and the driver's info log.
#[allow(unsafe_code)]
pub fn compile_shader(
    gl: &glow::Context,
    stage: ShaderStage,
    origin: &str,
    source: &str,
) -> Result<glow::Shader, HarnessError> {
    use glow::HasContext;

    // SAFETY: glow wraps raw GL calls as unsafe. We pass a valid shader
    // type constant and the shader is deleted on the failure path.
    let shader = unsafe {
        gl.create_shader(gl_shader_type(stage))
            .map_err(|e| HarnessError::Backend(format!("cannot create {stage} shader: {e}")))?
    };

    let compiled = unsafe {
        gl.shader_source(shader, source);
        gl.compile_shader(shader);
        gl.get_shader_compile_status(shader)
    };

    if compiled {
        tracing::debug!(%stage, origin, "shader compiled");
        Ok(shader)
    } else {
        let info_log = unsafe { gl.get_shader_info_log(shader) };
        unsafe { gl.delete_shader(shader) };
        Err(ShaderError::CompileError {
            stage,
            origin: origin.to_string(),
            log: format_shader_error(source, &info_log),
        }
        .into())
    }
}

/// Links a vertex and fragment shader into a program.
///
/// When `retrievable_binary` is set, the program is flagged with
/// `GL_PROGRAM_BINARY_RETRIEVABLE_HINT` before linking so that its binary
/// can be read back afterwards. The shaders are detached once linking is
/// done; the caller still owns and deletes them.
///
/// # Errors
///
/// - `HarnessError::Backend` if the program object cannot be created.
/// - `ShaderError::LinkError` (wrapped) if linking fails.
#[allow(unsafe_code)]
pub fn link_program(
    gl: &glow::Context,
    vertex: glow::Shader,
    fragment: glow::Shader,
    retrievable_binary: bool,
) -> Result<glow::Program, HarnessError> {
    use glow::HasContext;

    // SAFETY: glow wraps raw GL calls as unsafe. We pass valid shader and
    // program handles obtained from prior glow calls. The program is
    // deleted if linking fails.
    let program = unsafe {
        gl.create_program()
            .map_err(|e| HarnessError::Backend(format!("cannot create program: {e}")))?
    };

    let linked = unsafe {
        if retrievable_binary {
            gl.program_binary_retrievable_hint(program, true);
        }
        gl.attach_shader(program, vertex);
        gl.attach_shader(program, fragment);
        gl.link_program(program);
        gl.detach_shader(program, vertex);
        gl.detach_shader(program, fragment);
        gl.get_program_link_status(program)
    };

    if linked {
        tracing::debug!(retrievable_binary, "program linked");
        Ok(program)
    } else {
        let info_log = unsafe { gl.get_program_info_log(program) };
        unsafe { gl.delete_program(program) };
        Err(ShaderError::LinkError(info_log).into())
    }
}

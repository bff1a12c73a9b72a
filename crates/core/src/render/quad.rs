//! The two-triangle quad that covers the viewport.
//!
//! Positions are uploaded once as a 2-component float attribute bound to
//! `_GLF_vertexPosition`. Draw with two `draw_arrays(TRIANGLES, …)` calls
//! over vertices `0..3` and `3..6`.

use super::context::check_gl_error;
use crate::error::HarnessError;
use crate::params::ApiVersion;
use crate::vertex::VERTEX_POSITION_ATTRIBUTE;

/// Clip-space positions of the quad's six vertices, as `x, y` pairs.
pub const QUAD_VERTICES: [f32; 12] = [
    -1.0, -1.0, -1.0, 1.0, 1.0, -1.0, //
    1.0, 1.0, -1.0, 1.0, 1.0, -1.0,
];

/// Number of vertices in [`QUAD_VERTICES`].
pub const QUAD_VERTEX_COUNT: i32 = 6;

/// GL objects holding the uploaded quad.
#[derive(Debug)]
pub struct QuadBuffers {
    pub vao: Option<glow::VertexArray>,
    pub vbo: glow::Buffer,
}

impl QuadBuffers {
    /// Deletes the buffer and vertex array.
    #[allow(unsafe_code)]
    pub fn destroy(self, gl: &glow::Context) {
        use glow::HasContext;

        // SAFETY: both handles were created by `upload_quad` on this context.
        unsafe {
            gl.delete_buffer(self.vbo);
            if let Some(vao) = self.vao {
                gl.delete_vertex_array(vao);
            }
        }
    }
}

/// Looks up the location of `_GLF_vertexPosition` in `program`.
///
/// # Errors
///
/// Returns `HarnessError::Backend` if the program has no such active
/// attribute (for example, a user vertex shader that never reads it).
#[allow(unsafe_code)]
pub fn position_attribute(
    gl: &glow::Context,
    program: glow::Program,
) -> Result<u32, HarnessError> {
    use glow::HasContext;

    // SAFETY: program is a successfully linked program handle.
    unsafe { gl.get_attrib_location(program, VERTEX_POSITION_ATTRIBUTE) }.ok_or_else(|| {
        HarnessError::Backend(format!(
            "cannot find vertex attribute {VERTEX_POSITION_ATTRIBUTE} in program"
        ))
    })
}

/// Uploads [`QUAD_VERTICES`] and points `attribute` at it.
///
/// A vertex array object is created and bound first when the API needs
/// one (OpenGL ES, or any version from 3.0 on). Both objects stay bound.
///
/// # Errors
///
/// Returns `HarnessError::Backend` if an object cannot be created or the
/// GL error flag is raised.
#[allow(unsafe_code)]
pub fn upload_quad(
    gl: &glow::Context,
    api: ApiVersion,
    attribute: u32,
) -> Result<QuadBuffers, HarnessError> {
    use glow::HasContext;

    // SAFETY: glow wraps raw GL calls as unsafe. Buffers are created on
    // the current context and the vertex data outlives the upload call.
    let vao = if api.uses_vertex_array() {
        let vao = unsafe { gl.create_vertex_array() }
            .map_err(|e| HarnessError::Backend(format!("cannot create vertex array: {e}")))?;
        unsafe { gl.bind_vertex_array(Some(vao)) };
        check_gl_error(gl, "glBindVertexArray")?;
        Some(vao)
    } else {
        None
    };

    let vbo = unsafe { gl.create_buffer() }
        .map_err(|e| HarnessError::Backend(format!("cannot create vertex buffer: {e}")))?;

    unsafe {
        gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
        gl.buffer_data_u8_slice(
            glow::ARRAY_BUFFER,
            bytemuck::cast_slice(&QUAD_VERTICES),
            glow::STATIC_DRAW,
        );
    }
    check_gl_error(gl, "glBufferData")?;

    unsafe {
        gl.enable_vertex_attrib_array(attribute);
        gl.vertex_attrib_pointer_f32(attribute, 2, glow::FLOAT, false, 0, 0);
    }
    check_gl_error(gl, "glVertexAttribPointer")?;

    tracing::debug!(attribute, vao = vao.is_some(), "quad uploaded");
    Ok(QuadBuffers { vao, vbo })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertices() -> Vec<[f32; 2]> {
        QUAD_VERTICES.chunks(2).map(|p| [p[0], p[1]]).collect()
    }

    #[test]
    fn quad_has_six_two_component_vertices() {
        assert_eq!(QUAD_VERTICES.len(), 2 * QUAD_VERTEX_COUNT as usize);
    }

    #[test]
    fn quad_stays_in_clip_space() {
        assert!(QUAD_VERTICES.iter().all(|c| c.abs() == 1.0));
    }

    #[test]
    fn quad_touches_all_four_corners() {
        let v = vertices();
        for corner in [[-1.0, -1.0], [-1.0, 1.0], [1.0, -1.0], [1.0, 1.0]] {
            assert!(v.contains(&corner), "missing corner {corner:?}");
        }
    }

    #[test]
    fn triangles_share_the_anti_diagonal() {
        let v = vertices();
        let (first, second) = v.split_at(3);
        for shared in [[-1.0, 1.0], [1.0, -1.0]] {
            assert!(first.contains(&shared) && second.contains(&shared), "{shared:?}");
        }
    }

    #[test]
    fn quad_bytes_are_tightly_packed_f32() {
        let bytes: &[u8] = bytemuck::cast_slice(&QUAD_VERTICES);
        assert_eq!(bytes.len(), 12 * std::mem::size_of::<f32>());
    }

    #[test]
    #[ignore = "requires GL context"]
    fn upload_quad_binds_attribute() {
        // Would test: after upload_quad, GL_VERTEX_ATTRIB_ARRAY_ENABLED is set.
    }
}

//! Pass-through vertex shader for the fullscreen quad.
//!
//! Unless the user supplies a vertex shader, one is generated to match the
//! fragment shader's GLSL version. It reads a single `vec2` position and
//! writes it straight to clip space.

use crate::error::HarnessError;
use crate::source::{read_source, GlslVersion};
use std::path::Path;

/// Name of the position attribute the quad is bound to.
pub const VERTEX_POSITION_ATTRIBUTE: &str = "_GLF_vertexPosition";

/// Shader body shared by every generated vertex shader. The declaration
/// qualifier (`in` or `attribute`) is written in front of it.
const VERTEX_BODY: &str = "vec2 _GLF_vertexPosition;
void main(void) {
    gl_Position = vec4(_GLF_vertexPosition, 0.0, 1.0);
}
";

/// Generates the pass-through vertex shader for `version`.
///
/// GLSL ES 3.00 needs the ` es` suffix and declares the position with
/// `in`; every other supported version uses `attribute`.
pub fn generate_vertex_shader(version: GlslVersion) -> String {
    if version.value() == 300 {
        format!("#version {version} es\nin {VERTEX_BODY}")
    } else {
        format!("#version {version}\nattribute {VERTEX_BODY}")
    }
}

/// Returns the vertex shader source for the run.
///
/// Reads `user_path` verbatim when given (no validation), otherwise
/// generates one for `version`.
///
/// # Errors
///
/// Returns `HarnessError::FileNotFound` if `user_path` cannot be read.
pub fn vertex_source(
    user_path: Option<&Path>,
    version: GlslVersion,
) -> Result<String, HarnessError> {
    match user_path {
        Some(path) => read_source(path),
        None => Ok(generate_vertex_shader(version)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SUPPORTED_VERSIONS;

    fn version(v: u32) -> GlslVersion {
        GlslVersion::new(v).unwrap()
    }

    #[test]
    fn es_300_uses_suffix_and_in_qualifier() {
        let src = generate_vertex_shader(version(300));
        assert!(
            src.starts_with("#version 300 es\n"),
            "expected ES directive in:\n{src}"
        );
        assert!(
            src.contains("in vec2 _GLF_vertexPosition;"),
            "expected `in` declaration in:\n{src}"
        );
        assert!(!src.contains("attribute"), "unexpected attribute in:\n{src}");
    }

    #[test]
    fn every_other_version_uses_attribute_qualifier() {
        for &v in SUPPORTED_VERSIONS.iter().filter(|&&v| v != 300) {
            let src = generate_vertex_shader(version(v));
            assert!(
                src.starts_with(&format!("#version {v}\n")),
                "expected plain directive for {v} in:\n{src}"
            );
            assert!(
                src.contains("attribute vec2 _GLF_vertexPosition;"),
                "expected attribute declaration for {v} in:\n{src}"
            );
            assert!(!src.contains(" es\n"), "unexpected es suffix for {v}");
        }
    }

    #[test]
    fn generated_shader_writes_clip_space_position() {
        let src = generate_vertex_shader(version(100));
        assert!(
            src.contains("gl_Position = vec4(_GLF_vertexPosition, 0.0, 1.0);"),
            "expected gl_Position assignment in:\n{src}"
        );
        assert!(src.contains("void main(void)"), "expected main in:\n{src}");
    }

    #[test]
    fn generated_shader_declares_the_reserved_attribute() {
        let src = generate_vertex_shader(version(450));
        assert!(src.contains(VERTEX_POSITION_ATTRIBUTE));
    }

    #[test]
    fn user_vertex_shader_is_returned_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.vert");
        let contents = "not even glsl, passed through as-is";
        std::fs::write(&path, contents).unwrap();

        let src = vertex_source(Some(&path), version(330)).unwrap();
        assert_eq!(src, contents);
    }

    #[test]
    fn missing_user_vertex_shader_is_file_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = vertex_source(Some(&dir.path().join("none.vert")), version(330)).unwrap_err();
        assert!(matches!(err, HarnessError::FileNotFound { .. }), "got: {err}");
    }

    #[test]
    fn no_user_path_generates() {
        let src = vertex_source(None, version(120)).unwrap();
        assert_eq!(src, generate_vertex_shader(version(120)));
    }
}

//! Program binary dump.
//!
//! Dumping is best-effort with respect to driver capabilities: when the
//! API cannot hand out binaries the run continues with a warning. Once a
//! binary has been read, failing to write it is an error.

use super::context::check_gl_error;
use crate::error::HarnessError;
use crate::params::ApiVersion;
use std::path::Path;

/// What [`dump_program_binary`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpOutcome {
    Written { bytes: usize, format: u32 },
    Unsupported,
    NoFormats,
}

/// Writes the linked `program`'s binary verbatim to `path`.
///
/// # Errors
///
/// - `HarnessError::Backend` if the driver returns no binary or raises
///   the GL error flag.
/// - `HarnessError::Io` if `path` cannot be written.
#[allow(unsafe_code)]
pub fn dump_program_binary(
    gl: &glow::Context,
    api: ApiVersion,
    program: glow::Program,
    path: &Path,
) -> Result<DumpOutcome, HarnessError> {
    use glow::HasContext;

    // SAFETY: only queried once the API is known to have binary formats.
    let skipped = skip_reason(api, || unsafe {
        gl.get_parameter_i32(glow::NUM_PROGRAM_BINARY_FORMATS)
    });
    if let Some(outcome) = skipped {
        return Ok(outcome);
    }

    // SAFETY: program is linked with the retrievable hint set.
    let binary = unsafe { gl.get_program_binary(program) }
        .ok_or_else(|| HarnessError::Backend("glGetProgramBinary returned no data".into()))?;
    check_gl_error(gl, "glGetProgramBinary")?;

    std::fs::write(path, &binary.buffer).map_err(|source| HarnessError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(
        bytes = binary.buffer.len(),
        format = binary.format,
        "wrote program binary to {}",
        path.display()
    );

    Ok(DumpOutcome::Written {
        bytes: binary.buffer.len(),
        format: binary.format,
    })
}

/// Why a dump cannot happen on `api`, if it cannot. `formats` reports the
/// driver's binary format count and is only called when the API has the
/// entry points.
fn skip_reason(api: ApiVersion, formats: impl FnOnce() -> i32) -> Option<DumpOutcome> {
    if !api.supports_program_binary() {
        tracing::warn!(
            "{api} does not support program binaries (needs OpenGL 4.1 or OpenGLES 3.0), not dumping"
        );
        return Some(DumpOutcome::Unsupported);
    }
    if formats() <= 0 {
        tracing::warn!("driver reports no program binary formats, not dumping");
        return Some(DumpOutcome::NoFormats);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::GraphicsApi;
    use std::cell::Cell;

    #[test]
    fn old_apis_skip_without_querying_formats() {
        let queried = Cell::new(false);
        for api in [
            ApiVersion::from_major_minor(GraphicsApi::OpenGlEs, 2, 0),
            ApiVersion::from_major_minor(GraphicsApi::OpenGl, 3, 3),
        ] {
            let outcome = skip_reason(api, || {
                queried.set(true);
                1
            });
            assert_eq!(outcome, Some(DumpOutcome::Unsupported), "for {api}");
        }
        assert!(!queried.get(), "format count must not be queried");
    }

    #[test]
    fn zero_formats_skips() {
        let es3 = ApiVersion::from_major_minor(GraphicsApi::OpenGlEs, 3, 0);
        assert_eq!(skip_reason(es3, || 0), Some(DumpOutcome::NoFormats));
    }

    #[test]
    fn capable_api_with_formats_dumps() {
        let gl41 = ApiVersion::from_major_minor(GraphicsApi::OpenGl, 4, 1);
        assert_eq!(skip_reason(gl41, || 2), None);
    }

    #[test]
    #[ignore = "requires GL context"]
    fn dump_writes_driver_bytes_verbatim() {
        // Would test: the dumped file equals glGetProgramBinary's buffer.
    }
}

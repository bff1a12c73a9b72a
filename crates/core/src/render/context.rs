//! GPU context wrapper and GL error polling.
//!
//! `GpuContext` wraps a `glow::Context` together with the API version the
//! driver actually handed out, which can differ from what was requested.
//! The capability gates in [`ApiVersion`] are all read from it.

use crate::error::HarnessError;
use crate::params::{ApiVersion, GraphicsApi};

/// Wraps a `glow::Context` with its negotiated API and version.
pub struct GpuContext {
    gl: glow::Context,
    api: ApiVersion,
}

impl GpuContext {
    /// Wraps `gl` and reads the API/version it reports.
    pub fn new(gl: glow::Context) -> Self {
        use glow::HasContext;

        let version = gl.version();
        let family = if version.is_embedded {
            GraphicsApi::OpenGlEs
        } else {
            GraphicsApi::OpenGl
        };
        let api = ApiVersion::from_major_minor(family, version.major, version.minor);
        tracing::info!(
            api = %api,
            version = api.number,
            vendor = %version.vendor_info,
            "negotiated graphics context"
        );

        Self { gl, api }
    }

    /// Returns a reference to the underlying `glow::Context`.
    pub fn gl(&self) -> &glow::Context {
        &self.gl
    }

    /// The API and version of the live context.
    pub fn api(&self) -> ApiVersion {
        self.api
    }
}

/// Polls `glGetError` and turns a raised flag into a `Backend` error.
///
/// `label` names the call that was just made and is included in the
/// message.
///
/// # Errors
///
/// Returns `HarnessError::Backend` if the error flag was raised.
#[allow(unsafe_code)]
pub fn check_gl_error(gl: &glow::Context, label: &str) -> Result<(), HarnessError> {
    use glow::HasContext;

    // SAFETY: glGetError has no preconditions beyond a current context.
    let code = unsafe { gl.get_error() };
    if code == glow::NO_ERROR {
        Ok(())
    } else {
        Err(HarnessError::Backend(format!(
            "{label}: {} (0x{code:04X})",
            gl_error_name(code)
        )))
    }
}

/// Symbolic name of a `glGetError` code.
pub fn gl_error_name(code: u32) -> &'static str {
    match code {
        glow::NO_ERROR => "GL_NO_ERROR",
        glow::INVALID_ENUM => "GL_INVALID_ENUM",
        glow::INVALID_VALUE => "GL_INVALID_VALUE",
        glow::INVALID_OPERATION => "GL_INVALID_OPERATION",
        glow::INVALID_FRAMEBUFFER_OPERATION => "GL_INVALID_FRAMEBUFFER_OPERATION",
        glow::OUT_OF_MEMORY => "GL_OUT_OF_MEMORY",
        glow::STACK_UNDERFLOW => "GL_STACK_UNDERFLOW",
        glow::STACK_OVERFLOW => "GL_STACK_OVERFLOW",
        _ => "unknown GL error",
    }
}

//! Run configuration and graphics API capability gates.
//!
//! [`RunParams`] is filled once from defaults, command-line overrides and
//! the detected shader version, and is read-only afterwards. The API that
//! the driver actually handed out is described separately by
//! [`ApiVersion`], since it is only known once a context exists.

use crate::error::HarnessError;
use crate::source::GlslVersion;
use std::fmt;
use std::path::{Path, PathBuf};

/// Default viewport width in pixels.
pub const DEFAULT_WIDTH: u32 = 256;
/// Default viewport height in pixels.
pub const DEFAULT_HEIGHT: u32 = 256;
/// Default number of frames rendered before capture.
pub const DEFAULT_DELAY: u32 = 5;
/// Default capture path.
pub const DEFAULT_OUTPUT: &str = "output.png";

/// Everything one run needs to know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunParams {
    pub width: u32,
    pub height: u32,
    /// Version declared by the fragment shader; never set by the user.
    pub shader_version: GlslVersion,
    pub fragment_path: PathBuf,
    /// User-supplied vertex shader; `None` means generate one.
    pub vertex_path: Option<PathBuf>,
    pub output: PathBuf,
    /// Where to write the linked program binary, if requested.
    pub binary_dump: Option<PathBuf>,
    pub exit_after_compile: bool,
    pub exit_after_link: bool,
    /// Keep the window open after capture until a key is pressed.
    pub persist: bool,
    /// Frames to render before capturing.
    pub delay: u32,
}

impl RunParams {
    /// Creates parameters with every option at its default.
    pub fn new(fragment_path: impl Into<PathBuf>, shader_version: GlslVersion) -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            shader_version,
            fragment_path: fragment_path.into(),
            vertex_path: None,
            output: PathBuf::from(DEFAULT_OUTPUT),
            binary_dump: None,
            exit_after_compile: false,
            exit_after_link: false,
            persist: false,
            delay: DEFAULT_DELAY,
        }
    }

    /// Checks the invariants the rest of the run relies on.
    ///
    /// # Errors
    ///
    /// Returns `HarnessError::Config` if the width or height is zero.
    pub fn validate(&self) -> Result<(), HarnessError> {
        if self.width == 0 || self.height == 0 {
            return Err(HarnessError::Config(format!(
                "resolution must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }

    /// Path of the uniform description that accompanies the fragment shader:
    /// the shader path with its extension replaced by `json`.
    pub fn description_path(&self) -> PathBuf {
        description_path_for(&self.fragment_path)
    }
}

/// Derives `<shader>.json` from `<shader>.<ext>`.
pub fn description_path_for(fragment_path: &Path) -> PathBuf {
    fragment_path.with_extension("json")
}

/// Graphics API family of a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphicsApi {
    OpenGl,
    OpenGlEs,
}

impl fmt::Display for GraphicsApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphicsApi::OpenGl => f.write_str("OpenGL"),
            GraphicsApi::OpenGlEs => f.write_str("OpenGLES"),
        }
    }
}

/// The API and version of the context the driver created.
///
/// `number` uses the `major * 100 + minor * 10` form, so OpenGL 4.1 is
/// `410` and OpenGL ES 3.0 is `300`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiVersion {
    pub api: GraphicsApi,
    pub number: u32,
}

impl ApiVersion {
    /// Builds an `ApiVersion` from a context's reported major/minor version.
    pub fn from_major_minor(api: GraphicsApi, major: u32, minor: u32) -> Self {
        Self {
            api,
            number: major * 100 + minor * 10,
        }
    }

    pub fn major(self) -> u32 {
        self.number / 100
    }

    pub fn minor(self) -> u32 {
        (self.number % 100) / 10
    }

    /// Whether linked programs can be read back as binaries
    /// (OpenGL >= 4.1 or OpenGL ES >= 3.0).
    pub fn supports_program_binary(self) -> bool {
        match self.api {
            GraphicsApi::OpenGl => self.number >= 410,
            GraphicsApi::OpenGlEs => self.number >= 300,
        }
    }

    /// Whether `glUniform*ui` setters exist (OpenGL >= 3.0, OpenGL ES >= 3.0).
    pub fn supports_unsigned_uniforms(self) -> bool {
        self.number >= 300
    }

    /// Whether a vertex array object must be bound before uploading the quad.
    pub fn uses_vertex_array(self) -> bool {
        self.api == GraphicsApi::OpenGlEs || self.number >= 300
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}.{}", self.api, self.major(), self.minor())
    }
}

/// The context a shader version asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextRequest {
    pub api: GraphicsApi,
    pub major: u8,
    pub minor: u8,
}

impl ContextRequest {
    /// Maps a GLSL version to the API version that introduced it.
    pub fn for_shader(version: GlslVersion) -> Self {
        let (api, major, minor) = match version.value() {
            100 => (GraphicsApi::OpenGlEs, 2, 0),
            300 => (GraphicsApi::OpenGlEs, 3, 0),
            110 => (GraphicsApi::OpenGl, 2, 0),
            120 => (GraphicsApi::OpenGl, 2, 1),
            130 => (GraphicsApi::OpenGl, 3, 0),
            140 => (GraphicsApi::OpenGl, 3, 1),
            150 => (GraphicsApi::OpenGl, 3, 2),
            330 => (GraphicsApi::OpenGl, 3, 3),
            // 400..=450: the GLSL minor digit matches the GL minor version.
            v => (GraphicsApi::OpenGl, 4, ((v - 400) / 10) as u8),
        };
        Self { api, major, minor }
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
    fn new_uses_documented_defaults() {
        let p = RunParams::new("a.frag", version(100));
        assert_eq!((p.width, p.height), (256, 256));
        assert_eq!(p.delay, 5);
        assert_eq!(p.output, PathBuf::from("output.png"));
        assert!(p.vertex_path.is_none());
        assert!(p.binary_dump.is_none());
        assert!(!p.exit_after_compile && !p.exit_after_link && !p.persist);
    }

    #[test]
    fn validate_rejects_zero_dimensions() {
        let mut p = RunParams::new("a.frag", version(100));
        p.width = 0;
        assert!(matches!(p.validate(), Err(HarnessError::Config(_))));
        p.width = 64;
        p.height = 0;
        assert!(matches!(p.validate(), Err(HarnessError::Config(_))));
        p.height = 64;
        assert!(p.validate().is_ok());
    }

    #[test]
    fn description_path_swaps_extension() {
        let p = RunParams::new("shaders/variant_001.frag", version(100));
        assert_eq!(p.description_path(), PathBuf::from("shaders/variant_001.json"));
    }

    #[test]
    fn description_path_without_extension_appends_json() {
        assert_eq!(
            description_path_for(Path::new("dir/shader")),
            PathBuf::from("dir/shader.json")
        );
    }

    #[test]
    fn api_version_splits_major_minor() {
        let v = ApiVersion::from_major_minor(GraphicsApi::OpenGl, 4, 5);
        assert_eq!(v.number, 450);
        assert_eq!((v.major(), v.minor()), (4, 5));
        assert_eq!(v.to_string(), "OpenGL 4.5");
    }

    #[test]
    fn es_display_matches_usual_spelling() {
        let v = ApiVersion::from_major_minor(GraphicsApi::OpenGlEs, 3, 0);
        assert_eq!(v.to_string(), "OpenGLES 3.0");
    }

    #[test]
    fn program_binary_gate() {
        let gl = |maj, min| ApiVersion::from_major_minor(GraphicsApi::OpenGl, maj, min);
        let es = |maj, min| ApiVersion::from_major_minor(GraphicsApi::OpenGlEs, maj, min);
        assert!(!gl(4, 0).supports_program_binary());
        assert!(gl(4, 1).supports_program_binary());
        assert!(gl(4, 6).supports_program_binary());
        assert!(!es(2, 0).supports_program_binary());
        assert!(es(3, 0).supports_program_binary());
    }

    #[test]
    fn unsigned_uniform_gate() {
        assert!(!ApiVersion::from_major_minor(GraphicsApi::OpenGlEs, 2, 0)
            .supports_unsigned_uniforms());
        assert!(!ApiVersion::from_major_minor(GraphicsApi::OpenGl, 2, 1)
            .supports_unsigned_uniforms());
        assert!(ApiVersion::from_major_minor(GraphicsApi::OpenGl, 3, 0)
            .supports_unsigned_uniforms());
    }

    #[test]
    fn vertex_array_used_for_es_and_modern_desktop() {
        assert!(ApiVersion::from_major_minor(GraphicsApi::OpenGlEs, 2, 0).uses_vertex_array());
        assert!(!ApiVersion::from_major_minor(GraphicsApi::OpenGl, 2, 1).uses_vertex_array());
        assert!(ApiVersion::from_major_minor(GraphicsApi::OpenGl, 3, 3).uses_vertex_array());
    }

    #[test]
    fn context_request_for_es_shaders() {
        assert_eq!(
            ContextRequest::for_shader(version(100)),
            ContextRequest { api: GraphicsApi::OpenGlEs, major: 2, minor: 0 }
        );
        assert_eq!(
            ContextRequest::for_shader(version(300)),
            ContextRequest { api: GraphicsApi::OpenGlEs, major: 3, minor: 0 }
        );
    }

    #[test]
    fn context_request_for_4x_tracks_minor_digit() {
        for (glsl, minor) in [(400, 0), (410, 1), (420, 2), (430, 3), (440, 4), (450, 5)] {
            let req = ContextRequest::for_shader(version(glsl));
            assert_eq!(req.api, GraphicsApi::OpenGl);
            assert_eq!((req.major, req.minor), (4, minor), "for GLSL {glsl}");
        }
    }

    #[test]
    fn every_supported_version_maps_to_a_request() {
        for &v in SUPPORTED_VERSIONS {
            let req = ContextRequest::for_shader(version(v));
            assert_eq!(req.api == GraphicsApi::OpenGlEs, version(v).is_es(), "for {v}");
        }
    }
}

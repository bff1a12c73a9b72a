//! Error types for fragshot.
//!
//! Every failure in the run is a variant of [`HarnessError`]. Nothing in the
//! library terminates the process: errors travel up to the binary, which
//! prints them once and picks the exit code.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The two programmable stages fragshot compiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Fragment,
    Vertex,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Fragment => f.write_str("Fragment"),
            ShaderStage::Vertex => f.write_str("Vertex"),
        }
    }
}

/// Errors that can occur during shader compilation or program linking.
///
/// These are the two failures a calling harness classifies by exit code,
/// so they are kept apart from the rest of [`HarnessError`].
#[derive(Debug, Clone, Error)]
pub enum ShaderError {
    /// A shader stage failed to compile.
    #[error("{stage} shader compilation failed ({origin}):\n{log}")]
    CompileError {
        /// The stage that failed.
        stage: ShaderStage,
        /// Where the source came from (a file path or "generated").
        origin: String,
        /// Line-numbered source followed by the driver's info log.
        log: String,
    },
    /// The program failed to link.
    #[error("Program linking failed:\n{0}")]
    LinkError(String),
}

/// Errors produced while loading, compiling, binding, rendering or capturing.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Invalid run configuration (non-positive resolution, bad arguments).
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A shader or description file could not be read.
    #[error("file not found: {}", .path.display())]
    FileNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The fragment shader has no newline or no `#version` on its first line.
    #[error("malformed shader: {0}")]
    MalformedShader(String),

    /// The `#version` directive names a version outside the supported set.
    #[error("cannot find a supported GLSL version in first line of fragment shader: ``{0}''")]
    UnsupportedVersion(String),

    /// The uniform description file is not valid JSON or violates its schema.
    #[error("malformed description {}: {reason}", .path.display())]
    MalformedDescription { path: PathBuf, reason: String },

    /// An active uniform has no entry in the description.
    #[error("missing JSON entry for uniform: {0}")]
    MissingUniform(String),

    /// More than one description entry normalizes to the same uniform name.
    #[error("more than one JSON entry for uniform: {0}")]
    DuplicateUniform(String),

    /// The description names a setter outside the supported set, or one the
    /// negotiated API does not provide.
    #[error("unknown/unsupported uniform init func '{function}' for uniform: {uniform}")]
    UnsupportedFunction { uniform: String, function: String },

    /// The argument list does not fit the declared setter.
    #[error("bad arguments for uniform '{uniform}': {reason}")]
    ArgumentMismatch { uniform: String, reason: String },

    /// Shader compilation or program linking failed.
    #[error(transparent)]
    Shader(#[from] ShaderError),

    /// A backend call failed or left the GL error flag raised.
    #[error("backend error: {0}")]
    Backend(String),

    /// The captured frame could not be encoded or written.
    #[error("image encoding failed: {0}")]
    Encode(String),

    /// A generated artifact (such as the program binary) could not be written.
    #[error("cannot write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl HarnessError {
    /// Builds a `FileNotFound` for `path` from the I/O error that reading it raised.
    pub fn file_not_found(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        HarnessError::FileNotFound {
            path: path.into(),
            source,
        }
    }
}

//! CLI errors and the exit codes a calling harness relies on.
//!
//! Exit code scheme:
//! - 0:   success (including early stops requested on the command line)
//! - 1:   any other error (bad arguments, missing files, bad descriptions,
//!        backend and encode failures)
//! - 101: shader compilation failed (fragment or vertex)
//! - 102: program linking failed

use fragshot_core::{HarnessError, ShaderError};
use std::fmt;

/// Exit code for generic failures, including usage errors.
pub const EXIT_FAILURE: i32 = 1;
/// Exit code for a shader that failed to compile.
pub const EXIT_COMPILE_FAILURE: i32 = 101;
/// Exit code for a program that failed to link.
pub const EXIT_LINK_FAILURE: i32 = 102;

/// Errors produced by a run, each mapped to an exit code.
pub enum CliError {
    /// The command line was well-formed but its values are not usable.
    Usage(String),
    /// The harness failed.
    Harness(HarnessError),
}

impl CliError {
    /// Returns the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Harness(HarnessError::Shader(ShaderError::CompileError { .. })) => {
                EXIT_COMPILE_FAILURE
            }
            CliError::Harness(HarnessError::Shader(ShaderError::LinkError(_))) => {
                EXIT_LINK_FAILURE
            }
            CliError::Usage(_) | CliError::Harness(_) => EXIT_FAILURE,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Harness(e) => write!(f, "{e}"),
        }
    }
}

impl fmt::Debug for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl From<HarnessError> for CliError {
    fn from(e: HarnessError) -> Self {
        match e {
            HarnessError::Config(msg) => CliError::Usage(msg),
            other => CliError::Harness(other),
        }
    }
}

impl From<ShaderError> for CliError {
    fn from(e: ShaderError) -> Self {
        CliError::Harness(e.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fragshot_core::ShaderStage;

    #[test]
    fn compile_error_exit_code_is_101() {
        let err = CliError::from(ShaderError::CompileError {
            stage: ShaderStage::Vertex,
            origin: "generated".into(),
            log: "syntax error".into(),
        });
        assert_eq!(err.exit_code(), 101);
    }

    #[test]
    fn link_error_exit_code_is_102() {
        let err = CliError::from(ShaderError::LinkError("varying mismatch".into()));
        assert_eq!(err.exit_code(), 102);
        assert!(err.to_string().contains("varying mismatch"));
    }

    #[test]
    fn config_error_routes_to_usage() {
        let err = CliError::from(HarnessError::Config("resolution must be positive".into()));
        assert!(matches!(err, CliError::Usage(_)));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn other_harness_errors_exit_1() {
        let errors = [
            HarnessError::MalformedShader("no newline".into()),
            HarnessError::MissingUniform("time".into()),
            HarnessError::DuplicateUniform("time".into()),
            HarnessError::Backend("GL_INVALID_OPERATION".into()),
            HarnessError::Encode("disk full".into()),
        ];
        for e in errors {
            let msg = e.to_string();
            let err = CliError::from(e);
            assert_eq!(err.exit_code(), 1, "for {msg}");
            assert_eq!(err.to_string(), msg, "message should pass through unchanged");
        }
    }
}

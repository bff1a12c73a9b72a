//! Fragment shader loading and GLSL version detection.
//!
//! The version is read from the first line only. It is parsed from the
//! leading digits of the token that follows `#version`, so comments or
//! identifiers elsewhere on the line cannot be mistaken for a version
//! number.

use crate::error::HarnessError;
use std::fmt;
use std::path::Path;

/// Every GLSL version fragshot accepts, desktop first, then ES.
pub const SUPPORTED_VERSIONS: &[u32] = &[
    110, 120, 130, 140, 150, 330, 400, 410, 420, 430, 440, 450, 100, 300,
];

/// Longest excerpt of the first line quoted in an `UnsupportedVersion` error.
const EXCERPT_LEN: usize = 80;

/// A GLSL version number taken from a shader's `#version` directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlslVersion(u32);

impl GlslVersion {
    /// Wraps `value` if it is one of [`SUPPORTED_VERSIONS`].
    pub fn new(value: u32) -> Option<Self> {
        SUPPORTED_VERSIONS
            .contains(&value)
            .then_some(GlslVersion(value))
    }

    /// The numeric version, e.g. `330`.
    pub fn value(self) -> u32 {
        self.0
    }

    /// Whether this is a GLSL ES version (`100` or `300`).
    pub fn is_es(self) -> bool {
        matches!(self.0, 100 | 300)
    }
}

impl fmt::Display for GlslVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reads a shader source file.
///
/// # Errors
///
/// Returns `HarnessError::FileNotFound` if the file cannot be read.
pub fn read_source(path: &Path) -> Result<String, HarnessError> {
    std::fs::read_to_string(path).map_err(|e| HarnessError::file_not_found(path, e))
}

/// Detects the GLSL version declared on the first line of `source`.
///
/// # Errors
///
/// - `MalformedShader` if the source has no newline or the first line has
///   no `#version` directive.
/// - `UnsupportedVersion` if the directive's number is missing or not in
///   [`SUPPORTED_VERSIONS`].
pub fn detect_version(source: &str) -> Result<GlslVersion, HarnessError> {
    let first_line = source
        .split_once('\n')
        .map(|(line, _)| line.trim_end_matches('\r'))
        .ok_or_else(|| {
            HarnessError::MalformedShader("cannot find end-of-line in fragment shader".into())
        })?;

    let (_, directive) = first_line.split_once("#version").ok_or_else(|| {
        HarnessError::MalformedShader(
            "cannot find ``#version'' in first line of fragment shader".into(),
        )
    })?;

    directive
        .split_whitespace()
        .next()
        .and_then(leading_number)
        .and_then(GlslVersion::new)
        .ok_or_else(|| HarnessError::UnsupportedVersion(excerpt(first_line)))
}

/// Parses the digits at the start of `token`, so `300es` reads as 300.
fn leading_number(token: &str) -> Option<u32> {
    let end = token
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(token.len());
    token[..end].parse().ok()
}

fn excerpt(line: &str) -> String {
    line.chars().take(EXCERPT_LEN).collect()
}

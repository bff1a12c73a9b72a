//! Uniform descriptions: which value each active uniform is initialized to.
//!
//! A description is a JSON object next to the fragment shader
//! (`shader.frag` → `shader.json`):
//!
//! ```json
//! {
//!   "resolution": { "func": "glUniform2f", "args": [256.0, 256.0] },
//!   "weights":    { "func": "glUniform1fv", "args": [0.25, 0.5, 0.25] }
//! }
//! ```
//!
//! An entry's `func` and `args` are resolved into a [`UniformInit`] only
//! when an active uniform looks it up, so entries the program does not use
//! never fail a run. Duplicate keys are kept by the parser so that they can
//! be reported instead of silently collapsed. When no file exists, four
//! conventional uniforms get built-in values.

use crate::error::HarnessError;
use crate::params::{ApiVersion, RunParams};
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use serde_json::{json, Number, Value};
use std::fmt;
use std::path::{Path, PathBuf};

/// Number of components a setter writes per element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    One,
    Two,
    Three,
    Four,
}

impl Width {
    fn from_digit(c: char) -> Option<Self> {
        match c {
            '1' => Some(Width::One),
            '2' => Some(Width::Two),
            '3' => Some(Width::Three),
            '4' => Some(Width::Four),
            _ => None,
        }
    }

    /// Components per element, 1 to 4.
    pub fn count(self) -> usize {
        match self {
            Width::One => 1,
            Width::Two => 2,
            Width::Three => 3,
            Width::Four => 4,
        }
    }
}

/// A typed uniform initializer: which `glUniform*` setter to call, with its
/// arguments already converted to the setter's element type.
#[derive(Debug, Clone, PartialEq)]
pub enum UniformInit {
    Float1(f32),
    Float2([f32; 2]),
    Float3([f32; 3]),
    Float4([f32; 4]),
    Int1(i32),
    Int2([i32; 2]),
    Int3([i32; 3]),
    Int4([i32; 4]),
    Uint1(u32),
    Uint2([u32; 2]),
    Uint3([u32; 3]),
    Uint4([u32; 4]),
    /// `glUniform{N}fv`: `values.len()` is a non-zero multiple of `width`.
    FloatArray { width: Width, values: Vec<f32> },
    /// `glUniform{N}iv`: `values.len()` is a non-zero multiple of `width`.
    IntArray { width: Width, values: Vec<i32> },
}

/// Setter named by a description's `func` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Setter {
    Float(Width),
    Int(Width),
    Uint(Width),
    FloatArray(Width),
    IntArray(Width),
}

impl Setter {
    /// Parses `glUniform{1..4}{f,i,ui,fv,iv}`.
    fn parse(function: &str) -> Option<Self> {
        let rest = function.strip_prefix("glUniform")?;
        let mut chars = rest.chars();
        let width = Width::from_digit(chars.next()?)?;
        match chars.as_str() {
            "f" => Some(Setter::Float(width)),
            "i" => Some(Setter::Int(width)),
            "ui" => Some(Setter::Uint(width)),
            "fv" => Some(Setter::FloatArray(width)),
            "iv" => Some(Setter::IntArray(width)),
            _ => None,
        }
    }
}

impl UniformInit {
    /// Resolves a `func`/`args` pair for `uniform` into a typed initializer.
    ///
    /// # Errors
    ///
    /// - `UnsupportedFunction` if `function` is not a supported setter.
    /// - `ArgumentMismatch` if the argument count does not fit the setter,
    ///   or an integer setter receives a fractional or out-of-range value.
    pub fn from_call(uniform: &str, function: &str, args: &[Number]) -> Result<Self, HarnessError> {
        let setter = Setter::parse(function).ok_or_else(|| HarnessError::UnsupportedFunction {
            uniform: uniform.to_string(),
            function: function.to_string(),
        })?;
        let args = Args {
            uniform,
            function,
            values: args,
        };

        let init = match setter {
            Setter::Float(width) => {
                let v = args.floats()?;
                match width {
                    Width::One => UniformInit::Float1(args.exactly::<_, 1>(v)?[0]),
                    Width::Two => UniformInit::Float2(args.exactly(v)?),
                    Width::Three => UniformInit::Float3(args.exactly(v)?),
                    Width::Four => UniformInit::Float4(args.exactly(v)?),
                }
            }
            Setter::Int(width) => {
                let v = args.ints()?;
                match width {
                    Width::One => UniformInit::Int1(args.exactly::<_, 1>(v)?[0]),
                    Width::Two => UniformInit::Int2(args.exactly(v)?),
                    Width::Three => UniformInit::Int3(args.exactly(v)?),
                    Width::Four => UniformInit::Int4(args.exactly(v)?),
                }
            }
            Setter::Uint(width) => {
                let v = args.uints()?;
                match width {
                    Width::One => UniformInit::Uint1(args.exactly::<_, 1>(v)?[0]),
                    Width::Two => UniformInit::Uint2(args.exactly(v)?),
                    Width::Three => UniformInit::Uint3(args.exactly(v)?),
                    Width::Four => UniformInit::Uint4(args.exactly(v)?),
                }
            }
            Setter::FloatArray(width) => UniformInit::FloatArray {
                width,
                values: args.multiple_of(width, args.floats()?)?,
            },
            Setter::IntArray(width) => UniformInit::IntArray {
                width,
                values: args.multiple_of(width, args.ints()?)?,
            },
        };
        Ok(init)
    }

    /// The `glUniform*` name this initializer was declared with.
    pub fn function_name(&self) -> String {
        let (width, suffix) = match self {
            UniformInit::Float1(_) => (1, "f"),
            UniformInit::Float2(_) => (2, "f"),
            UniformInit::Float3(_) => (3, "f"),
            UniformInit::Float4(_) => (4, "f"),
            UniformInit::Int1(_) => (1, "i"),
            UniformInit::Int2(_) => (2, "i"),
            UniformInit::Int3(_) => (3, "i"),
            UniformInit::Int4(_) => (4, "i"),
            UniformInit::Uint1(_) => (1, "ui"),
            UniformInit::Uint2(_) => (2, "ui"),
            UniformInit::Uint3(_) => (3, "ui"),
            UniformInit::Uint4(_) => (4, "ui"),
            UniformInit::FloatArray { width, .. } => (width.count(), "fv"),
            UniformInit::IntArray { width, .. } => (width.count(), "iv"),
        };
        format!("glUniform{width}{suffix}")
    }

    /// Whether this needs one of the unsigned `glUniform*ui` setters.
    pub fn is_unsigned(&self) -> bool {
        matches!(
            self,
            UniformInit::Uint1(_)
                | UniformInit::Uint2(_)
                | UniformInit::Uint3(_)
                | UniformInit::Uint4(_)
        )
    }
}

/// Argument list of one description entry, with the context needed for
/// error messages.
struct Args<'a> {
    uniform: &'a str,
    function: &'a str,
    values: &'a [Number],
}

impl Args<'_> {
    fn mismatch(&self, reason: String) -> HarnessError {
        HarnessError::ArgumentMismatch {
            uniform: self.uniform.to_string(),
            reason,
        }
    }

    fn convert<T>(
        &self,
        expected: &str,
        f: impl Fn(&Number) -> Option<T>,
    ) -> Result<Vec<T>, HarnessError> {
        self.values
            .iter()
            .map(|n| {
                f(n).ok_or_else(|| {
                    self.mismatch(format!("{} expects {expected} arguments, got {n}", self.function))
                })
            })
            .collect()
    }

    fn floats(&self) -> Result<Vec<f32>, HarnessError> {
        self.convert("numeric", |n| n.as_f64().map(|v| v as f32))
    }

    fn ints(&self) -> Result<Vec<i32>, HarnessError> {
        self.convert("32-bit integer", |n| {
            integral(n).and_then(|v| i32::try_from(v).ok())
        })
    }

    fn uints(&self) -> Result<Vec<u32>, HarnessError> {
        self.convert("32-bit unsigned integer", |n| {
            integral(n).and_then(|v| u32::try_from(v).ok())
        })
    }

    fn exactly<T, const N: usize>(&self, values: Vec<T>) -> Result<[T; N], HarnessError> {
        let got = values.len();
        values.try_into().map_err(|_| {
            self.mismatch(format!("{} expects {N} argument(s), got {got}", self.function))
        })
    }

    fn multiple_of<T>(&self, width: Width, values: Vec<T>) -> Result<Vec<T>, HarnessError> {
        if values.is_empty() || values.len() % width.count() != 0 {
            return Err(self.mismatch(format!(
                "{} expects a non-empty multiple of {} arguments, got {}",
                self.function,
                width.count(),
                values.len()
            )));
        }
        Ok(values)
    }
}

/// The integer value of `n`, whether written `2` or `2.0`.
///
/// Floats beyond `i64` saturate, which the callers' range checks reject.
fn integral(n: &Number) -> Option<i64> {
    n.as_i64().or_else(|| {
        n.as_f64()
            .filter(|v| v.fract() == 0.0)
            .map(|v| v as i64)
    })
}

/// Strips an array subscript from a reflected uniform name (`foo[0]` → `foo`).
pub fn base_uniform_name(name: &str) -> &str {
    name.split_once('[').map_or(name, |(base, _)| base)
}

/// Where a description came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptionSource {
    File(PathBuf),
    Defaults,
}

/// One description entry, kept as written until a uniform asks for it.
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptionEntry {
    /// The key as written in the description.
    pub key: String,
    record: Value,
}

/// A loaded uniform description.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformDescription {
    source: DescriptionSource,
    entries: Vec<DescriptionEntry>,
}

impl UniformDescription {
    /// Loads the description next to the fragment shader, or the built-in
    /// defaults (with a warning) when there is none.
    ///
    /// # Errors
    ///
    /// Returns `FileNotFound` if the file exists but cannot be read, and any
    /// error from [`UniformDescription::from_json`].
    pub fn resolve(params: &RunParams) -> Result<Self, HarnessError> {
        let path = params.description_path();
        if !path.is_file() {
            tracing::warn!(
                "file '{}' not found, will rely on default uniform values only",
                path.display()
            );
            return Ok(Self::defaults(params.width, params.height));
        }
        let text =
            std::fs::read_to_string(&path).map_err(|e| HarnessError::file_not_found(&path, e))?;
        Self::from_json(&path, &text)
    }

    /// Parses description JSON. `path` is only used for error messages.
    ///
    /// Only the top-level shape is checked here; entries are resolved by
    /// [`UniformDescription::lookup`].
    ///
    /// # Errors
    ///
    /// `MalformedDescription` if the text is not a JSON object.
    pub fn from_json(path: &Path, text: &str) -> Result<Self, HarnessError> {
        let raw: RawDescription =
            serde_json::from_str(text).map_err(|e| HarnessError::MalformedDescription {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let entries = raw
            .0
            .into_iter()
            .map(|(key, record)| DescriptionEntry { key, record })
            .collect();
        Ok(Self {
            source: DescriptionSource::File(path.to_path_buf()),
            entries,
        })
    }

    /// The fallback used when a shader has no description file.
    pub fn defaults(width: u32, height: u32) -> Self {
        let entry = |key: &str, func: &str, args: Value| DescriptionEntry {
            key: key.to_string(),
            record: json!({ "func": func, "args": args }),
        };
        Self {
            source: DescriptionSource::Defaults,
            entries: vec![
                entry("injectionSwitch", "glUniform2f", json!([0.0, 1.0])),
                entry("time", "glUniform1f", json!([0.0])),
                entry("mouse", "glUniform2f", json!([0.0, 0.0])),
                entry("resolution", "glUniform2f", json!([width, height])),
            ],
        }
    }

    /// Finds and resolves the initializer for the uniform whose base name
    /// is `name`.
    ///
    /// # Errors
    ///
    /// - `MissingUniform` when no key normalizes to `name`,
    ///   `DuplicateUniform` when more than one does.
    /// - `MalformedDescription` if the matched record lacks `func` or
    ///   `args`, or an argument is not a number.
    /// - `UnsupportedFunction` / `ArgumentMismatch` from [`UniformInit::from_call`].
    pub fn lookup(&self, name: &str) -> Result<UniformInit, HarnessError> {
        let mut matches = self
            .entries
            .iter()
            .filter(|entry| base_uniform_name(&entry.key) == name);
        let first = matches
            .next()
            .ok_or_else(|| HarnessError::MissingUniform(name.to_string()))?;
        if matches.next().is_some() {
            return Err(HarnessError::DuplicateUniform(name.to_string()));
        }
        self.resolve_entry(first)
    }

    fn resolve_entry(&self, entry: &DescriptionEntry) -> Result<UniformInit, HarnessError> {
        let key = &entry.key;
        let malformed = |reason: String| HarnessError::MalformedDescription {
            path: match &self.source {
                DescriptionSource::File(path) => path.clone(),
                DescriptionSource::Defaults => PathBuf::from("<defaults>"),
            },
            reason,
        };

        let function = match entry.record.get("func") {
            Some(Value::String(function)) => function,
            Some(other) => {
                return Err(malformed(format!("'func' for uniform {key} is not a string: {other}")))
            }
            None => return Err(malformed(format!("no 'func' entry for uniform: {key}"))),
        };
        let args = match entry.record.get("args") {
            Some(Value::Array(args)) => args,
            Some(other) => {
                return Err(malformed(format!("'args' for uniform {key} is not an array: {other}")))
            }
            None => return Err(malformed(format!("no 'args' entry for uniform: {key}"))),
        };
        let args = args
            .iter()
            .map(|arg| match arg {
                Value::Number(n) => Ok(n.clone()),
                other => Err(malformed(format!(
                    "non-numeric argument {other} for uniform: {key}"
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?;

        UniformInit::from_call(key, function, &args)
    }

    pub fn source(&self) -> &DescriptionSource {
        &self.source
    }

    pub fn entries(&self) -> &[DescriptionEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A uniform paired with the value it will be set to.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformBinding {
    /// Base name (subscript stripped), as passed to `glGetUniformLocation`.
    pub name: String,
    pub init: UniformInit,
}

/// Matches the program's active uniforms against a description.
///
/// `load` is only called when `active` is non-empty, so a program without
/// uniforms never touches the description file.
///
/// # Errors
///
/// Any error from `load`, `MissingUniform`/`DuplicateUniform` from the
/// lookup, and `UnsupportedFunction` for unsigned setters on an API that
/// lacks them.
pub fn plan_bindings<F>(
    active: &[String],
    api: ApiVersion,
    load: F,
) -> Result<Vec<UniformBinding>, HarnessError>
where
    F: FnOnce() -> Result<UniformDescription, HarnessError>,
{
    if active.is_empty() {
        return Ok(Vec::new());
    }
    let description = load()?;

    active
        .iter()
        .map(|reflected| {
            let name = base_uniform_name(reflected);
            let init = description.lookup(name)?;
            if init.is_unsigned() && !api.supports_unsigned_uniforms() {
                return Err(HarnessError::UnsupportedFunction {
                    uniform: name.to_string(),
                    function: format!("{} (not available on {api})", init.function_name()),
                });
            }
            Ok(UniformBinding {
                name: name.to_string(),
                init,
            })
        })
        .collect()
}

/// Description entries in file order, duplicates included.
struct RawDescription(Vec<(String, Value)>);

impl<'de> Deserialize<'de> for RawDescription {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = RawDescription;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object mapping uniform names to {\"func\", \"args\"} records")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, Value>()? {
                    entries.push(entry);
                }
                Ok(RawDescription(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

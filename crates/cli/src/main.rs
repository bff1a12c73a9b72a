#![deny(unsafe_code)]
//! fragshot: compile, link and render a GLSL fragment shader, then capture
//! the frame to PNG.
//!
//! The process exit code is the interface to calling harnesses; see
//! [`error`] for the table.

mod error;
mod run;
mod window;

use clap::error::ErrorKind;
use clap::Parser;
use error::{CliError, EXIT_FAILURE};
use fragshot_core::params::{DEFAULT_DELAY, DEFAULT_OUTPUT};
use fragshot_core::{detect_version, read_source, RunParams};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = "\
Uniforms:
  Active uniforms are set from <shader>.json next to the fragment shader
  (the shader path with its extension replaced by .json), e.g.

    { \"resolution\": { \"func\": \"glUniform2f\", \"args\": [256.0, 256.0] } }

  Supported functions: glUniform{1..4}f, glUniform{1..4}i, glUniform{1..4}ui,
  glUniform{1..4}fv, glUniform{1..4}iv. Without a JSON file, injectionSwitch,
  time, mouse and resolution get default values.

Exit codes:
  0    success
  1    error
  101  shader compilation error
  102  program linking error";

#[derive(Parser)]
#[command(
    name = "fragshot",
    version,
    about = "Render a GLSL fragment shader and capture the frame to PNG",
    after_help = AFTER_HELP
)]
struct Cli {
    /// Fragment shader to render.
    shader: PathBuf,

    /// Number of frames to render before capturing.
    #[arg(long, value_name = "N", default_value_t = DEFAULT_DELAY)]
    delay: u32,

    /// Keep the window open after capture until a key is pressed.
    #[arg(long)]
    persist: bool,

    /// Stop right after the fragment shader compiles.
    #[arg(long)]
    exit_compile: bool,

    /// Stop right after the program links.
    #[arg(long)]
    exit_linking: bool,

    /// Path of the captured PNG.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Viewport size in pixels.
    #[arg(long, num_args = 2, value_names = ["WIDTH", "HEIGHT"])]
    resolution: Option<Vec<u32>>,

    /// Vertex shader to use instead of the generated pass-through one.
    #[arg(long, value_name = "PATH")]
    vertex: Option<PathBuf>,

    /// Write the linked program binary to this path.
    #[arg(long = "dump_bin", value_name = "PATH")]
    dump_bin: Option<PathBuf>,
}

impl Cli {
    /// Reads the fragment shader and layers the flags over the defaults.
    fn into_params(self) -> Result<(RunParams, String), CliError> {
        let source = read_source(&self.shader)?;
        let version = detect_version(&source)?;
        tracing::info!(version = %version, "detected GLSL version");

        let mut params = RunParams::new(self.shader, version);
        match self.resolution.as_deref() {
            None => {}
            Some(&[width, height]) => {
                params.width = width;
                params.height = height;
            }
            Some(values) => {
                return Err(CliError::Usage(format!(
                    "--resolution takes a width and a height, got {values:?}"
                )))
            }
        }
        params.delay = self.delay;
        params.persist = self.persist;
        params.exit_after_compile = self.exit_compile;
        params.exit_after_link = self.exit_linking;
        params.output = self.output;
        params.vertex_path = self.vertex;
        params.binary_dump = self.dump_bin;
        params.validate()?;

        Ok((params, source))
    }
}

fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            let _ = e.print();
            process::exit(EXIT_FAILURE);
        }
    };
    initialise_tracing();

    let result = cli
        .into_params()
        .and_then(|(params, source)| run::run(&params, &source));
    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(e.exit_code());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("fragshot").chain(args.iter().copied()))
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_apply_without_flags() {
        let cli = parse(&["a.frag"]).unwrap();
        assert_eq!(cli.delay, 5);
        assert_eq!(cli.output, PathBuf::from("output.png"));
        assert!(cli.resolution.is_none());
        assert!(!cli.persist && !cli.exit_compile && !cli.exit_linking);
    }

    #[test]
    fn every_flag_is_recognised() {
        let cli = parse(&[
            "a.frag",
            "--delay",
            "0",
            "--persist",
            "--exit-compile",
            "--exit-linking",
            "--output",
            "out.png",
            "--resolution",
            "64",
            "32",
            "--vertex",
            "v.vert",
            "--dump_bin",
            "prog.bin",
        ])
        .unwrap();
        assert_eq!(cli.delay, 0);
        assert!(cli.persist && cli.exit_compile && cli.exit_linking);
        assert_eq!(cli.resolution, Some(vec![64, 32]));
        assert_eq!(cli.vertex, Some(PathBuf::from("v.vert")));
        assert_eq!(cli.dump_bin, Some(PathBuf::from("prog.bin")));
    }

    #[test]
    fn resolution_needs_two_values() {
        let err = parse(&["a.frag", "--resolution", "64"]).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::WrongNumberOfValues);
    }

    #[test]
    fn repeated_resolution_is_a_usage_error() {
        let dir = tempfile::tempdir().unwrap();
        let shader = dir.path().join("a.frag");
        std::fs::write(&shader, "#version 100\nvoid main() {}\n").unwrap();
        let path = shader.to_str().unwrap();

        let err = parse(&[path, "--resolution", "8", "8", "--resolution", "16", "16"])
            .unwrap()
            .into_params()
            .err()
            .unwrap();
        assert!(matches!(err, CliError::Usage(_)), "got: {err}");
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn missing_shader_is_an_error() {
        assert!(parse(&[]).is_err());
    }

    #[test]
    fn extra_positional_is_an_error() {
        assert!(parse(&["a.frag", "b.frag"]).is_err());
    }

    #[test]
    fn help_documents_exit_codes() {
        let help = Cli::command().render_long_help().to_string();
        assert!(help.contains("101"), "missing compile exit code in:\n{help}");
        assert!(help.contains("102"), "missing link exit code in:\n{help}");
        assert!(help.contains(".json"), "missing description note in:\n{help}");
    }

    #[test]
    fn zero_resolution_is_a_usage_error() {
        let dir = tempfile::tempdir().unwrap();
        let shader = dir.path().join("a.frag");
        std::fs::write(&shader, "#version 100\nvoid main() {}\n").unwrap();
        let path = shader.to_str().unwrap();

        let err = parse(&[path, "--resolution", "0", "16"])
            .unwrap()
            .into_params()
            .err()
            .unwrap();
        assert!(matches!(err, CliError::Usage(_)), "got: {err}");
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn flags_land_in_run_params() {
        let dir = tempfile::tempdir().unwrap();
        let shader = dir.path().join("a.frag");
        std::fs::write(&shader, "#version 300 es\nvoid main() {}\n").unwrap();
        let path = shader.to_str().unwrap();

        let (params, source) = parse(&[path, "--resolution", "64", "48", "--exit-linking"])
            .unwrap()
            .into_params()
            .unwrap();
        assert_eq!((params.width, params.height), (64, 48));
        assert_eq!(params.shader_version.value(), 300);
        assert!(params.exit_after_link);
        assert!(source.starts_with("#version 300 es"));
    }
}

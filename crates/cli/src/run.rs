//! One harness run: load, open a context, build the pipeline, render,
//! capture.

use crate::error::CliError;
use crate::window::GlWindow;
use fragshot_core::render::{build_pipeline, render_and_capture, GpuContext, PipelineOutcome};
use fragshot_core::{ContextRequest, LoopOutcome, RenderSurface, RunParams};
use fragshot_snapshot::write_capture;

/// Runs the harness for `params` with the already-read `fragment_source`.
///
/// Returns once the frame has been captured, an early stop requested in
/// `params` has been reached, or the window has been closed.
///
/// # Errors
///
/// Any [`CliError`]; its exit code tells compile and link failures apart
/// from everything else.
pub fn run(params: &RunParams, fragment_source: &str) -> Result<(), CliError> {
    params.validate()?;

    let request = ContextRequest::for_shader(params.shader_version);
    tracing::debug!(
        glsl = %params.shader_version,
        api = %request.api,
        major = request.major,
        minor = request.minor,
        "requesting context"
    );
    let (mut window, gl) = GlWindow::open(request, params.width, params.height)?;
    let ctx = GpuContext::new(gl);

    let result = match build_pipeline(&ctx, params, fragment_source) {
        Ok(PipelineOutcome::StoppedAfter(stage)) => {
            tracing::info!("stopping after stage: {stage}");
            Ok(())
        }
        Ok(PipelineOutcome::Ready(bound)) => {
            let rendered = render_and_capture(ctx.gl(), &mut window, &bound, params, |pixels| {
                write_capture(&pixels, params.width, params.height, &params.output)
            });
            bound.destroy(ctx.gl());
            rendered.map(|outcome| match outcome {
                LoopOutcome::Captured { frames } => {
                    tracing::debug!(frames, "render loop finished");
                }
                LoopOutcome::ClosedEarly { frames } => {
                    tracing::debug!(frames, "render loop ended by window close");
                }
            })
        }
        Err(e) => Err(e),
    };

    window.terminate();
    result.map_err(CliError::from)
}

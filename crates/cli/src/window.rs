//! The on-screen window and GL context the shader is rendered into.
//!
//! Built with winit + glutin. The event loop is pumped manually so that
//! the render loop stays in charge of when frames are drawn.

use fragshot_core::{ContextRequest, GraphicsApi, HarnessError, RenderSurface};
use glutin::config::{Api, ConfigTemplateBuilder};
use glutin::context::{
    ContextApi, ContextAttributes, ContextAttributesBuilder, GlProfile, NotCurrentContext,
    PossiblyCurrentContext, Version,
};
use glutin::display::{Display, GetGlDisplay};
use glutin::prelude::*;
use glutin::surface::{Surface, SurfaceAttributesBuilder, WindowSurface};
use glutin_winit::DisplayBuilder;
use raw_window_handle::{HasRawWindowHandle, RawWindowHandle};
use std::num::NonZeroU32;
use std::time::Duration;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, WindowEvent};
use winit::event_loop::EventLoop;
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowBuilder};

const WINDOW_TITLE: &str = "fragshot";

fn backend(context: &str) -> impl FnOnce(glutin::error::Error) -> HarnessError + '_ {
    move |e| HarnessError::Backend(format!("{context}: {e}"))
}

/// A window with a current GL context.
///
/// Fields drop in declaration order: the surface and context go before
/// the window and event loop they were created from.
pub struct GlWindow {
    surface: Surface<WindowSurface>,
    context: PossiblyCurrentContext,
    window: Window,
    event_loop: EventLoop<()>,
    close_requested: bool,
}

impl GlWindow {
    /// Opens a `width` x `height` window and makes a context for
    /// `request` current on it.
    ///
    /// Desktop contexts use the compatibility profile. If the driver
    /// refuses the exact version, its default context is used instead and
    /// the negotiated version is whatever it reports.
    ///
    /// # Errors
    ///
    /// Returns `HarnessError::Backend` if the window, context or surface
    /// cannot be created, and `HarnessError::Config` for a zero size.
    #[allow(unsafe_code)]
    pub fn open(
        request: ContextRequest,
        width: u32,
        height: u32,
    ) -> Result<(Self, glow::Context), HarnessError> {
        let (w, h) = match (NonZeroU32::new(width), NonZeroU32::new(height)) {
            (Some(w), Some(h)) => (w, h),
            _ => {
                return Err(HarnessError::Config(format!(
                    "resolution must be positive, got {width}x{height}"
                )))
            }
        };

        let event_loop = EventLoop::new()
            .map_err(|e| HarnessError::Backend(format!("cannot create event loop: {e}")))?;
        let window_builder = WindowBuilder::new()
            .with_title(WINDOW_TITLE)
            .with_inner_size(PhysicalSize::new(width, height))
            .with_resizable(false);

        let api = match (request.api, request.major) {
            (GraphicsApi::OpenGl, _) => Api::OPENGL,
            (GraphicsApi::OpenGlEs, 2) => Api::GLES2,
            (GraphicsApi::OpenGlEs, _) => Api::GLES3,
        };
        let template = ConfigTemplateBuilder::new()
            .with_alpha_size(8)
            .with_api(api);
        let display_builder = DisplayBuilder::new().with_window_builder(Some(window_builder));

        // glutin only calls the picker with a non-empty set of configs.
        let (window, gl_config) = display_builder
            .build(&event_loop, template, |mut configs| {
                configs.next().expect("glutin passes at least one config")
            })
            .map_err(|e| HarnessError::Backend(format!("cannot create window: {e}")))?;
        let window =
            window.ok_or_else(|| HarnessError::Backend("no window was created".into()))?;

        let raw_window_handle = window.raw_window_handle();
        let gl_display = gl_config.display();

        let not_current = create_context(&gl_display, &gl_config, request, raw_window_handle)?;

        let surface_attributes =
            SurfaceAttributesBuilder::<WindowSurface>::new().build(raw_window_handle, w, h);
        // SAFETY: the window outlives the surface (see field order).
        let surface = unsafe { gl_display.create_window_surface(&gl_config, &surface_attributes) }
            .map_err(backend("cannot create window surface"))?;
        let context = not_current
            .make_current(&surface)
            .map_err(backend("cannot make context current"))?;

        // SAFETY: the context is current on this thread and stays current
        // for the rest of the run.
        let gl = unsafe {
            glow::Context::from_loader_function_cstr(|name| gl_display.get_proc_address(name))
        };

        Ok((
            Self {
                surface,
                context,
                window,
                event_loop,
                close_requested: false,
            },
            gl,
        ))
    }

    fn pump(&mut self, timeout: Option<Duration>) -> bool {
        let mut key_pressed = false;
        let close_requested = &mut self.close_requested;
        let status = self.event_loop.pump_events(timeout, |event, _target| {
            if let Event::WindowEvent { event, .. } = event {
                match event {
                    WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                        *close_requested = true;
                    }
                    WindowEvent::KeyboardInput { event, .. }
                        if event.state == ElementState::Pressed =>
                    {
                        key_pressed = true;
                    }
                    _ => {}
                }
            }
        });
        if let PumpStatus::Exit(_) = status {
            self.close_requested = true;
        }
        key_pressed
    }
}

/// Creates a context for `request`, falling back to the display's
/// default context if that exact version is refused.
#[allow(unsafe_code)]
fn create_context(
    display: &Display,
    config: &glutin::config::Config,
    request: ContextRequest,
    raw_window_handle: RawWindowHandle,
) -> Result<NotCurrentContext, HarnessError> {
    let version = Version::new(request.major, request.minor);
    let exact: ContextAttributes = match request.api {
        GraphicsApi::OpenGl => ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(version)))
            .with_profile(GlProfile::Compatibility)
            .build(Some(raw_window_handle)),
        GraphicsApi::OpenGlEs => ContextAttributesBuilder::new()
            .with_context_api(ContextApi::Gles(Some(version)))
            .build(Some(raw_window_handle)),
    };

    // SAFETY: the raw window handle comes from a live window that outlives
    // the context (see the field order of `GlWindow`).
    match unsafe { display.create_context(config, &exact) } {
        Ok(context) => Ok(context),
        Err(e) => {
            tracing::warn!(
                "cannot create {} {}.{} context ({e}), using the driver default",
                request.api,
                request.major,
                request.minor
            );
            let fallback = ContextAttributesBuilder::new().build(Some(raw_window_handle));
            unsafe { display.create_context(config, &fallback) }
                .map_err(backend("cannot create GL context"))
        }
    }
}

impl RenderSurface for GlWindow {
    fn keep_looping(&mut self) -> bool {
        self.pump(Some(Duration::ZERO));
        !self.close_requested
    }

    fn swap_buffers(&mut self) -> Result<(), HarnessError> {
        self.surface
            .swap_buffers(&self.context)
            .map_err(backend("cannot swap buffers"))?;
        self.window.request_redraw();
        Ok(())
    }

    fn wait_for_key_then_close(&mut self) {
        tracing::info!("capture done, press any key or close the window to exit");
        while !self.close_requested {
            if self.pump(None) {
                break;
            }
        }
    }

    fn terminate(self) {
        drop(self);
    }
}

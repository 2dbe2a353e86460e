//! Standalone window backed by winit.
//!
//! ```no_run
//! # use halo::app::App;
//! App::builder()
//!     .with_title("Halo")
//!     .build()
//!     .run()
//!     .unwrap();
//! ```

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::{ElementState, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::{
    error::HaloError, options::Options, renderer::BlendShaderSource,
    viewer::Viewer, InputEvent, MouseButton,
};

// ── Builder ──────────────────────────────────────────────────────────────

/// Fluent builder for [`App`].
pub struct AppBuilder {
    options: Options,
    blend: BlendShaderSource,
    title: String,
}

impl AppBuilder {
    /// Create a builder with sensible defaults (title "Halo", default
    /// options, additive blend shader).
    fn new() -> Self {
        Self {
            options: Options::default(),
            blend: BlendShaderSource::default(),
            title: "Halo".into(),
        }
    }

    /// Override the default options.
    #[must_use]
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Use a custom blend shader.
    #[must_use]
    pub fn with_blend_shader(mut self, blend: BlendShaderSource) -> Self {
        self.blend = blend;
        self
    }

    /// Set the window title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Consume the builder and produce an [`App`].
    #[must_use]
    pub fn build(self) -> App {
        App {
            options: self.options,
            blend: self.blend,
            title: self.title,
        }
    }
}

// ── App ──────────────────────────────────────────────────────────────────

/// A window showing the selective-bloom scene.
///
/// Construct via [`App::builder`], then call [`run`](Self::run) to enter
/// the event loop.
pub struct App {
    options: Options,
    blend: BlendShaderSource,
    title: String,
}

impl App {
    /// Start a new builder.
    #[must_use]
    pub fn builder() -> AppBuilder {
        AppBuilder::new()
    }

    /// Open the window and run the event loop. Blocks until the window is
    /// closed.
    ///
    /// # Errors
    ///
    /// Returns [`HaloError::Viewer`] if the event loop fails, or the
    /// viewer's initialization error (for example a rejected blend
    /// shader).
    pub fn run(self) -> Result<(), HaloError> {
        let event_loop =
            EventLoop::new().map_err(|e| HaloError::Viewer(e.to_string()))?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = AppState {
            window: None,
            viewer: None,
            options: Some(self.options),
            blend: self.blend,
            title: self.title,
            init_error: None,
        };

        event_loop
            .run_app(&mut app)
            .map_err(|e| HaloError::Viewer(e.to_string()))?;
        app.init_error.map_or(Ok(()), Err)
    }
}

// ── Event loop state ─────────────────────────────────────────────────────

struct AppState {
    window: Option<Arc<Window>>,
    viewer: Option<Viewer>,
    options: Option<Options>,
    blend: BlendShaderSource,
    title: String,
    init_error: Option<HaloError>,
}

fn viewport_size(inner: winit::dpi::PhysicalSize<u32>) -> (u32, u32) {
    (inner.width.max(1), inner.height.max(1))
}

impl AppState {
    fn forward(&mut self, event: InputEvent) {
        let Some(viewer) = &mut self.viewer else {
            return;
        };
        if viewer.handle_input(event) {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }
    }

    fn redraw(&mut self) {
        let (Some(window), Some(viewer)) = (&self.window, &mut self.viewer)
        else {
            return;
        };
        match viewer.tick() {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost) => {
                let (w, h) = viewport_size(window.inner_size());
                viewer.resize(w, h);
            }
            Err(e) => log::error!("render error: {e:?}"),
        }
        window.request_redraw();
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let Some(options) = self.options.take() else {
            return;
        };

        let monitor = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next());
        let attrs = if let Some(mon) = &monitor {
            let mon_size = mon.size();
            let scale = mon.scale_factor();
            let logical_w = (mon_size.width as f64 / scale * 0.75) as u32;
            let logical_h = (mon_size.height as f64 / scale * 0.75) as u32;
            Window::default_attributes()
                .with_title(&self.title)
                .with_inner_size(winit::dpi::LogicalSize::new(
                    logical_w, logical_h,
                ))
        } else {
            Window::default_attributes().with_title(&self.title)
        };

        let window = match event_loop.create_window(attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("Failed to create window: {e}");
                self.init_error = Some(HaloError::Viewer(e.to_string()));
                event_loop.exit();
                return;
            }
        };

        let size = viewport_size(window.inner_size());
        let viewer = match pollster::block_on(Viewer::new(
            window.clone(),
            size,
            options,
            &self.blend,
        )) {
            Ok(v) => v,
            Err(e) => {
                log::error!("Failed to initialize viewer: {e}");
                self.init_error = Some(e);
                event_loop.exit();
                return;
            }
        };

        window.request_redraw();
        self.window = Some(window);
        self.viewer = Some(viewer);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _id: WindowId,
        event: WindowEvent,
    ) {
        if matches!(event, WindowEvent::CloseRequested) {
            event_loop.exit();
            return;
        }

        match event {
            WindowEvent::Resized(event_size) => {
                if let Some(viewer) = &mut self.viewer {
                    let (w, h) = viewport_size(event_size);
                    viewer.resize(w, h);
                }
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                if let (Some(window), Some(viewer)) =
                    (&self.window, &mut self.viewer)
                {
                    let (w, h) = viewport_size(window.inner_size());
                    viewer.resize(w, h);
                }
            }

            WindowEvent::RedrawRequested => self.redraw(),

            WindowEvent::MouseInput { button, state, .. } => {
                self.forward(InputEvent::MouseButton {
                    button: MouseButton::from(button),
                    pressed: state == ElementState::Pressed,
                });
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.forward(InputEvent::CursorMoved {
                    x: position.x as f32,
                    y: position.y as f32,
                });
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let delta = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.01,
                };
                self.forward(InputEvent::Scroll { delta });
            }

            _ => (),
        }
    }
}

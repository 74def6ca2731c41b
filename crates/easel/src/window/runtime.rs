use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::device::{Gpu, SurfaceErrorAction};
use crate::render::{RenderCtx, RenderTarget, ScenePainter};
use crate::scene::Scene;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "easel".to_string(),
            initial_size: LogicalSize::new(1000.0, 1000.0),
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Runs the render loop until the window closes or a fatal error occurs.
    ///
    /// The scene is moved into the loop; records are append-only, so an
    /// empty scene at entry stays empty and the loop exits before a window
    /// ever opens.
    pub fn run(config: RuntimeConfig, scene: Scene) -> Result<()> {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = LoopState::new(config, scene);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        // Initialization failures happen inside winit callbacks and cannot
        // be returned from there; surface them to the caller here.
        if let Some(err) = state.init_error.take() {
            return Err(err);
        }
        Ok(())
    }
}

#[self_referencing]
struct WindowEntry {
    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct LoopState {
    config: RuntimeConfig,
    scene: Scene,

    entry: Option<WindowEntry>,
    painter: Option<ScenePainter>,

    init_error: Option<anyhow::Error>,
    exit_requested: bool,
}

impl LoopState {
    fn new(config: RuntimeConfig, scene: Scene) -> Self {
        Self {
            config,
            scene,
            entry: None,
            painter: None,
            init_error: None,
            exit_requested: false,
        }
    }

    fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    /// One-time window + GPU + pipeline bootstrap.
    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        // Aspect ratio and dimensions are fixed at startup; the window is
        // created non-resizable so the surface never needs reconfiguring.
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size)
            .with_resizable(false);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let entry = WindowEntryTryBuilder {
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w)),
        }
        .try_build()?;

        let painter = entry.with_gpu(|gpu| {
            let ctx = RenderCtx::new(
                gpu.device(),
                gpu.queue(),
                gpu.surface_format(),
                gpu.aspect_ratio(),
            );
            ScenePainter::new(&ctx)
        })?;

        self.entry = Some(entry);
        self.painter = Some(painter);
        Ok(())
    }

    /// Renders one frame. Returns `false` when the loop must terminate.
    fn frame(&mut self) -> bool {
        // Split borrows so the ouroboros closure does not capture `self`.
        let (scene, painter, entry) = (&self.scene, self.painter.as_mut(), self.entry.as_mut());
        let (Some(painter), Some(entry)) = (painter, entry) else {
            return true;
        };

        let mut fatal = false;

        entry.with_mut(|fields| {
            let gpu = fields.gpu;

            let mut frame = match gpu.begin_frame() {
                Ok(f) => f,
                Err(err) => {
                    if gpu.handle_surface_error(err) == SurfaceErrorAction::Fatal {
                        log::error!("surface out of memory; terminating render loop");
                        fatal = true;
                    }
                    return;
                }
            };

            let ctx = RenderCtx::new(
                gpu.device(),
                gpu.queue(),
                gpu.surface_format(),
                gpu.aspect_ratio(),
            );

            // RenderTarget borrows frame.encoder; dropped before submit() takes frame.
            {
                let mut target = RenderTarget::new(&mut frame.encoder, &frame.view);
                painter.render(&ctx, &mut target, scene);
            }

            fields.window.pre_present_notify();
            gpu.submit(frame);
        });

        !fatal
    }
}

impl ApplicationHandler for LoopState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() {
            return;
        }

        // Nothing will ever draw: exit before a window opens (no flash).
        if self.scene.is_empty() {
            log::info!("scene is empty; nothing to render");
            self.request_exit();
            event_loop.exit();
            return;
        }

        if let Err(e) = self.init(event_loop) {
            log::error!("initialization failed: {e:#}");
            self.init_error = Some(e);
            self.request_exit();
            event_loop.exit();
            return;
        }

        if let Some(entry) = self.entry.as_ref() {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw: the scene is redrawn every frame.
        if let Some(entry) = self.entry.as_ref() {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                self.entry = None;
                self.painter = None;
                self.request_exit();
                event_loop.exit();
            }

            WindowEvent::RedrawRequested => {
                if !self.frame() {
                    self.request_exit();
                    event_loop.exit();
                }
            }

            _ => {}
        }
    }
}

//! Window, GPU surface and frame loop.

use crate::config::AppConfig;
use crate::event_handler::EventTranslator;
use crate::guard::{AppError, SessionGuard};
use crate::shell::Shell;
use clusterpad_render::{RenderContext, Renderer, RendererError, VelloRenderer};
use kurbo::Size;
use peniko::Color;
use std::sync::Arc;
use std::time::Instant;
use vello::RendererOptions;
use vello::util::RenderSurface;
use vello::wgpu::PresentMode;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Window, WindowId};

/// Runtime state, created once the window exists.
struct AppState {
    window: Arc<Window>,
    surface: RenderSurface<'static>,
    vello_renderer: vello::Renderer,
    renderer: VelloRenderer,
    /// Copies the Rgba8 render target onto the (possibly Bgra8) surface.
    texture_blitter: vello::wgpu::util::TextureBlitter,
    shell: Shell,
    translator: EventTranslator,
    last_frame: Instant,
}

/// Main application struct.
pub struct App {
    config: AppConfig,
    guard: SessionGuard,
    state: Option<AppState>,
    render_cx: Option<vello::util::RenderContext>,
    /// Fatal error raised inside the event loop.
    error: Option<AppError>,
}

impl App {
    pub fn with_config(config: AppConfig) -> Self {
        Self {
            config,
            guard: SessionGuard::new(),
            state: None,
            render_cx: None,
            error: None,
        }
    }

    /// Open the window and run until it is closed.
    pub fn run(config: AppConfig) -> Result<(), AppError> {
        config.validate()?;
        let event_loop = EventLoop::new()?;
        let mut app = App::with_config(config);
        event_loop.run_app(&mut app)?;
        match app.error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<AppState, AppError> {
        let attrs = Window::default_attributes()
            .with_title(&self.config.title)
            .with_inner_size(PhysicalSize::new(self.config.width, self.config.height))
            .with_resizable(false);
        let window = Arc::new(event_loop.create_window(attrs)?);

        let size = window.inner_size();
        let (width, height) = if size.width == 0 || size.height == 0 {
            (self.config.width, self.config.height)
        } else {
            (size.width, size.height)
        };

        let render_cx = self
            .render_cx
            .get_or_insert_with(vello::util::RenderContext::new);
        let surface = pollster::block_on(render_cx.create_surface(
            window.clone(),
            width,
            height,
            PresentMode::AutoVsync,
        ))
        .map_err(|e| RendererError::Surface(e.to_string()))?;

        let device = &render_cx.devices[surface.dev_id].device;
        let vello_renderer = vello::Renderer::new(device, RendererOptions::default())
            .map_err(|e| RendererError::InitFailed(e.to_string()))?;
        let texture_blitter = vello::wgpu::util::TextureBlitter::new(device, surface.config.format);

        log::info!("ClusterPad initialized - {}x{}", width, height);
        log::info!("Left click adds a point, right click removes nearby points");

        Ok(AppState {
            window,
            surface,
            vello_renderer,
            renderer: VelloRenderer::new(),
            texture_blitter,
            shell: Shell::new(self.config.clone()),
            translator: EventTranslator::new(),
            last_frame: Instant::now(),
        })
    }
}

impl AppState {
    fn redraw(
        &mut self,
        render_cx: &vello::util::RenderContext,
        background: Color,
    ) -> Result<(), RendererError> {
        let now = Instant::now();
        self.shell.update(now - self.last_frame);
        self.last_frame = now;

        let width = self.surface.config.width;
        let height = self.surface.config.height;
        let ctx = RenderContext::new(Size::new(width as f64, height as f64))
            .with_background(background);
        self.renderer.begin_frame(&ctx);
        self.shell.draw(&mut self.renderer);

        let handle = &render_cx.devices[self.surface.dev_id];
        let surface_texture = self
            .surface
            .surface
            .get_current_texture()
            .map_err(|e| RendererError::Surface(e.to_string()))?;
        let view = surface_texture
            .texture
            .create_view(&vello::wgpu::TextureViewDescriptor::default());

        self.renderer.render_to_view(
            &mut self.vello_renderer,
            &handle.device,
            &handle.queue,
            &self.texture_blitter,
            &view,
            width,
            height,
            background,
        )?;
        surface_texture.present();
        Ok(())
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        if self.guard.start().is_err() {
            return;
        }

        log::info!("Creating window...");
        match self.init(event_loop) {
            Ok(state) => {
                state.window.request_redraw();
                self.state = Some(state);
            }
            Err(err) => {
                log::error!("Failed to start: {}", err);
                self.error = Some(err);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(state) = &mut self.state else {
            return;
        };

        match &event {
            WindowEvent::Resized(size) if size.width > 0 && size.height > 0 => {
                if let Some(render_cx) = self.render_cx.as_mut() {
                    render_cx.resize_surface(&mut state.surface, size.width, size.height);
                }
                state.window.request_redraw();
            }
            WindowEvent::RedrawRequested => {
                let Some(render_cx) = self.render_cx.as_ref() else {
                    return;
                };
                let background = Color::from(self.config.background_color);
                if let Err(e) = state.redraw(render_cx, background) {
                    log::warn!("Frame skipped: {}", e);
                }
                return;
            }
            _ => {}
        }

        let Some(input) = state.translator.translate(&event) else {
            return;
        };
        state.shell.handle_event(&input);
        if state.shell.is_running() {
            state.window.request_redraw();
        } else {
            event_loop.exit();
        }
    }
}

mod keymap;

use anyhow::{Context as _, Result};
use clap::Parser;
use egui::Context as EguiContext;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{CursorGrabMode, Window, WindowId};
use wisp_avatar::{RenderHost, Viewport};
use wisp_composer::{SceneConfig, SceneContext, load_models, setup_environment};
use wisp_input::{InputEvent, Key, PointerButton};
use wisp_render_wgpu::WgpuRenderer;

#[derive(Parser)]
#[command(name = "wisp-desktop", about = "Wisp scene desktop application")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene configuration (YAML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Asset directory, overrides the config
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Lock the pointer on click, release it with Escape
    #[arg(long)]
    pointer_lock: bool,
}

/// Frame clock and pointer control backed by the winit window.
struct WinitHost {
    start: Instant,
    window: Option<Arc<Window>>,
}

impl RenderHost for WinitHost {
    fn now_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    fn set_pointer_lock(&mut self, enabled: bool) {
        let Some(window) = &self.window else {
            return;
        };
        let grab = if enabled {
            window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined))
        } else {
            window.set_cursor_grab(CursorGrabMode::None)
        };
        if let Err(e) = grab {
            tracing::warn!("pointer lock unavailable: {e}");
        }
        window.set_cursor_visible(!enabled);
    }
}

struct Gpu {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

struct GpuApp {
    scene_config: SceneConfig,
    pointer_lock: bool,
    host: WinitHost,
    ctx: Option<SceneContext>,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
    show_inspector: bool,
    pointer_locked: bool,
    last_frame: Instant,
}

impl GpuApp {
    fn new(scene_config: SceneConfig, pointer_lock: bool) -> Self {
        Self {
            scene_config,
            pointer_lock,
            host: WinitHost {
                start: Instant::now(),
                window: None,
            },
            ctx: None,
            gpu: None,
            egui_ctx: EguiContext::default(),
            show_inspector: false,
            pointer_locked: false,
            last_frame: Instant::now(),
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window_config = &self.scene_config.window;
        let attrs = Window::default_attributes()
            .with_title(window_config.title.clone())
            .with_inner_size(PhysicalSize::new(window_config.width, window_config.height));
        let window = Arc::new(event_loop.create_window(attrs).context("create window")?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no compatible GPU adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("wisp_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("create device")?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or(surface_caps.formats.first())
            .copied()
            .context("surface reports no formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let mut ctx = setup_environment(
            self.scene_config.clone(),
            Viewport::new(size.width, size.height),
        )?;
        load_models(&mut ctx)?;

        let mut renderer =
            WgpuRenderer::new(&device, &queue, surface_format, config.width, config.height);
        renderer.set_clear_color(self.scene_config.environment.clear_color);

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        self.host.window = Some(window);
        self.ctx = Some(ctx);
        self.gpu = Some(Gpu {
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
        });
        self.last_frame = Instant::now();
        Ok(())
    }

    fn input(&mut self, event: InputEvent) {
        let Some(ctx) = &mut self.ctx else {
            return;
        };
        ctx.handle_input(&event);

        match event {
            InputEvent::KeyDown(Key::F1) => self.show_inspector = !self.show_inspector,
            InputEvent::PointerDown(PointerButton::Primary)
                if self.pointer_lock && !self.pointer_locked =>
            {
                ctx.player.set_pointer_lock(&mut self.host, true);
                self.pointer_locked = true;
            }
            InputEvent::KeyDown(Key::Escape) if self.pointer_locked => {
                ctx.player.set_pointer_lock(&mut self.host, false);
                self.pointer_locked = false;
            }
            _ => {}
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        let Some(gpu) = &mut self.gpu else {
            return;
        };
        gpu.config.width = width.max(1);
        gpu.config.height = height.max(1);
        gpu.surface.configure(&gpu.device, &gpu.config);
        gpu.renderer
            .resize(&gpu.device, gpu.config.width, gpu.config.height);
        if let Some(ctx) = &mut self.ctx {
            ctx.resize(Viewport::new(gpu.config.width, gpu.config.height));
        }
    }

    fn frame(&mut self) {
        let (Some(gpu), Some(ctx), Some(window)) = (&mut self.gpu, &mut self.ctx, &self.host.window)
        else {
            return;
        };

        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32().min(0.1);
        self.last_frame = now;

        if let Err(e) = ctx.before_render(dt) {
            tracing::error!("frame setup failed: {e}");
        }

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        gpu.renderer.render(
            &gpu.device,
            &gpu.queue,
            &view,
            ctx.player.camera(),
            &ctx.scene,
            &ctx.assets,
        );

        let raw_input = gpu.egui_winit.take_egui_input(window);
        let show_inspector = self.show_inspector;
        let resident = gpu.renderer.resident_assets();
        let full_output = self.egui_ctx.run(raw_input, |ui_ctx| {
            if show_inspector {
                draw_inspector(ui_ctx, ctx, resident);
            }
        });
        gpu.egui_winit
            .handle_platform_output(window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [gpu.config.width, gpu.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            gpu.egui_renderer
                .update_texture(&gpu.device, &gpu.queue, *id, image_delta);
        }
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        gpu.egui_renderer.update_buffers(
            &gpu.device,
            &gpu.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            gpu.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        gpu.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            gpu.egui_renderer.free_texture(id);
        }

        output.present();

        if let Err(e) = ctx.after_render(&self.host) {
            tracing::error!("avatar update failed: {e}");
        }
        window.request_redraw();
    }
}

fn draw_inspector(ui_ctx: &EguiContext, ctx: &SceneContext, resident: usize) {
    let camera = ctx.player.camera();
    let offset = ctx.player.wisp_offset();
    egui::Window::new("Wisp")
        .default_width(260.0)
        .show(ui_ctx, |ui| {
            ui.label(format!(
                "Camera: ({:.1}, {:.1}, {:.1})",
                camera.position.x, camera.position.y, camera.position.z
            ));
            ui.label(format!(
                "Speed: {} ({:.1})",
                ctx.player.speed_mode(),
                camera.speed
            ));
            ui.separator();
            ui.label(format!("Wisp offset: x {:.3}  y {:.3}", offset.x, offset.y));
            ui.label(format!("Wisp roll: {:.3} rad", ctx.player.roll()));
            ui.separator();
            ui.label(format!(
                "Nodes: {}  Assets: {}  GPU: {}",
                ctx.scene.node_count(),
                ctx.assets.len(),
                resident
            ));
            if ctx.loader.pending() > 0 {
                ui.label(format!("Loading {} model(s)...", ctx.loader.pending()));
            }
            ui.separator();
            ui.small("F1: Toggle | LMB drag: Look | WASD/QE: Move | Shift: Fast");
        });
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            tracing::error!("startup failed: {e:#}");
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let (Some(gpu), Some(window)) = (&mut self.gpu, &self.host.window) {
            let response = gpu.egui_winit.on_window_event(window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                self.resize(new_size.width, new_size.height);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                let key = keymap::map_key(code);
                let event = match state {
                    ElementState::Pressed => InputEvent::KeyDown(key),
                    ElementState::Released => InputEvent::KeyUp(key),
                };
                self.input(event);
            }
            WindowEvent::MouseInput { button, state, .. } => {
                if let Some(button) = keymap::map_button(button) {
                    self.input(match state {
                        ElementState::Pressed => InputEvent::PointerDown(button),
                        ElementState::Released => InputEvent::PointerUp(button),
                    });
                }
            }
            WindowEvent::RedrawRequested => self.frame(),
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.input(InputEvent::PointerMove {
                dx: delta.0 as f32,
                dy: delta.1 as f32,
            });
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.host.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("wisp-desktop starting");

    let mut scene_config = match &cli.config {
        Some(path) => SceneConfig::load(path)?,
        None => SceneConfig::default(),
    };
    if let Some(assets) = cli.assets {
        scene_config.assets.root = assets;
    }

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(scene_config, cli.pointer_lock);
    event_loop.run_app(&mut app)?;

    Ok(())
}

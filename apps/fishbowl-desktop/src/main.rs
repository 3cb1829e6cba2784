mod host;

use anyhow::Result;
use clap::Parser;
use egui::Context as EguiContext;
use fishbowl_common::{ControllerConfig, Viewport};
use fishbowl_input::{InputEvent, Key};
use fishbowl_kernel::{FrameHandle, SceneKind, Session};
use fishbowl_render_wgpu::{WgpuFrame, WgpuRenderer};
use fishbowl_tools::SessionInspector;
use glam::Vec2;
use host::TouchTracker;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "fishbowl-desktop", about = "Fishbowl desktop viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// JSON controller configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Scene shown at startup (sphere, cube, plane, empty)
    #[arg(long, default_value = "sphere")]
    scene: SceneKind,
}

/// Everything that only exists once the window is up.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Gpu {
    fn new(event_loop: &ActiveEventLoop, egui_ctx: &EguiContext) -> Self {
        let attrs = Window::default_attributes()
            .with_title("Fishbowl")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs).expect("create window"));

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .expect("create surface");

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .expect("find adapter");

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("fishbowl_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .expect("create device");

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let renderer = WgpuRenderer::new(&device, surface_format, config.width, config.height);
        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
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

        Self {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
        }
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.config.width = size.width.max(1);
        self.config.height = size.height.max(1);
        self.surface.configure(&self.device, &self.config);
    }
}

struct DesktopApp {
    session: Session,
    frame: Option<FrameHandle>,
    cursor: Vec2,
    touches: TouchTracker,
    show_inspector: bool,
    started: Instant,
    egui_ctx: EguiContext,
    gpu: Option<Gpu>,
}

impl DesktopApp {
    fn new(session: Session, frame: FrameHandle) -> Self {
        Self {
            session,
            frame: Some(frame),
            cursor: Vec2::ZERO,
            touches: TouchTracker::default(),
            show_inspector: false,
            started: Instant::now(),
            egui_ctx: EguiContext::default(),
            gpu: None,
        }
    }

    fn feed(&mut self, event: InputEvent) {
        if let Some(gesture) = self.session.handle_event(&event) {
            tracing::trace!(?gesture, "gesture");
        }
    }

    fn switch_scene(&mut self, kind: SceneKind) {
        match self.session.switch_scene(kind) {
            Ok(frame) => {
                self.frame = Some(frame);
                let events = self.session.drain_events();
                tracing::info!(%kind, lifecycle_events = events.len(), "switched scene");
            }
            Err(e) => tracing::error!("failed to switch to {kind}: {e}"),
        }
    }

    fn handle_key(&mut self, key: &winit::keyboard::Key, pressed: bool) {
        let Some(key) = host::translate_key(key) else {
            return;
        };
        if pressed {
            match &key {
                Key::Character(c @ '1'..='4') => {
                    let index = *c as usize - '1' as usize;
                    if let Some(kind) = SceneKind::from_index(index) {
                        self.switch_scene(kind);
                    }
                    return;
                }
                Key::Named(name) if name == "f1" => {
                    self.show_inspector = !self.show_inspector;
                    return;
                }
                _ => {}
            }
            self.feed(InputEvent::KeyDown(key));
        } else {
            self.feed(InputEvent::KeyUp(key));
        }
    }

    fn redraw(&mut self) {
        let time_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        if let Some(frame) = self.frame.take() {
            match self.session.tick(frame, time_ms) {
                Ok(next) => self.frame = Some(next),
                Err(e) => tracing::warn!("tick skipped: {e}"),
            }
        }

        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };

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

        let mut frame = WgpuFrame {
            renderer: &mut gpu.renderer,
            device: &gpu.device,
            queue: &gpu.queue,
            target: &view,
        };
        if let Err(e) = self.session.render(&mut frame) {
            tracing::warn!("render skipped: {e}");
        }

        if self.show_inspector {
            let session = &self.session;
            let raw_input = gpu.egui_winit.take_egui_input(&gpu.window);
            let full_output = self.egui_ctx.run(raw_input, |ctx| draw_inspector(ctx, session));
            gpu.egui_winit
                .handle_platform_output(&gpu.window, full_output.platform_output);

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
        }

        output.present();
        gpu.window.request_redraw();
    }
}

fn draw_inspector(ctx: &egui::Context, session: &Session) {
    egui::Window::new("Inspector")
        .default_width(280.0)
        .show(ctx, |ui| {
            match SessionInspector::summary(session) {
                Some(summary) => {
                    ui.label(format!(
                        "Scene: {}  Tick: {}",
                        summary.scene, summary.tick
                    ));
                    ui.label(format!(
                        "Camera: ({:.2}, {:.2}, {:.2})",
                        summary.position.x, summary.position.y, summary.position.z
                    ));
                    ui.label(format!(
                        "Yaw: {:.3}  Pitch: {:.3}",
                        summary.yaw, summary.pitch
                    ));
                    if let Some(target) = summary.manipulation {
                        ui.label(format!(
                            "Object: x={:.3} y={:.3}",
                            target.angle_x, target.angle_y
                        ));
                    }
                    ui.label(format!(
                        "Vertices: {}  Resources: {}",
                        summary.vertex_count, summary.live_resources
                    ));
                }
                None => {
                    ui.label("No scene");
                }
            }
            ui.separator();
            for object in SessionInspector::inspect_objects(session) {
                ui.label(object.to_string());
            }
            ui.separator();
            ui.small("1-4: Scene | F1: Inspector | WASD/Space/Shift: Move | Drag: Rotate");
        });
}

impl ApplicationHandler for DesktopApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        let gpu = Gpu::new(event_loop, &self.egui_ctx);
        self.session
            .set_viewport(gpu.config.width as f32, gpu.config.height as f32);
        self.cursor = Viewport::new(gpu.config.width as f32, gpu.config.height as f32).center();
        self.gpu = Some(gpu);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.show_inspector {
            if let Some(gpu) = &mut self.gpu {
                let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
                if response.consumed {
                    return;
                }
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                if let Err(e) = self.session.shutdown() {
                    tracing::warn!("shutdown: {e}");
                }
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(new_size);
                    self.session
                        .set_viewport(gpu.config.width as f32, gpu.config.height as f32);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                self.handle_key(&event.logical_key, event.state == ElementState::Pressed);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Vec2::new(position.x as f32, position.y as f32);
                self.feed(InputEvent::PointerMove {
                    x: self.cursor.x,
                    y: self.cursor.y,
                });
            }
            WindowEvent::CursorLeft { .. } => self.feed(InputEvent::PointerLeave),
            WindowEvent::Focused(false) => self.feed(InputEvent::FocusLost),
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state,
                ..
            } => {
                let event = match state {
                    ElementState::Pressed => InputEvent::PointerDown {
                        x: self.cursor.x,
                        y: self.cursor.y,
                    },
                    ElementState::Released => InputEvent::PointerUp,
                };
                self.feed(event);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.feed(InputEvent::Wheel {
                    delta_y: host::wheel_delta(delta),
                });
            }
            WindowEvent::Touch(touch) => {
                let position = Vec2::new(touch.location.x as f32, touch.location.y as f32);
                let event = self.touches.update(touch.id, touch.phase, position);
                self.feed(event);
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("fishbowl-desktop starting");

    let config = match &cli.config {
        Some(path) => ControllerConfig::load(path)?,
        None => ControllerConfig::default(),
    };
    let mut session = Session::new(config, Viewport::default());
    let frame = session.switch_scene(cli.scene)?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = DesktopApp::new(session, frame);
    event_loop.run_app(&mut app)?;

    Ok(())
}

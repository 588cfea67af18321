//! Desktop window backend and the winit glue that feeds pointer and key
//! input into an [`Engine`].

use super::{
    DrawList, DrawVertex, FrameInputs, FrameView, GpuBackend, RenderError, RenderResult,
    RenderSubmission,
};
use crate::camera::Viewport;
use crate::editor::{EventTarget, InputEvent, UiAction};
use crate::engine::{Engine, SketchConfig};
use glam::Vec2;
use pollster::block_on;
use std::sync::Arc;
use wgpu::util::DeviceExt;
use winit::{
    event::{ElementState, MouseButton, WindowEvent},
    event_loop::{EventLoop, EventLoopWindowTarget},
    keyboard::{Key, NamedKey},
    window::{Window, WindowId},
};

#[derive(Clone, Debug)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub resizable: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Theta Sketch".to_string(),
            width: 1280,
            height: 720,
            resizable: true,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct Uniforms {
    view_projection: [[f32; 4]; 4],
}

const VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<DrawVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &VERTEX_ATTRIBUTES,
    }
}

struct SketchPipelines {
    fill: wgpu::RenderPipeline,
    lines: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
}

struct WindowSurface {
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
}

pub struct WindowBackend {
    instance: wgpu::Instance,
    adapter: wgpu::Adapter,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    enable_vsync: bool,
    surface: Option<WindowSurface>,
    pipelines: Option<SketchPipelines>,
}

impl WindowBackend {
    pub fn initialize(enable_vsync: bool) -> RenderResult<Self> {
        block_on(Self::initialize_async(enable_vsync))
    }

    async fn initialize_async(enable_vsync: bool) -> RenderResult<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RenderError::Backend(
                "failed to find a compatible GPU adapter for window rendering",
            ))?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Sketch Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_defaults(),
                },
                None,
            )
            .await
            .map_err(|_| RenderError::Backend("failed to create wgpu device for window"))?;

        log::info!(
            "[render] window backend initialized (adapter: {:?})",
            adapter.get_info().name
        );

        Ok(Self {
            instance,
            adapter,
            device: Arc::new(device),
            queue: Arc::new(queue),
            enable_vsync,
            surface: None,
            pipelines: None,
        })
    }

    fn create_pipelines(&self, surface_format: wgpu::TextureFormat) -> SketchPipelines {
        let shader = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Sketch Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/sketch.wgsl").into()),
        });

        let uniform_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Sketch Uniform Buffer"),
            size: std::mem::size_of::<Uniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout =
            self.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("Sketch Bind Group Layout"),
                    entries: &[wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    }],
                });

        let uniform_bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Sketch Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let layout = self
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Sketch Pipeline Layout"),
                bind_group_layouts: &[&bind_group_layout],
                push_constant_ranges: &[],
            });

        let pipeline = |label: &'static str, topology: wgpu::PrimitiveTopology| {
            self.device
                .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                    label: Some(label),
                    layout: Some(&layout),
                    vertex: wgpu::VertexState {
                        module: &shader,
                        entry_point: "vs_main",
                        buffers: &[vertex_layout()],
                    },
                    fragment: Some(wgpu::FragmentState {
                        module: &shader,
                        entry_point: "fs_main",
                        targets: &[Some(wgpu::ColorTargetState {
                            format: surface_format,
                            blend: Some(wgpu::BlendState::REPLACE),
                            write_mask: wgpu::ColorWrites::ALL,
                        })],
                    }),
                    primitive: wgpu::PrimitiveState {
                        topology,
                        strip_index_format: None,
                        front_face: wgpu::FrontFace::Ccw,
                        // fills are double sided
                        cull_mode: None,
                        polygon_mode: wgpu::PolygonMode::Fill,
                        unclipped_depth: false,
                        conservative: false,
                    },
                    depth_stencil: None,
                    multisample: wgpu::MultisampleState::default(),
                    multiview: None,
                })
        };

        SketchPipelines {
            fill: pipeline("Sketch Fill Pipeline", wgpu::PrimitiveTopology::TriangleList),
            lines: pipeline("Sketch Line Pipeline", wgpu::PrimitiveTopology::LineList),
            uniform_buffer,
            uniform_bind_group,
        }
    }

    pub fn create_window_surface(&mut self, window: Arc<Window>) -> RenderResult<()> {
        let surface = self
            .instance
            .create_surface(Arc::clone(&window))
            .map_err(|_| RenderError::Backend("failed to create wgpu surface from window"))?;

        let capabilities = surface.get_capabilities(&self.adapter);
        // palette colours are authored in sRGB already
        let format = capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| capabilities.formats.first().copied())
            .ok_or(RenderError::Backend("surface reports no supported formats"))?;

        let size = window.inner_size();
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: if self.enable_vsync {
                wgpu::PresentMode::AutoVsync
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            alpha_mode: wgpu::CompositeAlphaMode::Opaque,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        surface.configure(&self.device, &surface_config);
        self.pipelines = Some(self.create_pipelines(format));
        self.surface = Some(WindowSurface {
            surface,
            surface_config,
        });

        log::info!(
            "[render] window surface configured ({}x{}, format: {:?})",
            size.width,
            size.height,
            format
        );

        Ok(())
    }

    fn vertex_buffer(&self, label: &'static str, vertices: &[DrawVertex]) -> Option<wgpu::Buffer> {
        if vertices.is_empty() {
            return None;
        }
        Some(
            self.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(label),
                    contents: bytemuck::cast_slice(vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                }),
        )
    }
}

impl GpuBackend for WindowBackend {
    fn label(&self) -> &'static str {
        "Window Backend (wgpu)"
    }

    fn render_frame(
        &mut self,
        inputs: &FrameInputs,
        view: &FrameView,
        draw_list: &DrawList,
    ) -> RenderResult<RenderSubmission> {
        let skipped = RenderSubmission {
            frame_index: inputs.frame_index,
            lines: 0,
            triangles: 0,
        };

        let (Some(surface), Some(pipelines)) = (self.surface.as_ref(), self.pipelines.as_ref())
        else {
            log::warn!("[render] window backend not yet attached to window, skipping frame");
            return Ok(skipped);
        };

        let frame = match surface.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                surface.surface.configure(&self.device, &surface.surface_config);
                log::debug!("[render] surface reconfigured, skipping frame {}", inputs.frame_index);
                return Ok(skipped);
            }
            Err(_) => return Err(RenderError::Backend("failed to acquire swapchain texture")),
        };

        let target = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let uniforms = Uniforms {
            view_projection: view.view_projection.to_cols_array_2d(),
        };
        self.queue
            .write_buffer(&pipelines.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));

        let triangles = self.vertex_buffer("Sketch Fill Vertices", &draw_list.triangles);
        let lines = self.vertex_buffer("Sketch Line Vertices", &draw_list.lines);
        let [r, g, b] = view.clear_color.to_unit();

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Sketch Frame Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Sketch Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_bind_group(0, &pipelines.uniform_bind_group, &[]);

            if let Some(buffer) = triangles.as_ref() {
                pass.set_pipeline(&pipelines.fill);
                pass.set_vertex_buffer(0, buffer.slice(..));
                pass.draw(0..draw_list.triangles.len() as u32, 0..1);
            }
            if let Some(buffer) = lines.as_ref() {
                pass.set_pipeline(&pipelines.lines);
                pass.set_vertex_buffer(0, buffer.slice(..));
                pass.draw(0..draw_list.lines.len() as u32, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();

        Ok(RenderSubmission {
            frame_index: inputs.frame_index,
            lines: draw_list.line_count(),
            triangles: draw_list.triangle_count(),
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if let Some(surf) = self.surface.as_mut() {
            surf.surface_config.width = width;
            surf.surface_config.height = height;
            surf.surface.configure(&self.device, &surf.surface_config);
            log::debug!("[render] window resized to {}x{}", width, height);
        }
    }
}

/// Editor action bound to a key, if any.
pub fn action_for_key(key: &Key) -> Option<UiAction> {
    match key {
        Key::Named(NamedKey::Enter) => Some(UiAction::CompletePolygon),
        Key::Named(NamedKey::Escape) => Some(UiAction::Reset),
        Key::Character(text) => match text.to_lowercase().as_str() {
            "c" => Some(UiAction::CompletePolygon),
            "d" => Some(UiAction::CopyPolygon),
            "r" => Some(UiAction::Reset),
            _ => None,
        },
        _ => None,
    }
}

/// Event loop wrapper for desktop window rendering
pub struct WindowEventLoop {
    event_loop: EventLoop<()>,
}

impl WindowEventLoop {
    pub fn new() -> RenderResult<Self> {
        let event_loop =
            EventLoop::new().map_err(|_| RenderError::Backend("failed to create event loop"))?;
        Ok(Self { event_loop })
    }

    pub fn run<F>(self, mut app_factory: F) -> RenderResult<()>
    where
        F: FnMut(&EventLoopWindowTarget<()>) -> RenderResult<Box<dyn WindowAppTrait>> + 'static,
    {
        use winit::event::{Event, StartCause};

        let mut app: Option<Box<dyn WindowAppTrait>> = None;

        self.event_loop
            .run(move |event, event_loop_target| match event {
                Event::NewEvents(StartCause::Init) => match app_factory(event_loop_target) {
                    Ok(new_app) => {
                        log::info!("[render] window application initialized");
                        app = Some(new_app);
                    }
                    Err(err) => {
                        log::error!("[render] failed to initialize window app: {err}");
                        event_loop_target.exit();
                    }
                },
                Event::WindowEvent { window_id, event } => {
                    if let Some(app) = app.as_mut() {
                        app.handle_window_event(event_loop_target, window_id, event);
                    }
                }
                Event::AboutToWait => {
                    if let Some(app) = app.as_mut() {
                        if let Err(err) = app.render_frame() {
                            log::error!("[render] frame error: {err}");
                            event_loop_target.exit();
                        }
                    }
                }
                _ => {}
            })
            .map_err(|_| RenderError::Backend("event loop terminated with error"))?;

        Ok(())
    }
}

pub trait WindowAppTrait {
    fn handle_window_event(
        &mut self,
        event_loop: &EventLoopWindowTarget<()>,
        window_id: WindowId,
        event: WindowEvent,
    );
    fn render_frame(&mut self) -> RenderResult<()>;
}

/// A sketch session drawn into a desktop window.
pub struct WindowApp {
    window: Arc<Window>,
    engine: Engine,
    cursor: Vec2,
    last_frame: std::time::Instant,
}

impl WindowApp {
    pub fn new(
        event_loop: &EventLoopWindowTarget<()>,
        window_config: WindowConfig,
        mut sketch: SketchConfig,
    ) -> RenderResult<Self> {
        use winit::dpi::LogicalSize;

        let window = winit::window::WindowBuilder::new()
            .with_title(window_config.title.clone())
            .with_inner_size(LogicalSize::new(window_config.width, window_config.height))
            .with_resizable(window_config.resizable)
            .build(event_loop)
            .map_err(|_| RenderError::Backend("failed to create window"))?;
        let window = Arc::new(window);

        let mut backend = WindowBackend::initialize(sketch.renderer.enable_vsync)?;
        backend.create_window_surface(Arc::clone(&window))?;

        let size = window.inner_size();
        sketch.viewport = Viewport::new(size.width, size.height);
        let engine = Engine::with_backend(sketch, Box::new(backend));

        Ok(Self {
            window,
            engine,
            cursor: Vec2::ZERO,
            last_frame: std::time::Instant::now(),
        })
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }
}

impl WindowAppTrait for WindowApp {
    fn handle_window_event(
        &mut self,
        event_loop: &EventLoopWindowTarget<()>,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("[render] window close requested");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                self.engine.resize(size.width, size.height);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Vec2::new(position.x as f32, position.y as f32);
                self.engine.push_event(InputEvent::PointerMove {
                    position: self.cursor,
                });
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                self.engine.push_event(InputEvent::Click {
                    position: self.cursor,
                    target: EventTarget::Canvas,
                });
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed || event.repeat {
                    return;
                }
                if let Some(action) = action_for_key(&event.logical_key) {
                    self.engine.push_event(InputEvent::Action(action));
                }
            }
            WindowEvent::RedrawRequested => {
                if let Err(err) = self.render_frame() {
                    log::error!("[render] redraw failed: {err}");
                }
            }
            _ => {}
        }
    }

    fn render_frame(&mut self) -> RenderResult<()> {
        let now = std::time::Instant::now();
        let delta_seconds = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        self.engine.tick(delta_seconds)?;
        self.window.request_redraw();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_map_to_editor_actions() {
        assert_eq!(
            action_for_key(&Key::Named(NamedKey::Enter)),
            Some(UiAction::CompletePolygon)
        );
        assert_eq!(action_for_key(&Key::Character("d".into())), Some(UiAction::CopyPolygon));
        assert_eq!(action_for_key(&Key::Character("R".into())), Some(UiAction::Reset));
        assert_eq!(action_for_key(&Key::Named(NamedKey::Escape)), Some(UiAction::Reset));
        assert_eq!(action_for_key(&Key::Character("x".into())), None);
    }
}

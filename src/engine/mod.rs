pub mod config;

pub use config::{ConfigError, SketchConfig};

use crate::camera::{Camera, CoordinateMapper, Viewport};
use crate::editor::{
    EditorResult, InputEvent, InteractionDispatcher, Notifier, Outcome, SceneState,
    SessionTelemetry, TelemetrySurface,
};
use crate::render::{
    BackendKind, FrameView, GpuBackend, NullGpuBackend, RenderResult, RenderSubmission, Renderer,
};
use crate::scene::grid::grid_objects;
use crate::scene::{Rgb, SceneGraph};
use std::collections::VecDeque;
use std::time::Instant;

const DEFAULT_MAX_FRAMES: u32 = 3;

/// Single-threaded sketch session: scene, camera, editor and renderer.
///
/// Input is queued with [`Engine::push_event`] and handled at the start of
/// the next [`Engine::tick`], one event at a time in arrival order. The
/// renderer only ever sees the scene between events.
pub struct Engine {
    scene: SceneGraph,
    camera: Camera,
    dispatcher: InteractionDispatcher,
    renderer: Renderer,
    pending: VecDeque<InputEvent>,
    telemetry: TelemetrySurface,
    clear_color: Rgb,
    target_frame_time: f32,
    max_frames: u32,
    frame: u64,
}

impl Engine {
    pub fn new(config: SketchConfig) -> Self {
        let backend = Self::create_backend(config.renderer.backend);
        Self::with_backend(config, backend)
    }

    pub fn with_backend(config: SketchConfig, backend: Box<dyn GpuBackend>) -> Self {
        let mut camera = config.camera;
        camera.set_aspect(config.viewport.aspect());

        let mapper = CoordinateMapper::new(config.plane, config.viewport);
        let dispatcher = InteractionDispatcher::new(config.editor(), mapper);
        let renderer = Renderer::new(config.renderer, backend);

        let mut scene = SceneGraph::new();
        if config.grid.enabled {
            for object in grid_objects(
                &config.grid,
                config.palette.grid_center,
                config.palette.grid_lines,
            ) {
                scene.add(object);
            }
        }

        log::info!(
            "[engine] sketch session ready ({}x{}, backend {}, vsync {})",
            config.viewport.width,
            config.viewport.height,
            renderer.backend_label(),
            renderer.config().enable_vsync
        );

        Self {
            scene,
            camera,
            dispatcher,
            renderer,
            pending: VecDeque::new(),
            telemetry: TelemetrySurface::default(),
            clear_color: config.palette.background,
            target_frame_time: 1.0 / 60.0,
            max_frames: DEFAULT_MAX_FRAMES,
            frame: 0,
        }
    }

    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.dispatcher = self.dispatcher.with_notifier(notifier);
        self
    }

    pub fn configure_max_frames(&mut self, frames: u32) {
        self.max_frames = frames.max(1);
    }

    pub fn push_event(&mut self, event: InputEvent) {
        self.pending.push_back(event);
    }

    pub fn pending_events(&self) -> usize {
        self.pending.len()
    }

    /// Handles every queued event in order. Each result is returned; failed
    /// events have already been reported through the notifier.
    pub fn process_pending_events(&mut self) -> Vec<EditorResult<Outcome>> {
        let mut results = Vec::with_capacity(self.pending.len());
        while let Some(event) = self.pending.pop_front() {
            let result = self.dispatcher.dispatch(&mut self.scene, &self.camera, &event);
            log::trace!("[engine] {event:?} -> {result:?}");
            results.push(result);
        }
        results
    }

    /// Handles one event immediately, bypassing the queue.
    pub fn dispatch(&mut self, event: InputEvent) -> EditorResult<Outcome> {
        self.dispatcher.dispatch(&mut self.scene, &self.camera, &event)
    }

    pub fn tick(&mut self, delta_seconds: f32) -> RenderResult<RenderSubmission> {
        self.process_pending_events();
        self.frame += 1;
        self.update_telemetry();

        let view = FrameView {
            view_projection: self.camera.view_projection(),
            clear_color: self.clear_color,
        };
        self.renderer.render(delta_seconds, &self.scene, &view)
    }

    pub fn run(&mut self) {
        let mut last_frame = Instant::now();
        for _ in 0..self.max_frames {
            let now = Instant::now();
            let raw_delta = now.duration_since(last_frame).as_secs_f32();
            let delta_seconds = if raw_delta == 0.0 {
                self.target_frame_time
            } else {
                raw_delta
            };
            last_frame = now;

            if let Err(err) = self.tick(delta_seconds) {
                log::error!("[engine] render error: {err}");
            }
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        let viewport = Viewport::new(width, height);
        self.dispatcher.set_viewport(viewport);
        if !viewport.is_degenerate() {
            self.camera.set_aspect(viewport.aspect());
        }
        self.renderer.resize(width, height);
        log::debug!("[engine] viewport resized to {width}x{height}");
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn state(&self) -> &SceneState {
        self.dispatcher.state()
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn viewport(&self) -> Viewport {
        self.dispatcher.mapper().viewport()
    }

    pub fn telemetry(&self) -> &TelemetrySurface {
        &self.telemetry
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    fn update_telemetry(&mut self) {
        let sample = SessionTelemetry::capture(self.frame, self.dispatcher.state(), &self.scene);
        if self.telemetry.record(sample) {
            if let Some(json) = self.telemetry.latest_json() {
                log::debug!("[telemetry] {json}");
            }
        }
    }

    fn create_backend(kind: BackendKind) -> Box<dyn GpuBackend> {
        match kind {
            BackendKind::Null => Box::new(NullGpuBackend),
            BackendKind::Wgpu => {
                // the wgpu backend needs a window surface; see render::window::WindowApp
                log::warn!(
                    "[engine] wgpu backend requested without a window; falling back to Null"
                );
                Box::new(NullGpuBackend)
            }
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(SketchConfig::default())
    }
}

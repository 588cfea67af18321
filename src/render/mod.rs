#[cfg(feature = "render-wgpu")]
pub mod window;

use crate::scene::{Renderable, Rgb, SceneGraph, SceneObject};
use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    Null,
    Wgpu,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    pub backend: BackendKind,
    pub enable_vsync: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Null,
            enable_vsync: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInputs {
    pub frame_index: u64,
    pub delta_seconds: f32,
    pub elapsed_seconds: f32,
}

/// Camera and clear state for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameView {
    pub view_projection: Mat4,
    pub clear_color: Rgb,
}

impl Default for FrameView {
    fn default() -> Self {
        Self {
            view_projection: Mat4::IDENTITY,
            clear_color: Rgb::WHITE,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "render-wgpu", derive(bytemuck::Pod, bytemuck::Zeroable))]
pub struct DrawVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl DrawVertex {
    fn new(position: Vec3, color: [f32; 3]) -> Self {
        Self {
            position: position.to_array(),
            color,
        }
    }
}

/// World-space geometry for one frame, flattened out of the scene.
///
/// `lines` holds vertex pairs, `triangles` vertex triples. Fills come first
/// in scene order; lines are drawn over them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawList {
    pub lines: Vec<DrawVertex>,
    pub triangles: Vec<DrawVertex>,
}

impl DrawList {
    pub fn from_scene(scene: &SceneGraph) -> Self {
        let mut list = DrawList::default();
        for (_, object) in scene.iter().filter(|(_, object)| object.visible) {
            list.push_object(object);
        }
        list
    }

    pub fn line_count(&self) -> usize {
        self.lines.len() / 2
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.triangles.is_empty()
    }

    fn push_object(&mut self, object: &SceneObject) {
        let color = object.material.color.to_unit();
        let offset = object.position;
        let mut line = |a: Vec3, b: Vec3| {
            self.lines.push(DrawVertex::new(a + offset, color));
            self.lines.push(DrawVertex::new(b + offset, color));
        };

        match &object.renderable {
            Renderable::LineStrip(points) => {
                for pair in points.windows(2) {
                    line(pair[0], pair[1]);
                }
            }
            Renderable::LineLoop(points) => {
                for pair in points.windows(2) {
                    line(pair[0], pair[1]);
                }
                if let (Some(&first), Some(&last)) = (points.first(), points.last()) {
                    if points.len() > 2 && first != last {
                        line(last, first);
                    }
                }
            }
            Renderable::LineList(segments) => {
                for [a, b] in segments {
                    line(*a, *b);
                }
            }
            Renderable::Mesh { vertices, indices } => {
                for triangle in indices.chunks_exact(3) {
                    let corners: Option<Vec<Vec3>> = triangle
                        .iter()
                        .map(|&i| vertices.get(i as usize).copied())
                        .collect();
                    match corners {
                        Some(corners) => self.triangles.extend(
                            corners
                                .into_iter()
                                .map(|p| DrawVertex::new(p + offset, color)),
                        ),
                        None => log::warn!(
                            "[render] skipping triangle {triangle:?} with out-of-range index"
                        ),
                    }
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderSubmission {
    pub frame_index: u64,
    pub lines: usize,
    pub triangles: usize,
}

#[derive(Debug)]
pub enum RenderError {
    FrameOutOfOrder { expected: u64, got: u64 },
    Backend(&'static str),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::FrameOutOfOrder { expected, got } => write!(
                f,
                "renderer expected frame {expected} but backend produced {got}"
            ),
            RenderError::Backend(reason) => write!(f, "gpu backend failure: {reason}"),
        }
    }
}

impl std::error::Error for RenderError {}

pub type RenderResult<T> = Result<T, RenderError>;

pub trait GpuBackend: Send {
    fn label(&self) -> &'static str;
    fn render_frame(
        &mut self,
        inputs: &FrameInputs,
        view: &FrameView,
        draw_list: &DrawList,
    ) -> RenderResult<RenderSubmission>;

    fn resize(&mut self, _width: u32, _height: u32) {}
}

pub struct Renderer {
    config: RendererConfig,
    backend: Box<dyn GpuBackend>,
    frame_index: u64,
    elapsed_seconds: f32,
}

impl Renderer {
    pub fn new(config: RendererConfig, backend: Box<dyn GpuBackend>) -> Self {
        Self {
            config,
            backend,
            frame_index: 0,
            elapsed_seconds: 0.0,
        }
    }

    /// Draws the scene as it stands. The scene is only read.
    pub fn render(
        &mut self,
        delta_seconds: f32,
        scene: &SceneGraph,
        view: &FrameView,
    ) -> RenderResult<RenderSubmission> {
        let next_index = self.frame_index + 1;
        let elapsed = self.elapsed_seconds + delta_seconds;
        let inputs = FrameInputs {
            frame_index: next_index,
            delta_seconds,
            elapsed_seconds: elapsed,
        };

        let draw_list = DrawList::from_scene(scene);
        let submission = self.backend.render_frame(&inputs, view, &draw_list)?;
        if submission.frame_index != next_index {
            return Err(RenderError::FrameOutOfOrder {
                expected: next_index,
                got: submission.frame_index,
            });
        }

        self.frame_index = next_index;
        self.elapsed_seconds = elapsed;
        Ok(submission)
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.backend.resize(width, height);
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn backend_label(&self) -> &'static str {
        self.backend.label()
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }
}

#[derive(Default)]
pub struct NullGpuBackend;

impl GpuBackend for NullGpuBackend {
    fn label(&self) -> &'static str {
        "Null GPU Backend"
    }

    fn render_frame(
        &mut self,
        inputs: &FrameInputs,
        _view: &FrameView,
        draw_list: &DrawList,
    ) -> RenderResult<RenderSubmission> {
        log::trace!(
            "[render] frame {} (Δ {:.3} s) - {} lines, {} triangles",
            inputs.frame_index,
            inputs.delta_seconds,
            draw_list.line_count(),
            draw_list.triangle_count()
        );

        Ok(RenderSubmission {
            frame_index: inputs.frame_index,
            lines: draw_list.line_count(),
            triangles: draw_list.triangle_count(),
        })
    }
}

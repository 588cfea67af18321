//! Camera model and screen-to-world mapping.
//!
//! Pointer positions arrive in window pixels (origin top-left, y down).
//! They are normalised to device coordinates in `[-1, 1]` with y pointing
//! up, turned into a world-space ray by the camera and intersected with the
//! fixed drawing plane.

use glam::{Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Denominator threshold below which a ray is treated as parallel to the plane.
const PARALLEL_EPSILON: f32 = 1.0e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280, 720)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Infinite plane holding every point `p` with `normal · p + constant == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrawingPlane {
    pub normal: Vec3,
    pub constant: f32,
}

impl DrawingPlane {
    /// Scales `normal` to unit length and `constant` by the same factor, so
    /// the described plane is unchanged.
    pub fn new(normal: Vec3, constant: f32) -> Self {
        let length = normal.length();
        if length <= f32::EPSILON || !length.is_finite() {
            return Self {
                normal: Vec3::ZERO,
                constant,
            };
        }
        Self {
            normal: normal / length,
            constant: constant / length,
        }
    }

    /// Point of the plane closest to the origin.
    pub fn anchor(&self) -> Vec3 {
        -self.constant * self.normal
    }

    pub fn distance_to(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.constant
    }

    /// Intersection of the ray's supporting line with the plane.
    ///
    /// Returns `None` only when the ray runs parallel to the plane; hits
    /// behind the ray origin are still reported.
    pub fn intersect(&self, ray: &Ray) -> Option<Vec3> {
        let denominator = self.normal.dot(ray.direction);
        if denominator.abs() < PARALLEL_EPSILON {
            return None;
        }
        let t = -self.distance_to(ray.origin) / denominator;
        Some(ray.at(t))
    }
}

impl Default for DrawingPlane {
    fn default() -> Self {
        Self::new(Vec3::Z, 0.0)
    }
}

/// The renderer-side camera abstraction the mapper depends on.
pub trait RayCaster {
    /// World-space ray through a point in normalised device coordinates.
    fn ray_through(&self, ndc: Vec2) -> Ray;

    /// Projects a world point to normalised device coordinates (x, y, depth).
    /// `None` when the point cannot be projected (behind a perspective eye).
    fn project_to_ndc(&self, world: Vec3) -> Option<Vec3>;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Projection {
    /// Vertical half-extent in world units; the horizontal extent follows the aspect ratio.
    Orthographic { half_height: f32 },
    Perspective { fov_y_degrees: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Camera {
    pub projection: Projection,
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub near: f32,
    pub far: f32,
    pub aspect: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::top_down(100.0, 1.0)
    }
}

impl Camera {
    /// Orthographic camera on +Z looking at the origin.
    pub fn top_down(half_height: f32, aspect: f32) -> Self {
        Self {
            projection: Projection::Orthographic { half_height },
            eye: Vec3::new(0.0, 0.0, 100.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            near: 1.0,
            far: 1000.0,
            aspect,
        }
    }

    pub fn perspective(fov_y_degrees: f32, eye: Vec3, target: Vec3, aspect: f32) -> Self {
        Self {
            projection: Projection::Perspective { fov_y_degrees },
            eye,
            target,
            up: Vec3::Y,
            near: 0.1,
            far: 1000.0,
            aspect,
        }
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        match self.projection {
            Projection::Orthographic { half_height } => {
                let half_width = half_height * self.aspect;
                Mat4::orthographic_rh(
                    -half_width,
                    half_width,
                    -half_height,
                    half_height,
                    self.near,
                    self.far,
                )
            }
            Projection::Perspective { fov_y_degrees } => Mat4::perspective_rh(
                fov_y_degrees.to_radians(),
                self.aspect,
                self.near,
                self.far,
            ),
        }
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view()
    }
}

impl RayCaster for Camera {
    fn ray_through(&self, ndc: Vec2) -> Ray {
        let inverse = self.view_projection().inverse();
        let near = inverse.project_point3(ndc.extend(0.0));
        let far = inverse.project_point3(ndc.extend(1.0));
        Ray {
            origin: near,
            direction: (far - near).normalize_or_zero(),
        }
    }

    fn project_to_ndc(&self, world: Vec3) -> Option<Vec3> {
        let clip = self.view_projection() * world.extend(1.0);
        if clip.w <= f32::EPSILON {
            return None;
        }
        Some(clip.truncate() / clip.w)
    }
}

/// Pixel position to normalised device coordinates (y flipped).
pub fn screen_to_ndc(screen: Vec2, viewport: Viewport) -> Option<Vec2> {
    if viewport.is_degenerate() {
        return None;
    }
    Some(Vec2::new(
        (screen.x / viewport.width as f32) * 2.0 - 1.0,
        -(screen.y / viewport.height as f32) * 2.0 + 1.0,
    ))
}

pub fn ndc_to_screen(ndc: Vec2, viewport: Viewport) -> Vec2 {
    Vec2::new(
        (ndc.x + 1.0) * 0.5 * viewport.width as f32,
        (1.0 - ndc.y) * 0.5 * viewport.height as f32,
    )
}

pub fn resolve_world_point(
    screen: Vec2,
    viewport: Viewport,
    camera: &dyn RayCaster,
    plane: &DrawingPlane,
) -> Option<Vec3> {
    let ndc = screen_to_ndc(screen, viewport)?;
    plane.intersect(&camera.ray_through(ndc))
}

pub fn world_to_screen(world: Vec3, viewport: Viewport, camera: &dyn RayCaster) -> Option<Vec2> {
    let ndc = camera.project_to_ndc(world)?;
    Some(ndc_to_screen(ndc.truncate(), viewport))
}

/// Binds the drawing plane to the current viewport size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    plane: DrawingPlane,
    viewport: Viewport,
}

impl CoordinateMapper {
    pub fn new(plane: DrawingPlane, viewport: Viewport) -> Self {
        Self { plane, viewport }
    }

    pub fn plane(&self) -> &DrawingPlane {
        &self.plane
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn resolve(&self, screen: Vec2, camera: &dyn RayCaster) -> Option<Vec3> {
        resolve_world_point(screen, self.viewport, camera, &self.plane)
    }

    pub fn to_screen(&self, world: Vec3, camera: &dyn RayCaster) -> Option<Vec2> {
        world_to_screen(world, self.viewport, camera)
    }
}

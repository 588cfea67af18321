use super::{Material, ObjectRole, Renderable, Rgb, SceneObject};
use glam::Vec3;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub enabled: bool,
    /// Edge length of the square grid in world units.
    pub size: f32,
    pub divisions: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            size: 200.0,
            divisions: 20,
        }
    }
}

/// Builds the reference grid on the XY plane, centred on the origin.
///
/// Returns two objects: the centre lines in `center` and the remaining
/// lines in `lines`. A grid with zero divisions yields only the centre lines.
pub fn grid_objects(config: &GridConfig, center: Rgb, lines: Rgb) -> Vec<SceneObject> {
    let half = config.size * 0.5;
    let mut axes = Vec::with_capacity(2);
    let mut rest = Vec::new();

    axes.push([Vec3::new(-half, 0.0, 0.0), Vec3::new(half, 0.0, 0.0)]);
    axes.push([Vec3::new(0.0, -half, 0.0), Vec3::new(0.0, half, 0.0)]);

    if config.divisions > 0 {
        let step = config.size / config.divisions as f32;
        for i in 0..=config.divisions {
            let offset = -half + step * i as f32;
            if i * 2 == config.divisions {
                continue;
            }
            rest.push([Vec3::new(-half, offset, 0.0), Vec3::new(half, offset, 0.0)]);
            rest.push([Vec3::new(offset, -half, 0.0), Vec3::new(offset, half, 0.0)]);
        }
    }

    let mut objects = vec![SceneObject::new(
        ObjectRole::Grid,
        Renderable::LineList(axes),
        Material::line(center),
    )];
    if !rest.is_empty() {
        objects.push(SceneObject::new(
            ObjectRole::Grid,
            Renderable::LineList(rest),
            Material::line(lines),
        ));
    }
    objects
}

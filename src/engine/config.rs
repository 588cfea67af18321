use crate::camera::{Camera, DrawingPlane, Viewport};
use crate::editor::{EditorConfig, FinalizePolicy, Palette, ResetScope};
use crate::render::RendererConfig;
use crate::scene::grid::GridConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Everything needed to start a sketch session. Missing fields take their
/// defaults, so `{}` is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SketchConfig {
    pub viewport: Viewport,
    pub camera: Camera,
    pub plane: DrawingPlane,
    pub palette: Palette,
    pub grid: GridConfig,
    pub finalize_policy: FinalizePolicy,
    pub reset_scope: ResetScope,
    pub renderer: RendererConfig,
}

impl Default for SketchConfig {
    fn default() -> Self {
        let viewport = Viewport::default();
        Self {
            viewport,
            camera: Camera::top_down(100.0, viewport.aspect()),
            plane: DrawingPlane::default(),
            palette: Palette::default(),
            grid: GridConfig::default(),
            finalize_policy: FinalizePolicy::default(),
            reset_scope: ResetScope::default(),
            renderer: RendererConfig::default(),
        }
    }
}

impl SketchConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let mut config: SketchConfig = serde_json::from_str(json)?;
        config.plane = DrawingPlane::new(config.plane.normal, config.plane.constant);
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        log::info!("[config] loaded {}", path.display());
        Ok(config)
    }

    pub fn editor(&self) -> EditorConfig {
        EditorConfig {
            palette: self.palette,
            finalize_policy: self.finalize_policy,
            reset_scope: self.reset_scope,
        }
    }
}

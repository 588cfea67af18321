pub mod commands;
pub mod dispatcher;
pub mod error;
pub mod notify;
pub mod path;
pub mod placement;
pub mod polygon;
pub mod state;
pub mod telemetry;
pub mod triangulate;

pub use commands::UiAction;
pub use dispatcher::{EventTarget, InputEvent, InteractionDispatcher, Outcome};
pub use error::{EditorError, EditorResult};
pub use notify::{LogNotifier, Notifier, RecordingNotifier};
pub use path::VertexPath;
pub use placement::CloneCycle;
pub use polygon::{MIN_POLYGON_VERTICES, Polygon};
pub use state::SceneState;
pub use telemetry::{SessionTelemetry, TelemetrySurface};

use crate::scene::Rgb;
use serde::{Deserialize, Serialize};

/// Colours used for everything the editor and scene draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub segment: Rgb,
    pub outline: Rgb,
    pub fill: Rgb,
    pub background: Rgb,
    pub grid_center: Rgb,
    pub grid_lines: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            segment: Rgb(0x00ff00),
            outline: Rgb::BLACK,
            fill: Rgb(0xffa500),
            background: Rgb::WHITE,
            grid_center: Rgb::BLACK,
            grid_lines: Rgb(0x999999),
        }
    }
}

/// What completing a polygon does when the session already holds one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalizePolicy {
    /// Fail with [`EditorError::PolygonAlreadyExists`] and keep the path.
    #[default]
    Reject,
    /// Remove the old outline and fill, then build the new polygon.
    Replace,
}

/// How much a reset removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetScope {
    /// Path, preview segments and polygon. Clones stay.
    #[default]
    AuthoredOnly,
    /// Also placed clones and any clone still following the cursor.
    Everything,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub palette: Palette,
    pub finalize_policy: FinalizePolicy,
    pub reset_scope: ResetScope,
}

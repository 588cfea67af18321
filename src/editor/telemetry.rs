use super::state::SceneState;
use crate::scene::SceneGraph;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTelemetry {
    pub frame: u64,
    pub vertex_count: usize,
    pub preview_segments: usize,
    pub has_polygon: bool,
    pub following: bool,
    pub placed_clones: usize,
    pub scene_objects: usize,
}

impl SessionTelemetry {
    pub fn capture(frame: u64, state: &SceneState, scene: &SceneGraph) -> Self {
        Self {
            frame,
            vertex_count: state.path().len(),
            preview_segments: state.preview_segment_count(),
            has_polygon: state.polygon().is_some(),
            following: state.cycle().is_following(),
            placed_clones: state.placed_clones().len(),
            scene_objects: scene.len(),
        }
    }

    fn same_session_state(&self, other: &SessionTelemetry) -> bool {
        let unframed = |sample: &SessionTelemetry| SessionTelemetry {
            frame: 0,
            ..sample.clone()
        };
        unframed(self) == unframed(other)
    }
}

/// Latest telemetry sample, with change detection ignoring the frame number.
#[derive(Debug, Default)]
pub struct TelemetrySurface {
    latest: Option<SessionTelemetry>,
    samples: u64,
}

impl TelemetrySurface {
    /// Stores `telemetry`; returns `true` when the session state differs from
    /// the previous sample.
    pub fn record(&mut self, telemetry: SessionTelemetry) -> bool {
        let changed = self
            .latest
            .as_ref()
            .map_or(true, |last| !last.same_session_state(&telemetry));
        self.samples = self.samples.saturating_add(1);
        self.latest = Some(telemetry);
        changed
    }

    pub fn latest(&self) -> Option<&SessionTelemetry> {
        self.latest.as_ref()
    }

    pub fn samples(&self) -> u64 {
        self.samples
    }

    pub fn latest_json(&self) -> Option<String> {
        let latest = self.latest.as_ref()?;
        match serde_json::to_string(latest) {
            Ok(json) => Some(json),
            Err(err) => {
                log::error!("[telemetry] failed to serialize frame {}: {err}", latest.frame);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(frame: u64, vertex_count: usize) -> SessionTelemetry {
        SessionTelemetry {
            frame,
            vertex_count,
            preview_segments: vertex_count.saturating_sub(1),
            has_polygon: false,
            following: false,
            placed_clones: 0,
            scene_objects: 2,
        }
    }

    #[test]
    fn first_sample_counts_as_change() {
        let mut surface = TelemetrySurface::default();
        assert!(surface.record(sample(1, 0)));
        assert_eq!(surface.samples(), 1);
    }

    #[test]
    fn frame_advance_alone_is_not_a_change() {
        let mut surface = TelemetrySurface::default();
        surface.record(sample(1, 2));
        assert!(!surface.record(sample(2, 2)));
        assert!(surface.record(sample(3, 3)));
        assert_eq!(surface.latest().map(|t| t.frame), Some(3));
    }

    #[test]
    fn latest_json_round_trips() {
        let mut surface = TelemetrySurface::default();
        surface.record(sample(7, 4));

        let json = surface.latest_json().expect("sample recorded");
        let decoded: SessionTelemetry = serde_json::from_str(&json).expect("decode telemetry");
        assert_eq!(decoded, sample(7, 4));
    }
}

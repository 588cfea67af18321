use super::ResetScope;
use super::path::VertexPath;
use super::placement::CloneCycle;
use super::polygon::Polygon;
use crate::scene::{ObjectId, SceneGraph};

/// Everything the authoring session owns inside the scene.
///
/// `placed_clones` is only emptied by a [`ResetScope::Everything`] reset.
/// Under the default [`ResetScope::AuthoredOnly`] every clone placed during
/// the session stays listed, across any number of resets.
#[derive(Debug, Default, Clone)]
pub struct SceneState {
    pub(crate) path: VertexPath,
    pub(crate) polygon: Option<Polygon>,
    pub(crate) cycle: CloneCycle,
    pub(crate) placed_clones: Vec<ObjectId>,
}

impl SceneState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(&self) -> &VertexPath {
        &self.path
    }

    pub fn polygon(&self) -> Option<&Polygon> {
        self.polygon.as_ref()
    }

    pub fn cycle(&self) -> CloneCycle {
        self.cycle
    }

    pub fn placed_clones(&self) -> &[ObjectId] {
        &self.placed_clones
    }

    pub fn preview_segment_count(&self) -> usize {
        self.path.segments().len()
    }

    /// Removes the preview segments and polygon facets and empties the path.
    ///
    /// With [`ResetScope::Everything`] placed clones and an in-flight clone go
    /// too. Calling it on an empty state changes nothing.
    pub fn reset(&mut self, scene: &mut SceneGraph, scope: ResetScope) {
        let segments = self.path.segments().len();
        self.path.clear(scene);
        if let Some(polygon) = self.polygon.take() {
            polygon.remove_from(scene);
        }

        if scope == ResetScope::Everything {
            self.cycle.abandon(scene);
            for clone in self.placed_clones.drain(..) {
                if let Err(err) = scene.remove(clone) {
                    log::debug!("[editor] placed clone already gone: {err}");
                }
            }
        }

        log::info!("[editor] scene reset ({segments} preview segments removed, scope {scope:?})");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::DrawingPlane;
    use crate::editor::polygon::finalize;
    use crate::editor::{FinalizePolicy, Palette};
    use crate::scene::{Material, ObjectRole};
    use glam::Vec3;

    fn authored(scene: &mut SceneGraph) -> SceneState {
        let mut state = SceneState::new();
        let material = Material::line(Palette::default().segment);
        for (x, y) in [(0.0, 0.0), (5.0, 0.0), (5.0, 5.0)] {
            state.path.add_vertex(scene, Vec3::new(x, y, 0.0), material);
        }
        finalize(
            &mut state.path,
            &mut state.polygon,
            scene,
            &DrawingPlane::default(),
            &Palette::default(),
            FinalizePolicy::Reject,
        )
        .expect("closes");
        state.path.add_vertex(scene, Vec3::new(9.0, 9.0, 0.0), material);
        state
    }

    #[test]
    fn reset_clears_authored_geometry() {
        let mut scene = SceneGraph::new();
        let mut state = authored(&mut scene);

        state.reset(&mut scene, ResetScope::AuthoredOnly);

        assert!(state.path().is_empty());
        assert_eq!(state.preview_segment_count(), 0);
        assert!(state.polygon().is_none());
        assert!(scene.is_empty());
    }

    #[test]
    fn reset_twice_matches_reset_once() {
        let mut scene = SceneGraph::new();
        let mut state = authored(&mut scene);

        state.reset(&mut scene, ResetScope::AuthoredOnly);
        let objects_after_one = scene.len();
        state.reset(&mut scene, ResetScope::AuthoredOnly);

        assert_eq!(scene.len(), objects_after_one);
        assert!(state.path().is_empty());
        assert!(state.polygon().is_none());
    }

    #[test]
    fn placed_clones_survive_authored_reset() {
        let mut scene = SceneGraph::new();
        let mut state = authored(&mut scene);
        state.cycle.begin(state.polygon.as_ref(), &mut scene).unwrap();
        let clone = state.cycle.place().unwrap();
        state.placed_clones.push(clone);

        state.reset(&mut scene, ResetScope::AuthoredOnly);

        assert!(scene.contains(clone));
        assert_eq!(scene.count_role(ObjectRole::Clone), 1);
        assert_eq!(state.placed_clones(), &[clone]);
    }

    #[test]
    fn placed_clones_accumulate_across_authored_resets() {
        let mut scene = SceneGraph::new();
        let mut placed = Vec::new();
        let mut state = SceneState::new();
        for _ in 0..3 {
            let mut round = authored(&mut scene);
            round.placed_clones = std::mem::take(&mut state.placed_clones);
            state = round;
            state.cycle.begin(state.polygon.as_ref(), &mut scene).unwrap();
            let clone = state.cycle.place().unwrap();
            state.placed_clones.push(clone);
            placed.push(clone);

            state.reset(&mut scene, ResetScope::AuthoredOnly);
        }

        assert_eq!(state.placed_clones(), placed.as_slice());
        assert_eq!(scene.count_role(ObjectRole::Clone), 3);

        state.reset(&mut scene, ResetScope::Everything);
        assert!(state.placed_clones().is_empty());
        assert!(scene.is_empty());
    }

    #[test]
    fn full_reset_removes_clones_and_ends_cycle() {
        let mut scene = SceneGraph::new();
        let mut state = authored(&mut scene);
        state.cycle.begin(state.polygon.as_ref(), &mut scene).unwrap();
        let placed = state.cycle.place().unwrap();
        state.placed_clones.push(placed);
        let following = state.cycle.begin(state.polygon.as_ref(), &mut scene).unwrap();

        state.reset(&mut scene, ResetScope::Everything);

        assert!(scene.is_empty());
        assert!(!scene.contains(following));
        assert!(!state.cycle().is_following());
        assert!(state.placed_clones().is_empty());
    }
}

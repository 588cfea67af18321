use super::error::{EditorError, EditorResult};
use super::polygon::Polygon;
use crate::camera::DrawingPlane;
use crate::scene::{ObjectId, ObjectRole, SceneGraph};
use glam::Vec3;

/// Copy-and-place interaction.
///
/// `Idle -> Following -> Idle`. While following, pointer moves snap the
/// clone to the cursor; the next canvas click ends the cycle. The pointer
/// routing for moves and placement clicks exists exactly while the cycle is
/// in `Following`, so there is nothing to attach or detach by hand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CloneCycle {
    #[default]
    Idle,
    Following {
        clone: ObjectId,
    },
}

impl CloneCycle {
    pub fn is_following(&self) -> bool {
        matches!(self, CloneCycle::Following { .. })
    }

    pub fn active_clone(&self) -> Option<ObjectId> {
        match self {
            CloneCycle::Following { clone } => Some(*clone),
            CloneCycle::Idle => None,
        }
    }

    /// Duplicates the polygon's fill (not its outline) and starts following.
    pub fn begin(
        &mut self,
        polygon: Option<&Polygon>,
        scene: &mut SceneGraph,
    ) -> EditorResult<ObjectId> {
        if self.is_following() {
            return Err(EditorError::CycleAlreadyActive);
        }
        let polygon = polygon.ok_or(EditorError::NoPolygonToCopy)?;

        let clone = scene.duplicate(polygon.fill_id())?;
        if let Some(object) = scene.get_mut(clone) {
            object.role = ObjectRole::Clone;
        }
        *self = CloneCycle::Following { clone };
        log::info!("[editor] copy started, clone {clone:?} following cursor");
        Ok(clone)
    }

    /// Snaps the clone to `point` on `plane` and returns the offset it now
    /// carries. Fill vertices already lie on the plane, so the offset is taken
    /// from the plane's anchor rather than the world origin. Ignored while
    /// idle.
    pub fn on_move(
        &mut self,
        scene: &mut SceneGraph,
        point: Vec3,
        plane: &DrawingPlane,
    ) -> EditorResult<Option<Vec3>> {
        let CloneCycle::Following { clone } = *self else {
            return Ok(None);
        };
        let offset = point - plane.anchor();
        if let Err(err) = scene.set_position(clone, offset) {
            // clone removed behind our back; stop tracking it
            *self = CloneCycle::Idle;
            return Err(err.into());
        }
        Ok(Some(offset))
    }

    /// Ends the cycle, leaving the clone where the last move put it.
    pub fn place(&mut self) -> Option<ObjectId> {
        let placed = self.active_clone();
        *self = CloneCycle::Idle;
        if let Some(clone) = placed {
            log::info!("[editor] clone {clone:?} placed");
        }
        placed
    }

    /// Ends the cycle and removes the in-flight clone from the scene.
    pub(crate) fn abandon(&mut self, scene: &mut SceneGraph) {
        if let Some(clone) = self.place() {
            if let Err(err) = scene.remove(clone) {
                log::debug!("[editor] in-flight clone already gone: {err}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::path::VertexPath;
    use crate::editor::polygon::finalize;
    use crate::editor::{FinalizePolicy, Palette};
    use crate::scene::{Material, Renderable};

    fn triangle(scene: &mut SceneGraph) -> Polygon {
        triangle_on(scene, &DrawingPlane::default())
    }

    fn triangle_on(scene: &mut SceneGraph, plane: &DrawingPlane) -> Polygon {
        let mut path = VertexPath::new();
        let material = Material::line(Palette::default().segment);
        let z = plane.anchor().z;
        for (x, y) in [(0.0, 0.0), (50.0, 0.0), (50.0, 50.0)] {
            path.add_vertex(scene, Vec3::new(x, y, z), material);
        }
        let mut current = None;
        finalize(
            &mut path,
            &mut current,
            scene,
            plane,
            &Palette::default(),
            FinalizePolicy::Reject,
        )
        .cloned()
        .expect("triangle closes")
    }

    #[test]
    fn begin_without_polygon_creates_nothing() {
        let mut scene = SceneGraph::new();
        let mut cycle = CloneCycle::default();

        assert_eq!(cycle.begin(None, &mut scene), Err(EditorError::NoPolygonToCopy));
        assert!(scene.is_empty());
        assert!(!cycle.is_following());
    }

    #[test]
    fn begin_duplicates_fill_only() {
        let mut scene = SceneGraph::new();
        let polygon = triangle(&mut scene);
        let before = scene.len();
        let mut cycle = CloneCycle::default();

        let clone = cycle.begin(Some(&polygon), &mut scene).expect("polygon exists");

        assert_eq!(scene.len(), before + 1);
        let source = scene.get(polygon.fill_id()).unwrap();
        let copy = scene.get(clone).unwrap();
        assert_eq!(copy.role, ObjectRole::Clone);
        assert_eq!(copy.renderable, source.renderable);
        assert_eq!(copy.material, source.material);
        assert_eq!(copy.position, source.position);
    }

    #[test]
    fn second_begin_is_rejected() {
        let mut scene = SceneGraph::new();
        let polygon = triangle(&mut scene);
        let mut cycle = CloneCycle::default();
        cycle.begin(Some(&polygon), &mut scene).unwrap();
        let before = scene.len();

        assert_eq!(
            cycle.begin(Some(&polygon), &mut scene),
            Err(EditorError::CycleAlreadyActive)
        );
        assert_eq!(scene.len(), before);
    }

    #[test]
    fn moves_snap_until_placed() {
        let mut scene = SceneGraph::new();
        let polygon = triangle(&mut scene);
        let mut cycle = CloneCycle::default();
        let clone = cycle.begin(Some(&polygon), &mut scene).unwrap();

        let plane = DrawingPlane::default();
        cycle.on_move(&mut scene, Vec3::new(3.0, 4.0, 0.0), &plane).unwrap();
        cycle.on_move(&mut scene, Vec3::new(10.0, 10.0, 0.0), &plane).unwrap();
        assert_eq!(cycle.place(), Some(clone));

        let idle = cycle.on_move(&mut scene, Vec3::new(99.0, 99.0, 0.0), &plane);
        assert_eq!(idle, Ok(None));
        assert_eq!(scene.get(clone).unwrap().position, Vec3::new(10.0, 10.0, 0.0));
        assert!(!cycle.is_following());
    }

    #[test]
    fn clone_stays_on_raised_plane() {
        let plane = DrawingPlane::new(Vec3::Z, -10.0);
        let mut scene = SceneGraph::new();
        let polygon = triangle_on(&mut scene, &plane);
        let mut cycle = CloneCycle::default();
        let clone = cycle.begin(Some(&polygon), &mut scene).unwrap();

        let offset = cycle
            .on_move(&mut scene, Vec3::new(10.0, 10.0, 10.0), &plane)
            .unwrap();

        assert_eq!(offset, Some(Vec3::new(10.0, 10.0, 0.0)));
        let object = scene.get(clone).unwrap();
        assert_eq!(object.position, Vec3::new(10.0, 10.0, 0.0));
        match &object.renderable {
            Renderable::Mesh { vertices, .. } => {
                for vertex in vertices {
                    let moved = *vertex + object.position;
                    assert!(plane.distance_to(moved).abs() < 1.0e-4, "{moved:?} off plane");
                }
            }
            other => panic!("clone should be a mesh, got {other:?}"),
        }
    }

    #[test]
    fn place_while_idle_is_a_no_op() {
        let mut cycle = CloneCycle::default();
        assert_eq!(cycle.place(), None);
    }
}

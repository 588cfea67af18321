use super::error::{EditorError, EditorResult};
use super::path::VertexPath;
use super::triangulate::triangulate;
use super::{FinalizePolicy, Palette};
use crate::camera::DrawingPlane;
use crate::scene::{Material, ObjectId, ObjectRole, Renderable, SceneGraph, SceneObject};
use glam::Vec3;

pub const MIN_POLYGON_VERTICES: usize = 3;

/// A closed polygon: outline loop plus triangulated fill, both built from the
/// same vertex ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    outline: Vec<Vec3>,
    vertices: Vec<Vec3>,
    indices: Vec<u32>,
    outline_id: ObjectId,
    fill_id: ObjectId,
}

impl Polygon {
    /// Closed outline: the input vertices followed by the first one again.
    pub fn outline(&self) -> &[Vec3] {
        &self.outline
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    /// Fill triangle indices into [`Polygon::vertices`], three per triangle.
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn outline_id(&self) -> ObjectId {
        self.outline_id
    }

    pub fn fill_id(&self) -> ObjectId {
        self.fill_id
    }

    pub(crate) fn remove_from(&self, scene: &mut SceneGraph) {
        for id in [self.outline_id, self.fill_id] {
            if let Err(err) = scene.remove(id) {
                log::debug!("[editor] polygon facet already gone: {err}");
            }
        }
    }
}

/// Closes `path` into the session polygon.
///
/// On failure nothing changes: the path keeps its points and the scene is
/// untouched. On success the path's points are cleared while its preview
/// segments stay in the scene.
pub fn finalize<'a>(
    path: &mut VertexPath,
    current: &'a mut Option<Polygon>,
    scene: &mut SceneGraph,
    plane: &DrawingPlane,
    palette: &Palette,
    policy: FinalizePolicy,
) -> EditorResult<&'a Polygon> {
    let distinct = path.distinct_len();
    if distinct < MIN_POLYGON_VERTICES {
        return Err(EditorError::InsufficientVertices {
            required: MIN_POLYGON_VERTICES,
            distinct,
        });
    }

    if let Some(existing) = current.as_ref() {
        match policy {
            FinalizePolicy::Reject => return Err(EditorError::PolygonAlreadyExists),
            FinalizePolicy::Replace => {
                log::info!("[editor] replacing existing polygon");
                existing.remove_from(scene);
            }
        }
    }

    let vertices = path.points().to_vec();
    let mut outline = vertices.clone();
    outline.push(vertices[0]);

    let indices: Vec<u32> = triangulate(&vertices, plane.normal)
        .into_iter()
        .flatten()
        .collect();

    let outline_id = scene.add(SceneObject::new(
        ObjectRole::Outline,
        Renderable::LineLoop(outline.clone()),
        Material::line(palette.outline),
    ));
    let fill_id = scene.add(SceneObject::new(
        ObjectRole::Fill,
        Renderable::Mesh {
            vertices: vertices.clone(),
            indices: indices.clone(),
        },
        Material::fill(palette.fill),
    ));

    path.clear_points();
    log::info!(
        "[editor] polygon completed: {} vertices, {} triangles",
        vertices.len(),
        indices.len() / 3
    );

    Ok(current.insert(Polygon {
        outline,
        vertices,
        indices,
        outline_id,
        fill_id,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::triangulate::triangles_area;
    use glam::Vec2;

    fn path_with(scene: &mut SceneGraph, points: &[(f32, f32)]) -> VertexPath {
        let mut path = VertexPath::new();
        let material = Material::line(Palette::default().segment);
        for &(x, y) in points {
            path.add_vertex(scene, Vec3::new(x, y, 0.0), material);
        }
        path
    }

    fn run(
        path: &mut VertexPath,
        current: &mut Option<Polygon>,
        scene: &mut SceneGraph,
        policy: FinalizePolicy,
    ) -> EditorResult<Polygon> {
        finalize(
            path,
            current,
            scene,
            &DrawingPlane::default(),
            &Palette::default(),
            policy,
        )
        .cloned()
    }

    #[test]
    fn too_few_vertices_leaves_state_alone() {
        let mut scene = SceneGraph::new();
        let mut path = path_with(&mut scene, &[(0.0, 0.0), (10.0, 0.0)]);
        let mut current = None;

        let err = run(&mut path, &mut current, &mut scene, FinalizePolicy::Reject)
            .expect_err("two vertices cannot close");

        assert_eq!(
            err,
            EditorError::InsufficientVertices {
                required: 3,
                distinct: 2
            }
        );
        assert_eq!(path.len(), 2);
        assert!(current.is_none());
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn repeated_clicks_do_not_count_as_distinct() {
        let mut scene = SceneGraph::new();
        let mut path = path_with(&mut scene, &[(1.0, 1.0), (1.0, 1.0), (1.0, 1.0)]);
        let mut current = None;

        let err = run(&mut path, &mut current, &mut scene, FinalizePolicy::Reject).unwrap_err();
        assert!(matches!(err, EditorError::InsufficientVertices { distinct: 1, .. }));
        assert_eq!(path.len(), 3);
    }

    #[test]
    fn triangle_outline_repeats_first_point() {
        let mut scene = SceneGraph::new();
        let mut path = path_with(&mut scene, &[(0.0, 0.0), (50.0, 0.0), (50.0, 50.0)]);
        let mut current = None;

        let polygon = run(&mut path, &mut current, &mut scene, FinalizePolicy::Reject)
            .expect("three vertices close");

        assert_eq!(
            polygon.outline(),
            &[
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(50.0, 0.0, 0.0),
                Vec3::new(50.0, 50.0, 0.0),
                Vec3::new(0.0, 0.0, 0.0),
            ]
        );
        assert_eq!(polygon.indices(), &[0, 1, 2]);
        assert!(path.is_empty());
        assert_eq!(path.segments().len(), 2, "preview segments stay attached");
        assert_eq!(scene.count_role(ObjectRole::Outline), 1);
        assert_eq!(scene.count_role(ObjectRole::Fill), 1);
        assert_eq!(current.as_ref(), Some(&polygon));
    }

    #[test]
    fn fill_covers_concave_outline() {
        let mut scene = SceneGraph::new();
        let mut path = path_with(
            &mut scene,
            &[(0.0, 0.0), (20.0, 0.0), (20.0, 20.0), (10.0, 5.0), (0.0, 20.0)],
        );
        let mut current = None;

        let polygon = run(&mut path, &mut current, &mut scene, FinalizePolicy::Reject).unwrap();
        let flat: Vec<Vec2> = polygon.vertices().iter().map(|p| p.truncate()).collect();
        let triangles: Vec<[u32; 3]> = polygon
            .indices()
            .chunks(3)
            .map(|t| [t[0], t[1], t[2]])
            .collect();

        assert_eq!(polygon.triangle_count(), 3);
        // 20x20 square minus the notch triangle (0,20)-(10,5)-(20,20)
        assert!((triangles_area(&flat, &triangles) - 250.0).abs() < 1.0e-3);
    }

    #[test]
    fn reject_policy_keeps_first_polygon_and_path() {
        let mut scene = SceneGraph::new();
        let mut path = path_with(&mut scene, &[(0.0, 0.0), (5.0, 0.0), (5.0, 5.0)]);
        let mut current = None;
        let first = run(&mut path, &mut current, &mut scene, FinalizePolicy::Reject).unwrap();

        let material = Material::line(Palette::default().segment);
        for point in [Vec3::ZERO, Vec3::X, Vec3::Y] {
            path.add_vertex(&mut scene, point, material);
        }
        let err = run(&mut path, &mut current, &mut scene, FinalizePolicy::Reject).unwrap_err();

        assert_eq!(err, EditorError::PolygonAlreadyExists);
        assert_eq!(path.len(), 3);
        assert_eq!(current.as_ref(), Some(&first));
        assert_eq!(scene.count_role(ObjectRole::Fill), 1);
    }

    #[test]
    fn replace_policy_swaps_facets() {
        let mut scene = SceneGraph::new();
        let mut path = path_with(&mut scene, &[(0.0, 0.0), (5.0, 0.0), (5.0, 5.0)]);
        let mut current = None;
        let first = run(&mut path, &mut current, &mut scene, FinalizePolicy::Replace).unwrap();

        let material = Material::line(Palette::default().segment);
        for point in [Vec3::ZERO, Vec3::X, Vec3::Y] {
            path.add_vertex(&mut scene, point, material);
        }
        let second = run(&mut path, &mut current, &mut scene, FinalizePolicy::Replace).unwrap();

        assert!(!scene.contains(first.fill_id()));
        assert!(!scene.contains(first.outline_id()));
        assert!(scene.contains(second.fill_id()));
        assert_eq!(scene.count_role(ObjectRole::Fill), 1);
        assert_eq!(scene.count_role(ObjectRole::Outline), 1);
    }
}

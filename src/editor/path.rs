use crate::scene::{Material, ObjectId, ObjectRole, Renderable, SceneGraph, SceneObject};
use glam::Vec3;

/// The polygon outline under construction plus the preview segments drawn
/// for it.
///
/// Points are kept in click order, duplicates included. Preview segments
/// outlive the points: finalizing clears the points but leaves the segments
/// in the scene until the next reset.
#[derive(Debug, Default, Clone)]
pub struct VertexPath {
    points: Vec<Vec3>,
    segments: Vec<ObjectId>,
}

impl VertexPath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `point` and, from the second point on, adds a preview segment
    /// joining it to its predecessor. Returns the new segment, if any.
    pub fn add_vertex(
        &mut self,
        scene: &mut SceneGraph,
        point: Vec3,
        material: Material,
    ) -> Option<ObjectId> {
        let previous = self.points.last().copied();
        self.points.push(point);

        let previous = previous?;
        let segment = scene.add(SceneObject::new(
            ObjectRole::PreviewSegment,
            Renderable::LineStrip(vec![previous, point]),
            material,
        ));
        self.segments.push(segment);
        log::trace!(
            "[editor] vertex {} at {:?}, segment {:?}",
            self.points.len(),
            point,
            segment
        );
        Some(segment)
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of pairwise distinct points.
    pub fn distinct_len(&self) -> usize {
        let mut distinct: Vec<Vec3> = Vec::with_capacity(self.points.len());
        for point in &self.points {
            if !distinct.contains(point) {
                distinct.push(*point);
            }
        }
        distinct.len()
    }

    pub fn segments(&self) -> &[ObjectId] {
        &self.segments
    }

    pub(crate) fn clear_points(&mut self) {
        self.points.clear();
    }

    /// Removes every preview segment from the scene and empties the path.
    pub(crate) fn clear(&mut self, scene: &mut SceneGraph) {
        for segment in self.segments.drain(..) {
            if let Err(err) = scene.remove(segment) {
                log::debug!("[editor] preview segment already gone: {err}");
            }
        }
        self.points.clear();
    }
}

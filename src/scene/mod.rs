pub mod grid;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Handle referencing an object within the scene graph.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObjectId {
    index: u32,
    generation: u32,
}

impl ObjectId {
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub const fn index(self) -> u32 {
        self.index
    }

    pub const fn generation(self) -> u32 {
        self.generation
    }
}

/// 24-bit RGB colour stored as `0xRRGGBB`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rgb(pub u32);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0x000000);
    pub const WHITE: Rgb = Rgb(0xffffff);

    pub fn to_unit(self) -> [f32; 3] {
        let r = ((self.0 >> 16) & 0xff) as f32 / 255.0;
        let g = ((self.0 >> 8) & 0xff) as f32 / 255.0;
        let b = (self.0 & 0xff) as f32 / 255.0;
        [r, g, b]
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Material {
    pub color: Rgb,
    pub double_sided: bool,
}

impl Material {
    pub const fn line(color: Rgb) -> Self {
        Self {
            color,
            double_sided: false,
        }
    }

    pub const fn fill(color: Rgb) -> Self {
        Self {
            color,
            double_sided: true,
        }
    }
}

/// What an object is in the authoring session. Used for bookkeeping and
/// for draw ordering, never for geometry.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectRole {
    Grid,
    PreviewSegment,
    Outline,
    Fill,
    Clone,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Renderable {
    /// Open polyline through consecutive points.
    LineStrip(Vec<Vec3>),
    /// Closed loop; the closing edge is implied by the last point.
    LineLoop(Vec<Vec3>),
    /// Independent segments.
    LineList(Vec<[Vec3; 2]>),
    Mesh { vertices: Vec<Vec3>, indices: Vec<u32> },
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneObject {
    pub role: ObjectRole,
    pub renderable: Renderable,
    pub material: Material,
    pub position: Vec3,
    pub visible: bool,
}

impl SceneObject {
    pub fn new(role: ObjectRole, renderable: Renderable, material: Material) -> Self {
        Self {
            role,
            renderable,
            material,
            position: Vec3::ZERO,
            visible: true,
        }
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SceneError {
    #[error("object {0:?} is not present in the scene")]
    NoSuchObject(ObjectId),
}

struct Slot {
    generation: u32,
    object: Option<SceneObject>,
}

/// Flat, generational store of everything the renderer draws.
#[derive(Default)]
pub struct SceneGraph {
    slots: Vec<Slot>,
    free_list: Vec<u32>,
    live: usize,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, object: SceneObject) -> ObjectId {
        self.live += 1;
        if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index as usize];
            slot.object = Some(object);
            ObjectId::new(index, slot.generation)
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                object: Some(object),
            });
            ObjectId::new(index, 0)
        }
    }

    pub fn remove(&mut self, id: ObjectId) -> Result<SceneObject, SceneError> {
        if !self.contains(id) {
            return Err(SceneError::NoSuchObject(id));
        }
        let slot = &mut self.slots[id.index as usize];
        slot.generation = slot.generation.wrapping_add(1);
        let object = slot.object.take().ok_or(SceneError::NoSuchObject(id))?;
        self.free_list.push(id.index);
        self.live -= 1;
        Ok(object)
    }

    /// Adds a copy of `id` (geometry, material and position) and returns the new handle.
    pub fn duplicate(&mut self, id: ObjectId) -> Result<ObjectId, SceneError> {
        let copy = self.get(id).cloned().ok_or(SceneError::NoSuchObject(id))?;
        Ok(self.add(copy))
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.object.as_ref())
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.object.as_mut())
    }

    pub fn set_position(&mut self, id: ObjectId, position: Vec3) -> Result<(), SceneError> {
        let object = self.get_mut(id).ok_or(SceneError::NoSuchObject(id))?;
        object.position = position;
        Ok(())
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &SceneObject)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.object
                .as_ref()
                .map(|object| (ObjectId::new(index as u32, slot.generation), object))
        })
    }

    pub fn count_role(&self, role: ObjectRole) -> usize {
        self.iter().filter(|(_, object)| object.role == role).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment() -> SceneObject {
        SceneObject::new(
            ObjectRole::PreviewSegment,
            Renderable::LineStrip(vec![Vec3::ZERO, Vec3::X]),
            Material::line(Rgb(0x00ff00)),
        )
    }

    #[test]
    fn add_and_get_object() {
        let mut scene = SceneGraph::new();
        let id = scene.add(segment());

        assert_eq!(scene.len(), 1);
        assert_eq!(scene.get(id).map(|o| o.role), Some(ObjectRole::PreviewSegment));
    }

    #[test]
    fn remove_invalidates_handle() {
        let mut scene = SceneGraph::new();
        let id = scene.add(segment());

        scene.remove(id).expect("object present");

        assert!(!scene.contains(id));
        assert!(scene.is_empty());
        assert_eq!(scene.remove(id), Err(SceneError::NoSuchObject(id)));
    }

    #[test]
    fn reused_slot_gets_new_generation() {
        let mut scene = SceneGraph::new();
        let first = scene.add(segment());
        scene.remove(first).unwrap();

        let second = scene.add(segment());
        assert_eq!(first.index(), second.index());
        assert_ne!(first.generation(), second.generation());
        assert!(scene.get(first).is_none());
        assert!(scene.get(second).is_some());
    }

    #[test]
    fn duplicate_copies_geometry_and_position() {
        let mut scene = SceneGraph::new();
        let id = scene.add(segment());
        scene.set_position(id, Vec3::new(1.0, 2.0, 0.0)).unwrap();

        let copy = scene.duplicate(id).expect("source present");

        assert_ne!(id, copy);
        assert_eq!(scene.get(id), scene.get(copy));
        assert_eq!(scene.len(), 2);
    }

    #[test]
    fn count_role_filters_by_role() {
        let mut scene = SceneGraph::new();
        scene.add(segment());
        scene.add(segment());
        scene.add(SceneObject::new(
            ObjectRole::Outline,
            Renderable::LineLoop(vec![Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::ZERO]),
            Material::line(Rgb::BLACK),
        ));

        assert_eq!(scene.count_role(ObjectRole::PreviewSegment), 2);
        assert_eq!(scene.count_role(ObjectRole::Outline), 1);
        assert_eq!(scene.count_role(ObjectRole::Fill), 0);
    }

    #[test]
    fn rgb_unpacks_channels() {
        assert_eq!(Rgb(0xffa500).to_unit(), [1.0, 165.0 / 255.0, 0.0]);
    }
}

use super::commands::UiAction;
use super::error::{EditorError, EditorResult};
use super::notify::{LogNotifier, Notifier};
use super::polygon::finalize;
use super::state::SceneState;
use super::EditorConfig;
use crate::camera::{CoordinateMapper, RayCaster, Viewport};
use crate::scene::{Material, ObjectId, SceneGraph};
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Element a click landed on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTarget {
    Canvas,
    Button(String),
    Input(String),
}

impl EventTarget {
    pub fn is_ui_control(&self) -> bool {
        matches!(self, EventTarget::Button(_) | EventTarget::Input(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Primary-button click at a window position in pixels.
    Click { position: Vec2, target: EventTarget },
    PointerMove { position: Vec2 },
    Action(UiAction),
}

impl InputEvent {
    pub fn canvas_click(x: f32, y: f32) -> Self {
        InputEvent::Click {
            position: Vec2::new(x, y),
            target: EventTarget::Canvas,
        }
    }

    pub fn pointer_move(x: f32, y: f32) -> Self {
        InputEvent::PointerMove {
            position: Vec2::new(x, y),
        }
    }
}

/// What handling an event did to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Ignored,
    VertexAdded {
        point: Vec3,
        segment: Option<ObjectId>,
    },
    PolygonCompleted {
        outline: ObjectId,
        fill: ObjectId,
    },
    CopyStarted {
        clone: ObjectId,
    },
    CloneMoved {
        clone: ObjectId,
        position: Vec3,
    },
    ClonePlaced {
        clone: ObjectId,
    },
    Reset,
}

/// Routes pointer and UI events to the authoring controllers.
///
/// Clicks on UI controls never reach drawing or placement. Otherwise a
/// click adds a vertex, or places the clone while a copy is following the
/// cursor. Failed actions are handed to the [`Notifier`] and leave the
/// session unchanged; misses during pointer moves are only logged.
pub struct InteractionDispatcher {
    state: SceneState,
    mapper: CoordinateMapper,
    config: EditorConfig,
    notifier: Box<dyn Notifier>,
}

impl InteractionDispatcher {
    pub fn new(config: EditorConfig, mapper: CoordinateMapper) -> Self {
        Self {
            state: SceneState::new(),
            mapper,
            config,
            notifier: Box::new(LogNotifier),
        }
    }

    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn state(&self) -> &SceneState {
        &self.state
    }

    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.mapper.set_viewport(viewport);
    }

    pub fn dispatch(
        &mut self,
        scene: &mut SceneGraph,
        camera: &dyn RayCaster,
        event: &InputEvent,
    ) -> EditorResult<Outcome> {
        let result = match event {
            InputEvent::Click { position, target } => {
                self.handle_click(scene, camera, *position, target)
            }
            InputEvent::PointerMove { position } => {
                return self.handle_move(scene, camera, *position);
            }
            InputEvent::Action(action) => self.handle_action(scene, *action),
        };

        if let Err(err) = &result {
            self.notifier.notify(err);
        }
        result
    }

    fn handle_click(
        &mut self,
        scene: &mut SceneGraph,
        camera: &dyn RayCaster,
        position: Vec2,
        target: &EventTarget,
    ) -> EditorResult<Outcome> {
        if target.is_ui_control() {
            log::trace!("[editor] click on {target:?} swallowed");
            return Ok(Outcome::Ignored);
        }

        if self.state.cycle.is_following() {
            return Ok(self.place_clone());
        }

        let point = self
            .mapper
            .resolve(position, camera)
            .ok_or(EditorError::NoPlaneIntersection)?;
        Ok(self.add_vertex(scene, point))
    }

    fn handle_move(
        &mut self,
        scene: &mut SceneGraph,
        camera: &dyn RayCaster,
        position: Vec2,
    ) -> EditorResult<Outcome> {
        let Some(clone) = self.state.cycle.active_clone() else {
            return Ok(Outcome::Ignored);
        };

        let Some(point) = self.mapper.resolve(position, camera) else {
            log::debug!("[editor] pointer at {position:?} misses the drawing plane");
            return Err(EditorError::NoPlaneIntersection);
        };

        match self.state.cycle.on_move(scene, point, self.mapper.plane())? {
            Some(position) => Ok(Outcome::CloneMoved { clone, position }),
            None => Ok(Outcome::Ignored),
        }
    }

    fn handle_action(&mut self, scene: &mut SceneGraph, action: UiAction) -> EditorResult<Outcome> {
        log::debug!("[editor] action {action}");
        match action {
            UiAction::CompletePolygon => self.complete_polygon(scene),
            UiAction::CopyPolygon => self.copy_polygon(scene),
            UiAction::Reset => Ok(self.reset(scene)),
        }
    }

    pub fn add_vertex(&mut self, scene: &mut SceneGraph, point: Vec3) -> Outcome {
        let material = Material::line(self.config.palette.segment);
        let segment = self.state.path.add_vertex(scene, point, material);
        Outcome::VertexAdded { point, segment }
    }

    pub fn complete_polygon(&mut self, scene: &mut SceneGraph) -> EditorResult<Outcome> {
        let polygon = finalize(
            &mut self.state.path,
            &mut self.state.polygon,
            scene,
            self.mapper.plane(),
            &self.config.palette,
            self.config.finalize_policy,
        )?;
        Ok(Outcome::PolygonCompleted {
            outline: polygon.outline_id(),
            fill: polygon.fill_id(),
        })
    }

    pub fn copy_polygon(&mut self, scene: &mut SceneGraph) -> EditorResult<Outcome> {
        let clone = self.state.cycle.begin(self.state.polygon.as_ref(), scene)?;
        Ok(Outcome::CopyStarted { clone })
    }

    fn place_clone(&mut self) -> Outcome {
        match self.state.cycle.place() {
            Some(clone) => {
                self.state.placed_clones.push(clone);
                Outcome::ClonePlaced { clone }
            }
            None => Outcome::Ignored,
        }
    }

    pub fn reset(&mut self, scene: &mut SceneGraph) -> Outcome {
        self.state.reset(scene, self.config.reset_scope);
        Outcome::Reset
    }
}

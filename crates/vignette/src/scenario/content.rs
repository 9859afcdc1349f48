//! Declarative scene content for the scenario runner
//!
//! Scenes are waypoint maps over a bounded camera. A click is mapped through
//! the camera to the nearest waypoint; waypoints with an exit ask the
//! orchestrator for a transition.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use anyhow::{Context, Result, bail};
use glam::Vec2;
use vignette_core::{
    Camera, CameraConfig, CameraPoint, ContextMenu, GameSession, InputEvent, RoutingTable, Scene, SceneId,
    SceneOffset, SceneOrchestrator, SceneRegistry, TransitionRequest,
};

use super::definition::{ExitDefinition, ScenarioDefinition, SceneDefinition};
use crate::config::AppConfig;

/// What the content observed, for verifications
#[derive(Debug, Default)]
pub struct ContentLog {
    pub loads: BTreeMap<SceneId, usize>,
    pub exits: BTreeMap<SceneId, usize>,
    /// Last known camera position per scene
    pub cameras: BTreeMap<SceneId, Vec2>,
    /// Save attempts, failed ones included
    pub saves: usize,
    pub failed_saves: usize,
    pub quit_prompts: usize,
    pub menu_visible: bool,
}

impl ContentLog {
    pub fn exit_count(&self, scene: &SceneId) -> usize {
        self.exits.get(scene).copied().unwrap_or(0)
    }

    pub fn load_count(&self, scene: &SceneId) -> usize {
        self.loads.get(scene).copied().unwrap_or(0)
    }
}

pub type SharedContentLog = Rc<RefCell<ContentLog>>;

/// A scene built from a [`SceneDefinition`]
pub struct ScriptedScene {
    id: SceneId,
    offset: SceneOffset,
    camera: Camera,
    exits: Vec<(String, ExitDefinition)>,
    content: SharedContentLog,
}

impl ScriptedScene {
    pub fn build(
        definition: &SceneDefinition,
        camera: CameraConfig,
        content: SharedContentLog,
    ) -> Result<Self> {
        let mut config = camera;
        if let Some(bounds) = definition.bounds {
            config.min_bounds = Vec2::new(bounds.min_x, bounds.min_y);
            config.max_bounds = Vec2::new(bounds.max_x, bounds.max_y);
        }
        let mut camera = Camera::new(config)
            .with_context(|| format!("Invalid camera for scene '{}'", definition.id))?
            .with_points(definition.waypoints.iter().map(|waypoint| CameraPoint {
                id: waypoint.id.clone(),
                position: Vec2::new(waypoint.x, waypoint.y),
            }));

        let exits = definition
            .waypoints
            .iter()
            .filter_map(|waypoint| {
                waypoint
                    .exit
                    .as_ref()
                    .map(|exit| (waypoint.id.clone(), exit.clone()))
            })
            .collect();
        if let Some(first) = definition.waypoints.first() {
            camera.snap_to_point(&first.id);
        }

        Ok(Self {
            id: definition.id.clone(),
            offset: SceneOffset::new(definition.id.as_str()),
            camera,
            exits,
            content,
        })
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    fn record_camera(&self) {
        self.content
            .borrow_mut()
            .cameras
            .insert(self.id.clone(), self.camera.position());
    }

    fn click(&mut self, x: f32, y: f32) -> Option<TransitionRequest> {
        let world = self.camera.screen_to_world(x, y);
        let waypoint = match self.camera.nearest_point_to(world.x, world.y) {
            Some(point) => point.id.clone(),
            None => {
                log::debug!(
                    "[{}] click at ({:.1}, {:.1}) hit no waypoint",
                    self.id,
                    world.x,
                    world.y
                );
                return None;
            }
        };

        self.camera.focus_point(&waypoint);
        let exit = self
            .exits
            .iter()
            .find(|(id, _)| *id == waypoint)
            .map(|(_, exit)| exit)?;
        log::info!("[{}] waypoint '{}' leads to {:?}", self.id, waypoint, exit.to);
        Some(TransitionRequest {
            next: exit.to.clone(),
            direction: exit.direction,
        })
    }
}

impl Scene for ScriptedScene {
    fn id(&self) -> &SceneId {
        &self.id
    }

    fn load(&mut self) {
        *self
            .content
            .borrow_mut()
            .loads
            .entry(self.id.clone())
            .or_default() += 1;
        self.record_camera();
    }

    fn exit(&mut self) {
        *self
            .content
            .borrow_mut()
            .exits
            .entry(self.id.clone())
            .or_default() += 1;
    }

    fn transition_from(&mut self, previous: &SceneId) {
        log::debug!("[{}] entered from '{}'", self.id, previous);
    }

    fn offset(&self) -> &SceneOffset {
        &self.offset
    }

    fn update(&mut self, dt: f32) -> Option<TransitionRequest> {
        if !self.camera.is_settled() {
            self.camera.tick(dt);
            self.record_camera();
        }
        None
    }

    fn handle_input(&mut self, event: &InputEvent) -> Option<TransitionRequest> {
        match event {
            InputEvent::PointerDown { x, y } => self.click(*x, *y),
            _ => None,
        }
    }
}

/// Session that counts saves and quit prompts
pub struct ScenarioSession {
    content: SharedContentLog,
    fail_saves: bool,
}

impl GameSession for ScenarioSession {
    fn save(&mut self) -> Result<()> {
        let mut content = self.content.borrow_mut();
        content.saves += 1;
        if self.fail_saves {
            content.failed_saves += 1;
            bail!("save slot is read-only");
        }
        Ok(())
    }

    fn prompt_quit(&mut self) {
        self.content.borrow_mut().quit_prompts += 1;
        log::info!("Quit prompt shown");
    }
}

/// Context menu reduced to its visibility flag
pub struct ScenarioMenu {
    content: SharedContentLog,
}

impl ContextMenu for ScenarioMenu {
    fn hide(&mut self) {
        self.content.borrow_mut().menu_visible = false;
    }
}

/// Everything a running scenario acts on and verifies against
pub struct ScenarioWorld {
    pub orchestrator: SceneOrchestrator,
    pub router: RoutingTable,
    pub content: SharedContentLog,
}

impl ScenarioWorld {
    pub fn build(scenario: &ScenarioDefinition, config: &AppConfig) -> Result<Self> {
        let content = SharedContentLog::default();
        let camera = config.camera_config();

        let mut registry = SceneRegistry::new();
        for definition in &scenario.scenes {
            let definition = definition.clone();
            let content = content.clone();
            registry.register(
                definition.id.clone(),
                move |id: &SceneId| -> Result<Box<dyn Scene>> {
                    if definition.broken {
                        bail!("content for scene '{}' is missing", id);
                    }
                    let scene = ScriptedScene::build(&definition, camera, content.clone())?;
                    Ok(Box::new(scene))
                },
            )?;
        }

        let mut settings = config.transition_settings();
        if let Some(fade_time) = scenario.fade_time {
            settings.fade_time = fade_time;
        }

        let router = RoutingTable::new();
        let session = ScenarioSession {
            content: content.clone(),
            fail_saves: scenario.fail_saves,
        };
        let menu = ScenarioMenu {
            content: content.clone(),
        };
        let orchestrator = SceneOrchestrator::new(
            settings,
            registry,
            Box::new(session),
            Box::new(router.clone()),
        )?
        .with_menu(Box::new(menu));

        Ok(Self {
            orchestrator,
            router,
            content,
        })
    }

    pub fn open_menu(&self) {
        self.content.borrow_mut().menu_visible = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::definition::{Bounds, WaypointDefinition};
    use vignette_core::Direction;

    fn porch() -> SceneDefinition {
        SceneDefinition {
            id: "porch".into(),
            bounds: Some(Bounds {
                min_x: 0.0,
                min_y: 0.0,
                max_x: 400.0,
                max_y: 400.0,
            }),
            waypoints: vec![
                WaypointDefinition {
                    id: "steps".to_string(),
                    x: 100.0,
                    y: 100.0,
                    exit: None,
                },
                WaypointDefinition {
                    id: "door".to_string(),
                    x: 300.0,
                    y: 100.0,
                    exit: Some(ExitDefinition {
                        to: Some("hall".into()),
                        direction: Direction::Up,
                    }),
                },
            ],
            broken: false,
        }
    }

    #[test]
    fn test_click_on_exit_requests_transition() {
        let content = SharedContentLog::default();
        let mut scene =
            ScriptedScene::build(&porch(), CameraConfig::default(), content.clone()).unwrap();
        assert_eq!(scene.camera().position(), Vec2::new(100.0, 100.0));

        // screen centre shows the camera position, zoom 1
        let door = scene.camera().world_to_screen(300.0, 100.0);
        let request = scene.handle_input(&InputEvent::PointerDown {
            x: door.x,
            y: door.y,
        });
        assert_eq!(request, Some(TransitionRequest::to("hall", Direction::Up)));

        // the camera seeks the clicked waypoint
        assert_eq!(scene.camera().target(), Vec2::new(300.0, 100.0));
        scene.update(1.0);
        assert_eq!(content.borrow().cameras[&SceneId::from("porch")], Vec2::new(200.0, 100.0));
    }

    #[test]
    fn test_click_without_exit_or_miss() {
        let mut scene =
            ScriptedScene::build(&porch(), CameraConfig::default(), SharedContentLog::default())
                .unwrap();
        assert_eq!(
            scene.handle_input(&InputEvent::PointerDown { x: 640.0, y: 360.0 }),
            None
        );
        assert_eq!(
            scene.handle_input(&InputEvent::PointerDown { x: 10.0, y: 10.0 }),
            None
        );
    }

    #[test]
    fn test_invalid_bounds_fail_construction() {
        let mut definition = porch();
        definition.bounds = Some(Bounds {
            min_x: 10.0,
            min_y: 0.0,
            max_x: 0.0,
            max_y: 10.0,
        });
        assert!(
            ScriptedScene::build(&definition, CameraConfig::default(), SharedContentLog::default())
                .is_err()
        );
    }

    #[test]
    fn test_session_counts_failed_saves() {
        let content = SharedContentLog::default();
        let mut session = ScenarioSession {
            content: content.clone(),
            fail_saves: true,
        };
        assert!(session.save().is_err());
        session.prompt_quit();
        let content = content.borrow();
        assert_eq!(content.saves, 1);
        assert_eq!(content.failed_saves, 1);
        assert_eq!(content.quit_prompts, 1);
    }
}

//! Contracts between the orchestrator and the content it drives.
//!
//! Scenes, the game session, the input router and the context menu are all
//! supplied by the host; the engine only relies on the traits below.

mod direction;
mod registry;
mod router;

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::animation::Property;

pub use direction::Direction;
pub use registry::{SceneFactory, SceneRegistry};
pub use router::{RoutingTable, SceneRouter};

/// Identifier of a scene in the [`SceneRegistry`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SceneId(pub String);

impl SceneId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SceneId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for SceneId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Screen-space offset of a scene, animated by slide transitions.
#[derive(Debug, Clone)]
pub struct SceneOffset {
    pub x: Property,
    pub y: Property,
}

impl SceneOffset {
    pub fn new(label: &str) -> Self {
        Self {
            x: Property::new(format!("{}.offset_x", label), 0.0),
            y: Property::new(format!("{}.offset_y", label), 0.0),
        }
    }

    pub fn get(&self) -> Vec2 {
        Vec2::new(self.x.get(), self.y.get())
    }

    pub fn set(&self, offset: Vec2) {
        self.x.set(offset.x);
        self.y.set(offset.y);
    }
}

/// Raw input delivered to the routed scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    PointerDown { x: f32, y: f32 },
    PointerUp { x: f32, y: f32 },
    PointerMoved { x: f32, y: f32 },
    Key { name: String, pressed: bool },
}

/// A scene asking to hand over to another one (or to quit when `next` is
/// `None`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionRequest {
    pub next: Option<SceneId>,
    pub direction: Direction,
}

impl TransitionRequest {
    pub fn to(next: impl Into<SceneId>, direction: Direction) -> Self {
        Self {
            next: Some(next.into()),
            direction,
        }
    }

    pub fn quit() -> Self {
        Self {
            next: None,
            direction: Direction::Fade,
        }
    }
}

/// A scene driven by the orchestrator.
///
/// Lifecycle: built by a [`SceneFactory`], then `load`, `transition_from` and
/// per-frame `update`/`handle_input` while active, `exit` once when torn down.
pub trait Scene {
    fn id(&self) -> &SceneId;

    /// Acquire resources. Called once before the scene becomes visible.
    fn load(&mut self);

    /// Tear down. Called once, after which the scene is dropped.
    fn exit(&mut self);

    /// Per-frame updates are suspended until [`resume`](Self::resume).
    fn pause(&mut self) {}

    fn resume(&mut self) {}

    /// Told which scene it replaced.
    fn transition_from(&mut self, _previous: &SceneId) {}

    /// Offset animated by slide transitions.
    fn offset(&self) -> &SceneOffset;

    fn update(&mut self, _dt: f32) -> Option<TransitionRequest> {
        None
    }

    fn handle_input(&mut self, _event: &InputEvent) -> Option<TransitionRequest> {
        None
    }
}

/// Session-level hooks owned by the host game.
pub trait GameSession {
    /// Persist game state. Called before the outgoing scene is torn down.
    fn save(&mut self) -> anyhow::Result<()>;

    /// Ask the player whether to save and quit.
    fn prompt_quit(&mut self);
}

/// Contextual action menu. Hidden at the start of every transition.
pub trait ContextMenu {
    fn hide(&mut self);
}

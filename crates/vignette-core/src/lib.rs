//! # Vignette Core
//!
//! Time-driven scene transitions: interpolators, an ordered step sequencer,
//! a bounded seeking camera and the orchestrator that swaps the active scene.

pub mod animation;
pub mod camera;
pub mod error;
pub mod orchestrator;
pub mod scene;
pub mod sequencer;

pub use animation::{EaseType, Interpolator, InterpolatorController, Property};
pub use camera::{Camera, CameraConfig, CameraPoint};
pub use error::{AnimationError, CameraError, SceneError, SequenceError, TransitionError};
pub use orchestrator::{Overlay, SceneOrchestrator, TransitionSettings, TransitionState};
pub use scene::{
    ContextMenu, Direction, GameSession, InputEvent, RoutingTable, Scene, SceneFactory, SceneId,
    SceneOffset, SceneRegistry, SceneRouter, TransitionRequest,
};
pub use sequencer::{ActionSequencer, Completion, Step};

/// Common imports for content code
pub mod prelude {
    pub use crate::scene::{
        ContextMenu, Direction, GameSession, InputEvent, Scene, SceneId, SceneOffset,
        TransitionRequest,
    };
    pub use glam::Vec2;
}

//! Error taxonomy for the engine.
//!
//! Configuration errors ([`AnimationError`], [`CameraError`]) are raised at
//! construction time. [`SequenceError`] reports misuse of an
//! [`ActionSequencer`](crate::sequencer::ActionSequencer). [`SceneError`]
//! covers missing or malformed content. [`TransitionError`] is what callers of
//! [`SceneOrchestrator::notify`](crate::orchestrator::SceneOrchestrator::notify)
//! see.

use thiserror::Error;

use crate::scene::SceneId;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnimationError {
    #[error("interpolator duration must be positive, got {0}")]
    InvalidDuration(f32),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CameraError {
    #[error("camera speed must be positive, got {0}")]
    InvalidSpeed(f32),

    #[error("camera zoom must be positive, got {0}")]
    InvalidZoom(f32),

    #[error("camera bounds on {axis} axis are inverted: min {min} > max {max}")]
    InvalidBounds { axis: char, min: f32, max: f32 },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SequenceError {
    #[error("sequencer busy: a sequence is already running")]
    Busy,

    #[error("step {step} signalled completion but the sequencer is at step {cursor}")]
    StaleCompletion { step: usize, cursor: usize },

    #[error("sequencer dropped before step {step} completed")]
    Detached { step: usize },
}

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("no scene registered as '{0}'")]
    UnknownScene(SceneId),

    #[error("scene '{0}' is already registered")]
    DuplicateScene(SceneId),

    #[error("failed to construct scene '{id}'")]
    Construction {
        id: SceneId,
        #[source]
        source: anyhow::Error,
    },
}

#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("transition direction {0} is not one of 0 (fade), 1 (up), 2 (right), 3 (down), 4 (left)")]
    InvalidDirection(u8),

    #[error("invalid transition settings: {0}")]
    InvalidSettings(String),

    #[error(transparent)]
    Sequence(#[from] SequenceError),

    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error(transparent)]
    Animation(#[from] AnimationError),
}

impl TransitionError {
    /// True when another transition is still in flight.
    pub fn is_busy(&self) -> bool {
        matches!(self, TransitionError::Sequence(SequenceError::Busy))
    }
}

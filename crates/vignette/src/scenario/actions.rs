//! Scenario actions

use serde::{Deserialize, Serialize};
use vignette_core::{Direction, SceneId};

/// Actions that can be performed during a scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScenarioAction {
    /// Ask the orchestrator for a transition; `to: None` asks to quit
    Transition {
        #[serde(default)]
        to: Option<SceneId>,
        #[serde(default)]
        direction: Direction,
        /// The request is expected to be rejected (busy, broken scene)
        #[serde(default)]
        expect_failure: bool,
    },

    /// Simulate frames covering `seconds` of game time
    Advance { seconds: f32 },

    /// Simulate frames until no transition is in flight
    Settle,

    /// Press and release the pointer at a screen position
    Click { x: f32, y: f32 },

    /// Show the context menu; transitions hide it
    OpenMenu,

    /// Dismiss the quit prompt
    CancelQuit,

    /// Write a message to the scenario log
    Log { message: String },
}

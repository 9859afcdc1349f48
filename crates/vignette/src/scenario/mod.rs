//! Headless scenario runner
//!
//! A scenario declares scenes, a start scene, actions and verifications in
//! RON. The executor builds a [`ScenarioWorld`] around a
//! [`SceneOrchestrator`](vignette_core::SceneOrchestrator), runs the actions
//! frame by frame and reports which verifications failed.

pub mod actions;
pub mod content;
pub mod definition;
pub mod executor;
pub mod results;
pub mod verification;

pub use actions::ScenarioAction;
pub use content::{ContentLog, ScenarioWorld, ScriptedScene};
pub use definition::{ScenarioDefinition, SceneDefinition};
pub use executor::{ScenarioExecutor, ScenarioExecutorConfig};
pub use results::ExecutionReport;
pub use verification::{VerificationCondition, VerificationResult};

/// One line per supported action and verification, for `--list`
pub fn describe_vocabulary() -> Vec<&'static str> {
    vec![
        "Actions:",
        "  Transition(to: Some(\"scene\"), direction: Fade|Up|Right|Down|Left, expect_failure: bool)",
        "  Advance(seconds: f32)",
        "  Settle",
        "  Click(x: f32, y: f32)",
        "  OpenMenu",
        "  CancelQuit",
        "  Log(message: \"...\")",
        "Verifications:",
        "  ActiveScene(id: Some(\"scene\"))",
        "  Idle",
        "  State(expected: Idle|TransitioningOut|Swapping|TransitioningIn|AwaitingQuitConfirmation)",
        "  OverlayOpacity(expected: f32, tolerance: Some(f32))",
        "  SaveCount(expected: usize)",
        "  ExitCount(scene: \"scene\", expected: usize)",
        "  MenuVisible(expected: bool)",
        "  CameraAt(scene: \"scene\", x: f32, y: f32, tolerance: Some(f32))",
        "  All(conditions: [..]) / Any(conditions: [..]) / Not(condition: ..)",
    ]
}

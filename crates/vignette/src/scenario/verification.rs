//! Verification conditions and state checks for scenarios

use serde::{Deserialize, Serialize};
use vignette_core::{SceneId, SceneRouter, TransitionState};

use super::content::ScenarioWorld;

/// Conditions that can be verified against orchestrator and content state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum VerificationCondition {
    // === ORCHESTRATOR CHECKS ===
    /// Assert the active scene (`None`: no scene active)
    ActiveScene { id: Option<SceneId> },

    /// Assert no transition is in flight and input is routed
    Idle,

    /// Assert the transition state
    State { expected: TransitionState },

    /// Assert overlay opacity (0 clear, 255 opaque)
    OverlayOpacity {
        expected: f32,
        #[serde(default)]
        tolerance: Option<f32>,
    },

    // === CONTENT CHECKS ===
    /// Assert the number of save attempts
    SaveCount { expected: usize },

    /// Assert how many times a scene was torn down
    ExitCount { scene: SceneId, expected: usize },

    /// Assert context menu visibility
    MenuVisible { expected: bool },

    /// Assert a scene's last camera position
    CameraAt {
        scene: SceneId,
        x: f32,
        y: f32,
        #[serde(default)]
        tolerance: Option<f32>,
    },

    // === COMPOSITE CONDITIONS ===
    /// All conditions must pass
    All {
        conditions: Vec<VerificationCondition>,
    },

    /// At least one condition must pass
    Any {
        conditions: Vec<VerificationCondition>,
    },

    /// Condition must NOT pass
    Not {
        condition: Box<VerificationCondition>,
    },
}

/// Result of a verification check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationResult {
    pub passed: bool,
    pub message: String,
    pub actual_value: Option<String>, // For debugging
}

impl VerificationCondition {
    /// Evaluate condition against the scenario world
    pub fn evaluate(&self, world: &ScenarioWorld) -> VerificationResult {
        let orchestrator = &world.orchestrator;
        match self {
            VerificationCondition::ActiveScene { id } => {
                let actual = orchestrator.active_scene_id();
                VerificationResult {
                    passed: actual == *id,
                    message: format!("Active scene: expected {:?}, got {:?}", id, actual),
                    actual_value: Some(format!("{:?}", actual)),
                }
            }

            VerificationCondition::Idle => {
                let state = orchestrator.state();
                let routed = world.router.active_scene();
                let passed = state == TransitionState::Idle
                    && !orchestrator.is_transitioning()
                    && routed.is_some()
                    && routed == orchestrator.active_scene_id();
                VerificationResult {
                    passed,
                    message: format!("Idle: state {:?}, input routed to {:?}", state, routed),
                    actual_value: Some(format!("{:?}", state)),
                }
            }

            VerificationCondition::State { expected } => {
                let actual = orchestrator.state();
                VerificationResult {
                    passed: actual == *expected,
                    message: format!(
                        "Transition state: expected {:?}, got {:?}",
                        expected, actual
                    ),
                    actual_value: Some(format!("{:?}", actual)),
                }
            }

            VerificationCondition::OverlayOpacity {
                expected,
                tolerance,
            } => {
                let actual = orchestrator.overlay_opacity();
                let tol = tolerance.unwrap_or(0.01);
                VerificationResult {
                    passed: (actual - expected).abs() <= tol,
                    message: format!(
                        "Overlay opacity: expected {}±{}, got {:.2}",
                        expected, tol, actual
                    ),
                    actual_value: Some(actual.to_string()),
                }
            }

            VerificationCondition::SaveCount { expected } => {
                let actual = world.content.borrow().saves;
                VerificationResult {
                    passed: actual == *expected,
                    message: format!("Save count: expected {}, got {}", expected, actual),
                    actual_value: Some(actual.to_string()),
                }
            }

            VerificationCondition::ExitCount { scene, expected } => {
                let actual = world.content.borrow().exit_count(scene);
                VerificationResult {
                    passed: actual == *expected,
                    message: format!(
                        "Exit count of '{}': expected {}, got {}",
                        scene, expected, actual
                    ),
                    actual_value: Some(actual.to_string()),
                }
            }

            VerificationCondition::MenuVisible { expected } => {
                let actual = world.content.borrow().menu_visible;
                VerificationResult {
                    passed: actual == *expected,
                    message: format!("Menu visible: expected {}, got {}", expected, actual),
                    actual_value: Some(actual.to_string()),
                }
            }

            VerificationCondition::CameraAt {
                scene,
                x,
                y,
                tolerance,
            } => {
                let tol = tolerance.unwrap_or(0.5);
                match world.content.borrow().cameras.get(scene) {
                    Some(pos) => VerificationResult {
                        passed: (pos.x - x).abs() <= tol && (pos.y - y).abs() <= tol,
                        message: format!(
                            "Camera of '{}': expected ({}, {})±{}, got ({:.1}, {:.1})",
                            scene, x, y, tol, pos.x, pos.y
                        ),
                        actual_value: Some(format!("({:.1}, {:.1})", pos.x, pos.y)),
                    },
                    None => VerificationResult {
                        passed: false,
                        message: format!("Camera of '{}': scene never loaded", scene),
                        actual_value: None,
                    },
                }
            }

            VerificationCondition::All { conditions } => {
                let results: Vec<_> = conditions.iter().map(|c| c.evaluate(world)).collect();
                let failed: Vec<&str> = results
                    .iter()
                    .filter(|r| !r.passed)
                    .map(|r| r.message.as_str())
                    .collect();
                VerificationResult {
                    passed: failed.is_empty(),
                    message: if failed.is_empty() {
                        format!("All {} conditions passed", results.len())
                    } else {
                        format!("All: {} failed: {}", failed.len(), failed.join("; "))
                    },
                    actual_value: None,
                }
            }

            VerificationCondition::Any { conditions } => {
                let results: Vec<_> = conditions.iter().map(|c| c.evaluate(world)).collect();
                let passed = results.iter().find(|r| r.passed);
                VerificationResult {
                    passed: passed.is_some(),
                    message: match passed {
                        Some(result) => format!("Any: {}", result.message),
                        None => format!("Any: none of {} conditions passed", results.len()),
                    },
                    actual_value: None,
                }
            }

            VerificationCondition::Not { condition } => {
                let inner = condition.evaluate(world);
                VerificationResult {
                    passed: !inner.passed,
                    message: format!("Not: {}", inner.message),
                    actual_value: inner.actual_value,
                }
            }
        }
    }
}

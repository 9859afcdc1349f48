//! Scenario definition and RON file loading

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::Path;
use vignette_core::{Direction, SceneId};

use super::actions::ScenarioAction;
use super::verification::VerificationCondition;

/// Top-level scenario definition loaded from RON files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioDefinition {
    /// Scenario name
    pub name: String,

    /// Description
    #[serde(default)]
    pub description: String,

    /// Scene active before the first action
    pub start: SceneId,

    /// Scenes available to transitions
    pub scenes: Vec<SceneDefinition>,

    /// Overrides `transition.fade_time` from the app config
    #[serde(default)]
    pub fade_time: Option<f32>,

    /// Make every save fail (the transition must still complete)
    #[serde(default)]
    pub fail_saves: bool,

    /// Main scenario actions
    pub actions: Vec<ScenarioAction>,

    /// Verification checks to run after scenario
    #[serde(default)]
    pub verify: Vec<VerificationCondition>,
}

/// A declarative scene
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneDefinition {
    pub id: SceneId,

    /// Camera bounds; the app config's camera section when absent
    #[serde(default)]
    pub bounds: Option<Bounds>,

    /// Camera waypoints. The camera starts on the first one.
    #[serde(default)]
    pub waypoints: Vec<WaypointDefinition>,

    /// Construction fails, as with missing content
    #[serde(default)]
    pub broken: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaypointDefinition {
    pub id: String,
    pub x: f32,
    pub y: f32,

    /// Clicking this waypoint leaves the scene
    #[serde(default)]
    pub exit: Option<ExitDefinition>,
}

/// Where a waypoint leads. `to: None` asks to quit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExitDefinition {
    #[serde(default)]
    pub to: Option<SceneId>,

    #[serde(default)]
    pub direction: Direction,
}

impl ScenarioDefinition {
    /// Load scenario from RON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario file: {}", path.display()))?;

        let scenario: Self = ron::from_str(&content)
            .with_context(|| format!("Failed to parse RON scenario: {}", path.display()))?;

        scenario
            .validate()
            .with_context(|| format!("Invalid scenario: {}", path.display()))?;
        Ok(scenario)
    }

    /// Save scenario to RON file
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let ron = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .context("Failed to serialize scenario to RON")?;

        std::fs::write(path.as_ref(), ron).with_context(|| {
            format!("Failed to write scenario file: {}", path.as_ref().display())
        })?;

        Ok(())
    }

    /// Check references between scenes. Duplicate scene ids are caught when
    /// the scenes are registered.
    pub fn validate(&self) -> Result<()> {
        if self.scene(&self.start).is_none() {
            bail!("Start scene '{}' is not declared", self.start);
        }
        for scene in &self.scenes {
            for waypoint in &scene.waypoints {
                let target = waypoint.exit.as_ref().and_then(|exit| exit.to.as_ref());
                if let Some(target) = target {
                    if self.scene(target).is_none() {
                        bail!(
                            "Waypoint '{}' in scene '{}' leads to undeclared scene '{}'",
                            waypoint.id,
                            scene.id,
                            target
                        );
                    }
                }
            }
        }
        Ok(())
    }

    pub fn scene(&self, id: &SceneId) -> Option<&SceneDefinition> {
        self.scenes.iter().find(|scene| &scene.id == id)
    }
}

//! Application configuration with layered loading
//!
//! Configuration is loaded from multiple sources (lowest to highest priority):
//! 1. Compiled defaults
//! 2. `vignette.ron` file (if exists)
//! 3. Environment variables prefixed with `VIGNETTE_`
//!
//! Example environment variable: `VIGNETTE_TRANSITION__FADE_TIME=0.25`

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use vignette_core::{CameraConfig, TransitionSettings};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub transition: TransitionConfig,

    #[serde(default)]
    pub camera: CameraSection,

    #[serde(default)]
    pub runner: RunnerConfig,

    #[serde(default)]
    pub debug: DebugConfig,
}

/// Transition timing and viewport
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionConfig {
    /// Seconds per cross-fade half; slides take twice as long
    pub fade_time: f32,
    /// Viewport width in pixels
    pub viewport_width: f32,
    /// Viewport height in pixels
    pub viewport_height: f32,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            fade_time: 0.5,
            viewport_width: 1280.0,
            viewport_height: 720.0,
        }
    }
}

/// Default camera for scenes that do not declare their own bounds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraSection {
    /// Seek speed in world units per second
    pub speed: f32,
    /// Render scale
    pub zoom: f32,
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Default for CameraSection {
    fn default() -> Self {
        Self {
            speed: 100.0,
            zoom: 1.0,
            min_x: 0.0,
            min_y: 0.0,
            max_x: 1000.0,
            max_y: 1000.0,
        }
    }
}

/// Headless runner settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Simulated frames per second
    pub tick_rate: f32,
    /// Give up on `Settle` after this much simulated time
    pub max_settle_seconds: f32,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60.0,
            max_settle_seconds: 30.0,
        }
    }
}

/// Debug/development settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DebugConfig {
    /// Enable verbose logging
    pub verbose_logging: bool,
}

impl AppConfig {
    /// Load configuration with layered priority:
    /// 1. Compiled defaults (lowest priority)
    /// 2. `vignette.ron` file (if exists)
    /// 3. Environment variables prefixed with `VIGNETTE_` (highest priority)
    pub fn load() -> Result<Self> {
        Self::load_from("vignette")
    }

    /// Same as [`load`](Self::load) with a different config file stem.
    pub fn load_from(file_stem: &str) -> Result<Self> {
        let builder = Config::builder()
            // Layer 1: Compiled defaults
            .set_default("transition.fade_time", 0.5)?
            .set_default("transition.viewport_width", 1280.0)?
            .set_default("transition.viewport_height", 720.0)?
            .set_default("camera.speed", 100.0)?
            .set_default("camera.zoom", 1.0)?
            .set_default("camera.min_x", 0.0)?
            .set_default("camera.min_y", 0.0)?
            .set_default("camera.max_x", 1000.0)?
            .set_default("camera.max_y", 1000.0)?
            .set_default("runner.tick_rate", 60.0)?
            .set_default("runner.max_settle_seconds", 30.0)?
            .set_default("debug.verbose_logging", false)?
            // Layer 2: Config file (optional, won't error if missing)
            .add_source(
                File::with_name(file_stem)
                    .format(config::FileFormat::Ron)
                    .required(false),
            )
            // Layer 3: Environment variables (VIGNETTE_TRANSITION__FADE_TIME, etc.)
            .add_source(Environment::with_prefix("VIGNETTE").separator("__"));

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    pub fn viewport(&self) -> Vec2 {
        Vec2::new(
            self.transition.viewport_width,
            self.transition.viewport_height,
        )
    }

    /// Engine transition settings. Validated by the orchestrator.
    pub fn transition_settings(&self) -> TransitionSettings {
        TransitionSettings {
            fade_time: self.transition.fade_time,
            viewport: self.viewport(),
        }
    }

    /// Engine camera settings. Validated by the camera.
    pub fn camera_config(&self) -> CameraConfig {
        CameraConfig {
            min_bounds: Vec2::new(self.camera.min_x, self.camera.min_y),
            max_bounds: Vec2::new(self.camera.max_x, self.camera.max_y),
            speed: self.camera.speed,
            zoom: self.camera.zoom,
            viewport: self.viewport(),
        }
    }

    /// Seconds per simulated frame.
    pub fn frame_time(&self) -> f32 {
        1.0 / self.runner.tick_rate
    }
}

//! Scenario execution engine

use anyhow::{Context, Result, bail};
use std::time::Instant;
use vignette_core::InputEvent;

use super::actions::ScenarioAction;
use super::content::ScenarioWorld;
use super::definition::ScenarioDefinition;
use super::results::ExecutionReport;
use crate::config::AppConfig;

/// Configuration for scenario executor
#[derive(Debug, Clone)]
pub struct ScenarioExecutorConfig {
    /// Verbose logging
    pub verbose: bool,

    /// Simulated frames per second
    pub tick_rate: f32,

    /// Give up on `Settle` after this much simulated time
    pub max_settle_seconds: f32,
}

impl Default for ScenarioExecutorConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            tick_rate: 60.0,
            max_settle_seconds: 30.0,
        }
    }
}

impl ScenarioExecutorConfig {
    pub fn from_app(config: &AppConfig) -> Self {
        Self {
            verbose: config.debug.verbose_logging,
            tick_rate: config.runner.tick_rate,
            max_settle_seconds: config.runner.max_settle_seconds,
        }
    }
}

/// Executes scenario actions against a fresh [`ScenarioWorld`]
pub struct ScenarioExecutor {
    /// Configuration
    config: ScenarioExecutorConfig,

    /// Current frame counter
    frame_count: usize,

    /// Game time simulated so far
    simulated_seconds: f32,

    /// Action execution log
    log: Vec<String>,
}

impl ScenarioExecutor {
    /// Create new executor with default config
    pub fn new() -> Self {
        Self::with_config(ScenarioExecutorConfig::default())
    }

    /// Create new executor with custom config
    pub fn with_config(config: ScenarioExecutorConfig) -> Self {
        Self {
            config,
            frame_count: 0,
            simulated_seconds: 0.0,
            log: Vec::new(),
        }
    }

    /// Execute a complete scenario
    pub fn execute_scenario(
        &mut self,
        scenario: &ScenarioDefinition,
        app_config: &AppConfig,
    ) -> Result<ExecutionReport> {
        if !(self.config.tick_rate > 0.0) {
            bail!("Tick rate must be positive, got {}", self.config.tick_rate);
        }

        let start_time = Instant::now();
        let mut report = ExecutionReport::new(scenario.name.clone());

        self.log.clear();
        self.frame_count = 0;
        self.simulated_seconds = 0.0;

        self.log(&format!("Starting scenario: {}", scenario.name));
        if !scenario.description.is_empty() {
            self.log(&format!("Description: {}", scenario.description));
        }

        let mut world = ScenarioWorld::build(scenario, app_config)
            .context("Failed to build scenario world")?;
        world
            .orchestrator
            .start(scenario.start.clone())
            .with_context(|| format!("Failed to start in scene '{}'", scenario.start))?;
        self.log(&format!("Started in scene '{}'", scenario.start));

        // Execute main actions
        self.log(&format!("Running {} actions", scenario.actions.len()));
        for (idx, action) in scenario.actions.iter().enumerate() {
            if let Err(e) = self.execute_action(action, &mut world) {
                let msg = format!("Action {} failed: {:#}", idx, e);
                self.log(&msg);
                world.orchestrator.shutdown();
                return Err(anyhow::anyhow!(msg));
            }
        }
        report.actions_executed = scenario.actions.len();

        // Run verifications
        if !scenario.verify.is_empty() {
            self.log(&format!("Running {} verifications", scenario.verify.len()));
            for condition in &scenario.verify {
                let result = condition.evaluate(&world);
                self.log(&format!(
                    "  {} {}",
                    if result.passed { "✓" } else { "✗" },
                    result.message
                ));

                if !result.passed {
                    report.verification_failures.push(result);
                }
            }
        }

        // Finalize report
        report.transitions_completed = world.orchestrator.transitions_completed();
        report.save_failures = world.orchestrator.save_failures();
        world.orchestrator.shutdown();

        report.frames_executed = self.frame_count;
        report.simulated_seconds = self.simulated_seconds;
        report.passed = report.verification_failures.is_empty();
        report.duration_ms = start_time.elapsed().as_secs_f64() * 1000.0;

        self.log(&format!(
            "Scenario complete: {} ({} frames, {:.1}ms)",
            if report.passed { "PASSED" } else { "FAILED" },
            self.frame_count,
            report.duration_ms
        ));
        report.log = self.log.clone();

        Ok(report)
    }

    /// Execute a single action
    fn execute_action(&mut self, action: &ScenarioAction, world: &mut ScenarioWorld) -> Result<()> {
        if self.config.verbose {
            self.log(&format!("[Frame {}] {:?}", self.frame_count, action));
        }

        match action {
            ScenarioAction::Transition {
                to,
                direction,
                expect_failure,
            } => match (world.orchestrator.notify(to.clone(), *direction), *expect_failure) {
                (Ok(()), false) => {
                    self.log(&format!("  Transition to {:?} ({:?}) started", to, direction));
                }
                (Err(e), true) => {
                    self.log(&format!("  Transition to {:?} rejected as expected: {}", to, e));
                }
                (Ok(()), true) => {
                    bail!("Transition to {:?} was expected to fail", to);
                }
                (Err(e), false) => {
                    return Err(e).with_context(|| format!("Transition to {:?} failed", to));
                }
            },

            ScenarioAction::Advance { seconds } => {
                let frames = (seconds * self.config.tick_rate).round().max(0.0) as usize;
                self.simulate_frames(world, frames)?;
                self.log(&format!("  Advanced {} frames", frames));
            }

            ScenarioAction::Settle => {
                let frames = self.settle(world)?;
                self.log(&format!("  Settled after {} frames", frames));
            }

            ScenarioAction::Click { x, y } => {
                let delivered = world
                    .orchestrator
                    .handle_input(&InputEvent::PointerDown { x: *x, y: *y })?;
                world
                    .orchestrator
                    .handle_input(&InputEvent::PointerUp { x: *x, y: *y })?;
                self.log(&format!(
                    "  Clicked ({}, {}){}",
                    x,
                    y,
                    if delivered { "" } else { " - no scene routed" }
                ));
            }

            ScenarioAction::OpenMenu => {
                world.open_menu();
                self.log("  Menu opened");
            }

            ScenarioAction::CancelQuit => {
                if !world.orchestrator.cancel_quit() {
                    bail!("No quit prompt to cancel");
                }
                self.log("  Quit cancelled");
            }

            ScenarioAction::Log { message } => {
                self.log(&format!("  {}", message));
            }
        }

        Ok(())
    }

    /// Simulate frames until no transition is in flight
    fn settle(&mut self, world: &mut ScenarioWorld) -> Result<usize> {
        let max_frames = (self.config.max_settle_seconds * self.config.tick_rate).ceil() as usize;
        for frame in 0..max_frames {
            if !world.orchestrator.is_transitioning() {
                return Ok(frame);
            }
            self.simulate_frames(world, 1)?;
        }
        if world.orchestrator.is_transitioning() {
            bail!(
                "Settle timed out after {} frames in state {:?}",
                max_frames,
                world.orchestrator.state()
            );
        }
        Ok(max_frames)
    }

    /// Simulate N frames
    fn simulate_frames(&mut self, world: &mut ScenarioWorld, frames: usize) -> Result<()> {
        let dt = 1.0 / self.config.tick_rate;
        for _ in 0..frames {
            world.orchestrator.tick(dt)?;
            self.frame_count += 1;
            self.simulated_seconds += dt;
        }
        Ok(())
    }

    fn log(&mut self, message: &str) {
        log::info!("{}", message);
        self.log.push(message.to_string());
    }
}

impl Default for ScenarioExecutor {
    fn default() -> Self {
        Self::new()
    }
}

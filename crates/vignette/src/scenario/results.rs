//! Execution results and reporting

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::verification::VerificationResult;

/// Report from scenario execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionReport {
    /// Scenario name
    pub scenario_name: String,

    /// Timestamp (ISO 8601)
    pub timestamp: String,

    /// Overall pass/fail status
    pub passed: bool,

    /// Total frames simulated
    pub frames_executed: usize,

    /// Game time covered by those frames (seconds)
    pub simulated_seconds: f32,

    /// Number of actions executed
    pub actions_executed: usize,

    /// Transitions that ran to completion
    pub transitions_completed: usize,

    /// Saves that failed during transitions
    pub save_failures: usize,

    /// Verification failures (empty if all passed)
    pub verification_failures: Vec<VerificationResult>,

    /// Execution log messages
    pub log: Vec<String>,

    /// Wall-clock duration (milliseconds)
    pub duration_ms: f64,
}

impl ExecutionReport {
    /// Create new execution report
    pub fn new(scenario_name: String) -> Self {
        Self {
            scenario_name,
            timestamp: chrono::Utc::now().to_rfc3339(),
            passed: false,
            frames_executed: 0,
            simulated_seconds: 0.0,
            actions_executed: 0,
            transitions_completed: 0,
            save_failures: 0,
            verification_failures: Vec::new(),
            log: Vec::new(),
            duration_ms: 0.0,
        }
    }

    /// Check if all verifications passed
    pub fn success(&self) -> bool {
        self.verification_failures.is_empty()
    }

    /// Generate human-readable summary
    pub fn summary(&self) -> String {
        format!(
            "{}: {} | {} frames ({:.2}s simulated) | {} actions | {} transitions | {} failed checks",
            self.scenario_name,
            if self.passed { "PASSED" } else { "FAILED" },
            self.frames_executed,
            self.simulated_seconds,
            self.actions_executed,
            self.transitions_completed,
            self.verification_failures.len()
        )
    }

    /// Save report to RON file
    pub fn save_ron(&self, path: impl AsRef<Path>) -> Result<()> {
        let ron = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .context("Failed to serialize execution report to RON")?;

        // Ensure parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path.as_ref(), ron).with_context(|| {
            format!(
                "Failed to write execution report: {}",
                path.as_ref().display()
            )
        })?;

        Ok(())
    }

    /// Load report from RON file
    pub fn from_ron(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read report file: {}", path.as_ref().display()))?;

        let report = ron::from_str(&content)
            .with_context(|| format!("Failed to parse RON report: {}", path.as_ref().display()))?;

        Ok(report)
    }
}

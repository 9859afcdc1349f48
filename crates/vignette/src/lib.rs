//! # Vignette
//!
//! Application layer over `vignette-core`: layered configuration and a
//! headless scenario runner that drives the orchestrator from RON files.

pub mod config;
pub mod scenario;

pub use config::AppConfig;
pub use scenario::{ExecutionReport, ScenarioDefinition, ScenarioExecutor};

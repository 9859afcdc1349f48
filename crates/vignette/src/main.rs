use anyhow::{Context, bail};
use clap::Parser;
use std::path::PathBuf;
use vignette::scenario::{ScenarioExecutorConfig, describe_vocabulary};
use vignette::{AppConfig, ScenarioDefinition, ScenarioExecutor};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Scenario file (RON) to run headlessly
    scenario: Option<PathBuf>,

    /// Also write the execution report to this path (RON)
    #[arg(long)]
    report: Option<PathBuf>,

    /// List supported scenario actions and verifications
    #[arg(long)]
    list: bool,

    /// Debug logging
    #[arg(long)]
    verbose: bool,

    /// Simulated frames per second (overrides runner.tick_rate)
    #[arg(long)]
    tick_rate: Option<f32>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = AppConfig::load()?;

    let verbose = args.verbose || config.debug.verbose_logging;
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    // Handle --list flag
    if args.list {
        for line in describe_vocabulary() {
            println!("{}", line);
        }
        return Ok(());
    }

    let Some(path) = args.scenario else {
        bail!("No scenario given. Run with <SCENARIO.ron>, or --list for the file vocabulary");
    };

    let scenario = ScenarioDefinition::from_file(&path)?;
    let mut executor_config = ScenarioExecutorConfig::from_app(&config);
    executor_config.verbose = verbose;
    if let Some(tick_rate) = args.tick_rate {
        executor_config.tick_rate = tick_rate;
    }

    log::info!("Running scenario {}", path.display());
    let mut executor = ScenarioExecutor::with_config(executor_config);
    let report = executor
        .execute_scenario(&scenario, &config)
        .with_context(|| format!("Scenario '{}' aborted", scenario.name))?;

    if let Some(report_path) = &args.report {
        report.save_ron(report_path)?;
        log::info!("Report written to {}", report_path.display());
    }

    println!("{}", report.summary());
    for failure in &report.verification_failures {
        println!("  ✗ {}", failure.message);
    }

    if !report.passed {
        std::process::exit(1);
    }
    Ok(())
}

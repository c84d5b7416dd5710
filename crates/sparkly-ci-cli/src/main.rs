//! sparkly CI - command line front end
//!
//! The `ci-run` command drives the sparkly CI gate.
//!
//! ## Commands
//!
//! - `run`: build docs, run tests, and on nightly compile and run benchmarks
//! - `plan`: print the stages `run` would execute, without running them

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use sparkly_ci::{
    plan, CargoRunner, CiConfig, CiPipeline, PipelineResult, StageConfig, Toolchain,
};
use std::path::PathBuf;
use tracing::{info, Level};

#[derive(Parser, Debug)]
#[command(name = "ci-run")]
#[command(author = "sparkly developers")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "CI gate for sparkly: docs, tests and nightly benchmarks", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines and summary
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the CI stages, stopping at the first failure
    Run(RunArgs),

    /// Show the stages a run would execute
    Plan(RunArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Workspace path (default: current directory)
    #[arg(short, long, default_value = ".")]
    workspace: PathBuf,

    /// Benchmarks directory, relative to the workspace
    #[arg(long, default_value = "benches")]
    benches_dir: PathBuf,

    /// Build tool to invoke [default: $CARGO, else cargo]
    #[arg(long)]
    cargo: Option<String>,

    /// Toolchain the job runs on; "nightly" enables benchmarks
    /// [default: $TRAVIS_RUST_VERSION]
    #[arg(long)]
    toolchain: Option<String>,

    /// Per-stage timeout in seconds (0 = none)
    #[arg(long, default_value = "0")]
    timeout_secs: u64,
}

impl RunArgs {
    /// Layer the flags the user passed over `base` (normally the environment).
    fn apply(&self, base: CiConfig) -> CiConfig {
        let mut config = base
            .with_workspace(&self.workspace)
            .with_benches_dir(&self.benches_dir)
            .with_timeout_secs(self.timeout_secs);
        if let Some(toolchain) = &self.toolchain {
            config = config.with_toolchain(Toolchain::from_value(Some(toolchain.as_str())));
        }
        if let Some(cargo) = self.cargo.as_deref().filter(|c| !c.is_empty()) {
            config = config.with_cargo(cargo);
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    sparkly_ci::init_tracing(cli.json, level);

    match cli.command {
        Commands::Run(args) => cmd_run(&args.apply(CiConfig::from_env()), cli.json).await,
        Commands::Plan(args) => cmd_plan(&args.apply(CiConfig::from_env()), cli.json),
    }
}

/// Run the pipeline and print a summary
async fn cmd_run(config: &CiConfig, json: bool) -> Result<()> {
    info!(workspace = ?config.workspace, toolchain = %config.toolchain, "Running CI");

    let runner = CargoRunner::new(&config.workspace);
    let result = CiPipeline::run(&runner, config)
        .await
        .context("CI run aborted")?;

    print_summary(&result, json)
}

fn print_summary(result: &PipelineResult, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    println!();
    println!("Run ID: {}", result.run_id);
    println!("Toolchain: {}", result.toolchain);
    println!("Status: ✓ PASSED");
    println!("Duration: {}ms", result.duration_ms);
    for stage in &result.stages {
        println!("  ✓ {} ({}ms)", stage.command, stage.duration_ms);
    }
    Ok(())
}

/// Print the plan without running anything
fn cmd_plan(config: &CiConfig, json: bool) -> Result<()> {
    let stages: Vec<StageConfig> = plan::full_plan(config).context("Failed to build CI plan")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stages)?);
        return Ok(());
    }

    println!("Toolchain: {}", config.toolchain);
    for (i, stage) in stages.iter().enumerate() {
        println!("  {}. {}", i + 1, stage.command_line());
    }
    Ok(())
}

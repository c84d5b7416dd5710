//! CI pipeline orchestration.

use crate::config::{CiConfig, Toolchain};
use crate::error::{CiError, Result};
use crate::plan;
use crate::runner::{StageResult, StageRunner};
use crate::stage::{StageConfig, StageKind};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Instant;
use tracing::{error, info};
use uuid::Uuid;

/// Result of a complete, successful CI pipeline execution.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    /// Identifier used to correlate this run's log lines.
    pub run_id: String,

    /// When the run started.
    pub started_at: DateTime<Utc>,

    /// Toolchain the run was planned for.
    pub toolchain: Toolchain,

    /// Results of individual stages, in execution order.
    pub stages: Vec<StageResult>,

    /// Total duration in milliseconds.
    pub duration_ms: u64,
}

impl PipelineResult {
    /// Number of stages that ran.
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Whether the bench stages were part of this run.
    pub fn ran_benches(&self) -> bool {
        self.stages.iter().any(|s| s.kind == StageKind::Bench)
    }
}

/// CI pipeline orchestrator.
pub struct CiPipeline;

impl CiPipeline {
    /// Run the gate: `doc --all`, `test --all`, then on nightly each bench
    /// target followed by `bench`.
    ///
    /// Stops at the first stage that does not pass. The benches directory is
    /// only listed once the core stages have passed on a nightly toolchain.
    pub async fn run(runner: &dyn StageRunner, config: &CiConfig) -> Result<PipelineResult> {
        let start = Instant::now();
        let started_at = Utc::now();
        let run_id = Uuid::new_v4().to_string();

        info!(run_id = %run_id, toolchain = %config.toolchain, "Starting CI pipeline");

        let mut stage_results = Vec::new();

        run_stages(runner, &plan::core_stages(config), &mut stage_results).await?;

        if config.toolchain.is_nightly() {
            let bench_stages = plan::bench_stages(config)?;
            info!(count = bench_stages.len() - 1, "Running bench targets");
            run_stages(runner, &bench_stages, &mut stage_results).await?;
        } else {
            info!(toolchain = %config.toolchain, "Not nightly, skipping benches");
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        info!(run_id = %run_id, duration_ms, "CI pipeline completed successfully");

        Ok(PipelineResult {
            run_id,
            started_at,
            toolchain: config.toolchain.clone(),
            stages: stage_results,
            duration_ms,
        })
    }
}

async fn run_stages(
    runner: &dyn StageRunner,
    stages: &[StageConfig],
    results: &mut Vec<StageResult>,
) -> Result<()> {
    for config in stages {
        info!(stage = %config.name(), command = %config.command_line(), "Executing stage");

        let result = runner.run_stage(config).await.map_err(|e| {
            error!(stage = %config.name(), error = %e, "Stage could not run");
            e
        })?;

        if !result.passed() {
            error!(
                stage = %result.stage_name,
                exit_code = ?result.exit_code,
                duration_ms = result.duration_ms,
                "Stage failed, aborting"
            );
            return Err(CiError::StageFailed {
                stage: result.stage_name,
                command: result.command,
                exit_code: result.exit_code,
            });
        }

        info!(stage = %result.stage_name, duration_ms = result.duration_ms, "Stage passed");
        results.push(result);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::ScriptedRunner;

    #[tokio::test]
    async fn test_stable_runs_core_stages_only() {
        let runner = ScriptedRunner::new();
        let config = CiConfig::default().with_toolchain(Toolchain::Other(Some("stable".into())));

        let result = CiPipeline::run(&runner, &config).await.unwrap();
        assert_eq!(runner.invocations(), vec!["doc --all", "test --all"]);
        assert_eq!(result.stage_count(), 2);
        assert!(!result.ran_benches());
        assert!(!result.run_id.is_empty());
    }

    #[tokio::test]
    async fn test_first_failure_stops_run() {
        let runner = ScriptedRunner::new().failing("doc --all", 101);

        let err = CiPipeline::run(&runner, &CiConfig::default())
            .await
            .unwrap_err();
        assert_eq!(runner.invocations(), vec!["doc --all"]);
        match err {
            CiError::StageFailed {
                stage, exit_code, ..
            } => {
                assert_eq!(stage, "cargo_doc");
                assert_eq!(exit_code, Some(101));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_run_stages_collects_in_order() {
        let runner = ScriptedRunner::new();
        let stages = vec![
            StageConfig::from_kind(StageKind::Test, "cargo", 0),
            StageConfig::from_kind(StageKind::Doc, "cargo", 0),
        ];
        let mut results = Vec::new();

        run_stages(&runner, &stages, &mut results).await.unwrap();
        assert_eq!(runner.invocations(), vec!["test --all", "doc --all"]);
        let kinds: Vec<_> = results.iter().map(|r| r.kind.clone()).collect();
        assert_eq!(kinds, vec![StageKind::Test, StageKind::Doc]);
    }

    #[test]
    fn test_ran_benches_matches_kind() {
        let mut result = PipelineResult {
            run_id: "run123".to_string(),
            started_at: Utc::now(),
            toolchain: Toolchain::Nightly,
            stages: vec![StageResult::for_stage(
                &StageConfig::from_kind(StageKind::BenchTarget("cargo_bench".into()), "cargo", 0),
                Some(0),
                10,
            )],
            duration_ms: 10,
        };
        assert!(!result.ran_benches());

        result.stages.push(StageResult::for_stage(
            &StageConfig::from_kind(StageKind::Bench, "cargo", 0),
            Some(0),
            10,
        ));
        assert!(result.ran_benches());
    }

    #[test]
    fn test_pipeline_result_serializes() {
        let result = PipelineResult {
            run_id: "run123".to_string(),
            started_at: Utc::now(),
            toolchain: Toolchain::Nightly,
            stages: vec![StageResult::for_stage(
                &StageConfig::from_kind(StageKind::Bench, "cargo", 0),
                Some(0),
                10,
            )],
            duration_ms: 10,
        };

        assert!(result.ran_benches());
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["toolchain"], "nightly");
        assert_eq!(json["stages"][0]["command"], "cargo bench");
    }
}

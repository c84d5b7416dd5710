//! CI stage execution.

use crate::error::{CiError, Result};
use crate::stage::{StageConfig, StageKind};
use async_trait::async_trait;
use serde::Serialize;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::debug;

/// Result of a stage execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageResult {
    /// Which invocation ran.
    pub kind: StageKind,

    /// Stage name.
    pub stage_name: String,

    /// Command line that was run.
    pub command: String,

    /// Exit code (`None` if the process was killed by a signal).
    pub exit_code: Option<i32>,

    /// Duration in milliseconds.
    pub duration_ms: u64,

    /// Whether execution succeeded.
    pub success: bool,
}

impl StageResult {
    /// Build a result for `config` from how its process ended.
    pub fn for_stage(config: &StageConfig, exit_code: Option<i32>, duration_ms: u64) -> Self {
        Self {
            kind: config.kind.clone(),
            stage_name: config.name(),
            command: config.command_line(),
            exit_code,
            duration_ms,
            success: exit_code == Some(0),
        }
    }

    /// Whether this stage passed (exit code 0).
    pub fn passed(&self) -> bool {
        self.success && self.exit_code == Some(0)
    }
}

/// Something that can run a stage to completion.
///
/// Implementations block (asynchronously) until the stage has finished.
#[async_trait]
pub trait StageRunner: Send + Sync {
    async fn run_stage(&self, config: &StageConfig) -> Result<StageResult>;
}

/// Runs stages as child processes that share this process's stdio.
#[derive(Debug, Clone)]
pub struct CargoRunner {
    working_dir: PathBuf,
}

impl CargoRunner {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
        }
    }
}

impl Default for CargoRunner {
    fn default() -> Self {
        Self::new(".")
    }
}

#[async_trait]
impl StageRunner for CargoRunner {
    async fn run_stage(&self, config: &StageConfig) -> Result<StageResult> {
        if config.program.is_empty() {
            return Err(CiError::EmptyCommand(config.name()));
        }

        let start = Instant::now();
        debug!(stage = %config.name(), dir = %self.working_dir.display(), "Spawning");

        let mut child = Command::new(&config.program)
            .args(&config.args)
            .current_dir(&self.working_dir)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| CiError::Spawn {
                program: config.program.clone(),
                source,
            })?;

        let status = if config.timeout_secs > 0 {
            let waited =
                tokio::time::timeout(Duration::from_secs(config.timeout_secs), child.wait()).await;
            match waited {
                Ok(status) => status?,
                Err(_) => {
                    child.kill().await.ok();
                    return Err(CiError::Timeout {
                        stage: config.name(),
                        timeout_secs: config.timeout_secs,
                    });
                }
            }
        } else {
            child.wait().await?
        };

        Ok(StageResult::for_stage(
            config,
            status.code(),
            start.elapsed().as_millis() as u64,
        ))
    }
}

//! In-memory stage runner (testing only)
//!
//! `ScriptedRunner` records every stage it is asked to run and reports
//! success unless the stage's arguments were marked as failing.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::Result;
use crate::runner::{StageResult, StageRunner};
use crate::stage::StageConfig;

/// Records invocations instead of spawning processes.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    calls: Mutex<Vec<StageConfig>>,
    failures: HashMap<String, i32>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the stage whose arguments join to `args` (e.g. `"test --all"`)
    /// exit with `exit_code`.
    pub fn failing(mut self, args: &str, exit_code: i32) -> Self {
        self.failures.insert(args.to_string(), exit_code);
        self
    }

    /// Every stage run so far, in order.
    pub fn calls(&self) -> Vec<StageConfig> {
        self.calls.lock().unwrap().clone()
    }

    /// Arguments of every stage run so far, joined with spaces.
    pub fn invocations(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.args_line())
            .collect()
    }
}

#[async_trait]
impl StageRunner for ScriptedRunner {
    async fn run_stage(&self, config: &StageConfig) -> Result<StageResult> {
        self.calls.lock().unwrap().push(config.clone());

        let exit_code = self
            .failures
            .get(&config.args_line())
            .copied()
            .unwrap_or(0);

        Ok(StageResult::for_stage(config, Some(exit_code), 0))
    }
}

//! Error types for sparkly-ci

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a CI run.
#[derive(Error, Debug)]
pub enum CiError {
    /// A stage's process exited with a non-zero status
    #[error("Stage '{stage}' failed: `{command}` exited with {}", describe_exit(.exit_code))]
    StageFailed {
        stage: String,
        command: String,
        exit_code: Option<i32>,
    },

    /// The build tool could not be started
    #[error("Failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// A stage ran longer than its configured timeout
    #[error("Stage '{stage}' timed out after {timeout_secs} seconds")]
    Timeout { stage: String, timeout_secs: u64 },

    /// The benchmarks directory could not be listed
    #[error("Failed to list benches directory {path:?}: {source}")]
    BenchesDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Stage has no program to run
    #[error("Stage {0} has empty command")]
    EmptyCommand(String),

    /// IO error while waiting on a child
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn describe_exit(exit_code: &Option<i32>) -> String {
    match exit_code {
        Some(code) => format!("code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

/// Result type for sparkly-ci operations
pub type Result<T> = std::result::Result<T, CiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_failed_message() {
        let err = CiError::StageFailed {
            stage: "cargo_test".to_string(),
            command: "cargo test --all".to_string(),
            exit_code: Some(101),
        };
        assert_eq!(
            err.to_string(),
            "Stage 'cargo_test' failed: `cargo test --all` exited with code 101"
        );
    }

    #[test]
    fn test_signal_exit_message() {
        let err = CiError::StageFailed {
            stage: "cargo_bench".to_string(),
            command: "cargo bench".to_string(),
            exit_code: None,
        };
        assert!(err.to_string().contains("terminated by signal"));
    }
}

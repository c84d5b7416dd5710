//! CI stage definitions and configuration.

use serde::{Serialize, Serializer};
use std::ffi::OsString;

/// The cargo invocations the gate knows how to run.
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    /// cargo doc --all
    Doc,

    /// cargo test --all
    Test,

    /// cargo test --bench <name>
    ///
    /// The name is kept as raw OS string so it reaches cargo byte for byte.
    BenchTarget(#[serde(serialize_with = "serialize_lossy")] OsString),

    /// cargo bench
    Bench,
}

impl StageKind {
    /// Get the stage name as a string.
    pub fn name(&self) -> String {
        match self {
            StageKind::Doc => "cargo_doc".to_string(),
            StageKind::Test => "cargo_test".to_string(),
            StageKind::BenchTarget(bench) => {
                format!("cargo_test_bench_{}", bench.to_string_lossy())
            }
            StageKind::Bench => "cargo_bench".to_string(),
        }
    }

    /// Arguments passed to the build tool, without the program itself.
    pub fn args(&self) -> Vec<OsString> {
        match self {
            StageKind::Doc => vec!["doc".into(), "--all".into()],
            StageKind::Test => vec!["test".into(), "--all".into()],
            StageKind::BenchTarget(bench) => vec!["test".into(), "--bench".into(), bench.clone()],
            StageKind::Bench => vec!["bench".into()],
        }
    }
}

/// Configuration for a CI stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageConfig {
    /// Which invocation this is.
    pub kind: StageKind,

    /// Executable to run.
    pub program: String,

    /// Arguments to the executable.
    #[serde(serialize_with = "serialize_lossy_seq")]
    pub args: Vec<OsString>,

    /// Timeout in seconds (0 = wait forever).
    pub timeout_secs: u64,
}

impl StageConfig {
    /// Create a stage configuration for one of the known cargo invocations.
    pub fn from_kind(kind: StageKind, program: &str, timeout_secs: u64) -> Self {
        Self {
            args: kind.args(),
            kind,
            program: program.to_string(),
            timeout_secs,
        }
    }

    /// Human-readable stage name.
    pub fn name(&self) -> String {
        self.kind.name()
    }

    /// Arguments joined with spaces, lossily decoded.
    pub fn args_line(&self) -> String {
        join_lossy(&self.args)
    }

    /// The full command line, for logs and error messages.
    pub fn command_line(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args_line())
        }
    }
}

fn join_lossy(parts: &[OsString]) -> String {
    parts
        .iter()
        .map(|p| p.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}

fn serialize_lossy<S: Serializer>(value: &OsString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_string_lossy())
}

#[allow(clippy::ptr_arg)]
fn serialize_lossy_seq<S: Serializer>(
    values: &Vec<OsString>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(values.iter().map(|v| v.to_string_lossy()))
}

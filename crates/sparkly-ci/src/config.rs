//! Run configuration: which toolchain we are on and where things live.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming the toolchain the CI job runs on.
pub const TOOLCHAIN_ENV: &str = "TRAVIS_RUST_VERSION";

/// Environment variable overriding the build tool program.
pub const CARGO_ENV: &str = "CARGO";

/// Toolchain value that enables the benchmark stages.
pub const NIGHTLY: &str = "nightly";

/// Toolchain the job is running on, as reported by the CI environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Toolchain {
    Nightly,
    /// Any other value, or `None` when the variable is unset.
    Other(Option<String>),
}

impl Toolchain {
    /// Classify a raw `TRAVIS_RUST_VERSION` value.
    ///
    /// Only an exact match on `"nightly"` counts; dated nightlies and
    /// differently-cased values do not.
    pub fn from_value(value: Option<&str>) -> Self {
        match value {
            Some(NIGHTLY) => Toolchain::Nightly,
            other => Toolchain::Other(other.map(str::to_string)),
        }
    }

    pub fn is_nightly(&self) -> bool {
        matches!(self, Toolchain::Nightly)
    }
}

impl std::fmt::Display for Toolchain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Toolchain::Nightly => f.write_str(NIGHTLY),
            Toolchain::Other(Some(value)) => f.write_str(value),
            Toolchain::Other(None) => f.write_str("unset"),
        }
    }
}

/// Configuration for one CI run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CiConfig {
    pub toolchain: Toolchain,

    /// Directory the build tool runs in.
    pub workspace: PathBuf,

    /// Benchmarks directory, relative to `workspace` unless absolute.
    pub benches_dir: PathBuf,

    /// Build tool program.
    pub cargo: String,

    /// Per-stage timeout in seconds (0 = none).
    pub timeout_secs: u64,
}

impl Default for CiConfig {
    fn default() -> Self {
        Self {
            toolchain: Toolchain::Other(None),
            workspace: PathBuf::from("."),
            benches_dir: PathBuf::from("benches"),
            cargo: "cargo".to_string(),
            timeout_secs: 0,
        }
    }
}

impl CiConfig {
    /// Build a configuration from `TRAVIS_RUST_VERSION` and `CARGO`.
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var(TOOLCHAIN_ENV).ok().as_deref(),
            std::env::var(CARGO_ENV).ok().as_deref(),
        )
    }

    /// Build a configuration from raw toolchain and cargo values.
    ///
    /// An unset or empty `cargo` falls back to `cargo`.
    pub fn from_vars(toolchain: Option<&str>, cargo: Option<&str>) -> Self {
        let mut config = Self {
            toolchain: Toolchain::from_value(toolchain),
            ..Self::default()
        };
        if let Some(cargo) = cargo.filter(|c| !c.is_empty()) {
            config.cargo = cargo.to_string();
        }
        config
    }

    pub fn with_toolchain(mut self, toolchain: Toolchain) -> Self {
        self.toolchain = toolchain;
        self
    }

    pub fn with_workspace(mut self, workspace: impl Into<PathBuf>) -> Self {
        self.workspace = workspace.into();
        self
    }

    pub fn with_benches_dir(mut self, benches_dir: impl Into<PathBuf>) -> Self {
        self.benches_dir = benches_dir.into();
        self
    }

    pub fn with_cargo(mut self, cargo: impl Into<String>) -> Self {
        self.cargo = cargo.into();
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Benchmarks directory resolved against the workspace.
    pub fn benches_path(&self) -> PathBuf {
        resolve(&self.workspace, &self.benches_dir)
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toolchain_exact_match() {
        assert!(Toolchain::from_value(Some("nightly")).is_nightly());
        assert!(!Toolchain::from_value(Some("stable")).is_nightly());
        assert!(!Toolchain::from_value(Some("Nightly")).is_nightly());
        assert!(!Toolchain::from_value(Some("nightly-2018-01-01")).is_nightly());
        assert!(!Toolchain::from_value(Some("")).is_nightly());
        assert!(!Toolchain::from_value(None).is_nightly());
    }

    #[test]
    fn test_toolchain_display() {
        assert_eq!(Toolchain::Nightly.to_string(), "nightly");
        assert_eq!(
            Toolchain::Other(Some("beta".to_string())).to_string(),
            "beta"
        );
        assert_eq!(Toolchain::Other(None).to_string(), "unset");
    }

    #[test]
    fn test_default_config() {
        let config = CiConfig::default();
        assert!(!config.toolchain.is_nightly());
        assert_eq!(config.cargo, "cargo");
        assert_eq!(config.timeout_secs, 0);
        assert_eq!(config.benches_path(), PathBuf::from("./benches"));
    }

    #[test]
    fn test_from_vars_unset() {
        let config = CiConfig::from_vars(None, None);
        assert_eq!(config, CiConfig::default());
    }

    #[test]
    fn test_from_vars_empty_cargo_falls_back() {
        let config = CiConfig::from_vars(Some("nightly"), Some(""));
        assert_eq!(config.cargo, "cargo");
        assert!(config.toolchain.is_nightly());
    }

    #[test]
    fn test_from_vars_empty_toolchain_is_not_nightly() {
        let config = CiConfig::from_vars(Some(""), Some("/opt/rust/bin/cargo"));
        assert_eq!(config.toolchain, Toolchain::Other(Some(String::new())));
        assert_eq!(config.cargo, "/opt/rust/bin/cargo");
    }

    #[test]
    fn test_benches_path_resolution() {
        let config = CiConfig::default()
            .with_workspace("/work/sparkly")
            .with_benches_dir("perf");
        assert_eq!(config.benches_path(), PathBuf::from("/work/sparkly/perf"));

        let config = config.with_benches_dir("/elsewhere/benches");
        assert_eq!(config.benches_path(), PathBuf::from("/elsewhere/benches"));
    }

    #[test]
    fn test_builder_setters() {
        let config = CiConfig::default()
            .with_toolchain(Toolchain::Nightly)
            .with_cargo("/opt/cargo")
            .with_timeout_secs(600);
        assert!(config.toolchain.is_nightly());
        assert_eq!(config.cargo, "/opt/cargo");
        assert_eq!(config.timeout_secs, 600);
    }
}

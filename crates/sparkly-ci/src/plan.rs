//! Stage planning: which cargo invocations a run performs, in order.

use crate::config::CiConfig;
use crate::error::{CiError, Result};
use crate::stage::{StageConfig, StageKind};
use std::ffi::{OsStr, OsString};
use std::path::Path;
use tracing::debug;

/// Derive a bench target name from an entry in the benches directory.
///
/// Strips one trailing `.rs`; anything else is returned unchanged. Works on
/// the raw OS string, so names that are not valid UTF-8 survive intact.
pub fn bench_name(file_name: impl AsRef<OsStr>) -> OsString {
    let path = Path::new(file_name.as_ref());
    match (path.extension(), path.file_stem()) {
        (Some(ext), Some(stem)) if ext == "rs" => stem.to_os_string(),
        _ => file_name.as_ref().to_os_string(),
    }
}

/// List bench target names in `dir` (non-recursive), sorted.
///
/// Every entry counts, files and directories alike. A missing directory is
/// an error, never an empty list.
pub fn bench_targets(dir: &Path) -> Result<Vec<OsString>> {
    let entries = std::fs::read_dir(dir).map_err(|source| CiError::BenchesDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| CiError::BenchesDir {
            path: dir.to_path_buf(),
            source,
        })?;
        names.push(bench_name(entry.file_name()));
    }
    names.sort();

    debug!(dir = %dir.display(), count = names.len(), "Listed bench targets");
    Ok(names)
}

/// `doc --all` then `test --all`.
pub fn core_stages(config: &CiConfig) -> Vec<StageConfig> {
    [StageKind::Doc, StageKind::Test]
        .into_iter()
        .map(|kind| StageConfig::from_kind(kind, &config.cargo, config.timeout_secs))
        .collect()
}

/// One `test --bench <name>` per benches entry, then a trailing `bench`.
pub fn bench_stages(config: &CiConfig) -> Result<Vec<StageConfig>> {
    let mut stages: Vec<StageConfig> = bench_targets(&config.benches_path())?
        .into_iter()
        .map(|name| {
            StageConfig::from_kind(
                StageKind::BenchTarget(name),
                &config.cargo,
                config.timeout_secs,
            )
        })
        .collect();
    stages.push(StageConfig::from_kind(
        StageKind::Bench,
        &config.cargo,
        config.timeout_secs,
    ));
    Ok(stages)
}

/// Every stage a run with `config` would execute, assuming all pass.
pub fn full_plan(config: &CiConfig) -> Result<Vec<StageConfig>> {
    let mut stages = core_stages(config);
    if config.toolchain.is_nightly() {
        stages.extend(bench_stages(config)?);
    }
    Ok(stages)
}

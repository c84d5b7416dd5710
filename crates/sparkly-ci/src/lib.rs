//! sparkly-ci - the sparkly CI gate
//!
//! Runs cargo the way the sparkly CI job needs it:
//! - `cargo doc --all` and `cargo test --all` on every toolchain
//! - on nightly, `cargo test --bench <name>` for each entry in `benches/`,
//!   then `cargo bench`
//!
//! The run stops at the first stage that fails.

pub mod config;
pub mod error;
pub mod fakes;
pub mod pipeline;
pub mod plan;
pub mod runner;
pub mod stage;
pub mod telemetry;

// Re-export key types
pub use config::{CiConfig, Toolchain};
pub use error::{CiError, Result};
pub use pipeline::{CiPipeline, PipelineResult};
pub use plan::{bench_name, bench_targets};
pub use runner::{CargoRunner, StageResult, StageRunner};
pub use stage::{StageConfig, StageKind};
pub use telemetry::init_tracing;

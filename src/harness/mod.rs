//! Toolchain validation harness
//!
//! Drives the compiler under test through a staged build pipeline for every allow-listed test program, runs the
//! resulting executable, and compares its exit code with the expected one.
//!
//! ## Flow
//!
//! ```text
//! EnvironmentBootstrapper -> discover_test_files -> TestSelector
//!     -> Pipeline (PipelinePlanner + StageRunner + verify_exit_code) -> TestReporter
//! ```
//!
//! ## Modules
//!
//! - `config` - `HarnessConfig`, `FADORS_*` environment overrides
//! - `environment` - captured environment and the bootstrap script
//! - `manifest` - allow-lists (built-in corpus or manifest file)
//! - `select` - discovery and selection
//! - `plan` - per-mode stage plans
//! - `runner` - the process boundary (`StageRunner`)
//! - `pipeline` - stage execution and classification
//! - `verify` - exit code comparison
//! - `report` - console and JSON reporters

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod config;
pub mod environment;
pub mod error;
pub mod manifest;
pub mod model;
pub mod pipeline;
pub mod plan;
pub mod report;
pub mod runner;
pub mod select;
pub mod verify;

pub use config::{HarnessConfig, SkipPolicy, Toolchain};
pub use environment::{Environment, EnvironmentBootstrapper};
pub use error::{HarnessError, HarnessResult};
pub use manifest::{AllowList, ManifestError};
pub use model::{FailReason, StageOutcome, StageStatus, TestCase, TestResult, Verdict};
pub use pipeline::Pipeline;
pub use report::{ConsoleReporter, JsonReporter, RunReport, TestReporter};
pub use runner::{Invocation, ProcessStageRunner, StageRun, StageRunner};
pub use select::{TestSelector, discover_test_files};
pub use verify::verify_exit_code;

//! Provide the shared, pure vocabulary of the fadors toolchain harness.
//!
//! This crate is intentionally small and dependency-free. It holds the pieces of the harness that are plain data
//! or plain arithmetic, so they can be tested (and fuzzed) without spawning a single process:
//! - the ordered set of pipeline stages ([`stage`]),
//! - exit-status normalization ([`exit_code`]),
//! - artifact naming by extension substitution ([`naming`]),
//! - the built-in allow-list of test programs and their expected exit codes ([`corpus`]).
//!
//! ## Notes
//!
//! - **No process spawning, no global state.** Filesystem access is limited to path manipulation; nothing here
//!   reads or writes files.
//! - The harness crate (`fadors_harness`) owns all I/O and policy decisions.

pub mod corpus;
pub mod exit_code;
pub mod naming;
pub mod stage;

pub use corpus::{CORPUS, CorpusEntry};
pub use exit_code::{STATUS_ACCESS_VIOLATION, normalize, parse_status};
pub use naming::ArtifactPaths;
pub use stage::{PipelineMode, StageKind};

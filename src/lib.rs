#![forbid(unsafe_code)]
//! fadors Toolchain Validation Harness
//!
//! Validates the fadors C compiler end to end: each allow-listed test program is compiled, assembled, linked and
//! executed inside a bootstrapped toolchain environment, and its exit code is compared against the expected value.
//! The pure vocabulary (stages, exit-code normalization, artifact naming, the built-in corpus) lives in
//! `fadors_core`; this crate owns process execution, policy and reporting.
//!
//! ## Panic Policy
//!
//! This codebase follows explicit error handling:
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` and `harness` modules
//!   enforce `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//!
//! - **Per-test failures are data**: a stage that fails ends that test with a `Verdict::Fail`; only startup problems
//!   (`HarnessError`) abort a run.

pub mod cli;
pub mod harness;
pub mod version;

pub use harness::{HarnessConfig, Pipeline, RunReport, TestResult, Verdict};

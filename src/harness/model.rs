//! Test cases, stage outcomes and verdicts
//!
//! A [`TestResult`] is built incrementally while a test's stages run and is finalized by exactly one terminal
//! [`Verdict`]. Stage outcomes are stored in execution order, which is always `StageKind` order.

use std::path::{Path, PathBuf};
use std::time::Duration;

use fadors_core::{ArtifactPaths, StageKind};
use thiserror::Error;

/// One test program, its expected exit code and the artifacts it produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    /// Source basename, used as the test's display name
    pub name: String,
    pub source: PathBuf,
    pub expected_exit_code: i32,
    pub artifacts: ArtifactPaths,
}

impl TestCase {
    pub fn new(source: impl Into<PathBuf>, expected_exit_code: i32) -> Self {
        let source = source.into();
        let name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| source.display().to_string());
        let artifacts = ArtifactPaths::from_source(&source);
        Self {
            name,
            source,
            expected_exit_code,
            artifacts,
        }
    }
}

/// How a single stage ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageStatus {
    Success,
    /// The tool could not be located at all
    ToolMissing,
    NonZeroExit(i32),
    /// The stage ran but its expected output file is absent
    ArtifactMissing(PathBuf),
    /// Execute stage only: the program returned the wrong code
    Mismatch { expected: i32, actual: i32 },
    /// The tool exists but could not be started (permissions, bad image, ...)
    LaunchFailed(String),
    Signaled(i32),
    TimedOut(Duration),
}

/// Result of one stage invocation.
///
/// Captured output is kept only when the stage did not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageOutcome {
    pub kind: StageKind,
    pub status: StageStatus,
    pub stdout: String,
    pub stderr: String,
}

impl StageOutcome {
    pub fn new(kind: StageKind, status: StageStatus) -> Self {
        Self {
            kind,
            status,
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    /// Attach captured output, dropping it again if the stage succeeded.
    pub fn with_output(mut self, stdout: String, stderr: String) -> Self {
        if !self.is_success() {
            self.stdout = stdout;
            self.stderr = stderr;
        }
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == StageStatus::Success
    }
}

/// Why a test failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailReason {
    #[error("{stage} tool `{tool}` not found")]
    ToolMissing { stage: StageKind, tool: String },

    #[error("{stage} did not produce {}", path.display())]
    ArtifactMissing { stage: StageKind, path: PathBuf },

    #[error("{stage} exited with status {code}")]
    NonZeroExit { stage: StageKind, code: i32 },

    #[error("expected exit code {expected}, got {actual}")]
    Mismatch { expected: i32, actual: i32 },

    #[error("{stage} could not be started: {message}")]
    Launch { stage: StageKind, message: String },

    #[error("{stage} terminated by signal {signal}")]
    Signaled { stage: StageKind, signal: i32 },

    #[error("{stage} timed out after {}s", after.as_secs())]
    TimedOut { stage: StageKind, after: Duration },
}

impl FailReason {
    /// Stage the failure happened in.
    pub fn stage(&self) -> StageKind {
        match self {
            FailReason::ToolMissing { stage, .. }
            | FailReason::ArtifactMissing { stage, .. }
            | FailReason::NonZeroExit { stage, .. }
            | FailReason::Launch { stage, .. }
            | FailReason::Signaled { stage, .. }
            | FailReason::TimedOut { stage, .. } => *stage,
            FailReason::Mismatch { .. } => StageKind::Execute,
        }
    }

    /// Compact form for the summary table, e.g. `Comp`, `EXE missing`, `Got 3`.
    pub fn short(&self) -> String {
        match self {
            FailReason::ToolMissing { stage, .. } => format!("{} tool missing", stage.label()),
            FailReason::ArtifactMissing { path, .. } => format!("{} missing", artifact_label(path)),
            FailReason::NonZeroExit { stage, .. } => stage.label().to_string(),
            FailReason::Mismatch { actual, .. } => format!("Got {actual}"),
            FailReason::Launch { stage, .. } => format!("{} launch error", stage.label()),
            FailReason::Signaled { signal, .. } => format!("Signal {signal}"),
            FailReason::TimedOut { stage, .. } => format!("{} timeout", stage.label()),
        }
    }
}

fn artifact_label(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_uppercase())
        .unwrap_or_else(|| "artifact".to_string())
}

/// Terminal verdict of one test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    /// An optional tool was unavailable; earlier stages succeeded
    Skip(String),
    Fail(FailReason),
}

/// Everything recorded about one test.
#[derive(Debug, Clone)]
pub struct TestResult {
    pub case: TestCase,
    pub outcomes: Vec<StageOutcome>,
    pub verdict: Verdict,
    pub duration: Duration,
}

impl TestResult {
    pub fn is_pass(&self) -> bool {
        self.verdict == Verdict::Pass
    }

    pub fn is_skip(&self) -> bool {
        matches!(self.verdict, Verdict::Skip(_))
    }

    pub fn is_fail(&self) -> bool {
        matches!(self.verdict, Verdict::Fail(_))
    }

    /// Status column of the summary table: `PASS`, `SKIP (ml64 not found)`, `FAIL (Got 3)`.
    pub fn status_label(&self) -> String {
        match &self.verdict {
            Verdict::Pass => "PASS".to_string(),
            Verdict::Skip(reason) => format!("SKIP ({reason})"),
            Verdict::Fail(reason) => format!("FAIL ({})", reason.short()),
        }
    }

    /// The last non-successful stage, if any.
    pub fn failing_outcome(&self) -> Option<&StageOutcome> {
        self.outcomes.iter().rev().find(|o| !o.is_success())
    }
}

//! Pipeline execution
//!
//! Runs each planned stage in order, classifies what happened, and stops at the first stage that does not
//! succeed. A missing optional tool ends the test as a skip; every other non-success is a failure local to that
//! test. Nothing here aborts the run.

use std::fs;
use std::io;
use std::time::Instant;

use fadors_core::normalize;

use super::config::HarnessConfig;
use super::environment::Environment;
use super::model::{FailReason, StageOutcome, StageStatus, TestCase, TestResult, Verdict};
use super::plan::{ExitPolicy, PipelinePlanner, StagePlan, ToolPolicy};
use super::report::{RunReport, TestReporter};
use super::runner::{StageRun, StageRunner};
use super::verify::verify_exit_code;

/// Executes test cases against one toolchain environment.
pub struct Pipeline<'a, R: StageRunner + ?Sized> {
    config: &'a HarnessConfig,
    runner: &'a R,
    environment: &'a Environment,
}

impl<'a, R: StageRunner + ?Sized> Pipeline<'a, R> {
    pub fn new(config: &'a HarnessConfig, runner: &'a R, environment: &'a Environment) -> Self {
        Self {
            config,
            runner,
            environment,
        }
    }

    /// Run every case in order, reporting as each one completes.
    pub fn run_all(&self, cases: &[TestCase], reporter: &mut dyn TestReporter) -> RunReport {
        let start = Instant::now();
        reporter.on_collection_complete(cases.len());

        let mut report = RunReport::new(self.config.mode, self.config.skip_policy);
        for case in cases {
            reporter.on_test_start(case);
            let result = self.run_case(case);
            reporter.on_test_complete(&result);
            report.push(result);
        }

        report.duration = start.elapsed();
        reporter.on_run_complete(&report);
        report
    }

    /// Drive one test case through its planned stages.
    #[tracing::instrument(skip_all, fields(test = %case.name, mode = %self.config.mode))]
    pub fn run_case(&self, case: &TestCase) -> TestResult {
        let start = Instant::now();
        if self.config.clean_artifacts {
            remove_stale_artifacts(case);
        }

        let mut outcomes = Vec::new();
        let mut verdict = Verdict::Pass;

        for stage in PipelinePlanner::new(self.config).plan(case) {
            let (status, stdout, stderr) = self.run_stage(&stage);
            let outcome = StageOutcome::new(stage.kind, status).with_output(stdout, stderr);

            if let Some(terminal) = judge(&stage, &outcome) {
                verdict = terminal;
                outcomes.push(outcome);
                break;
            }
            outcomes.push(outcome);
        }

        match &verdict {
            Verdict::Pass => tracing::debug!("passed"),
            Verdict::Skip(reason) => tracing::warn!("skipped: {}", reason),
            Verdict::Fail(reason) => tracing::debug!("failed: {}", reason),
        }

        TestResult {
            case: case.clone(),
            outcomes,
            verdict,
            duration: start.elapsed(),
        }
    }

    fn run_stage(&self, stage: &StagePlan) -> (StageStatus, String, String) {
        match self.runner.run(&stage.invocation, self.environment) {
            StageRun::ToolMissing => (StageStatus::ToolMissing, String::new(), String::new()),
            StageRun::LaunchFailed(message) => (StageStatus::LaunchFailed(message), String::new(), String::new()),
            StageRun::TimedOut(after) => (StageStatus::TimedOut(after), String::new(), String::new()),
            StageRun::Signaled { signal, stdout, stderr } => (StageStatus::Signaled(signal), stdout, stderr),
            StageRun::Exited { code, stdout, stderr } => (classify_exit(stage, code), stdout, stderr),
        }
    }
}

/// Status of a stage whose process ran to completion.
fn classify_exit(stage: &StagePlan, raw: i64) -> StageStatus {
    let code = normalize(raw);
    match stage.exit_policy {
        ExitPolicy::Expect(expected) => {
            return match verify_exit_code(raw, expected) {
                Ok(_) => StageStatus::Success,
                Err(_) => StageStatus::Mismatch { expected, actual: code },
            };
        }
        ExitPolicy::RequireZero if code != 0 => return StageStatus::NonZeroExit(code),
        ExitPolicy::Tolerate if code != 0 => {
            tracing::debug!(stage = %stage.kind, code, "non-zero status tolerated; checking artifact");
        }
        _ => {}
    }

    match &stage.artifact {
        Some(path) if !path.is_file() => StageStatus::ArtifactMissing(path.clone()),
        _ => StageStatus::Success,
    }
}

/// Terminal verdict implied by a stage outcome, or `None` to continue with the next stage.
fn judge(stage: &StagePlan, outcome: &StageOutcome) -> Option<Verdict> {
    let kind = stage.kind;
    let reason = match &outcome.status {
        StageStatus::Success => return None,
        StageStatus::ToolMissing => {
            let tool = stage.invocation.program.display().to_string();
            if stage.tool_policy == ToolPolicy::Optional {
                return Some(Verdict::Skip(format!("{tool} not found")));
            }
            FailReason::ToolMissing { stage: kind, tool }
        }
        StageStatus::NonZeroExit(code) => FailReason::NonZeroExit { stage: kind, code: *code },
        StageStatus::ArtifactMissing(path) => FailReason::ArtifactMissing {
            stage: kind,
            path: path.clone(),
        },
        StageStatus::Mismatch { expected, actual } => FailReason::Mismatch {
            expected: *expected,
            actual: *actual,
        },
        StageStatus::LaunchFailed(message) => FailReason::Launch {
            stage: kind,
            message: message.clone(),
        },
        StageStatus::Signaled(signal) => FailReason::Signaled {
            stage: kind,
            signal: *signal,
        },
        StageStatus::TimedOut(after) => FailReason::TimedOut { stage: kind, after: *after },
    };
    Some(Verdict::Fail(reason))
}

fn remove_stale_artifacts(case: &TestCase) {
    for path in case.artifacts.iter() {
        match fs::remove_file(path) {
            Ok(()) => tracing::debug!("removed stale {}", path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("cannot remove stale {}: {}", path.display(), e),
        }
    }
}

//! Reporting (pytest-style console output, JSON)
//!
//! ## TestReporter Trait
//!
//! The pipeline drives a [`TestReporter`] as tests complete, which keeps presentation out of execution. The
//! console reporter prints per-test lines as they finish, a FAILURES section, and the final summary table; the
//! JSON reporter emits a single document once the run is over.
//!
//! Rendering is split into pure `render_*` functions so the exact text can be snapshot-tested.

use std::fmt::Write as _;
use std::time::Duration;

use fadors_core::PipelineMode;
use serde_json::{Value, json};

use super::config::SkipPolicy;
use super::model::{StageStatus, TestCase, TestResult, Verdict};

/// Trait for reporting test execution results.
pub trait TestReporter {
    /// Called once the selection is known
    fn on_collection_complete(&mut self, test_count: usize);

    /// Called before a test's first stage runs
    fn on_test_start(&mut self, _case: &TestCase) {}

    /// Called when a test reaches its verdict
    fn on_test_complete(&mut self, result: &TestResult);

    /// Called when all tests have completed
    fn on_run_complete(&mut self, report: &RunReport);
}

/// Aggregate of one harness run, in selection order.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub mode: PipelineMode,
    pub skip_policy: SkipPolicy,
    pub results: Vec<TestResult>,
    pub duration: Duration,
}

impl RunReport {
    pub fn new(mode: PipelineMode, skip_policy: SkipPolicy) -> Self {
        Self {
            mode,
            skip_policy,
            results: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    pub fn push(&mut self, result: TestResult) {
        self.results.push(result);
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.is_pass()).count()
    }

    pub fn skipped(&self) -> usize {
        self.results.iter().filter(|r| r.is_skip()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| r.is_fail()).count()
    }

    /// Whether the run as a whole succeeded under its skip policy.
    ///
    /// An empty selection succeeds.
    pub fn is_success(&self) -> bool {
        match self.skip_policy {
            SkipPolicy::Lenient => self.failed() == 0,
            SkipPolicy::Strict => self.failed() == 0 && self.skipped() == 0,
        }
    }
}

// ============================================================================
// Console
// ============================================================================

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const BOLD: &str = "\x1b[1m";
const BOLD_RED: &str = "\x1b[1;31m";
const RESET: &str = "\x1b[0m";

fn paint(text: &str, color: &str, enabled: bool) -> String {
    if enabled {
        format!("{color}{text}{RESET}")
    } else {
        text.to_string()
    }
}

/// Default console reporter (pytest-style)
///
/// Progress lines go to stdout alongside the summary; diagnostics go through `tracing` on stderr.
#[derive(Debug, Default)]
pub struct ConsoleReporter {
    pub verbose: bool,
    pub color: bool,
}

impl ConsoleReporter {
    pub fn new(verbose: bool, color: bool) -> Self {
        Self { verbose, color }
    }
}

impl TestReporter for ConsoleReporter {
    fn on_collection_complete(&mut self, test_count: usize) {
        if test_count == 0 {
            println!("No tests collected");
            return;
        }
        println!("{}", paint("=================== test session starts ===================", BOLD, self.color));
        println!("collected {test_count} item(s)");
        println!();
    }

    fn on_test_start(&mut self, case: &TestCase) {
        if self.verbose {
            println!("Testing {}...", case.source.display());
        }
    }

    fn on_test_complete(&mut self, result: &TestResult) {
        print!("{}", render_test_line(result, self.verbose, self.color));
    }

    fn on_run_complete(&mut self, report: &RunReport) {
        let failures = render_failures(report, self.color);
        if !failures.is_empty() {
            println!();
            print!("{failures}");
        }
        println!();
        print!("{}", render_summary_table(report));
    }
}

/// One line per test, plus one line per stage when `verbose`.
pub fn render_test_line(result: &TestResult, verbose: bool, color: bool) -> String {
    let mut out = String::new();
    if verbose {
        for outcome in &result.outcomes {
            let _ = writeln!(out, "  {:<8} {}", outcome.kind.as_str(), describe_status(&outcome.status));
        }
    }

    let status = match &result.verdict {
        Verdict::Pass => paint("PASSED", GREEN, color),
        Verdict::Skip(reason) => format!("{} ({reason})", paint("SKIPPED", YELLOW, color)),
        Verdict::Fail(reason) => format!("{} ({reason})", paint("FAILED", RED, color)),
    };
    if verbose {
        let _ = writeln!(out, "{} ... {} ({}ms)", result.case.name, status, result.duration.as_millis());
    } else {
        let _ = writeln!(out, "{} ... {}", result.case.name, status);
    }
    out
}

fn describe_status(status: &StageStatus) -> String {
    match status {
        StageStatus::Success => "ok".to_string(),
        StageStatus::ToolMissing => "tool not found".to_string(),
        StageStatus::NonZeroExit(code) => format!("exit status {code}"),
        StageStatus::ArtifactMissing(path) => format!("missing {}", path.display()),
        StageStatus::Mismatch { expected, actual } => format!("exit code {actual}, expected {expected}"),
        StageStatus::LaunchFailed(message) => format!("launch failed: {message}"),
        StageStatus::Signaled(signal) => format!("signal {signal}"),
        StageStatus::TimedOut(after) => format!("timed out after {}s", after.as_secs()),
    }
}

/// FAILURES section with the captured output of each failing stage; empty when nothing failed.
pub fn render_failures(report: &RunReport, color: bool) -> String {
    let mut out = String::new();
    let failures: Vec<_> = report.results.iter().filter(|r| r.is_fail()).collect();
    if failures.is_empty() {
        return out;
    }

    let _ = writeln!(out, "{}", paint("=================== FAILURES ===================", BOLD_RED, color));
    for result in failures {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", paint(&format!("___________ {} ___________", result.case.name), BOLD, color));
        if let Verdict::Fail(reason) = &result.verdict {
            let _ = writeln!(out, "    {reason}");
        }
        if let Some(outcome) = result.failing_outcome() {
            for (label, text) in [("STDOUT", &outcome.stdout), ("STDERR", &outcome.stderr)] {
                if text.trim().is_empty() {
                    continue;
                }
                let _ = writeln!(out, "    --- {label} ---");
                for line in text.lines() {
                    let _ = writeln!(out, "    {line}");
                }
            }
        }
    }
    out
}

/// Final results table. Contains no timings so identical runs render identically.
pub fn render_summary_table(report: &RunReport) -> String {
    let rule = "=".repeat(20);
    let mut out = String::new();
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "FINAL TEST RESULTS ({} PIPELINE)", report.mode.as_str().to_ascii_uppercase());
    let _ = writeln!(out, "{rule}");
    for result in &report.results {
        let _ = writeln!(out, "{:25} : {}", result.case.name, result.status_label());
    }
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Summary: {}/{} tests passed, {} skipped, {} failed",
        report.passed(),
        report.total(),
        report.skipped(),
        report.failed()
    );
    let closing = if report.is_success() {
        "ALL TESTS PASSED!"
    } else {
        "SOME TESTS FAILED."
    };
    let _ = writeln!(out, "{closing}");
    out
}

// ============================================================================
// JSON
// ============================================================================

/// Prints one JSON document on stdout when the run completes.
#[derive(Debug, Default)]
pub struct JsonReporter;

impl TestReporter for JsonReporter {
    fn on_collection_complete(&mut self, _test_count: usize) {}

    fn on_test_complete(&mut self, _result: &TestResult) {}

    fn on_run_complete(&mut self, report: &RunReport) {
        match serde_json::to_string_pretty(&report_to_json(report)) {
            Ok(text) => println!("{text}"),
            Err(e) => tracing::error!("cannot serialize report: {}", e),
        }
    }
}

/// Machine-readable form of a run.
pub fn report_to_json(report: &RunReport) -> Value {
    let tests: Vec<Value> = report.results.iter().map(result_to_json).collect();
    json!({
        "mode": report.mode.as_str(),
        "success": report.is_success(),
        "totals": {
            "total": report.total(),
            "passed": report.passed(),
            "skipped": report.skipped(),
            "failed": report.failed(),
        },
        "tests": tests,
    })
}

fn result_to_json(result: &TestResult) -> Value {
    let (verdict, reason, failed_stage) = match &result.verdict {
        Verdict::Pass => ("pass", Value::Null, Value::Null),
        Verdict::Skip(reason) => ("skip", json!(reason), Value::Null),
        Verdict::Fail(reason) => ("fail", json!(reason.to_string()), json!(reason.stage().as_str())),
    };
    let stages: Vec<Value> = result
        .outcomes
        .iter()
        .map(|o| {
            json!({
                "stage": o.kind.as_str(),
                "status": describe_status(&o.status),
                "stdout": o.stdout,
                "stderr": o.stderr,
            })
        })
        .collect();
    json!({
        "name": result.case.name,
        "expected_exit_code": result.case.expected_exit_code,
        "verdict": verdict,
        "status": result.status_label(),
        "reason": reason,
        "failed_stage": failed_stage,
        "stages": stages,
        "duration_ms": result.duration.as_millis() as u64,
    })
}

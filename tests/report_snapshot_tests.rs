//! Snapshot tests for report rendering
//!
//! Review changes: `cargo insta review`

use std::path::PathBuf;
use std::time::Duration;

use fadors_core::{PipelineMode, StageKind};
use fadors_harness::harness::report::{render_failures, render_summary_table, render_test_line};
use fadors_harness::harness::{
    FailReason, RunReport, SkipPolicy, StageOutcome, StageStatus, TestCase, TestResult, Verdict,
};

fn result(name: &str, expected: i32, outcomes: Vec<StageOutcome>, verdict: Verdict) -> TestResult {
    TestResult {
        case: TestCase::new(PathBuf::from("tests").join(name), expected),
        outcomes,
        verdict,
        duration: Duration::from_millis(12),
    }
}

fn ok(kind: StageKind) -> StageOutcome {
    StageOutcome::new(kind, StageStatus::Success)
}

fn masm_report() -> RunReport {
    let mut report = RunReport::new(PipelineMode::Masm, SkipPolicy::Lenient);
    report.push(result("01_return.c", 42, StageKind::ALL.map(ok).to_vec(), Verdict::Pass));
    report.push(result(
        "17_for.c",
        45,
        vec![
            ok(StageKind::Compile),
            StageOutcome::new(StageKind::Assemble, StageStatus::ToolMissing),
        ],
        Verdict::Skip("ml64 not found".to_string()),
    ));
    report.push(result(
        "20_switch.c",
        120,
        vec![
            ok(StageKind::Compile),
            ok(StageKind::Assemble),
            ok(StageKind::Link),
            StageOutcome::new(StageKind::Execute, StageStatus::Mismatch { expected: 120, actual: 3 })
                .with_output("case 3\n".to_string(), String::new()),
        ],
        Verdict::Fail(FailReason::Mismatch { expected: 120, actual: 3 }),
    ));
    report.push(result(
        "23_pointer_math.c",
        0,
        Vec::new(),
        Verdict::Fail(FailReason::Mismatch {
            expected: 0,
            actual: -1_073_741_819,
        }),
    ));
    report
}

#[test]
fn test_masm_summary_table() {
    insta::assert_snapshot!(render_summary_table(&masm_report()), @r"
    ====================
    FINAL TEST RESULTS (MASM PIPELINE)
    ====================
    01_return.c               : PASS
    17_for.c                  : SKIP (ml64 not found)
    20_switch.c               : FAIL (Got 3)
    23_pointer_math.c         : FAIL (Got -1073741819)

    Summary: 1/4 tests passed, 1 skipped, 2 failed
    SOME TESTS FAILED.
    ");
}

#[test]
fn test_object_summary_table() {
    let mut report = RunReport::new(PipelineMode::Object, SkipPolicy::Lenient);
    report.push(result("02_arithmetic.c", 7, Vec::new(), Verdict::Pass));
    report.push(result(
        "04_if.c",
        100,
        Vec::new(),
        Verdict::Fail(FailReason::NonZeroExit {
            stage: StageKind::Compile,
            code: 1,
        }),
    ));
    report.push(result(
        "12_string.c",
        72,
        Vec::new(),
        Verdict::Fail(FailReason::ArtifactMissing {
            stage: StageKind::Compile,
            path: PathBuf::from("tests/12_string.exe"),
        }),
    ));

    insta::assert_snapshot!(render_summary_table(&report), @r"
    ====================
    FINAL TEST RESULTS (OBJECT PIPELINE)
    ====================
    02_arithmetic.c           : PASS
    04_if.c                   : FAIL (Comp)
    12_string.c               : FAIL (EXE missing)

    Summary: 1/3 tests passed, 0 skipped, 2 failed
    SOME TESTS FAILED.
    ");
}

#[test]
fn test_all_passed_closing_line() {
    let mut report = RunReport::new(PipelineMode::Masm, SkipPolicy::Lenient);
    report.push(result("01_return.c", 42, Vec::new(), Verdict::Pass));
    report.push(result("07_function.c", 123, Vec::new(), Verdict::Skip("link not found".to_string())));

    let table = render_summary_table(&report);
    assert!(table.ends_with("Summary: 1/2 tests passed, 1 skipped, 0 failed\nALL TESTS PASSED!\n"));
}

#[test]
fn test_summary_table_is_deterministic() {
    let first = masm_report();
    let mut second = masm_report();
    second.duration = Duration::from_secs(30);
    for r in &mut second.results {
        r.duration = Duration::from_secs(3);
    }
    assert_eq!(render_summary_table(&first), render_summary_table(&second));
}

#[test]
fn test_verbose_test_line() {
    let report = masm_report();
    insta::assert_snapshot!(render_test_line(&report.results[2], true, false), @r"
      compile  ok
      assemble ok
      link     ok
      execute  exit code 3, expected 120
    20_switch.c ... FAILED (expected exit code 120, got 3) (12ms)
    ");
}

#[test]
fn test_failures_section() {
    insta::assert_snapshot!(render_failures(&masm_report(), false), @r"
    =================== FAILURES ===================

    ___________ 20_switch.c ___________
        expected exit code 120, got 3
        --- STDOUT ---
        case 3

    ___________ 23_pointer_math.c ___________
        expected exit code 0, got -1073741819
    ");
}

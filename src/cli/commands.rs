//! CLI command implementations
//!
//! All commands return `CliResult<ExitCode>` and never call `process::exit` themselves.

use std::env;
use std::io::{self, IsTerminal};

use fadors_core::{normalize, parse_status};

use super::{CliError, CliResult, ExitCode, OutputFormat, RunArgs};
use crate::harness::{
    AllowList, ConsoleReporter, Environment, EnvironmentBootstrapper, HarnessConfig, HarnessError, HarnessResult,
    JsonReporter, Pipeline, ProcessStageRunner, TestCase, TestReporter, TestSelector, discover_test_files,
};

/// Effective configuration: flags over `FADORS_*` variables over defaults.
fn resolve_config(args: &RunArgs) -> HarnessConfig {
    args.apply(HarnessConfig::from_env())
}

/// Allow-list in effect: the manifest when one is given, otherwise the built-in corpus for the mode.
fn allow_list(config: &HarnessConfig) -> HarnessResult<AllowList> {
    match &config.manifest {
        Some(path) => AllowList::load(path),
        None => Ok(AllowList::builtin(config.mode)),
    }
}

/// Discover and select the cases for this run.
pub fn select_cases(config: &HarnessConfig) -> HarnessResult<Vec<TestCase>> {
    let allow = allow_list(config)?;
    let candidates = discover_test_files(&config.test_dir)?;
    let cases = TestSelector::new(&allow)
        .with_keyword(config.keyword.as_deref())
        .select(&candidates);
    tracing::debug!(
        "selected {} of {} candidates in {}",
        cases.len(),
        candidates.len(),
        config.test_dir.display()
    );
    Ok(cases)
}

/// Bootstrap the toolchain environment and make sure the compiler under test is reachable in it.
pub fn prepare_environment(config: &HarnessConfig) -> HarnessResult<Environment> {
    let environment = EnvironmentBootstrapper::new(config.bootstrap.clone()).bootstrap(Environment::capture())?;
    match environment.find_program(&config.toolchain.compiler) {
        Some(found) => {
            tracing::debug!("compiler under test: {}", found.display());
            Ok(environment)
        }
        None => Err(HarnessError::CompilerNotFound {
            path: config.toolchain.compiler.clone(),
        }),
    }
}

/// Run the full harness and map the aggregate verdict to the process exit code.
pub fn run_harness(args: &RunArgs) -> CliResult<ExitCode> {
    let config = resolve_config(args);
    let environment = prepare_environment(&config)?;
    let cases = select_cases(&config)?;
    let runner = ProcessStageRunner::new(config.stage_timeout).map_err(HarnessError::Runtime)?;

    let mut reporter: Box<dyn TestReporter> = match args.format {
        OutputFormat::Console => Box::new(ConsoleReporter::new(args.verbose, use_color())),
        OutputFormat::Json => Box::new(JsonReporter),
    };

    let report = Pipeline::new(&config, &runner, &environment).run_all(&cases, &mut *reporter);
    tracing::info!(
        "{} passed, {} skipped, {} failed in {:.2}s",
        report.passed(),
        report.skipped(),
        report.failed(),
        report.duration.as_secs_f64()
    );

    if report.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        // Summary already printed
        Err(CliError::new("", ExitCode::FAILURE))
    }
}

/// Print the selection without touching the toolchain.
pub fn list_tests(args: &RunArgs) -> CliResult<ExitCode> {
    let config = resolve_config(args);
    let cases = select_cases(&config)?;
    if cases.is_empty() {
        println!("No tests collected");
    }
    for case in &cases {
        println!("{:25} : {}", case.name, case.expected_exit_code);
    }
    Ok(ExitCode::SUCCESS)
}

/// Print `raw -> normalized` for a decimal or `0x` hex status.
pub fn normalize_status(status: &str) -> CliResult<ExitCode> {
    let raw = parse_status(status)
        .ok_or_else(|| CliError::failure(format!("Error: `{status}` is not a decimal or 0x-hex status")))?;
    println!("{}", describe_normalized(raw));
    Ok(ExitCode::SUCCESS)
}

fn describe_normalized(raw: i64) -> String {
    let normalized = normalize(raw);
    format!("{raw} (0x{:08X}) -> {normalized}", normalized as u32)
}

fn use_color() -> bool {
    env::var_os("NO_COLOR").is_none() && io::stdout().is_terminal()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_describe_normalized() {
        assert_eq!(describe_normalized(3_221_225_477), "3221225477 (0xC0000005) -> -1073741819");
        assert_eq!(describe_normalized(42), "42 (0x0000002A) -> 42");
    }

    #[test]
    fn test_normalize_status_rejects_garbage() {
        let err = normalize_status("segfault").unwrap_err();
        assert_eq!(err.exit_code, ExitCode::FAILURE);
        assert!(err.message.contains("segfault"));
    }

    #[test]
    fn test_select_cases_with_manifest() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["01_return.c", "05_loop.c", "99_extra.c"] {
            fs::write(dir.path().join(name), "int main(void) { return 0; }\n").unwrap();
        }
        let manifest = dir.path().join("ready.txt");
        fs::write(&manifest, "# ready\n01_return.c 42\n05_loop.c 45\n").unwrap();

        let config = HarnessConfig::new()
            .with_test_dir(dir.path())
            .with_manifest(Some(manifest));
        let cases = select_cases(&config).unwrap();
        let names: Vec<_> = cases.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["01_return.c", "05_loop.c"]);
    }

    #[test]
    fn test_missing_compiler_is_fatal() {
        let config = HarnessConfig::new()
            .with_bootstrap(None)
            .with_compiler("no/such/dir/fadors99");
        let err = prepare_environment(&config).unwrap_err();
        assert!(matches!(err, HarnessError::CompilerNotFound { .. }));

        let cli_err = CliError::from(err);
        assert!(cli_err.message.contains("compiler not found"));
    }
}

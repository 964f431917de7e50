//! CLI module for the fadors toolchain harness
//!
//! ## Commands
//!
//! - `run` - Validate the toolchain against the test corpus (default when no subcommand is given)
//! - `list` - Print the selected tests and their expected exit codes without running anything
//! - `normalize <STATUS>` - Print the normalized form of a raw process status
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand, ValueEnum};
use fadors_core::PipelineMode;

use crate::harness::{HarnessConfig, HarnessError, SkipPolicy};
use crate::version::HARNESS_VERSION;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    /// Create a new CLI error with a message and exit code.
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Fatal harness errors are rendered as miette diagnostics (code, cause chain, help).
impl From<HarnessError> for CliError {
    fn from(err: HarnessError) -> Self {
        CliError::failure(format!("{:?}", miette::Report::new(err)))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

// ============================================================================
// Clap CLI definition
// ============================================================================

/// End-to-end validation harness for the fadors C compiler toolchain
#[derive(Parser, Debug)]
#[command(name = "fadors-harness")]
#[command(version = HARNESS_VERSION)]
#[command(about = "End-to-end validation harness for the fadors C compiler toolchain", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Options for the default `run` action
    #[command(flatten)]
    pub run: RunArgs,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile, build and execute every selected test program
    Run(RunArgs),

    /// List the selected tests and their expected exit codes
    List(RunArgs),

    /// Print the normalized (signed 32-bit) form of a raw process status
    Normalize {
        /// Raw status, decimal or `0x` hex (e.g. 0xC0000005)
        #[arg(value_name = "STATUS", allow_hyphen_values = true)]
        status: String,
    },
}

/// Report format on stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Console,
    Json,
}

/// Harness options. Anything left unset falls back to `FADORS_*` variables, then to built-in defaults.
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Pipeline shape: `masm` (external assembler and linker) or `object` (compiler links)
    #[arg(long, value_name = "MODE")]
    pub mode: Option<PipelineMode>,

    /// Compiler under test
    #[arg(long, value_name = "PATH")]
    pub compiler: Option<PathBuf>,

    /// Assembler (masm mode)
    #[arg(long, value_name = "PATH")]
    pub assembler: Option<PathBuf>,

    /// Linker
    #[arg(long, value_name = "PATH")]
    pub linker: Option<PathBuf>,

    /// Toolchain bootstrap script whose resulting environment is used for every stage
    #[arg(long, value_name = "SCRIPT", conflicts_with = "no_bootstrap")]
    pub bootstrap: Option<PathBuf>,

    /// Use the inherited environment without running a bootstrap script
    #[arg(long)]
    pub no_bootstrap: bool,

    /// Directory containing the test programs
    #[arg(long, value_name = "DIR")]
    pub test_dir: Option<PathBuf>,

    /// Allow-list file (`<name>.c <expected>` per line) replacing the built-in corpus
    #[arg(long, value_name = "FILE")]
    pub manifest: Option<PathBuf>,

    /// Only run tests whose name contains EXPR
    #[arg(short = 'k', value_name = "EXPR")]
    pub keyword: Option<String>,

    /// Fail the run when any test is skipped
    #[arg(long)]
    pub strict: bool,

    /// Ask the compiler to stop after emitting assembly (`-S`)
    #[arg(long)]
    pub emit_only: bool,

    /// Per-stage timeout in seconds (0 disables)
    #[arg(long, value_name = "N")]
    pub timeout_secs: Option<u64>,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Console)]
    pub format: OutputFormat,

    /// Verbose output (per-stage lines)
    #[arg(short, long)]
    pub verbose: bool,
}

impl RunArgs {
    /// Layer the flags that were given over `config`.
    pub fn apply(&self, mut config: HarnessConfig) -> HarnessConfig {
        if let Some(mode) = self.mode {
            config = config.with_mode(mode);
        }
        if let Some(path) = &self.compiler {
            config = config.with_compiler(path);
        }
        if let Some(path) = &self.assembler {
            config = config.with_assembler(path);
        }
        if let Some(path) = &self.linker {
            config = config.with_linker(path);
        }
        if self.no_bootstrap {
            config = config.with_bootstrap(None);
        } else if let Some(script) = &self.bootstrap {
            config = config.with_bootstrap(Some(script.clone()));
        }
        if let Some(dir) = &self.test_dir {
            config = config.with_test_dir(dir);
        }
        if self.manifest.is_some() {
            config = config.with_manifest(self.manifest.clone());
        }
        if self.keyword.is_some() {
            config = config.with_keyword(self.keyword.clone());
        }
        if self.strict {
            config = config.with_skip_policy(SkipPolicy::Strict);
        }
        if self.emit_only {
            config = config.with_emit_only(true);
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout_secs(secs);
        }
        config
    }
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Some(Command::Run(args)) => commands::run_harness(&args),
        Some(Command::List(args)) => commands::list_tests(&args),
        Some(Command::Normalize { status }) => commands::normalize_status(&status),
        None => commands::run_harness(&cli.run),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_cli_default_is_run() {
        let cli = Cli::try_parse_from(["fadors-harness", "--mode", "object", "--strict"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.run.mode, Some(PipelineMode::Object));
        assert!(cli.run.strict);
    }

    #[test]
    fn test_cli_parse_run() {
        let cli = Cli::try_parse_from(["fadors-harness", "run", "-v", "-k", "union", "--format", "json"]).unwrap();
        if let Some(Command::Run(args)) = cli.command {
            assert!(args.verbose);
            assert_eq!(args.keyword.as_deref(), Some("union"));
            assert_eq!(args.format, OutputFormat::Json);
        } else {
            panic!("Expected Run command");
        }
    }

    #[test]
    fn test_cli_parse_list() {
        let cli = Cli::try_parse_from(["fadors-harness", "list", "--manifest", "ready.txt"]).unwrap();
        assert!(matches!(cli.command, Some(Command::List(ref args)) if args.manifest.is_some()));
    }

    #[test]
    fn test_cli_parse_normalize() {
        let cli = Cli::try_parse_from(["fadors-harness", "normalize", "0xC0000005"]).unwrap();
        if let Some(Command::Normalize { status }) = cli.command {
            assert_eq!(status, "0xC0000005");
        } else {
            panic!("Expected Normalize command");
        }
    }

    #[test]
    fn test_cli_rejects_unknown_mode() {
        assert!(Cli::try_parse_from(["fadors-harness", "--mode", "elf"]).is_err());
    }

    #[test]
    fn test_cli_bootstrap_flags_conflict() {
        assert!(Cli::try_parse_from(["fadors-harness", "--bootstrap", "env.sh", "--no-bootstrap"]).is_err());
    }

    #[test]
    fn test_flags_override_config() {
        let args = Cli::try_parse_from([
            "fadors-harness",
            "--compiler",
            "out/fadors99",
            "--no-bootstrap",
            "--timeout-secs",
            "0",
            "--emit-only",
        ])
        .unwrap()
        .run;
        let base = HarnessConfig::new()
            .with_bootstrap(Some(PathBuf::from("vcvars64.bat")))
            .with_linker("lld-link");
        let config = args.apply(base);

        assert_eq!(config.toolchain.compiler, PathBuf::from("out/fadors99"));
        assert_eq!(config.toolchain.linker, PathBuf::from("lld-link"));
        assert_eq!(config.bootstrap, None);
        assert_eq!(config.stage_timeout, None);
        assert!(config.emit_only);
    }

    #[test]
    fn test_unset_flags_keep_config() {
        let config = RunArgs::default().apply(HarnessConfig::new().with_timeout_secs(9));
        assert_eq!(config.stage_timeout, Some(Duration::from_secs(9)));
        assert_eq!(config.skip_policy, SkipPolicy::Lenient);
    }
}

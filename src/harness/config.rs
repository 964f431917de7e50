//! Harness configuration
//!
//! ## Configuration Precedence
//!
//! 1. CLI flags (highest priority, applied by `cli`)
//! 2. `FADORS_*` environment variables
//! 3. Built-in defaults matching the Windows/MSVC layout the toolchain is developed on

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use fadors_core::PipelineMode;

/// Path of the compiler under test, relative to the repository root.
pub const COMPILER_ENV: &str = "FADORS_COMPILER";
/// Assembler executable (MASM mode only).
pub const ASSEMBLER_ENV: &str = "FADORS_ASSEMBLER";
/// Linker executable. Also handed to the compiler in object mode, which links internally.
pub const LINKER_ENV: &str = "FADORS_LINKER";
/// Toolchain bootstrap script (`vcvars64.bat` on Windows).
pub const BOOTSTRAP_ENV: &str = "FADORS_BOOTSTRAP";
/// Directory holding the test programs.
pub const TEST_DIR_ENV: &str = "FADORS_TEST_DIR";
/// Per-stage timeout in seconds; `0` disables the timeout.
pub const STAGE_TIMEOUT_ENV: &str = "FADORS_STAGE_TIMEOUT";

const DEFAULT_VCVARS: &str = r"C:\Program Files\Microsoft Visual Studio\2022\Community\VC\Auxiliary\Build\vcvars64.bat";
const DEFAULT_STAGE_TIMEOUT: Duration = Duration::from_secs(120);

/// External executables driven by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    pub compiler: PathBuf,
    pub assembler: PathBuf,
    pub linker: PathBuf,
}

impl Default for Toolchain {
    fn default() -> Self {
        Self {
            compiler: PathBuf::from("build")
                .join("Release")
                .join(format!("fadors99{}", env::consts::EXE_SUFFIX)),
            assembler: PathBuf::from("ml64"),
            linker: PathBuf::from("link"),
        }
    }
}

/// Whether a skipped test (optional tool missing) lets the run succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SkipPolicy {
    /// Skips count toward success: compiling alone is a partial pass when binary tools are absent.
    #[default]
    Lenient,
    /// Any skip fails the run.
    Strict,
}

/// Full harness configuration
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    pub toolchain: Toolchain,
    /// Bootstrap script; `None` runs with the inherited environment only
    pub bootstrap: Option<PathBuf>,
    pub test_dir: PathBuf,
    /// Allow-list file replacing the built-in corpus
    pub manifest: Option<PathBuf>,
    pub mode: PipelineMode,
    pub skip_policy: SkipPolicy,
    /// Entry point passed to the linker (`/entry:`)
    pub entry_symbol: String,
    /// Pass `-S` so the compiler stops after writing assembly (MASM mode)
    pub emit_only: bool,
    pub stage_timeout: Option<Duration>,
    /// Remove artifacts left by previous runs before compiling
    pub clean_artifacts: bool,
    /// Only run tests whose name contains this keyword
    pub keyword: Option<String>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            toolchain: Toolchain::default(),
            bootstrap: cfg!(windows).then(|| PathBuf::from(DEFAULT_VCVARS)),
            test_dir: PathBuf::from("tests"),
            manifest: None,
            mode: PipelineMode::default(),
            skip_policy: SkipPolicy::default(),
            entry_symbol: "main".to_string(),
            emit_only: false,
            stage_timeout: Some(DEFAULT_STAGE_TIMEOUT),
            clean_artifacts: true,
            keyword: None,
        }
    }
}

impl HarnessConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by the `FADORS_*` variables of the current process.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for the `FADORS_*` names.
    ///
    /// Empty values are ignored. An unparsable timeout keeps the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(path) = get(COMPILER_ENV) {
            config.toolchain.compiler = PathBuf::from(path);
        }
        if let Some(path) = get(ASSEMBLER_ENV) {
            config.toolchain.assembler = PathBuf::from(path);
        }
        if let Some(path) = get(LINKER_ENV) {
            config.toolchain.linker = PathBuf::from(path);
        }
        if let Some(path) = get(BOOTSTRAP_ENV) {
            config.bootstrap = Some(PathBuf::from(path));
        }
        if let Some(path) = get(TEST_DIR_ENV) {
            config.test_dir = PathBuf::from(path);
        }
        if let Some(secs) = get(STAGE_TIMEOUT_ENV) {
            match secs.trim().parse::<u64>() {
                Ok(secs) => config = config.with_timeout_secs(secs),
                Err(_) => tracing::warn!("ignoring {}={:?}: not a number of seconds", STAGE_TIMEOUT_ENV, secs),
            }
        }
        config
    }

    pub fn with_mode(mut self, mode: PipelineMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_compiler(mut self, path: impl Into<PathBuf>) -> Self {
        self.toolchain.compiler = path.into();
        self
    }

    pub fn with_assembler(mut self, path: impl Into<PathBuf>) -> Self {
        self.toolchain.assembler = path.into();
        self
    }

    pub fn with_linker(mut self, path: impl Into<PathBuf>) -> Self {
        self.toolchain.linker = path.into();
        self
    }

    pub fn with_bootstrap(mut self, script: Option<PathBuf>) -> Self {
        self.bootstrap = script;
        self
    }

    pub fn with_test_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.test_dir = dir.into();
        self
    }

    pub fn with_manifest(mut self, manifest: Option<PathBuf>) -> Self {
        self.manifest = manifest;
        self
    }

    pub fn with_skip_policy(mut self, policy: SkipPolicy) -> Self {
        self.skip_policy = policy;
        self
    }

    pub fn with_emit_only(mut self, emit_only: bool) -> Self {
        self.emit_only = emit_only;
        self
    }

    /// Set the per-stage timeout; `0` disables it.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.stage_timeout = (secs > 0).then_some(Duration::from_secs(secs));
        self
    }

    pub fn with_clean_artifacts(mut self, clean: bool) -> Self {
        self.clean_artifacts = clean;
        self
    }

    pub fn with_keyword(mut self, keyword: Option<String>) -> Self {
        self.keyword = keyword;
        self
    }
}

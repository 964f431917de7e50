//! Pipeline planning
//!
//! Both pipeline shapes are described as data: an ordered list of [`StagePlan`]s, each carrying its command line,
//! the artifact that proves it worked, and how strictly its exit status and tool availability are treated. A single
//! executor ([`super::pipeline`]) consumes either shape.
//!
//! | mode     | compile                     | assemble     | link         | execute       |
//! |----------|-----------------------------|--------------|--------------|---------------|
//! | `masm`   | `--masm`, status tolerated  | optional     | optional     | expected code |
//! | `object` | `--obj`, status must be `0` | -            | -            | expected code |

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use fadors_core::{PipelineMode, StageKind};

use super::config::{HarnessConfig, LINKER_ENV};
use super::model::TestCase;
use super::runner::Invocation;

/// How a stage's exit status is judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitPolicy {
    /// Ignore the status; the artifact alone decides. The compiler under test may return non-zero after an
    /// internal assembler/linker call it does not control.
    Tolerate,
    RequireZero,
    /// Compare the normalized status against the expected exit code.
    Expect(i32),
}

/// What a missing tool means for the test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolPolicy {
    Required,
    /// Absence turns the rest of the pipeline into a skip
    Optional,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagePlan {
    pub kind: StageKind,
    pub invocation: Invocation,
    /// File whose presence proves the stage worked
    pub artifact: Option<PathBuf>,
    pub exit_policy: ExitPolicy,
    pub tool_policy: ToolPolicy,
}

/// Derives stage plans from the harness configuration.
#[derive(Debug, Clone, Copy)]
pub struct PipelinePlanner<'a> {
    config: &'a HarnessConfig,
}

impl<'a> PipelinePlanner<'a> {
    pub fn new(config: &'a HarnessConfig) -> Self {
        Self { config }
    }

    /// Ordered stages for `case`. The result is always sorted by [`StageKind`].
    pub fn plan(&self, case: &TestCase) -> Vec<StagePlan> {
        match self.config.mode {
            PipelineMode::Masm => vec![
                self.compile_masm(case),
                self.assemble(case),
                self.link(case),
                self.execute(case),
            ],
            PipelineMode::Object => vec![self.compile_object(case), self.execute(case)],
        }
    }

    fn compile_masm(&self, case: &TestCase) -> StagePlan {
        let mut invocation = Invocation::new(&self.config.toolchain.compiler)
            .arg(&case.source)
            .arg(PipelineMode::Masm.compiler_flag());
        if self.config.emit_only {
            invocation = invocation.arg("-S");
        }
        StagePlan {
            kind: StageKind::Compile,
            invocation,
            artifact: Some(case.artifacts.asm.clone()),
            exit_policy: ExitPolicy::Tolerate,
            tool_policy: ToolPolicy::Required,
        }
    }

    fn compile_object(&self, case: &TestCase) -> StagePlan {
        let linker = self.config.toolchain.linker.to_string_lossy().into_owned();
        let invocation = Invocation::new(&self.config.toolchain.compiler)
            .arg(&case.source)
            .arg(PipelineMode::Object.compiler_flag())
            .env(LINKER_ENV, linker);
        StagePlan {
            kind: StageKind::Compile,
            invocation,
            artifact: Some(case.artifacts.executable.clone()),
            exit_policy: ExitPolicy::RequireZero,
            tool_policy: ToolPolicy::Required,
        }
    }

    fn assemble(&self, case: &TestCase) -> StagePlan {
        let invocation = Invocation::new(&self.config.toolchain.assembler)
            .arg("/c")
            .arg("/nologo")
            .arg(prefixed("/Fo", &case.artifacts.object))
            .arg(&case.artifacts.asm);
        StagePlan {
            kind: StageKind::Assemble,
            invocation,
            artifact: Some(case.artifacts.object.clone()),
            exit_policy: ExitPolicy::RequireZero,
            tool_policy: ToolPolicy::Optional,
        }
    }

    fn link(&self, case: &TestCase) -> StagePlan {
        let invocation = Invocation::new(&self.config.toolchain.linker)
            .arg("/nologo")
            .arg(format!("/entry:{}", self.config.entry_symbol))
            .arg("/subsystem:console")
            .arg(prefixed("/out:", &case.artifacts.executable))
            .arg(&case.artifacts.object);
        StagePlan {
            kind: StageKind::Link,
            invocation,
            artifact: Some(case.artifacts.executable.clone()),
            exit_policy: ExitPolicy::RequireZero,
            tool_policy: ToolPolicy::Optional,
        }
    }

    fn execute(&self, case: &TestCase) -> StagePlan {
        StagePlan {
            kind: StageKind::Execute,
            invocation: Invocation::new(&case.artifacts.executable),
            artifact: None,
            exit_policy: ExitPolicy::Expect(case.expected_exit_code),
            tool_policy: ToolPolicy::Required,
        }
    }
}

/// MSVC-style `/Flag<path>` argument, built without a lossy string round trip.
fn prefixed(flag: &str, path: &Path) -> OsString {
    let mut arg = OsString::from(flag);
    arg.push(path);
    arg
}

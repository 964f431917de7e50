//! Stage runner: one external tool invocation
//!
//! The [`StageRunner`] trait is the process boundary of the harness. The pipeline only ever sees a [`StageRun`],
//! which keeps "the tool is absent" ([`StageRun::ToolMissing`]) apart from "the tool ran and rejected the input"
//! ([`StageRun::Exited`] with a non-zero code). Tests substitute scripted runners for the real one.

use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use super::environment::Environment;

/// A fully resolved command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    /// Variables layered over the run environment for this invocation only
    pub extra_env: Vec<(String, String)>,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            extra_env: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_env.push((key.into(), value.into()));
        self
    }

    /// Human-readable command line for logs.
    pub fn display(&self) -> String {
        let mut line = self.program.display().to_string();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&arg.to_string_lossy());
        }
        line
    }
}

/// What happened when a stage's process was launched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageRun {
    /// The process ran to completion. `code` is the raw OS status, not yet normalized.
    Exited { code: i64, stdout: String, stderr: String },
    /// Unix only: terminated by a signal.
    Signaled { signal: i32, stdout: String, stderr: String },
    ToolMissing,
    LaunchFailed(String),
    TimedOut(Duration),
}

/// Launch one external process and wait for it.
pub trait StageRunner {
    fn run(&self, invocation: &Invocation, environment: &Environment) -> StageRun;
}

/// Runs stages as real child processes, with an optional per-stage timeout.
///
/// Process waiting goes through a single-threaded tokio runtime so a hung tool can be killed when the timeout
/// elapses. From the caller's side every call still blocks until the stage is over.
pub struct ProcessStageRunner {
    runtime: tokio::runtime::Runtime,
    timeout: Option<Duration>,
}

impl ProcessStageRunner {
    pub fn new(timeout: Option<Duration>) -> io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
        Ok(Self { runtime, timeout })
    }

    async fn spawn_and_wait(&self, invocation: &Invocation, environment: &Environment) -> StageRun {
        let mut command = tokio::process::Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .env_clear()
            .envs(environment.iter())
            .envs(invocation.extra_env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = match command.spawn() {
            Ok(child) => child,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return StageRun::ToolMissing,
            Err(e) => return StageRun::LaunchFailed(e.to_string()),
        };

        // Dropping the wait future on timeout drops the child, which kills it (`kill_on_drop`).
        let waited = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait_with_output()).await {
                Ok(waited) => waited,
                Err(_) => return StageRun::TimedOut(limit),
            },
            None => child.wait_with_output().await,
        };

        let output = match waited {
            Ok(output) => output,
            Err(e) => return StageRun::LaunchFailed(e.to_string()),
        };
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        match raw_status(output.status) {
            RawStatus::Code(code) => StageRun::Exited { code, stdout, stderr },
            RawStatus::Signal(signal) => StageRun::Signaled { signal, stdout, stderr },
        }
    }
}

impl StageRunner for ProcessStageRunner {
    fn run(&self, invocation: &Invocation, environment: &Environment) -> StageRun {
        tracing::debug!(command = %invocation.display(), "running stage");
        self.runtime.block_on(self.spawn_and_wait(invocation, environment))
    }
}

enum RawStatus {
    Code(i64),
    Signal(i32),
}

/// The OS-level status, widened. Windows reports a `DWORD`, so the code is re-read as unsigned there.
#[cfg(windows)]
fn raw_status(status: ExitStatus) -> RawStatus {
    RawStatus::Code(status.code().map(|c| i64::from(c as u32)).unwrap_or(-1))
}

#[cfg(unix)]
fn raw_status(status: ExitStatus) -> RawStatus {
    use std::os::unix::process::ExitStatusExt;

    match (status.code(), status.signal()) {
        (Some(code), _) => RawStatus::Code(i64::from(code)),
        (None, Some(signal)) => RawStatus::Signal(signal),
        (None, None) => RawStatus::Code(-1),
    }
}

#[cfg(not(any(unix, windows)))]
fn raw_status(status: ExitStatus) -> RawStatus {
    RawStatus::Code(status.code().map(i64::from).unwrap_or(-1))
}

//! Toolchain environment
//!
//! The MSVC tools only work inside the environment `vcvars64.bat` sets up. Instead of mutating the harness's own
//! process environment, the bootstrap result is captured once into an [`Environment`] value that is passed to
//! every stage invocation. The harness process environment is never modified.

use std::collections::BTreeMap;
use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use super::error::{HarnessError, HarnessResult};

/// A flat `NAME → value` table handed to child processes verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: BTreeMap<String, String>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current process environment (non-UTF-8 entries are converted lossily).
    pub fn capture() -> Self {
        let vars = env::vars_os()
            .map(|(k, v)| (k.to_string_lossy().into_owned(), v.to_string_lossy().into_owned()))
            .collect();
        Self { vars }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Merge `KEY=VALUE` lines over this environment. Returns how many variables were applied.
    pub fn merge_lines(&mut self, output: &str) -> usize {
        self.merge_pairs(parse_env_lines(output))
    }

    /// Merge NUL-terminated `KEY=VALUE` records (as printed by `env -0`). Returns how many variables were applied.
    pub fn merge_nul_separated(&mut self, output: &str) -> usize {
        self.merge_pairs(parse_env_nul(output))
    }

    fn merge_pairs<'a>(&mut self, pairs: impl Iterator<Item = (&'a str, &'a str)>) -> usize {
        let mut applied = 0;
        for (key, value) in pairs {
            self.set(key, value);
            applied += 1;
        }
        applied
    }

    /// Resolve `program` the way a child process launch would.
    ///
    /// Paths with more than one component are checked directly; bare names are searched for in this
    /// environment's `PATH` (with the platform executable suffix appended when missing).
    pub fn find_program(&self, program: &Path) -> Option<PathBuf> {
        if program.components().count() > 1 {
            return program.is_file().then(|| program.to_path_buf());
        }

        let path_var = self.get("PATH").or_else(|| self.get("Path"))?;
        env::split_paths(path_var).find_map(|dir| {
            let candidate = dir.join(program);
            if candidate.is_file() {
                return Some(candidate);
            }
            let suffix = env::consts::EXE_SUFFIX;
            if suffix.is_empty() || candidate.extension().is_some() {
                return None;
            }
            let mut with_suffix = OsString::from(candidate);
            with_suffix.push(suffix);
            let with_suffix = PathBuf::from(with_suffix);
            with_suffix.is_file().then_some(with_suffix)
        })
    }
}

/// Split bootstrap output into `(key, value)` pairs.
///
/// Each line is split at its first `=`. Lines without `=` and lines with an empty key (Windows emits entries such
/// as `=C:=C:\` for per-drive directories) are ignored.
pub fn parse_env_lines(output: &str) -> impl Iterator<Item = (&str, &str)> {
    output.lines().filter_map(|line| {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let (key, value) = line.split_once('=')?;
        (!key.is_empty()).then_some((key, value))
    })
}

/// Split NUL-separated bootstrap output into `(key, value)` pairs.
///
/// Values may contain newlines. Records without `=` or with an empty key are ignored.
pub fn parse_env_nul(output: &str) -> impl Iterator<Item = (&str, &str)> {
    output.split('\0').filter_map(|record| {
        let (key, value) = record.split_once('=')?;
        (!key.is_empty()).then_some((key, value))
    })
}

/// Printed after the script has been sourced; everything before it is the script's own output.
const DUMP_MARKER: &str = "__FADORS_ENV__";

/// The environment dump following [`DUMP_MARKER`], or `None` when the shell never reached it.
fn environment_dump(stdout: &str) -> Option<&str> {
    let (_, dump) = stdout.split_once(DUMP_MARKER)?;
    Some(dump.strip_prefix("\r\n").or_else(|| dump.strip_prefix('\n')).unwrap_or(dump))
}

/// Runs the toolchain bootstrap script once and captures the environment it leaves behind.
#[derive(Debug, Clone)]
pub struct EnvironmentBootstrapper {
    script: Option<PathBuf>,
}

impl EnvironmentBootstrapper {
    pub fn new(script: Option<PathBuf>) -> Self {
        Self { script }
    }

    /// Produce the toolchain environment on top of `base`.
    ///
    /// A missing script is not an error: the toolchain may already be on `PATH`. A script that exists but fails
    /// is fatal, since every later stage would run in a half-configured environment.
    #[tracing::instrument(skip_all, fields(script = ?self.script))]
    pub fn bootstrap(&self, base: Environment) -> HarnessResult<Environment> {
        let Some(script) = self.script.as_deref() else {
            return Ok(base);
        };
        if !script.exists() {
            tracing::debug!("bootstrap script {} not present; using inherited environment", script.display());
            return Ok(base);
        }

        let fail = |reason: String| HarnessError::Bootstrap {
            script: script.to_path_buf(),
            reason,
        };

        let output = bootstrap_command(script)
            .env_clear()
            .envs(base.iter())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| fail(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(fail(format!("{} {}", output.status, stderr.trim())));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let Some(dump) = environment_dump(&stdout) else {
            return Err(fail("script exited before its environment could be captured".to_string()));
        };

        let mut environment = base;
        let applied = merge_dump(&mut environment, dump);
        tracing::info!("bootstrap applied {} variables from {}", applied, script.display());
        Ok(environment)
    }
}

/// The line handed to `cmd /C`.
///
/// The whole line is wrapped in one more pair of quotes: `cmd` strips the outermost pair when the line contains
/// special characters such as the parentheses in `Program Files (x86)`, which leaves the script path quoted.
#[cfg_attr(not(windows), allow(dead_code))]
fn cmd_line(script: &Path) -> String {
    format!("\"\"{}\" && echo {DUMP_MARKER}&& set\"", script.display())
}

#[cfg(windows)]
fn bootstrap_command(script: &Path) -> Command {
    use std::os::windows::process::CommandExt;

    let mut command = Command::new("cmd");
    command.arg("/C").raw_arg(cmd_line(script));
    command
}

#[cfg(windows)]
fn merge_dump(environment: &mut Environment, dump: &str) -> usize {
    environment.merge_lines(dump)
}

#[cfg(not(windows))]
fn bootstrap_command(script: &Path) -> Command {
    let script = std::path::absolute(script).unwrap_or_else(|_| script.to_path_buf());
    let mut command = Command::new("sh");
    command
        .arg("-c")
        .arg(format!(r#". "$0" >/dev/null && echo {DUMP_MARKER} && env -0"#))
        .arg(script);
    command
}

#[cfg(not(windows))]
fn merge_dump(environment: &mut Environment, dump: &str) -> usize {
    environment.merge_nul_separated(dump)
}

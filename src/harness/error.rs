//! Fatal harness errors
//!
//! These abort a run before any test executes. Everything that can go wrong *inside* a test's pipeline is a
//! per-test [`FailReason`](super::model::FailReason) instead and never surfaces here.

use std::io;
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use super::manifest::ManifestError;

#[derive(Debug, Error, Diagnostic)]
pub enum HarnessError {
    #[error("compiler not found at {}", path.display())]
    #[diagnostic(
        code(fadors::compiler_missing),
        help("build the compiler first, or point --compiler / FADORS_COMPILER at it")
    )]
    CompilerNotFound { path: PathBuf },

    #[error("toolchain bootstrap `{}` failed: {reason}", script.display())]
    #[diagnostic(
        code(fadors::bootstrap_failed),
        help("run the script by hand to see its output, or pass --no-bootstrap")
    )]
    Bootstrap { script: PathBuf, reason: String },

    #[error("cannot read test directory {}", dir.display())]
    #[diagnostic(code(fadors::test_dir))]
    TestDir {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot read manifest {}", path.display())]
    #[diagnostic(code(fadors::manifest_io))]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid manifest {}", path.display())]
    #[diagnostic(
        code(fadors::manifest_invalid),
        help("each line must be `<basename>.c <expected exit code>`; `#` starts a comment")
    )]
    Manifest {
        path: PathBuf,
        #[source]
        source: ManifestError,
    },

    #[error("failed to start the process runtime")]
    #[diagnostic(code(fadors::runtime))]
    Runtime(#[source] io::Error),
}

/// Result type for fatal harness operations.
pub type HarnessResult<T> = Result<T, HarnessError>;

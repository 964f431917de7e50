//! Define the pipeline stages and pipeline modes.
//!
//! A test program travels through at most four stages, always in the same order:
//! compile → assemble → link → execute. The order is encoded in the derived `Ord` of [`StageKind`], so
//! "a later stage" has a precise meaning everywhere in the harness.

use std::fmt;
use std::str::FromStr;

/// One discrete external-tool invocation in the source-to-executable pipeline.
///
/// ## Examples
/// ```rust
/// use fadors_core::StageKind;
///
/// assert!(StageKind::Compile < StageKind::Assemble);
/// assert!(StageKind::Link < StageKind::Execute);
/// assert_eq!(StageKind::Assemble.as_str(), "assemble");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StageKind {
    Compile,
    Assemble,
    Link,
    Execute,
}

impl StageKind {
    /// All stages, in pipeline order.
    pub const ALL: [StageKind; 4] = [StageKind::Compile, StageKind::Assemble, StageKind::Link, StageKind::Execute];

    /// Lowercase name used in logs and machine-readable reports.
    pub const fn as_str(self) -> &'static str {
        match self {
            StageKind::Compile => "compile",
            StageKind::Assemble => "assemble",
            StageKind::Link => "link",
            StageKind::Execute => "execute",
        }
    }

    /// Short label used in the human-readable summary table (`FAIL (Comp)`).
    pub const fn label(self) -> &'static str {
        match self {
            StageKind::Compile => "Comp",
            StageKind::Assemble => "Asm",
            StageKind::Link => "Link",
            StageKind::Execute => "Exec",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape of the pipeline the harness drives.
///
/// - `Masm`: the compiler emits MASM text; the harness assembles and links it with external tools.
/// - `Object`: the compiler writes a COFF object and links it itself (through `FADORS_LINKER`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PipelineMode {
    #[default]
    Masm,
    Object,
}

impl PipelineMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            PipelineMode::Masm => "masm",
            PipelineMode::Object => "object",
        }
    }

    /// Flag passed to the compiler to select this mode's output.
    pub const fn compiler_flag(self) -> &'static str {
        match self {
            PipelineMode::Masm => "--masm",
            PipelineMode::Object => "--obj",
        }
    }
}

impl fmt::Display for PipelineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown pipeline mode name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseModeError {
    value: String,
}

impl fmt::Display for ParseModeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid pipeline mode '{}': expected 'masm' or 'object'", self.value)
    }
}

impl std::error::Error for ParseModeError {}

impl FromStr for PipelineMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "masm" | "asm" => Ok(PipelineMode::Masm),
            "object" | "obj" | "coff" => Ok(PipelineMode::Object),
            _ => Err(ParseModeError { value: s.to_string() }),
        }
    }
}

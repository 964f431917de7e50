//! Derive artifact paths from a source path by extension substitution.
//!
//! The convention is fixed and collision-free per test directory: `name.c` produces `name.asm`, `name.obj` and
//! `name.exe` next to it. These are the names the compiler under test writes, so the harness must agree with it.

use std::path::{Path, PathBuf};

/// Extension of test program sources.
pub const SOURCE_EXTENSION: &str = "c";
/// Extension of MASM text emitted by the compiler.
pub const ASM_EXTENSION: &str = "asm";
/// Extension of COFF objects.
pub const OBJECT_EXTENSION: &str = "obj";
/// Extension of linked executables.
pub const EXECUTABLE_EXTENSION: &str = "exe";

/// Paths of every artifact a test program can produce.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactPaths {
    pub asm: PathBuf,
    pub object: PathBuf,
    pub executable: PathBuf,
}

impl ArtifactPaths {
    /// Derive the artifact set for `source`.
    ///
    /// ## Examples
    /// ```rust
    /// use std::path::Path;
    /// use fadors_core::ArtifactPaths;
    ///
    /// let paths = ArtifactPaths::from_source(Path::new("tests/01_return.c"));
    /// assert_eq!(paths.asm, Path::new("tests/01_return.asm"));
    /// assert_eq!(paths.object, Path::new("tests/01_return.obj"));
    /// assert_eq!(paths.executable, Path::new("tests/01_return.exe"));
    /// ```
    pub fn from_source(source: &Path) -> Self {
        Self {
            asm: source.with_extension(ASM_EXTENSION),
            object: source.with_extension(OBJECT_EXTENSION),
            executable: source.with_extension(EXECUTABLE_EXTENSION),
        }
    }

    /// Iterate over all artifact paths, in the order stages produce them.
    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        [self.asm.as_path(), self.object.as_path(), self.executable.as_path()].into_iter()
    }
}

/// Check whether `path` names a test program source by extension.
pub fn is_source_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(SOURCE_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dotted_directory_is_untouched() {
        let paths = ArtifactPaths::from_source(Path::new("build.v2/tests/17_for.c"));
        assert_eq!(paths.object, Path::new("build.v2/tests/17_for.obj"));
    }

    #[test]
    fn test_iter_order() {
        let paths = ArtifactPaths::from_source(Path::new("a.c"));
        let names: Vec<_> = paths.iter().map(|p| p.to_string_lossy().into_owned()).collect();
        assert_eq!(names, ["a.asm", "a.obj", "a.exe"]);
    }

    #[test]
    fn test_is_source_file() {
        assert!(is_source_file(Path::new("tests/01_return.c")));
        assert!(!is_source_file(Path::new("tests/01_return.asm")));
        assert!(!is_source_file(Path::new("tests/README")));
    }
}

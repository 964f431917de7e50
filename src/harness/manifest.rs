//! Allow-list of test programs and their expected exit codes.
//!
//! The built-in list comes from [`fadors_core::corpus`]. A manifest file can replace it:
//!
//! ```text
//! # name              expected
//! 01_return.c         42
//! 23_pointer_math.c   0
//! 99_crash.c          0xC0000005
//! ```
//!
//! Expected values may be decimal or `0x` hex; both are normalized to signed 32-bit, so a crash status can be
//! listed the way the OS reports it.

use std::fs;
use std::path::Path;

use fadors_core::{PipelineMode, corpus, normalize, parse_status};
use thiserror::Error;

use super::error::{HarnessError, HarnessResult};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManifestError {
    #[error("line {line}: expected `<name> <exit code>`, found {text:?}")]
    Malformed { line: usize, text: String },

    #[error("line {line}: invalid exit code {value:?}")]
    BadExitCode { line: usize, value: String },

    #[error("line {line}: duplicate entry {name:?}")]
    Duplicate { line: usize, name: String },
}

/// Ordered allow-list: basename → expected exit code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowList {
    entries: Vec<(String, i32)>,
}

impl AllowList {
    /// The built-in corpus entries ready for `mode`.
    pub fn builtin(mode: PipelineMode) -> Self {
        Self {
            entries: corpus::allow_list(mode).map(|e| (e.name.to_string(), e.expected)).collect(),
        }
    }

    /// Parse manifest text.
    pub fn parse(text: &str) -> Result<Self, ManifestError> {
        let mut list = Self::default();

        for (idx, raw) in text.lines().enumerate() {
            let line = idx + 1;
            let content = raw.split('#').next().unwrap_or("").trim();
            if content.is_empty() {
                continue;
            }

            let mut fields = content.split_whitespace();
            let (Some(name), Some(value), None) = (fields.next(), fields.next(), fields.next()) else {
                return Err(ManifestError::Malformed {
                    line,
                    text: content.to_string(),
                });
            };

            let expected = parse_status(value).map(normalize).ok_or_else(|| ManifestError::BadExitCode {
                line,
                value: value.to_string(),
            })?;

            if list.contains(name) {
                return Err(ManifestError::Duplicate {
                    line,
                    name: name.to_string(),
                });
            }
            list.entries.push((name.to_string(), expected));
        }

        Ok(list)
    }

    /// Read and parse a manifest file.
    pub fn load(path: &Path) -> HarnessResult<Self> {
        let text = fs::read_to_string(path).map_err(|source| HarnessError::ManifestRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text).map_err(|source| HarnessError::Manifest {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn expected(&self, name: &str) -> Option<i32> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, code)| *code)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.expected(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i32)> {
        self.entries.iter().map(|(n, c)| (n.as_str(), *c))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_entries_and_comments() {
        let list = AllowList::parse("# header\n\n01_return.c 42\n17_for.c\t45   # loop\n").unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list.expected("01_return.c"), Some(42));
        assert_eq!(list.expected("17_for.c"), Some(45));
        assert_eq!(list.expected("02_arithmetic.c"), None);
    }

    #[test]
    fn test_parse_hex_is_normalized() {
        let list = AllowList::parse("99_crash.c 0xC0000005\n").unwrap();
        assert_eq!(list.expected("99_crash.c"), Some(-1_073_741_819));
    }

    #[test]
    fn test_parse_preserves_order() {
        let list = AllowList::parse("b.c 1\na.c 2\n").unwrap();
        let names: Vec<_> = list.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["b.c", "a.c"]);
    }

    #[test]
    fn test_parse_malformed() {
        assert_eq!(
            AllowList::parse("01_return.c\n"),
            Err(ManifestError::Malformed {
                line: 1,
                text: "01_return.c".to_string()
            })
        );
        assert!(matches!(
            AllowList::parse("a.c 1 2\n"),
            Err(ManifestError::Malformed { line: 1, .. })
        ));
    }

    #[test]
    fn test_parse_bad_code() {
        assert_eq!(
            AllowList::parse("a.c 1\nb.c many\n"),
            Err(ManifestError::BadExitCode {
                line: 2,
                value: "many".to_string()
            })
        );
    }

    #[test]
    fn test_parse_duplicate() {
        assert!(matches!(
            AllowList::parse("a.c 1\na.c 2\n"),
            Err(ManifestError::Duplicate { line: 2, .. })
        ));
    }

    #[test]
    fn test_builtin_matches_corpus() {
        let list = AllowList::builtin(PipelineMode::Masm);
        assert_eq!(list.expected("17_for.c"), Some(45));
        assert!(!list.contains("02_arithmetic.c"));
        assert!(AllowList::builtin(PipelineMode::Object).contains("02_arithmetic.c"));
    }
}

//! Test discovery and selection
//!
//! Discovery lists the candidate sources in the test directory; selection intersects them with the
//! [`AllowList`]. Programs that are not allow-listed are excluded silently: the list scopes the run, it does not
//! judge correctness.

use std::fs;
use std::path::{Path, PathBuf};

use fadors_core::naming;

use super::error::{HarnessError, HarnessResult};
use super::manifest::AllowList;
use super::model::TestCase;

/// List test program sources directly inside `dir`, sorted by file name.
///
/// Sorting makes the run order, and with it the report, independent of how the filesystem enumerates entries.
pub fn discover_test_files(dir: &Path) -> HarnessResult<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|source| HarnessError::TestDir {
        dir: dir.to_path_buf(),
        source,
    })?;

    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && naming::is_source_file(path))
        .collect();
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Intersects discovered files with an allow-list.
#[derive(Debug, Clone, Copy)]
pub struct TestSelector<'a> {
    allow_list: &'a AllowList,
    keyword: Option<&'a str>,
}

impl<'a> TestSelector<'a> {
    pub fn new(allow_list: &'a AllowList) -> Self {
        Self {
            allow_list,
            keyword: None,
        }
    }

    /// Keep only tests whose name contains `keyword`.
    pub fn with_keyword(mut self, keyword: Option<&'a str>) -> Self {
        self.keyword = keyword;
        self
    }

    /// Allow-listed candidates, in candidate order.
    pub fn select(&self, candidates: &[PathBuf]) -> Vec<TestCase> {
        let selected: Vec<TestCase> = candidates
            .iter()
            .filter_map(|path| {
                let name = path.file_name()?.to_str()?;
                let expected = self.allow_list.expected(name)?;
                Some(TestCase::new(path.clone(), expected))
            })
            .filter(|case| self.keyword.is_none_or(|k| case.name.contains(k)))
            .collect();

        for (name, _) in self.allow_list.iter() {
            if !selected.iter().any(|c| c.name == name) {
                tracing::debug!("allow-listed test {} not selected", name);
            }
        }
        selected
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(|n| Path::new("tests").join(n)).collect()
    }

    #[test]
    fn test_select_intersection_in_candidate_order() {
        let allow = AllowList::parse("07_function.c 123\n01_return.c 42\n").unwrap();
        let cases = TestSelector::new(&allow).select(&paths(&["01_return.c", "05_loop.c", "07_function.c"]));

        let names: Vec<_> = cases.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["01_return.c", "07_function.c"]);
        assert_eq!(cases[0].expected_exit_code, 42);
        assert_eq!(cases[1].expected_exit_code, 123);
    }

    #[test]
    fn test_missing_allow_listed_file_is_not_an_entry() {
        let allow = AllowList::parse("01_return.c 42\n99_gone.c 0\n").unwrap();
        let cases = TestSelector::new(&allow).select(&paths(&["01_return.c"]));
        assert_eq!(cases.len(), 1);
    }

    #[test]
    fn test_keyword_filter() {
        let allow = AllowList::parse("21_enum.c 6\n22_union.c 42\n").unwrap();
        let cases = TestSelector::new(&allow)
            .with_keyword(Some("union"))
            .select(&paths(&["21_enum.c", "22_union.c"]));
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].name, "22_union.c");
    }

    #[test]
    fn test_discover_sorted_sources_only() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["20_switch.c", "01_return.c", "01_return.asm", "notes.txt"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        fs::create_dir(dir.path().join("nested.c")).unwrap();

        let files = discover_test_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["01_return.c", "20_switch.c"]);
    }

    #[test]
    fn test_discover_missing_dir() {
        let err = discover_test_files(Path::new("no/such/test/dir")).unwrap_err();
        assert!(matches!(err, HarnessError::TestDir { .. }));
    }
}

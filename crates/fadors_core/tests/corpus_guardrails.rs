use std::collections::HashSet;
use std::path::Path;

use fadors_core::naming::{self, ArtifactPaths};
use fadors_core::{CORPUS, PipelineMode, StageKind, corpus};

#[test]
fn corpus_names_unique() {
    let mut seen = HashSet::new();
    for entry in CORPUS {
        assert!(seen.insert(entry.name), "duplicate corpus entry {:?}", entry.name);
    }
}

#[test]
fn corpus_names_are_sources() {
    for entry in CORPUS {
        assert!(
            naming::is_source_file(Path::new(entry.name)),
            "corpus entry is not a .c basename: {}",
            entry.name
        );
        assert!(!entry.name.contains(['/', '\\']), "corpus entry must be a basename: {}", entry.name);
    }
}

#[test]
fn corpus_entries_have_a_mode() {
    for entry in CORPUS {
        assert!(!entry.modes.is_empty(), "corpus entry {} is ready for no mode", entry.name);
    }
}

#[test]
fn corpus_sorted_by_name() {
    let names: Vec<_> = CORPUS.iter().map(|e| e.name).collect();
    let mut sorted = names.clone();
    sorted.sort_unstable();
    assert_eq!(names, sorted, "keep the corpus table in test-number order");
}

#[test]
fn corpus_artifacts_do_not_collide() {
    let mut seen = HashSet::new();
    for entry in CORPUS {
        let paths = ArtifactPaths::from_source(&Path::new("tests").join(entry.name));
        for path in paths.iter() {
            assert!(seen.insert(path.to_path_buf()), "artifact collision at {}", path.display());
        }
    }
}

#[test]
fn every_mode_has_tests() {
    for mode in [PipelineMode::Masm, PipelineMode::Object] {
        assert!(corpus::allow_list(mode).next().is_some(), "no tests for mode {mode}");
    }
}

#[test]
fn stage_names_unique() {
    let names: HashSet<_> = StageKind::ALL.iter().map(|s| s.as_str()).collect();
    assert_eq!(names.len(), StageKind::ALL.len());
}

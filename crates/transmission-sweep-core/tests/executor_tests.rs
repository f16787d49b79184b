use std::fs;
use std::path::Path;
use tempfile::tempdir;

use transmission_sweep_core::executor::{remove_artifacts, DeletionOutcome};
use transmission_sweep_core::model::{ArtifactKind, LocalArtifact};

fn target(path: &Path) -> LocalArtifact {
    LocalArtifact {
        name: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        path: path.to_path_buf(),
        identity: String::new(),
        kind: ArtifactKind::PayloadEntry,
    }
}

#[test]
fn test_removes_files_and_directories() {
    let tmp = tempdir().unwrap();
    let file = tmp.path().join("stale.torrent");
    fs::write(&file, "bytes").unwrap();

    let dir = tmp.path().join("payload");
    fs::create_dir(&dir).unwrap();
    fs::write(dir.join("chunk.bin"), "bytes").unwrap();

    let reports = remove_artifacts(&[target(&file), target(&dir)], false);
    assert!(reports
        .iter()
        .all(|r| r.outcome == DeletionOutcome::Deleted));
    assert!(!file.exists());
    assert!(!dir.exists());
}

#[test]
fn test_already_absent_target_is_success() {
    let tmp = tempdir().unwrap();
    let gone = tmp.path().join("already-gone.torrent");

    let reports = remove_artifacts(&[target(&gone)], false);
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].outcome, DeletionOutcome::AlreadyAbsent);
}

#[test]
fn test_absent_target_does_not_stop_siblings() {
    let tmp = tempdir().unwrap();
    let gone = tmp.path().join("already-gone.torrent");
    let real = tmp.path().join("real.torrent");
    fs::write(&real, "bytes").unwrap();

    let reports = remove_artifacts(&[target(&gone), target(&real)], false);
    assert_eq!(reports[0].outcome, DeletionOutcome::AlreadyAbsent);
    assert_eq!(reports[1].outcome, DeletionOutcome::Deleted);
    assert!(!real.exists());
}

#[test]
fn test_dry_run_touches_nothing() {
    let tmp = tempdir().unwrap();
    let file = tmp.path().join("stale.torrent");
    fs::write(&file, "bytes").unwrap();

    let reports = remove_artifacts(&[target(&file)], true);
    assert_eq!(reports[0].outcome, DeletionOutcome::DryRun);
    assert!(file.exists());
}

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

use crate::model::LocalArtifact;

/// Outcome of one removal attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletionOutcome {
    Deleted,
    /// The target was already gone, e.g. removed by the daemon itself.
    /// Counts as success; deletion is idempotent.
    AlreadyAbsent,
    /// Removal failed (permissions, I/O). Remaining targets are still
    /// attempted.
    Denied(String),
    /// Dry run; nothing was touched.
    DryRun,
}

#[derive(Debug, Clone)]
pub struct DeletionReport {
    pub path: PathBuf,
    pub outcome: DeletionOutcome,
}

/// Apply the deletion set. Each target is attempted independently; a failed
/// removal never aborts its siblings.
pub fn remove_artifacts(targets: &[LocalArtifact], dry_run: bool) -> Vec<DeletionReport> {
    targets
        .iter()
        .map(|artifact| {
            let outcome = if dry_run {
                DeletionOutcome::DryRun
            } else {
                remove_path(&artifact.path)
            };
            match &outcome {
                DeletionOutcome::Denied(reason) => {
                    error!("failed to remove '{}': {}", artifact.path.display(), reason);
                }
                outcome => debug!("{:?}: {}", outcome, artifact.path.display()),
            }
            DeletionReport {
                path: artifact.path.clone(),
                outcome,
            }
        })
        .collect()
}

fn remove_path(path: &Path) -> DeletionOutcome {
    let result = if path.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };

    match result {
        Ok(()) => DeletionOutcome::Deleted,
        Err(err) if err.kind() == io::ErrorKind::NotFound => DeletionOutcome::AlreadyAbsent,
        Err(err) => DeletionOutcome::Denied(err.to_string()),
    }
}

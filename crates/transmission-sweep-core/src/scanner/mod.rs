pub mod descriptor;

use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::Error;
use crate::model::{ArtifactKind, LocalArtifact};

const DESCRIPTOR_EXT: &str = "torrent";
const MAGNET_EXT: &str = "magnet";
const IN_PROGRESS_SUFFIX: &str = ".part";

/// Snapshot a descriptor directory into an ordered artifact list.
///
/// Recognized entries are `.torrent` descriptors and `.magnet` text files;
/// anything else fails the whole run. Partial knowledge of the directory is
/// worse than aborting: a skipped entry could be the only live copy of a
/// task.
pub fn scan_torrents_dir(dir: &Path) -> Result<Vec<LocalArtifact>, Error> {
    let mut artifacts = Vec::new();

    for path in list_entries_sorted(dir)? {
        if path.is_dir() {
            return Err(Error::UnknownArtifactType(path));
        }
        let name = entry_name(&path);
        let artifact = if has_extension(&path, DESCRIPTOR_EXT) {
            let (identity, kind) = descriptor::torrent_identity(&path)?;
            LocalArtifact {
                name,
                path,
                identity,
                kind,
            }
        } else if has_extension(&path, MAGNET_EXT) {
            let identity = descriptor::magnet_identity(&path)?;
            LocalArtifact {
                name,
                path,
                identity,
                kind: ArtifactKind::MagnetDescriptor,
            }
        } else {
            return Err(Error::UnknownArtifactType(path));
        };
        debug!("scanned {} -> {}", artifact.name, artifact.identity);
        artifacts.push(artifact);
    }

    Ok(artifacts)
}

/// Snapshot an incomplete-downloads directory. Every entry (file or
/// directory) is a payload artifact; identity is the entry name with the
/// trailing in-progress suffix stripped, so it matches task display names.
pub fn scan_incomplete_dir(dir: &Path) -> Result<Vec<LocalArtifact>, Error> {
    let mut artifacts = Vec::new();

    for path in list_entries_sorted(dir)? {
        let name = entry_name(&path);
        let identity = name
            .strip_suffix(IN_PROGRESS_SUFFIX)
            .unwrap_or(&name)
            .to_string();
        debug!("scanned {} -> {}", name, identity);
        artifacts.push(LocalArtifact {
            name,
            path,
            identity,
            kind: ArtifactKind::PayloadEntry,
        });
    }

    Ok(artifacts)
}

/// Full directory listing, sorted by name for deterministic output.
fn list_entries_sorted(dir: &Path) -> Result<Vec<PathBuf>, Error> {
    if !dir.is_dir() {
        return Err(Error::MissingDirectory(dir.to_path_buf()));
    }

    let mut paths = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()?;
    paths.sort();
    Ok(paths)
}

fn has_extension(path: &Path, wanted: &str) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some(wanted)
}

fn entry_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

use std::path::PathBuf;

/// How the scanner recognized a local artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// A `.torrent` file carrying a full metainfo dictionary.
    DescriptorFile,
    /// A magnet-derived descriptor: a `.torrent` stub with a precomputed
    /// hash, or a `.magnet` text file.
    MagnetDescriptor,
    /// A payload file or directory in the incomplete-downloads directory.
    PayloadEntry,
}

/// One entry found by the scanner. Built once per run, read-only after.
#[derive(Debug, Clone)]
pub struct LocalArtifact {
    /// Raw file or directory name as read from disk.
    pub name: String,
    pub path: PathBuf,
    /// Lowercase hex hash for descriptors; display name (without the
    /// in-progress suffix) for payload entries.
    pub identity: String,
    pub kind: ArtifactKind,
}

/// Task lifecycle state, mapped from the daemon's numeric status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Stopped,
    CheckWait,
    Checking,
    DownloadWait,
    Downloading,
    SeedWait,
    Seeding,
    Unknown(i64),
}

impl TaskStatus {
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => TaskStatus::Stopped,
            1 => TaskStatus::CheckWait,
            2 => TaskStatus::Checking,
            3 => TaskStatus::DownloadWait,
            4 => TaskStatus::Downloading,
            5 => TaskStatus::SeedWait,
            6 => TaskStatus::Seeding,
            other => TaskStatus::Unknown(other),
        }
    }

    pub fn is_stopped(&self) -> bool {
        matches!(self, TaskStatus::Stopped)
    }
}

/// One task from the daemon's task set, normalized into the identity space
/// shared with local artifacts.
#[derive(Debug, Clone)]
pub struct RemoteTask {
    /// Daemon-assigned identifier, used only for removal calls.
    pub id: i64,
    /// Lowercase hex hash string as reported by the daemon.
    pub identity: String,
    pub display_name: String,
    /// Basename of the descriptor file the daemon loaded the task from.
    pub source_descriptor_name: Option<String>,
    pub status: TaskStatus,
    pub is_finished: bool,
    /// Unix timestamp of completion; zero if never completed.
    pub done_date: i64,
}

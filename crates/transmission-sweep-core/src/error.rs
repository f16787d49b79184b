use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Directory not found: {}", .0.display())]
    MissingDirectory(PathBuf),

    #[error("Malformed descriptor '{}': {reason}", .path.display())]
    MalformedDescriptor { path: PathBuf, reason: String },

    #[error("Unrecognized artifact type: {}", .0.display())]
    UnknownArtifactType(PathBuf),

    #[error("Remote query failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Daemon rejected request: {0}")]
    Daemon(String),

    #[error("Drift detected, {} remote task(s) have no local descriptor: {}", .0.len(), .0.join(", "))]
    DriftDetected(Vec<String>),

    #[error("Conservation check failed: {0} net-new item(s) appeared mid-run")]
    ConservationMismatch(i64),
}

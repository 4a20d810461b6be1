use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DetectiveError {
    #[error("Failed to read file {path:?}: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },

    #[error("Failed to write file {path:?}: {source}")]
    WriteFile { path: PathBuf, source: std::io::Error },

    #[error("Failed to parse JSON in {path:?}: {source}")]
    ParseJson { path: PathBuf, source: serde_json::Error },

    #[error("Failed to serialize JSON for {path:?}: {reason}")]
    SerializeJson { path: PathBuf, reason: String },

    #[error("Project manifest package.json not found at {path:?}")]
    ManifestMissing { path: PathBuf },

    #[error("Invalid manifest in {path:?}: {reason}")]
    ManifestInvalid { path: PathBuf, reason: String },

    #[error("I/O error at {path:?}: {source}")]
    Io { path: PathBuf, source: std::io::Error },

    #[error("Failed to start size scan workers: {reason}")]
    ThreadPool { reason: String },

    #[error("Background task failed: {reason}")]
    Task { reason: String },
}

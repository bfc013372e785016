//! Error types for jungle operations.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::version::Version;

pub type Result<T, E = JungleError> = std::result::Result<T, E>;

/// Errors that can occur while inspecting or changing a jungle.
///
/// Engine operations never apply a partial pointer change: when any of these
/// is returned, `current` is exactly as it was before the call.
#[derive(Debug, Error)]
pub enum JungleError {
    /// The jungle root is missing or is not a directory.
    #[error("invalid jungle root {}: {reason}", .path.display())]
    InvalidJungleRoot { path: PathBuf, reason: &'static str },

    /// No parseable versions where at least one was required.
    #[error("no versions in {}", .path.display())]
    EmptyVersionSet { path: PathBuf },

    #[error("release directory {} does not exist", .path.display())]
    NoReleaseDir { path: PathBuf },

    #[error("{} already exists, will not initialise an existing jungle", .path.display())]
    AlreadyInitialized { path: PathBuf },

    #[error("{} does not exist, jungle is not initialised", .path.display())]
    NoCurrent { path: PathBuf },

    #[error("{} is not a symbolic link", .path.display())]
    NotASymlink { path: PathBuf },

    /// `current` points somewhere other than `release/<name>`.
    #[error("{} points at '{}', expected release/<version>", .path.display(), .target.display())]
    MalformedTarget { path: PathBuf, target: PathBuf },

    #[error("{} points at release/{name}, which is not a valid version", .path.display())]
    InvalidVersion { path: PathBuf, name: String },

    /// `current` names a version whose release directory is gone.
    #[error("{} points at missing release {}", .path.display(), .target.display())]
    DanglingPointer { path: PathBuf, target: PathBuf },

    #[error("version {version} does not exist")]
    UnknownVersion { version: String },

    /// Attempt to remove the active release. Never overridable.
    #[error("refusing to delete current version {version}")]
    CannotDeleteCurrent { version: Version },

    #[error("need at least two versions to degrade, found {found}")]
    InsufficientVersions { found: usize },

    /// `prune --iterations` asked to keep fewer versions than `prune.min_keep`.
    #[error("refusing to keep {requested} versions, prune.min_keep is {min_keep}")]
    BelowRetentionFloor { requested: usize, min_keep: usize },

    #[error("invalid config {}: {message}", .path.display())]
    Config { path: PathBuf, message: String },

    #[error("{action} {}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl JungleError {
    /// Build a mapper from `io::Error` that records what was being done and where.
    pub fn io(action: &'static str, path: &Path) -> impl FnOnce(io::Error) -> Self {
        let path = path.to_path_buf();
        move |source| Self::Io {
            action,
            path,
            source,
        }
    }
}

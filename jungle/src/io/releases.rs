//! Release directory discovery and removal.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::{debug, instrument, trace};

use crate::core::version::Version;
use crate::error::{JungleError, Result};

/// List every version directory directly inside `release_dir`, ascending.
///
/// Entries whose names are not versions, or which are not directories, are
/// ignored.
#[instrument(skip_all, fields(dir = %release_dir.display()))]
pub fn list_versions(release_dir: &Path) -> Result<Vec<Version>> {
    let entries = match fs::read_dir(release_dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(JungleError::NoReleaseDir {
                path: release_dir.to_path_buf(),
            });
        }
        Err(err) => return Err(JungleError::io("read release directory", release_dir)(err)),
    };

    let mut versions = Vec::new();
    for entry in entries {
        let entry = entry.map_err(JungleError::io("read release directory", release_dir))?;
        let name = entry.file_name();
        let Some(version) = name.to_str().and_then(Version::from_dir_name) else {
            trace!(entry = ?name, "skipping non-version entry");
            continue;
        };
        if !entry.path().is_dir() {
            trace!(entry = ?name, "skipping non-directory entry");
            continue;
        }
        versions.push(version);
    }
    versions.sort();
    debug!(count = versions.len(), "discovered versions");
    Ok(versions)
}

/// Last modification time of a release directory.
pub fn modified(path: &Path) -> Result<DateTime<Utc>> {
    let metadata = fs::metadata(path).map_err(JungleError::io("stat release", path))?;
    let mtime = metadata
        .modified()
        .map_err(JungleError::io("read modification time of", path))?;
    Ok(DateTime::<Utc>::from(mtime))
}

/// Recursively remove a release directory.
pub fn remove_release(path: &Path) -> Result<()> {
    fs::remove_dir_all(path).map_err(JungleError::io("remove release", path))?;
    debug!(path = %path.display(), "removed release");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_only_version_directories_in_order() {
        let temp = tempfile::tempdir().expect("tempdir");
        let release = temp.path().join("release");
        for name in ["2.0", "1.0", "bin", "1.3b1", "notes", "01.0"] {
            fs::create_dir_all(release.join(name)).expect("mkdir");
        }
        fs::write(release.join("1.9"), "a file, not a release").expect("write");

        let versions = list_versions(&release).expect("list");
        let names: Vec<String> = versions.iter().map(Version::to_string).collect();
        assert_eq!(names, vec!["1.0", "1.3b1", "2.0"]);
    }

    #[test]
    fn missing_release_dir_is_reported() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = list_versions(&temp.path().join("release")).unwrap_err();
        assert!(matches!(err, JungleError::NoReleaseDir { .. }));
    }

    #[test]
    fn remove_release_deletes_the_subtree() {
        let temp = tempfile::tempdir().expect("tempdir");
        let release = temp.path().join("release/1.0");
        fs::create_dir_all(release.join("bin")).expect("mkdir");
        fs::write(release.join("bin/app"), "#!/bin/sh\n").expect("write");

        remove_release(&release).expect("remove");
        assert!(!release.exists());
    }
}

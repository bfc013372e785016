//! The `current` pointer: validation and atomic replacement.
//!
//! `current` is only ever replaced by building a new link at `current.new`
//! and renaming it over `current`, so readers always see either the old or the
//! new target.

use std::fs;
use std::io::ErrorKind;
use std::os::unix::fs::symlink;
use std::path::{Component, Path};

use tracing::{debug, instrument, warn};

use super::paths::{JunglePaths, RELEASE_DIR, link_target};
use crate::core::version::Version;
use crate::error::{JungleError, Result};

/// Re-read `current` from disk and validate it.
///
/// Checks, in order: the link exists, it is a symlink, its target has the
/// form `release/<name>`, `<name>` is a version, and that release is a
/// directory. Returns the version it points at.
pub fn read_current(paths: &JunglePaths) -> Result<Version> {
    let link = &paths.current_link;
    let metadata = match fs::symlink_metadata(link) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(JungleError::NoCurrent { path: link.clone() });
        }
        Err(err) => return Err(JungleError::io("stat", link)(err)),
    };
    if !metadata.file_type().is_symlink() {
        return Err(JungleError::NotASymlink { path: link.clone() });
    }

    let target = fs::read_link(link).map_err(JungleError::io("read link", link))?;
    let malformed = || JungleError::MalformedTarget {
        path: link.clone(),
        target: target.clone(),
    };
    let components: Vec<Component<'_>> = target.components().collect();
    let name = match components.as_slice() {
        [Component::Normal(dir), Component::Normal(name)] if *dir == RELEASE_DIR => *name,
        _ => return Err(malformed()),
    };

    let name = name.to_str().ok_or_else(malformed)?;
    let version: Version = name.parse().map_err(|_| JungleError::InvalidVersion {
        path: link.clone(),
        name: name.to_string(),
    })?;

    let release = paths.release(&version);
    if !release.is_dir() {
        return Err(JungleError::DanglingPointer {
            path: link.clone(),
            target: release,
        });
    }
    Ok(version)
}

/// True if anything at all occupies the `current` name, including a dangling link.
pub fn current_exists(paths: &JunglePaths) -> Result<bool> {
    occupied(&paths.current_link)
}

/// Atomically point `current` at `release/<version>`.
///
/// The caller guarantees the release exists. A stale `current.new` left by an
/// interrupted run is replaced.
#[instrument(skip_all, fields(version = %version))]
pub fn swap_current(paths: &JunglePaths, version: &Version) -> Result<()> {
    let staging = &paths.staging_link;
    if occupied(staging)? {
        warn!(path = %staging.display(), "replacing stale staging link");
        fs::remove_file(staging).map_err(JungleError::io("remove stale staging link", staging))?;
    }

    let target = link_target(version);
    symlink(&target, staging).map_err(JungleError::io("create staging link", staging))?;

    if let Err(err) = fs::rename(staging, &paths.current_link) {
        // Old pointer is untouched; do not leave the staging link behind.
        let _ = fs::remove_file(staging);
        return Err(JungleError::io("replace", &paths.current_link)(err));
    }
    debug!(target = %target.display(), "current repointed");
    Ok(())
}

fn occupied(path: &Path) -> Result<bool> {
    match fs::symlink_metadata(path) {
        Ok(_) => Ok(true),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
        Err(err) => Err(JungleError::io("stat", path)(err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jungle_with(versions: &[&str]) -> (tempfile::TempDir, JunglePaths) {
        let temp = tempfile::tempdir().expect("tempdir");
        let paths = JunglePaths::new(temp.path());
        for name in versions {
            fs::create_dir_all(paths.release_dir.join(name)).expect("mkdir");
        }
        (temp, paths)
    }

    fn v(s: &str) -> Version {
        s.parse().expect("valid version")
    }

    #[test]
    fn swap_writes_relative_link_and_reads_back() {
        let (_temp, paths) = jungle_with(&["1.0", "2.0"]);

        swap_current(&paths, &v("1.0")).expect("swap");
        assert_eq!(
            fs::read_link(&paths.current_link).expect("read link"),
            Path::new("release/1.0")
        );
        assert_eq!(read_current(&paths).expect("current"), v("1.0"));

        swap_current(&paths, &v("2.0")).expect("swap again");
        assert_eq!(read_current(&paths).expect("current"), v("2.0"));
        assert!(!occupied(&paths.staging_link).expect("stat"));
    }

    #[test]
    fn swap_replaces_stale_staging_link() {
        let (_temp, paths) = jungle_with(&["1.0"]);
        symlink("release/9.9", &paths.staging_link).expect("stale link");

        swap_current(&paths, &v("1.0")).expect("swap");
        assert_eq!(read_current(&paths).expect("current"), v("1.0"));
        assert!(!occupied(&paths.staging_link).expect("stat"));
    }

    #[test]
    fn missing_current_is_no_current() {
        let (_temp, paths) = jungle_with(&["1.0"]);
        let err = read_current(&paths).unwrap_err();
        assert!(matches!(err, JungleError::NoCurrent { .. }));
    }

    #[test]
    fn directory_current_is_not_a_symlink() {
        let (_temp, paths) = jungle_with(&["1.0"]);
        fs::create_dir(&paths.current_link).expect("mkdir current");
        let err = read_current(&paths).unwrap_err();
        assert!(matches!(err, JungleError::NotASymlink { .. }));
    }

    #[test]
    fn targets_outside_release_are_malformed() {
        let (_temp, paths) = jungle_with(&["1.0"]);
        for target in ["1.0", "/srv/release/1.0", "./release/1.0", "release/1.0/bin", "other/1.0"] {
            let _ = fs::remove_file(&paths.current_link);
            symlink(target, &paths.current_link).expect("link");
            let err = read_current(&paths).unwrap_err();
            assert!(
                matches!(err, JungleError::MalformedTarget { .. }),
                "{target}: {err}"
            );
        }
    }

    #[test]
    fn non_version_target_is_invalid_version() {
        let (_temp, paths) = jungle_with(&["1.0"]);
        fs::create_dir_all(paths.release_dir.join("latest")).expect("mkdir");
        symlink("release/latest", &paths.current_link).expect("link");
        let err = read_current(&paths).unwrap_err();
        assert!(matches!(err, JungleError::InvalidVersion { ref name, .. } if name == "latest"));
    }

    #[test]
    fn missing_release_is_dangling() {
        let (_temp, paths) = jungle_with(&["1.0"]);
        symlink("release/3.0", &paths.current_link).expect("link");
        let err = read_current(&paths).unwrap_err();
        assert!(matches!(err, JungleError::DanglingPointer { .. }));
        assert!(current_exists(&paths).expect("stat"));
    }
}
